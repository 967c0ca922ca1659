//! Domain models for DevAssist Hub.
//!
//! These are the core types shared across all crates.

pub mod comment;
pub mod kb_article;
pub mod playbook;
pub mod suggestion;
pub mod ticket;
pub mod user;
