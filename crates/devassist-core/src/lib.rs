//! DevAssist Core: domain models, repository traits, error taxonomy and
//! the ticket authorization policy.

pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
