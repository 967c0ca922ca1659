//! DevAssist Auth: password verification, JWT issuance/validation and
//! the login/refresh/logout flow.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::{Claims, TokenUse};
