//! Authentication error types.

use devassist_core::error::DevAssistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("refresh token has been revoked")]
    TokenRevoked,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for DevAssistError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::TokenRevoked => DevAssistError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => DevAssistError::Crypto(msg),
        }
    }
}
