//! Error types for DevAssist Hub.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevAssistError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    AlreadyExists { entity: String },

    #[error("{reason}")]
    Unauthorized { reason: String },

    #[error("{reason}")]
    Forbidden { reason: String },

    #[error("{feature} feature is not enabled")]
    Disabled { feature: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DevAssistError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type DevAssistResult<T> = Result<T, DevAssistError>;
