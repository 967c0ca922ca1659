//! Database-specific error types and conversions.

use devassist_core::error::DevAssistError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed {entity} row: {reason}")]
    InvalidRow { entity: &'static str, reason: String },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Duplicate {entity}: {reason}")]
    Duplicate { entity: &'static str, reason: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_row(entity: &'static str, reason: impl ToString) -> Self {
        Self::InvalidRow {
            entity,
            reason: reason.to_string(),
        }
    }
}

impl From<DbError> for DevAssistError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DevAssistError::NotFound { entity, id },
            DbError::Duplicate { entity, .. } => DevAssistError::AlreadyExists {
                entity: entity.into(),
            },
            DbError::PasswordHash(msg) => DevAssistError::Crypto(msg),
            other => DevAssistError::Database(other.to_string()),
        }
    }
}
