//! Database-specific error types and conversions.

use stowage_core::error::StowageError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Transaction aborted: {0}")]
    Transaction(String),

    #[error("Corrupt {entity} row: {reason}")]
    Decode { entity: &'static str, reason: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn decode(entity: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            entity,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<DbError> for StowageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StowageError::NotFound { entity, id },
            DbError::Transaction(msg) => StowageError::Conflict(msg),
            other => StowageError::Database(other.to_string()),
        }
    }
}
