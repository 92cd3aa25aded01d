//! Error types for the Stowage system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StowageError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    /// Covers every failure of the request lifecycle: warehouse not
    /// available, race lost on accept, unknown request, store failure.
    #[error("Rental request error: {0}")]
    RequestCreation(String),

    #[error("Rental agreement could not be created: {0}")]
    RentalAgreementCreation(String),

    #[error("Review could not be persisted: {0}")]
    ReviewPersistence(String),

    #[error("Conflicting state: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StowageError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
        }
    }

    /// Whether the error originates from caller input rather than the store.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::IllegalArgument(_) | Self::AuthorizationDenied { .. }
        )
    }
}

pub type StowageResult<T> = Result<T, StowageError>;
