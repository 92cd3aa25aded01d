//! Error boundary of the lifecycle operations.
//!
//! Store failures are logged here and re-raised as the domain error of
//! the operation that hit them. Caller mistakes (validation, permission,
//! illegal arguments) and errors that already carry a domain meaning pass
//! through unchanged.

use stowage_core::error::StowageError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    CreateRequests,
    AcceptRequest,
    DeclineRequest,
    CreateAgreement,
    PersistReview,
}

impl LifecycleOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateRequests => "create_rental_requests",
            Self::AcceptRequest => "accept_rental_request",
            Self::DeclineRequest => "decline_rental_request",
            Self::CreateAgreement => "create_rental_agreement",
            Self::PersistReview => "create_and_persist_review",
        }
    }

    /// Translate `err` into this operation's domain error.
    pub fn fail(self, err: StowageError) -> StowageError {
        if err.is_caller_error() || is_domain_error(&err) {
            return err;
        }

        warn!(operation = self.name(), error = %err, "rental lifecycle operation failed");

        let message = err.to_string();
        match self {
            Self::CreateRequests | Self::AcceptRequest | Self::DeclineRequest => {
                StowageError::RequestCreation(message)
            }
            Self::CreateAgreement => StowageError::RentalAgreementCreation(message),
            Self::PersistReview => StowageError::ReviewPersistence(message),
        }
    }

    /// Build this operation's domain error from a message.
    pub fn reject(self, message: impl Into<String>) -> StowageError {
        let message = message.into();
        warn!(operation = self.name(), reason = %message, "rental lifecycle operation rejected");
        match self {
            Self::CreateRequests | Self::AcceptRequest | Self::DeclineRequest => {
                StowageError::RequestCreation(message)
            }
            Self::CreateAgreement => StowageError::RentalAgreementCreation(message),
            Self::PersistReview => StowageError::ReviewPersistence(message),
        }
    }
}

fn is_domain_error(err: &StowageError) -> bool {
    matches!(
        err,
        StowageError::RequestCreation(_)
            | StowageError::RentalAgreementCreation(_)
            | StowageError::ReviewPersistence(_)
    )
}
