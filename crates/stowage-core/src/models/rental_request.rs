//! Rental request domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StowageError, StowageResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// Price and period shared by all requests sent in one round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestDetails {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    /// Monthly price in cents.
    pub monthly_price_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One agent's copy of a solicitation.
///
/// `status` and `invalid` are orthogonal: a declined request is also
/// invalid, and an accepted request becomes invalid once the agreement is
/// recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRequest {
    pub id: Uuid,
    pub details_id: Uuid,
    pub warehouse_id: Uuid,
    pub agent_id: Uuid,
    pub status: RequestStatus,
    pub invalid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentalRequest {
    pub fn is_open(&self) -> bool {
        !self.invalid && self.status == RequestStatus::Pending
    }

    /// Accepted and not yet consumed by an agreement.
    pub fn is_accepted(&self) -> bool {
        !self.invalid && self.status == RequestStatus::Accepted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequestDetails {
    pub warehouse_id: Uuid,
    pub monthly_price_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreateRequestDetails {
    /// Field-level checks: positive price and a non-empty period of at
    /// least `min_lease_days`.
    pub fn validate(&self, min_lease_days: i64) -> StowageResult<()> {
        if self.monthly_price_cents <= 0 {
            return Err(StowageError::validation("monthly price must be positive"));
        }
        if self.start_date >= self.end_date {
            return Err(StowageError::validation(
                "start date must be before end date",
            ));
        }
        let days = (self.end_date - self.start_date).num_days();
        if days < min_lease_days {
            return Err(StowageError::validation(format!(
                "lease must last at least {min_lease_days} days, got {days}"
            )));
        }
        Ok(())
    }
}
