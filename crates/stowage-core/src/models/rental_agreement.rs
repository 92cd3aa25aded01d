//! Rental agreement domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tenant::NewTenant;

/// A recorded rent-out. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalAgreement {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub agent_id: Uuid,
    pub tenant_id: Uuid,
    /// The accepted request this agreement was created from.
    pub request_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Monthly price in cents.
    pub monthly_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for the "create agreement" action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRentalAgreement {
    pub request_id: Uuid,
    pub warehouse_id: Uuid,
    pub agent_id: Uuid,
    pub tenant: NewTenant,
}

/// Fully resolved agreement handed to the store. Dates and price come
/// from the originating request's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRentalAgreement {
    pub request_id: Uuid,
    pub warehouse_id: Uuid,
    pub agent_id: Uuid,
    pub tenant: NewTenant,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_price_cents: i64,
}
