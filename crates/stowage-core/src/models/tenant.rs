//! Tenant domain model.
//!
//! A tenant is the party renting a warehouse through an agreement. Tenants
//! are not login accounts; a fresh record is created with every agreement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Company the tenant rents on behalf of.
    pub company: String,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Tenant details supplied when an agreement is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTenant {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
}
