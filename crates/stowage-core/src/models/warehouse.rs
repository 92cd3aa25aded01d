//! Warehouse domain model.
//!
//! A warehouse moves through `Available -> PendingRental -> Rented` as a
//! side effect of the request and agreement operations. Declining the last
//! open request is the only way back to `Available`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WarehouseStatus {
    /// Open to new rental requests.
    Available,
    /// Has outstanding request(s), not yet agreed.
    PendingRental,
    /// An agreement is in force.
    Rented,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageType {
    General,
    ColdStorage,
    Hazardous,
    Bulk,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClimateCondition {
    Ambient,
    Refrigerated,
    Frozen,
    HumidityControlled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Floor area in square meters.
    pub size_sq_m: u32,
    pub address: Address,
    pub storage_type: StorageType,
    pub climate: ClimateCondition,
    pub status: WarehouseStatus,
    /// Soft-delete marker. Warehouses are never removed once referenced.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn accepts_requests(&self) -> bool {
        !self.deleted && self.status == WarehouseStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWarehouse {
    pub owner_id: Uuid,
    pub size_sq_m: u32,
    pub address: Address,
    pub storage_type: StorageType,
    pub climate: ClimateCondition,
}

/// Physical attributes an owner may edit. Status is never set here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateWarehouse {
    pub size_sq_m: Option<u32>,
    pub address: Option<Address>,
    pub storage_type: Option<StorageType>,
    pub climate: Option<ClimateCondition>,
}
