//! SurrealDB implementation of [`WarehouseRepository`].

use chrono::{DateTime, Utc};
use stowage_core::error::{StowageError, StowageResult};
use stowage_core::models::warehouse::{
    Address, ClimateCondition, CreateWarehouse, StorageType, UpdateWarehouse, Warehouse,
    WarehouseStatus,
};
use stowage_core::repository::{PaginatedResult, Pagination, WarehouseRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::row::{CountRow, parse_uuid};

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct WarehouseRow {
    record_id: String,
    owner_id: String,
    size_sq_m: u32,
    street: String,
    city: String,
    postal_code: String,
    country: String,
    storage_type: String,
    climate: String,
    status: String,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_status(s: &str) -> Result<WarehouseStatus, DbError> {
    match s {
        "Available" => Ok(WarehouseStatus::Available),
        "PendingRental" => Ok(WarehouseStatus::PendingRental),
        "Rented" => Ok(WarehouseStatus::Rented),
        other => Err(DbError::decode(
            "warehouse",
            format!("unknown status: {other}"),
        )),
    }
}

pub(crate) fn status_to_string(s: WarehouseStatus) -> &'static str {
    match s {
        WarehouseStatus::Available => "Available",
        WarehouseStatus::PendingRental => "PendingRental",
        WarehouseStatus::Rented => "Rented",
    }
}

fn parse_storage_type(s: &str) -> Result<StorageType, DbError> {
    match s {
        "General" => Ok(StorageType::General),
        "ColdStorage" => Ok(StorageType::ColdStorage),
        "Hazardous" => Ok(StorageType::Hazardous),
        "Bulk" => Ok(StorageType::Bulk),
        other => Err(DbError::decode(
            "warehouse",
            format!("unknown storage type: {other}"),
        )),
    }
}

fn storage_type_to_string(s: StorageType) -> &'static str {
    match s {
        StorageType::General => "General",
        StorageType::ColdStorage => "ColdStorage",
        StorageType::Hazardous => "Hazardous",
        StorageType::Bulk => "Bulk",
    }
}

fn parse_climate(s: &str) -> Result<ClimateCondition, DbError> {
    match s {
        "Ambient" => Ok(ClimateCondition::Ambient),
        "Refrigerated" => Ok(ClimateCondition::Refrigerated),
        "Frozen" => Ok(ClimateCondition::Frozen),
        "HumidityControlled" => Ok(ClimateCondition::HumidityControlled),
        other => Err(DbError::decode(
            "warehouse",
            format!("unknown climate condition: {other}"),
        )),
    }
}

fn climate_to_string(c: ClimateCondition) -> &'static str {
    match c {
        ClimateCondition::Ambient => "Ambient",
        ClimateCondition::Refrigerated => "Refrigerated",
        ClimateCondition::Frozen => "Frozen",
        ClimateCondition::HumidityControlled => "HumidityControlled",
    }
}

impl WarehouseRow {
    fn try_into_warehouse(self) -> Result<Warehouse, DbError> {
        Ok(Warehouse {
            id: parse_uuid("warehouse", "record", &self.record_id)?,
            owner_id: parse_uuid("warehouse", "owner", &self.owner_id)?,
            size_sq_m: self.size_sq_m,
            address: Address {
                street: self.street,
                city: self.city,
                postal_code: self.postal_code,
                country: self.country,
            },
            storage_type: parse_storage_type(&self.storage_type)?,
            climate: parse_climate(&self.climate)?,
            status: parse_status(&self.status)?,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Warehouse repository.
#[derive(Clone)]
pub struct SurrealWarehouseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWarehouseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WarehouseRepository for SurrealWarehouseRepository<C> {
    async fn create(&self, input: CreateWarehouse) -> StowageResult<Warehouse> {
        if input.size_sq_m == 0 {
            return Err(StowageError::validation("warehouse size must be positive"));
        }
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('warehouse', $id) SET \
                 owner_id = $owner_id, size_sq_m = $size_sq_m, \
                 street = $street, city = $city, \
                 postal_code = $postal_code, country = $country, \
                 storage_type = $storage_type, climate = $climate, \
                 status = 'Available', deleted = false; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('warehouse', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("size_sq_m", input.size_sq_m))
            .bind(("street", input.address.street))
            .bind(("city", input.address.city))
            .bind(("postal_code", input.address.postal_code))
            .bind(("country", input.address.country))
            .bind((
                "storage_type",
                storage_type_to_string(input.storage_type).to_string(),
            ))
            .bind(("climate", climate_to_string(input.climate).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WarehouseRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("warehouse", id_str))?;

        Ok(row.try_into_warehouse()?)
    }

    async fn get_by_id(&self, id: Uuid) -> StowageResult<Warehouse> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('warehouse', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WarehouseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("warehouse", id_str))?;

        Ok(row.try_into_warehouse()?)
    }

    async fn update(&self, id: Uuid, input: UpdateWarehouse) -> StowageResult<Warehouse> {
        if input.size_sq_m == Some(0) {
            return Err(StowageError::validation("warehouse size must be positive"));
        }
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.size_sq_m.is_some() {
            sets.push("size_sq_m = $size_sq_m");
        }
        if input.address.is_some() {
            sets.push("street = $street, city = $city");
            sets.push("postal_code = $postal_code, country = $country");
        }
        if input.storage_type.is_some() {
            sets.push("storage_type = $storage_type");
        }
        if input.climate.is_some() {
            sets.push("climate = $climate");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('warehouse', $id) SET {} \
             WHERE deleted = false; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('warehouse', $id) WHERE deleted = false;",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(size) = input.size_sq_m {
            builder = builder.bind(("size_sq_m", size));
        }
        if let Some(address) = input.address {
            builder = builder
                .bind(("street", address.street))
                .bind(("city", address.city))
                .bind(("postal_code", address.postal_code))
                .bind(("country", address.country));
        }
        if let Some(storage_type) = input.storage_type {
            builder = builder.bind(("storage_type", storage_type_to_string(storage_type).to_string()));
        }
        if let Some(climate) = input.climate {
            builder = builder.bind(("climate", climate_to_string(climate).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WarehouseRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("warehouse", id_str))?;

        Ok(row.try_into_warehouse()?)
    }

    async fn delete(&self, id: Uuid) -> StowageResult<()> {
        // Soft-delete, unless a rental round is in flight.
        let current = self.get_by_id(id).await?;
        if current.status == WarehouseStatus::PendingRental {
            return Err(StowageError::Conflict(format!(
                "warehouse {id} has pending rental requests"
            )));
        }

        let mut result = self
            .db
            .query(
                "UPDATE type::record('warehouse', $id) SET \
                 deleted = true, updated_at = time::now() \
                 WHERE status != 'PendingRental' \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        if ids.is_empty() {
            return Err(StowageError::Conflict(format!(
                "warehouse {id} has pending rental requests"
            )));
        }

        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> StowageResult<PaginatedResult<Warehouse>> {
        let owner_id_str = owner_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM warehouse \
                 WHERE owner_id = $owner_id AND deleted = false GROUP ALL",
            )
            .bind(("owner_id", owner_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM warehouse \
                 WHERE owner_id = $owner_id AND deleted = false \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner_id", owner_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WarehouseRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_warehouse())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_available_by_owner(&self, owner_id: Uuid) -> StowageResult<Vec<Warehouse>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM warehouse \
                 WHERE owner_id = $owner_id AND deleted = false \
                 AND status = 'Available' \
                 ORDER BY created_at ASC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WarehouseRow> = result.take(0).map_err(DbError::from)?;

        let warehouses = rows
            .into_iter()
            .map(|row| row.try_into_warehouse())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(warehouses)
    }

    async fn update_status(&self, id: Uuid, status: WarehouseStatus) -> StowageResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('warehouse', $id) SET \
                 status = $status, updated_at = time::now() \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        if ids.is_empty() {
            return Err(DbError::not_found("warehouse", id_str).into());
        }

        Ok(())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: WarehouseStatus,
        to: WarehouseStatus,
    ) -> StowageResult<bool> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('warehouse', $id) SET \
                 status = $to, updated_at = time::now() \
                 WHERE status = $from AND deleted = false \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id.to_string()))
            .bind(("from", status_to_string(from).to_string()))
            .bind(("to", status_to_string(to).to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;

        Ok(!ids.is_empty())
    }
}
