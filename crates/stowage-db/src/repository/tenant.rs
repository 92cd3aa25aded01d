//! SurrealDB implementation of [`TenantRepository`].
//!
//! Tenants are only ever created inside the agreement transaction, so
//! this repository is read-only.

use chrono::{DateTime, Utc};
use stowage_core::error::StowageResult;
use stowage_core::models::tenant::Tenant;
use stowage_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TenantRow {
    first_name: String,
    last_name: String,
    company: String,
    created_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> StowageResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tenant", id_str))?;

        Ok(Tenant {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
            created_at: row.created_at,
        })
    }
}
