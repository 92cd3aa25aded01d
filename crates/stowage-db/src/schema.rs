//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (owners, agents, administrators)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Owner', 'Agent', 'Administrator'];
DEFINE FIELD received_reviews ON TABLE user TYPE array<string> \
    DEFAULT [];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Warehouses (owned by a user, soft-deleted)
-- =======================================================================
DEFINE TABLE warehouse SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE warehouse TYPE string;
DEFINE FIELD size_sq_m ON TABLE warehouse TYPE int ASSERT $value > 0;
DEFINE FIELD street ON TABLE warehouse TYPE string;
DEFINE FIELD city ON TABLE warehouse TYPE string;
DEFINE FIELD postal_code ON TABLE warehouse TYPE string;
DEFINE FIELD country ON TABLE warehouse TYPE string;
DEFINE FIELD storage_type ON TABLE warehouse TYPE string \
    ASSERT $value IN ['General', 'ColdStorage', 'Hazardous', 'Bulk'];
DEFINE FIELD climate ON TABLE warehouse TYPE string \
    ASSERT $value IN ['Ambient', 'Refrigerated', 'Frozen', \
    'HumidityControlled'];
DEFINE FIELD status ON TABLE warehouse TYPE string \
    ASSERT $value IN ['Available', 'PendingRental', 'Rented'];
DEFINE FIELD deleted ON TABLE warehouse TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE warehouse TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE warehouse TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_warehouse_owner ON TABLE warehouse COLUMNS owner_id;

-- =======================================================================
-- Request details (shared by every request of one round)
-- =======================================================================
DEFINE TABLE request_details SCHEMAFULL;
DEFINE FIELD warehouse_id ON TABLE request_details TYPE string;
DEFINE FIELD monthly_price_cents ON TABLE request_details TYPE int \
    ASSERT $value > 0;
DEFINE FIELD start_date ON TABLE request_details TYPE datetime;
DEFINE FIELD end_date ON TABLE request_details TYPE datetime;

-- =======================================================================
-- Rental requests (one per warehouse/agent pair, never hard-deleted)
-- =======================================================================
DEFINE TABLE rental_request SCHEMAFULL;
DEFINE FIELD details_id ON TABLE rental_request TYPE string;
DEFINE FIELD warehouse_id ON TABLE rental_request TYPE string;
DEFINE FIELD agent_id ON TABLE rental_request TYPE string;
DEFINE FIELD status ON TABLE rental_request TYPE string \
    ASSERT $value IN ['Pending', 'Accepted', 'Declined'];
DEFINE FIELD invalid ON TABLE rental_request TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE rental_request TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE rental_request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rental_request_warehouse ON TABLE rental_request \
    COLUMNS warehouse_id;
DEFINE INDEX idx_rental_request_agent ON TABLE rental_request \
    COLUMNS agent_id, status;

-- =======================================================================
-- Tenants (renting party, created with each agreement)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD first_name ON TABLE tenant TYPE string;
DEFINE FIELD last_name ON TABLE tenant TYPE string;
DEFINE FIELD company ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Rental agreements (immutable)
-- =======================================================================
DEFINE TABLE rental_agreement SCHEMAFULL;
DEFINE FIELD warehouse_id ON TABLE rental_agreement TYPE string;
DEFINE FIELD agent_id ON TABLE rental_agreement TYPE string;
DEFINE FIELD tenant_id ON TABLE rental_agreement TYPE string;
DEFINE FIELD request_id ON TABLE rental_agreement TYPE string;
DEFINE FIELD start_date ON TABLE rental_agreement TYPE datetime;
DEFINE FIELD end_date ON TABLE rental_agreement TYPE datetime;
DEFINE FIELD monthly_price_cents ON TABLE rental_agreement TYPE int;
DEFINE FIELD created_at ON TABLE rental_agreement TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rental_agreement_request ON TABLE rental_agreement \
    COLUMNS request_id UNIQUE;

-- =======================================================================
-- Reviews of agents
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD agent_id ON TABLE review TYPE string;
DEFINE FIELD reviewer_id ON TABLE review TYPE string;
DEFINE FIELD assessment ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD description ON TABLE review TYPE string;
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_agent ON TABLE review COLUMNS agent_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
