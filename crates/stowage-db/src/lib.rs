//! Stowage Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The unit-of-work helper for multi-statement writes
//!   ([`transaction::in_transaction`])
//! - Implementations of the `stowage-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
mod schema;

pub mod repository;
pub mod transaction;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
