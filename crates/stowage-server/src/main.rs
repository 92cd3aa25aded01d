//! Stowage Server — connects to SurrealDB and brings the schema up to date.

use std::process::ExitCode;

use stowage_db::{DbConfig, DbManager, run_migrations};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stowage=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting Stowage server...");

    let config = DbConfig::from_env();
    info!(url = %config.url, namespace = %config.namespace, database = %config.database, "Connecting to SurrealDB");

    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "Failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        error!(error = %e, "Schema migration failed");
        return ExitCode::FAILURE;
    }

    info!("Stowage server ready.");
    ExitCode::SUCCESS
}
