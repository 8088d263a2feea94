//! FLEETGATE Server — Application entry point.

use fleetgate_db::{DbConfig, DbManager, run_migrations};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fleetgate=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting FLEETGATE server...");

    let db_config = DbConfig::from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to run database migrations");
        std::process::exit(1);
    }

    // TODO: Start REST API server once the HTTP surface lands

    tracing::info!("FLEETGATE server stopped.");
}
