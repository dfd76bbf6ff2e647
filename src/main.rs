use domain::gateway::blob_store::GcsBlobStore;
use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(err) = Logger::init_logger(&config) {
        eprintln!("Failed to start logging: {err}");
        std::process::exit(1);
    }

    info!("Starting up call insights dashboard...");
    debug!("Runtime environment: {}", config.runtime_env());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(err) => {
            error!("Could not connect to the database: {err:?}");
            std::process::exit(1);
        }
    };

    if let Err(err) = Migrator::up(db.as_ref(), None).await {
        error!("Database migration failed: {err:?}");
        std::process::exit(1);
    }

    let blob_store = match GcsBlobStore::new(&config) {
        Ok(blob_store) => Arc::new(blob_store),
        Err(err) => {
            error!("Object storage is not configured (set STORAGE_HMAC_ACCESS_ID and STORAGE_HMAC_SECRET): {err:?}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &db, blob_store);

    if let Err(err) = web::init_server(app_state).await {
        error!("Server stopped: {err}");
        std::process::exit(1);
    }
}
