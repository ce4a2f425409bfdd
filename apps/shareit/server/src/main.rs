use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_shareit::Repositories;
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, StorageBackend};
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before anything fallible, so startup errors are reported in colour
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(storage = %config.storage, "Starting ShareIt");

    let (repositories, db) = match (&config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            let db = database::postgres::connect_from_config_with_retry(database.clone(), None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            database::postgres::run_migrations::<Migrator>(&db, config.app.name)
                .await
                .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

            (Repositories::postgres(db.clone()), Some(db))
        }
        (StorageBackend::Postgres, None) => {
            eyre::bail!("Postgres storage selected without a database configuration")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    let state = AppState {
        config,
        repositories,
        db,
    };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &state.config.environment)?;

    // - /health: liveness with app name/version
    // - /ready: readiness with a storage ping
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    create_production_app(app, &state.config.server, async move {
        if let Some(db) = state.db {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("ShareIt shutdown complete");
    Ok(())
}
