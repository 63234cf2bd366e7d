use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use configs::{AppConfig, StorageMode};
use migration::MigratorTrait;
use service::{db::route_store::SeaOrmRouteStore, file::route_store::FileRouteStore, Backend, RouteRegistry};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the stores and resolve the primary backend.
///
/// The file store is always loaded (and migrated). With a database
/// configured, failing to connect or to create the table aborts startup.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let file = Arc::new(FileRouteStore::open(&cfg.storage.routes_file).await);

    let backend = match cfg.storage_mode() {
        StorageMode::File => Backend::File,
        StorageMode::Database(db_cfg) => {
            let db = models::db::connect_with_config(&db_cfg)
                .await
                .context("cannot connect to database")?;
            migration::Migrator::up(&db, None)
                .await
                .context("cannot create json_routes table")?;
            Backend::Database(Arc::new(SeaOrmRouteStore::new(db)))
        }
    };

    let registry = RouteRegistry::new(file, backend);
    info!(event = "storage_selected", storage = registry.storage().as_str(), routes_file = %cfg.storage.routes_file, "route registry ready");
    Ok(ServerState { registry: Arc::new(registry) })
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.storage.public_dir, &cfg.storage.routes_file).await?;

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, &cfg.storage.public_dir, build_cors());

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .with_context(|| format!("cannot bind {}:{}", cfg.server.host, cfg.server.port))?;
    let addr = listener.local_addr()?;
    info!(%addr, public_dir = %cfg.storage.public_dir, "json host listening");
    axum::serve(listener, app).await?;
    Ok(())
}
