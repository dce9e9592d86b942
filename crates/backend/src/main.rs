pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;

use std::path::PathBuf;
use std::sync::Arc;

use domain::a001_product::repository::SqliteProductStore;
use domain::a001_product::store::StoreLifecycle;
use shared::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    system::tracing::initialize(&config::get_log_file_path(&cfg))?;

    let db_path = config::get_database_path(&cfg);
    let store = SqliteProductStore::open(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    store.verify_connection().await?;
    tracing::info!("Successfully established connection to storage component");

    let migrations_dir = PathBuf::from(&cfg.server.migration_path);
    if cfg.server.migrate_up {
        store.migrate_up(&migrations_dir).await?;
    }

    let state = routes::AppState {
        store: Arc::new(store.clone()),
    };
    let app = routes::configure_routes(state);

    let address = cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Product API server running on address: {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down server...");
    if cfg.server.migrate_down {
        store.migrate_down(&migrations_dir).await?;
    }
    store.close().await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
