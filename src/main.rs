mod config;
mod db;
mod error;
mod handlers;
mod models;
mod service;
mod store;
mod voting;

use config::{Config, StoreBackend};
use db::Database;
use handlers::AppState;
use log::{error, info, warn};
use service::VotingService;
use std::sync::Arc;
use store::{MemoryRowStore, RowStore, SqliteRowStore};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::load();

    let store: Arc<dyn RowStore> = match config.store_backend {
        StoreBackend::Sqlite => match SqliteRowStore::connect(&config.database_url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Failed to open row store at {}: {}", config.database_url, e);
                return;
            }
        },
        StoreBackend::Memory => {
            warn!("Using the in-memory row store; data is lost on shutdown");
            Arc::new(MemoryRowStore::default())
        }
    };

    let database = Database::new(store);
    if let Err(e) = database.ensure_headers().await {
        error!("Failed to prepare sheets: {}", e);
        return;
    }

    if config.admin_secret.is_none() {
        warn!("ADMIN_SECRET is not set; admin and results routes are open");
    }

    let service = VotingService::new(database, config.reject_duplicate_projects);
    let address = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState { service, config });
    let app = handlers::router(state);

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            return;
        }
    };
    info!("Server running on {}", address);

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {:?}", e);
    }
    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
