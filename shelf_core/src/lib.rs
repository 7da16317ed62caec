//! Core library for the document shelf: registry, validation and route handlers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notice;
pub mod registry;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use notice::{Notice, NoticeLevel};
pub use registry::{DocumentEntry, DocumentRegistry, RegistryConfig, RegistryError, ResolvedDocument};

use axum::{extract::DefaultBodyLimit, Router};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub registry: DocumentRegistry,
}

impl AppState {
    pub fn new(registry: DocumentRegistry) -> Self {
        Self {
            app_name: "Mobi Shelf".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            registry,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(DocumentRegistry::new(config.registry_config()))
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let body_limit = usize::try_from(state.registry.config().max_upload_bytes).unwrap_or(usize::MAX);

    let mut router = create_routes().layer(DefaultBodyLimit::max(body_limit));

    if config.logging.log_requests {
        router = middleware::logging::with_request_logging(router);
    }

    router.with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
