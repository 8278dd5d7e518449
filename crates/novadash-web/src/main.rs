mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use novadash_core::{
    ConfigLoader,
    DeployContext,
    NovadashConfig,
    ServerConfig,
};
use tower_http::cors::{
    Any,
    CorsLayer,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

struct ApiServerConfig {
    bind_addr: SocketAddr,
    cors_allow_all: bool,
}

impl ApiServerConfig {
    /// `NOVADASH_BIND_ADDR` and `NOVADASH_CORS_ALLOW_ALL` override the config file
    fn resolve(server: &ServerConfig) -> anyhow::Result<Self> {
        let bind_addr = std::env::var("NOVADASH_BIND_ADDR")
            .unwrap_or_else(|_| server.bind_addr.clone());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind_addr))?;

        let cors_allow_all = std::env::var("NOVADASH_CORS_ALLOW_ALL")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(server.cors_allow_all);

        Ok(Self {
            bind_addr,
            cors_allow_all,
        })
    }
}

pub(crate) fn build_app(state: AppState, cors_allow_all: bool) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_router())
        .fallback(|| async { axum::http::StatusCode::NOT_FOUND })
        .layer(TraceLayer::new_for_http())
        .layer(if cors_allow_all {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Already installed is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    if std::env::var("NOVADASH_DEV")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
    {
        novadash_core::logging::init_dev();
    } else {
        novadash_core::logging::init();
    }

    tracing::info!("Starting Novadash API server");

    let config_path = ConfigLoader::discover_config_path();
    let (config, load_error) = match ConfigLoader::load_or_env(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (NovadashConfig::default(), Some(e.to_string())),
    };

    let api_config = ApiServerConfig::resolve(&config.server)?;
    tracing::info!("Bind address: {}", api_config.bind_addr);

    let app_state = match load_error {
        Some(error) => {
            tracing::error!("Failed to load config {}: {}", config_path.display(), error);
            AppState::config_error(error)
        }
        None => match DeployContext::from_config(&config) {
            Ok(core) => {
                tracing::info!(
                    project_id = core.project_id,
                    "Configuration valid - services ready"
                );
                AppState::initialized(core)
            }
            Err(e) => {
                tracing::error!("Invalid configuration: {}", e);
                AppState::config_error(e.to_string())
            }
        },
    };

    let app = build_app(app_state, api_config.cors_allow_all);

    tracing::info!("Listening on {}", api_config.bind_addr);
    let listener = tokio::net::TcpListener::bind(api_config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", api_config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
