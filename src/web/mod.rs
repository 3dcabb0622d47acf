//! Web server module.

mod handlers;
mod render;
mod session;

use session::SessionStore;

use crate::client::TelemetryApi;
use crate::config::ServerConfig;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub api: Arc<dyn TelemetryApi>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: ServerConfig, api: Arc<dyn TelemetryApi>) -> Self {
        Self {
            sessions: SessionStore::new(config.default_range),
            config,
            api,
        }
    }
}

/// Web server for the dashboard.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(config: ServerConfig, api: Arc<dyn TelemetryApi>) -> Self {
        Self { state: AppState::new(config, api) }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        router(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/", get(handlers::handle_root))
        // Authenticated pages
        .route("/network", get(handlers::handle_overview))
        .route("/network/{id}", get(handlers::handle_detail))
        .route("/network/cycle", post(handlers::handle_cycle))
        // Share pages
        .route("/share/network", get(handlers::handle_share_overview))
        .route("/share/network/{id}", get(handlers::handle_share_detail))
        // API
        .route("/api/resize", post(handlers::handle_resize))
        .route("/health", get(handlers::handle_health))
        // Static assets
        .route("/assets/{*path}", get(handlers::handle_asset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
