//! panelwatch - network telemetry dashboard
//!
//! Renders the latency, loss and availability pages of a server panel
//! from its backend RPC API.

mod aggregate;
mod client;
mod config;
mod model;
mod telemetry;
mod view;
mod web;

use client::{HttpBackend, TelemetryApi};
use config::ServerConfig;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("panelwatch=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    cfg.validate()?;
    tracing::info!("Starting panelwatch on port {}...", cfg.http_port);
    tracing::info!("Using backend at {}", cfg.api_base());
    if !cfg.has_admin() {
        tracing::warn!("No admin token configured, serving share pages only");
    }

    let api: Arc<dyn TelemetryApi> = Arc::new(HttpBackend::new(cfg.api_base(), cfg.token.clone())?);

    // Start web server
    let server = Server::new(cfg, api);
    server.start().await?;

    Ok(())
}
