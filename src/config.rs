//! Configuration module for panelwatch.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

use thiserror::Error;

use crate::model::Range;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid backend url {0:?}: expected http:// or https://")]
    BackendUrl(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Base URL of the panel backend (default: "http://127.0.0.1:6365")
    pub backend_url: String,
    /// Path prefix of the backend RPC routes (default: "/api/v1")
    pub api_prefix: String,
    /// Admin token. Without one only the shared views are served.
    pub token: Option<String>,
    /// Range selected when a page is opened without `?range=`
    pub default_range: Range,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            backend_url: "http://127.0.0.1:6365".to_string(),
            api_prefix: "/api/v1".to_string(),
            token: None,
            default_range: Range::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PANELWATCH_HTTP_PORT`: HTTP port (default: 8080)
    /// - `PANELWATCH_BACKEND_URL`: backend base URL (default: "http://127.0.0.1:6365")
    /// - `PANELWATCH_API_PREFIX`: backend route prefix (default: "/api/v1")
    /// - `PANELWATCH_TOKEN`: admin token (default: unset)
    /// - `PANELWATCH_DEFAULT_RANGE`: one of 1h, 12h, 1d, 7d, 30d (default: "1h")
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("PANELWATCH_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(url) = env::var("PANELWATCH_BACKEND_URL") {
            if !url.trim().is_empty() {
                cfg.backend_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(prefix) = env::var("PANELWATCH_API_PREFIX") {
            cfg.api_prefix = normalize_prefix(&prefix);
        }

        if let Ok(token) = env::var("PANELWATCH_TOKEN") {
            if !token.trim().is_empty() {
                cfg.token = Some(token.trim().to_string());
            }
        }

        if let Ok(range) = env::var("PANELWATCH_DEFAULT_RANGE") {
            if let Some(range) = Range::from_token(&range) {
                cfg.default_range = range;
            }
        }

        cfg
    }

    /// Check the values that cannot be defaulted away.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConfigError::BackendUrl(self.backend_url.clone()));
        }
        Ok(())
    }

    /// Full URL of the backend API root, e.g. `http://host:6365/api/v1`.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.backend_url, self.api_prefix)
    }

    /// Whether the authenticated (admin) views are available.
    pub fn has_admin(&self) -> bool {
        self.token.is_some()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
