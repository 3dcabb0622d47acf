//! Client side of the panel backend's RPC channel.
//!
//! Every call is a JSON `POST` answered with a `{code, msg, data}`
//! envelope.

#[cfg(test)]
pub mod fake;
mod http;

pub use http::*;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{DetailPayload, LatencyStat, NodeSummary, Range, SharedOverview, SysSnapshot};

/// Backend call error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend answered HTTP {0}")]
    Status(u16),
    #[error("backend rejected request (code {code}): {msg}")]
    Rejected { code: i64, msg: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("no admin token configured")]
    MissingToken,
}

impl ApiError {
    /// Text shown to the user in a transient notice.
    pub fn notice(&self) -> String {
        match self {
            ApiError::Transport(_) => "Network error".to_string(),
            ApiError::Rejected { msg, .. } if !msg.trim().is_empty() => msg.clone(),
            ApiError::Status(code) => format!("Request failed (HTTP {})", code),
            ApiError::MissingToken => "Not signed in".to_string(),
            _ => "Request failed".to_string(),
        }
    }
}

/// RPC routes consumed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    NetworkStats,
    NetworkStatsBatch,
    NodeList,
    NodeSysinfo,
    ShareNetworkList,
    ShareNetworkStats,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::NetworkStats => "/node/network-stats",
            Endpoint::NetworkStatsBatch => "/node/network-stats-batch",
            Endpoint::NodeList => "/node/list",
            Endpoint::NodeSysinfo => "/node/sysinfo",
            Endpoint::ShareNetworkList => "/share/network-list",
            Endpoint::ShareNetworkStats => "/share/network-stats",
        }
    }

    /// Share routes are public and must never carry the admin token.
    pub fn requires_token(self) -> bool {
        !matches!(self, Endpoint::ShareNetworkList | Endpoint::ShareNetworkStats)
    }
}

/// Request/response contracts of the backend operations the dashboard
/// reads.
#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Probe samples, targets, disconnects and SLA of one node.
    async fn node_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError>;

    /// Pre-aggregated latency per node.
    async fn latency_batch(&self, range: Range) -> Result<HashMap<i64, LatencyStat>, ApiError>;

    async fn node_roster(&self) -> Result<Vec<NodeSummary>, ApiError>;

    /// Most recent system snapshot of one node, `None` when it never
    /// reported.
    async fn latest_snapshot(&self, node_id: i64) -> Result<Option<SysSnapshot>, ApiError>;

    /// Read-only mirror of roster + batch latency + latest snapshots.
    async fn shared_overview(&self, range: Range) -> Result<SharedOverview, ApiError>;

    /// Read-only mirror of [`TelemetryApi::node_detail`].
    async fn shared_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        let rejected = ApiError::Rejected { code: 1, msg: "node not found".to_string() };
        assert_eq!(rejected.notice(), "node not found");

        let blank = ApiError::Rejected { code: 1, msg: "  ".to_string() };
        assert_eq!(blank.notice(), "Request failed");

        assert_eq!(ApiError::Transport("refused".to_string()).notice(), "Network error");
        assert_eq!(ApiError::Decode("eof".to_string()).notice(), "Request failed");
    }

    #[test]
    fn test_share_endpoints_are_public() {
        assert!(!Endpoint::ShareNetworkList.requires_token());
        assert!(!Endpoint::ShareNetworkStats.requires_token());
        assert!(Endpoint::NodeSysinfo.requires_token());
    }
}
