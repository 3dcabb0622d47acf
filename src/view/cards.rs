//! Overview grid cards.

use crate::aggregate::NodeView;
use crate::telemetry::{
    format_latency, format_traffic, format_uptime, format_usage, BillingLine, UNAVAILABLE,
};

/// Display-ready fields of one overview card.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCard {
    pub id: i64,
    pub name: String,
    pub online: bool,
    pub version: Option<String>,
    pub cpu: String,
    pub mem: String,
    pub uptime: String,
    pub latency: String,
    /// Name of the target behind the latest latency value.
    pub latency_target: Option<String>,
    pub tx: String,
    pub rx: String,
    pub billing: Option<String>,
    /// Active billing-cycle override, if any.
    pub cycle_override: Option<u32>,
}

impl NodeCard {
    /// Offline nodes show no live metric at all, even when a stale
    /// snapshot or latency figure is present.
    pub fn new(view: &NodeView, cycle_override: Option<u32>, now_ms: i64) -> Self {
        let node = &view.node;
        let online = node.is_online();
        let snapshot = view.snapshot.as_ref().filter(|_| online);
        let latency = view.latency.as_ref().filter(|_| online);
        let unavailable = || UNAVAILABLE.to_string();

        Self {
            id: node.id,
            name: node.name.clone(),
            online,
            version: node.version.clone().filter(|v| !v.is_empty()),
            cpu: snapshot.map(|s| format_usage(s.cpu)).unwrap_or_else(unavailable),
            mem: snapshot.map(|s| format_usage(s.mem)).unwrap_or_else(unavailable),
            uptime: snapshot.map(|s| format_uptime(s.uptime)).unwrap_or_else(unavailable),
            latency: if online { format_latency(latency) } else { unavailable() },
            latency_target: latency
                .and_then(|l| l.latest_target.as_ref())
                .map(|t| t.name.clone())
                .filter(|n| !n.is_empty()),
            tx: snapshot.map(|s| format_traffic(s.bytes_tx)).unwrap_or_else(unavailable),
            rx: snapshot.map(|s| format_traffic(s.bytes_rx)).unwrap_or_else(unavailable),
            billing: BillingLine::for_node(node, cycle_override, now_ms).map(|b| b.render()),
            cycle_override,
        }
    }
}
