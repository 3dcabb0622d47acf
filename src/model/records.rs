//! Records exchanged with the panel backend.

use std::collections::HashMap;

use serde::Deserialize;

use super::de;

/// One latency probe against one target.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSample {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub target_id: Option<i64>,
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub time_ms: i64,
    #[serde(default, deserialize_with = "de::flag")]
    pub ok: bool,
    /// Only meaningful when `ok` is set.
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub rtt_ms: Option<f64>,
}

/// A monitored endpoint, looked up by id for legends.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProbeTarget {
    /// Filled in from the map key when the entry omits it.
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
}

/// One outage interval. `up_at_ms == None` means the node is still down.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectEvent {
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub down_at_ms: i64,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub up_at_ms: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub duration_s: Option<i64>,
}

/// Roster entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_days")]
    pub cycle_days: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub start_date_ms: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
}

impl NodeSummary {
    pub fn is_online(&self) -> bool {
        self.status == Some(1)
    }
}

/// Target that produced a node's latest latency value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LatestTarget {
    #[serde(default, deserialize_with = "de::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Server-side latency summary for one node over one range.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyStat {
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub avg: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub latest: Option<f64>,
    #[serde(default)]
    pub latest_target: Option<LatestTarget>,
}

/// Latest point-in-time system metrics of a node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SysSnapshot {
    #[serde(default, deserialize_with = "de::f64_or_zero")]
    pub cpu: f64,
    #[serde(default, deserialize_with = "de::f64_or_zero")]
    pub mem: f64,
    /// Seconds since boot.
    #[serde(default, deserialize_with = "de::u64_or_zero")]
    pub uptime: u64,
    #[serde(default, deserialize_with = "de::u64_or_zero")]
    pub bytes_tx: u64,
    #[serde(default, deserialize_with = "de::u64_or_zero")]
    pub bytes_rx: u64,
}

/// Everything the detail view shows for one node over one range.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DetailPayload {
    #[serde(default, deserialize_with = "de::null_default")]
    pub results: Vec<ProbeSample>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub targets: HashMap<String, ProbeTarget>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub disconnects: Vec<DisconnectEvent>,
    #[serde(default, deserialize_with = "de::f64_or_zero")]
    pub sla: f64,
}

impl DetailPayload {
    /// Apply the ingestion invariants: `sla` in `[0,1]` and target ids
    /// matching their map keys.
    pub fn normalized(mut self) -> Self {
        self.sla = if self.sla.is_finite() { self.sla.clamp(0.0, 1.0) } else { 0.0 };
        for (key, target) in self.targets.iter_mut() {
            if target.id == 0 {
                if let Ok(id) = key.parse() {
                    target.id = id;
                }
            }
        }
        self
    }

    /// Legend label for a grouped series key.
    pub fn target_label(&self, key: &str) -> String {
        target_label(&self.targets, key)
    }
}

/// Target name for a series key, synthesized when the lookup misses.
pub fn target_label(targets: &HashMap<String, ProbeTarget>, key: &str) -> String {
    match targets.get(key) {
        Some(t) if !t.name.is_empty() => t.name.clone(),
        _ => format!("Target {}", key),
    }
}

/// Combined payload of the shared overview call.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SharedOverview {
    #[serde(default, deserialize_with = "de::null_default")]
    pub nodes: Vec<NodeSummary>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub stats: HashMap<String, LatencyStat>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub sys: HashMap<String, SysSnapshot>,
}

/// Re-key a JSON object keyed by stringified node ids.
///
/// Keys that are not integers cannot belong to any roster entry and are
/// dropped.
pub fn keyed_by_node<T>(map: HashMap<String, T>) -> HashMap<i64, T> {
    map.into_iter()
        .filter_map(|(k, v)| match k.trim().parse() {
            Ok(id) => Some((id, v)),
            Err(_) => {
                tracing::debug!("Ignoring non-numeric node key {:?}", k);
                None
            }
        })
        .collect()
}
