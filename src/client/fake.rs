//! Scripted in-memory backend used by the aggregator, view and web tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiError, TelemetryApi};
use crate::model::{DetailPayload, LatencyStat, NodeSummary, Range, SharedOverview, SysSnapshot};

#[derive(Default)]
pub struct ScriptedApi {
    pub nodes: Vec<NodeSummary>,
    pub roster_fails: bool,
    pub batch: HashMap<i64, LatencyStat>,
    pub batch_fails: bool,
    pub snapshots: HashMap<i64, SysSnapshot>,
    pub failing_snapshots: HashSet<i64>,
    pub snapshot_delays: HashMap<i64, u64>,
    pub details: HashMap<i64, DetailPayload>,
    pub detail_fails: bool,
    pub detail_delays: HashMap<Range, u64>,
    pub shared: SharedOverview,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn node(id: i64, name: &str, online: bool) -> NodeSummary {
        NodeSummary {
            id,
            name: name.to_string(),
            status: Some(if online { 1 } else { 0 }),
            ..Default::default()
        }
    }

    pub fn snapshot(cpu: f64) -> SysSnapshot {
        SysSnapshot { cpu, mem: 40.0, uptime: 3_700, bytes_tx: 2048, bytes_rx: 1024 }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(msg: &str) -> ApiError {
        ApiError::Rejected { code: 1, msg: msg.to_string() }
    }
}

async fn pause(ms: Option<&u64>) {
    if let Some(ms) = ms {
        tokio::time::sleep(Duration::from_millis(*ms)).await;
    }
}

#[async_trait]
impl TelemetryApi for ScriptedApi {
    async fn node_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError> {
        self.record(format!("detail:{}:{}", node_id, range));
        pause(self.detail_delays.get(&range)).await;
        if self.detail_fails {
            return Err(Self::rejected("detail unavailable"));
        }
        Ok(self.details.get(&node_id).cloned().unwrap_or_default())
    }

    async fn latency_batch(&self, range: Range) -> Result<HashMap<i64, LatencyStat>, ApiError> {
        self.record(format!("batch:{}", range));
        if self.batch_fails {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(self.batch.clone())
    }

    async fn node_roster(&self) -> Result<Vec<NodeSummary>, ApiError> {
        self.record("roster".to_string());
        if self.roster_fails {
            return Err(Self::rejected("roster unavailable"));
        }
        Ok(self.nodes.clone())
    }

    async fn latest_snapshot(&self, node_id: i64) -> Result<Option<SysSnapshot>, ApiError> {
        self.record(format!("sysinfo:{}", node_id));
        pause(self.snapshot_delays.get(&node_id)).await;
        if self.failing_snapshots.contains(&node_id) {
            return Err(ApiError::Transport("timed out".to_string()));
        }
        Ok(self.snapshots.get(&node_id).cloned())
    }

    async fn shared_overview(&self, range: Range) -> Result<SharedOverview, ApiError> {
        self.record(format!("share-list:{}", range));
        if self.roster_fails {
            return Err(Self::rejected("share disabled"));
        }
        Ok(self.shared.clone())
    }

    async fn shared_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError> {
        self.record(format!("share-detail:{}:{}", node_id, range));
        pause(self.detail_delays.get(&range)).await;
        if self.detail_fails {
            return Err(Self::rejected("share disabled"));
        }
        Ok(self.details.get(&node_id).cloned().unwrap_or_default())
    }
}
