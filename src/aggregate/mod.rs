//! Overview aggregation: node roster, batch latency and per-node system
//! snapshots merged into one view model keyed by node id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::client::{ApiError, TelemetryApi};
use crate::model::{keyed_by_node, LatencyStat, NodeSummary, Range, SysSnapshot};

/// One overview card's worth of data.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub node: NodeSummary,
    pub latency: Option<LatencyStat>,
    pub snapshot: Option<SysSnapshot>,
}

/// The overview grid, in roster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewModel {
    pub nodes: Vec<NodeView>,
}

impl OverviewModel {
    pub fn find(&self, node_id: i64) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.node.id == node_id)
    }
}

/// Raw results of one overview load, before merging.
#[derive(Debug)]
pub struct OverviewFetch {
    pub roster: Result<Vec<NodeSummary>, ApiError>,
    /// `None` when no latency call was made for this load.
    pub latency: Option<Result<HashMap<i64, LatencyStat>, ApiError>>,
    /// Latest snapshot per roster node; `None` when the node never
    /// reported or its fetch failed.
    pub snapshots: HashMap<i64, Option<SysSnapshot>>,
}

impl OverviewFetch {
    /// Merge into a new model.
    ///
    /// A failed roster keeps the prior cards (and their snapshots); a
    /// failed batch keeps the prior latency figures. Both failures are
    /// returned for reporting.
    pub fn merge(self, prior: &OverviewModel) -> (OverviewModel, Vec<ApiError>) {
        let mut errors = Vec::new();

        let latency = match self.latency {
            Some(Ok(latency)) => Some(latency),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };
        let latency_for = |id: i64, prior_stat: Option<&LatencyStat>| match &latency {
            Some(map) => map.get(&id).cloned(),
            None => prior_stat.cloned(),
        };

        let nodes = match self.roster {
            Ok(roster) => {
                let mut snapshots = self.snapshots;
                roster
                    .into_iter()
                    .map(|node| {
                        let prior_stat = prior.find(node.id).and_then(|v| v.latency.as_ref());
                        NodeView {
                            latency: latency_for(node.id, prior_stat),
                            snapshot: snapshots.remove(&node.id).flatten(),
                            node,
                        }
                    })
                    .collect()
            }
            Err(e) => {
                errors.push(e);
                prior
                    .nodes
                    .iter()
                    .map(|view| NodeView {
                        latency: latency_for(view.node.id, view.latency.as_ref()),
                        ..view.clone()
                    })
                    .collect()
            }
        };

        (OverviewModel { nodes }, errors)
    }
}

/// Fetches the three overview sources.
#[derive(Clone)]
pub struct DashboardAggregator {
    api: Arc<dyn TelemetryApi>,
}

impl DashboardAggregator {
    pub fn new(api: Arc<dyn TelemetryApi>) -> Self {
        Self { api }
    }

    /// Authenticated overview: roster (then its snapshot fan-out) and the
    /// batch latency call run concurrently.
    pub async fn fetch_overview(&self, range: Range) -> OverviewFetch {
        let roster_then_snapshots = async {
            let roster = self.api.node_roster().await;
            let snapshots = match &roster {
                Ok(nodes) => {
                    let ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
                    self.fetch_snapshots(&ids).await
                }
                Err(_) => HashMap::new(),
            };
            (roster, snapshots)
        };

        let ((roster, snapshots), latency) =
            tokio::join!(roster_then_snapshots, self.api.latency_batch(range));

        OverviewFetch { roster, latency: Some(latency), snapshots }
    }

    /// Latest snapshot of every node, one independent request each.
    ///
    /// Completions are collected in whatever order they finish and
    /// keyed by node id. A failed request yields `None` for that node
    /// only.
    pub async fn fetch_snapshots(&self, node_ids: &[i64]) -> HashMap<i64, Option<SysSnapshot>> {
        let mut out: HashMap<i64, Option<SysSnapshot>> =
            node_ids.iter().map(|id| (*id, None)).collect();

        let mut join_set = JoinSet::new();
        for &node_id in node_ids {
            let api = self.api.clone();
            join_set.spawn(async move { (node_id, api.latest_snapshot(node_id).await) });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((node_id, Ok(snapshot))) => {
                    out.insert(node_id, snapshot);
                }
                Ok((node_id, Err(e))) => {
                    tracing::warn!("Snapshot fetch failed for node {}: {}", node_id, e);
                }
                Err(e) => {
                    tracing::error!("Snapshot task aborted: {}", e);
                }
            }
        }

        out
    }

    /// Shared overview: the read-only endpoint returns all three sources
    /// in one payload, so a failure is reported once, against the roster.
    pub async fn fetch_shared_overview(&self, range: Range) -> OverviewFetch {
        match self.api.shared_overview(range).await {
            Ok(shared) => {
                let mut sys = keyed_by_node(shared.sys);
                let snapshots = shared.nodes.iter().map(|n| (n.id, sys.remove(&n.id))).collect();
                OverviewFetch {
                    roster: Ok(shared.nodes),
                    latency: Some(Ok(keyed_by_node(shared.stats))),
                    snapshots,
                }
            }
            Err(e) => OverviewFetch {
                roster: Err(e),
                latency: None,
                snapshots: HashMap::new(),
            },
        }
    }
}
