//! reqwest-backed implementation of [`TelemetryApi`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, Endpoint, TelemetryApi};
use crate::model::{
    keyed_by_node, DetailPayload, LatencyStat, NodeSummary, Range, SharedOverview, SysSnapshot,
};

/// Response envelope shared by every backend route.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

/// Client for the panel backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl HttpBackend {
    /// `base` is the API root, e.g. `http://127.0.0.1:6365/api/v1`.
    pub fn new(base: impl Into<String>, token: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post<T>(&self, endpoint: Endpoint, body: Value) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.base, endpoint.path());
        let mut request = self.client.post(&url).json(&body);

        if endpoint.requires_token() {
            let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("POST {} failed: {}", endpoint.path(), e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("POST {} answered {}", endpoint.path(), status);
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_envelope(&bytes).inspect_err(|e| {
            tracing::warn!("POST {}: {}", endpoint.path(), e);
        })
    }
}

fn decode_envelope<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    let envelope: Envelope<T> =
        serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))?;

    if envelope.code != 0 {
        return Err(ApiError::Rejected {
            code: envelope.code,
            msg: envelope.msg.unwrap_or_default(),
        });
    }

    Ok(envelope.data.unwrap_or_default())
}

#[async_trait]
impl TelemetryApi for HttpBackend {
    async fn node_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError> {
        let payload: DetailPayload = self
            .post(Endpoint::NetworkStats, json!({ "nodeId": node_id, "range": range }))
            .await?;
        Ok(payload.normalized())
    }

    async fn latency_batch(&self, range: Range) -> Result<HashMap<i64, LatencyStat>, ApiError> {
        let stats: HashMap<String, LatencyStat> = self
            .post(Endpoint::NetworkStatsBatch, json!({ "range": range }))
            .await?;
        Ok(keyed_by_node(stats))
    }

    async fn node_roster(&self) -> Result<Vec<NodeSummary>, ApiError> {
        self.post(Endpoint::NodeList, json!({})).await
    }

    async fn latest_snapshot(&self, node_id: i64) -> Result<Option<SysSnapshot>, ApiError> {
        let series: Vec<SysSnapshot> = self
            .post(
                Endpoint::NodeSysinfo,
                json!({ "nodeId": node_id, "range": Range::OneHour, "limit": 1 }),
            )
            .await?;
        Ok(series.into_iter().last())
    }

    async fn shared_overview(&self, range: Range) -> Result<SharedOverview, ApiError> {
        self.post(Endpoint::ShareNetworkList, json!({ "range": range })).await
    }

    async fn shared_detail(&self, node_id: i64, range: Range) -> Result<DetailPayload, ApiError> {
        let payload: DetailPayload = self
            .post(Endpoint::ShareNetworkStats, json!({ "nodeId": node_id, "range": range }))
            .await?;
        Ok(payload.normalized())
    }
}
