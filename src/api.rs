//! REST boundary to the cluster manager and Spark APIs.
//!
//! All monitor endpoints are served by one backend proxy under a common base
//! URL. Responses that Spark returns in two shapes (a bare array, or an
//! object wrapper when no application is active) are normalized here so the
//! ambiguity never reaches the cache or the views.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::model::{
    ClusterConfig, ClusterCreateResponse, ClusterDeleteResponse, ClusterStatus, ExecutorSummary,
    MasterSummary, StageSummary,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Typed error for a failed API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from the backend.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Connection, timeout, or body-decode failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status code, when the failure got far enough to have one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Seam between the pollers/actions and the network.
///
/// The production implementation is [`SparkApiClient`]; tests substitute
/// counting mocks.
pub trait SparkApi: Send + Sync {
    fn fetch_status(&self) -> impl Future<Output = Result<ClusterStatus, ApiError>> + Send;

    fn fetch_cluster_summary(&self) -> impl Future<Output = Result<MasterSummary, ApiError>> + Send;

    fn fetch_executors(&self)
    -> impl Future<Output = Result<Vec<ExecutorSummary>, ApiError>> + Send;

    fn fetch_stages(&self) -> impl Future<Output = Result<Vec<StageSummary>, ApiError>> + Send;

    fn create_cluster(
        &self,
        config: Option<ClusterConfig>,
    ) -> impl Future<Output = Result<ClusterCreateResponse, ApiError>> + Send;

    fn delete_cluster(&self) -> impl Future<Output = Result<ClusterDeleteResponse, ApiError>> + Send;
}

/// Spark may return executors as a bare array, or wrapped when the proxy has
/// no active application to forward to.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExecutorsPayload {
    Bare(Vec<ExecutorSummary>),
    Wrapped { executors: Vec<ExecutorSummary> },
}

impl From<ExecutorsPayload> for Vec<ExecutorSummary> {
    fn from(payload: ExecutorsPayload) -> Self {
        match payload {
            ExecutorsPayload::Bare(v) => v,
            ExecutorsPayload::Wrapped { executors } => executors,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StagesPayload {
    Bare(Vec<StageSummary>),
    Wrapped { stages: Vec<StageSummary> },
}

impl From<StagesPayload> for Vec<StageSummary> {
    fn from(payload: StagesPayload) -> Self {
        match payload {
            StagesPayload::Bare(v) => v,
            StagesPayload::Wrapped { stages } => stages,
        }
    }
}

/// HTTP client for the Spark monitor proxy.
pub struct SparkApiClient {
    http: Client,
    base_url: String,
    /// Session token forwarded as a cookie, when the proxy requires auth.
    auth_cookie: Option<String>,
}

impl SparkApiClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_cookie: token.map(|t| format!("kbase_session={t}")),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie.as_str()),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let resp = self.with_auth(self.http.get(self.url(path))).send().await?;
        decode(resp).await
    }
}

/// Turn a response into a typed value, mapping non-2xx into `ApiError::Http`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        };
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.json::<T>().await?)
}

impl SparkApi for SparkApiClient {
    async fn fetch_status(&self) -> Result<ClusterStatus, ApiError> {
        self.get_json("status").await
    }

    async fn fetch_cluster_summary(&self) -> Result<MasterSummary, ApiError> {
        self.get_json("cluster").await
    }

    async fn fetch_executors(&self) -> Result<Vec<ExecutorSummary>, ApiError> {
        let payload: ExecutorsPayload = self.get_json("app/executors").await?;
        Ok(payload.into())
    }

    async fn fetch_stages(&self) -> Result<Vec<StageSummary>, ApiError> {
        let payload: StagesPayload = self.get_json("app/stages").await?;
        Ok(payload.into())
    }

    async fn create_cluster(
        &self,
        config: Option<ClusterConfig>,
    ) -> Result<ClusterCreateResponse, ApiError> {
        debug!("POST cluster/create");
        let body = config.unwrap_or_default();
        let resp = self
            .with_auth(self.http.post(self.url("cluster/create")))
            .json(&body)
            .send()
            .await?;
        decode(resp).await
    }

    async fn delete_cluster(&self) -> Result<ClusterDeleteResponse, ApiError> {
        debug!("DELETE cluster/delete");
        let resp = self
            .with_auth(self.http.delete(self.url("cluster/delete")))
            .send()
            .await?;
        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executors_decode_bare_array() {
        let json = r#"[{"id": "0", "activeTasks": 2}, {"id": "1"}]"#;
        let payload: ExecutorsPayload = serde_json::from_str(json).unwrap();
        let executors: Vec<ExecutorSummary> = payload.into();
        assert_eq!(executors.len(), 2);
        assert_eq!(executors[0].active_tasks, 2);
        assert_eq!(executors[1].active_tasks, 0);
    }

    #[test]
    fn executors_decode_wrapped_object() {
        let json = r#"{"executors": [{"id": "driver"}]}"#;
        let payload: ExecutorsPayload = serde_json::from_str(json).unwrap();
        let executors: Vec<ExecutorSummary> = payload.into();
        assert_eq!(executors.len(), 1);
        assert_eq!(executors[0].id, "driver");
    }

    #[test]
    fn stages_decode_both_shapes() {
        let bare = r#"[{"stageId": 3, "status": "ACTIVE", "name": "count"}]"#;
        let wrapped = r#"{"stages": [{"stageId": 3, "status": "ACTIVE", "name": "count"}]}"#;
        for json in [bare, wrapped] {
            let payload: StagesPayload = serde_json::from_str(json).unwrap();
            let stages: Vec<StageSummary> = payload.into();
            assert_eq!(stages.len(), 1);
            assert_eq!(stages[0].stage_id, 3);
            assert_eq!(stages[0].status, crate::model::StageStatus::Active);
        }
    }

    #[test]
    fn stage_timestamps_are_optional() {
        let json = r#"[{"stageId": 1, "status": "COMPLETE", "completionTime": "2025-06-01T10:00:00.000GMT"}]"#;
        let payload: StagesPayload = serde_json::from_str(json).unwrap();
        let stages: Vec<StageSummary> = payload.into();
        assert_eq!(
            stages[0].completion_time.as_deref(),
            Some("2025-06-01T10:00:00.000GMT")
        );
        assert!(stages[0].submission_time.is_none());
    }

    #[test]
    fn http_error_carries_status() {
        let err = ApiError::Http {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("502"));
    }
}
