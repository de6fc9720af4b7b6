//! HTTP dataset backend.
//!
//! Speaks the gesture server's REST surface: `/fetch`, `/add`,
//! `/check-conflicts`, `/merge-dataset`, `/stats`, `/delete-gesture` and
//! `/clear-database`. Every response is deserialized into a typed schema and
//! rejected with a descriptive error when it does not match.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::defaults::BACKEND_TIMEOUT_MS;
use crate::error::{Result, SignshError};
use crate::store::backend::{
    ConflictReport, DatasetBackend, DatasetStats, MergeDecision, MergeOutcome,
};
use crate::store::dataset::GestureDataset;

/// Backend client for a remote gesture dataset server.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Where the backend server listens by default.
    pub const DEFAULT_URL: &'static str = crate::defaults::BACKEND_URL;

    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(BACKEND_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SignshError::Backend {
                message: format!("Request failed: {e}"),
            })?;
        Self::read_body(path, response).await
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| SignshError::Backend {
                message: format!("Request failed: {e}"),
            })?;
        Self::read_body(path, response).await
    }

    async fn post_empty(&self, path: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SignshError::Backend {
                message: format!("Request failed: {e}"),
            })?;
        Self::read_body(path, response).await
    }

    async fn read_body(path: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(SignshError::Backend {
                message: format!("Backend returned status {status} for {path}"),
            });
        }
        response.text().await.map_err(|e| SignshError::Backend {
            message: format!("Failed to read backend response: {e}"),
        })
    }

    fn parse<T: serde::de::DeserializeOwned>(path: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| SignshError::Backend {
            message: format!("Invalid backend response for {path}: {e}"),
        })
    }
}

/// Split per-label decisions into the wire's replacement and rejection lists.
fn split_decisions(decisions: &BTreeMap<String, MergeDecision>) -> (Vec<&str>, Vec<&str>) {
    let mut replacements = Vec::new();
    let mut rejections = Vec::new();
    for (label, decision) in decisions {
        match decision {
            MergeDecision::Replace => replacements.push(label.as_str()),
            MergeDecision::Reject => rejections.push(label.as_str()),
        }
    }
    (replacements, rejections)
}

#[async_trait::async_trait]
impl DatasetBackend for HttpBackend {
    async fn fetch(&self) -> Result<GestureDataset> {
        let body = self.get_text("/fetch").await?;
        let value: serde_json::Value = Self::parse("/fetch", &body)?;
        GestureDataset::from_value(&value)
    }

    async fn save(&self, dataset: &GestureDataset) -> Result<()> {
        self.post_json("/add", &serde_json::json!({ "dataset": dataset }))
            .await?;
        Ok(())
    }

    async fn check_conflicts(&self, candidate: &GestureDataset) -> Result<ConflictReport> {
        let body = self
            .post_json(
                "/check-conflicts",
                &serde_json::json!({ "dataset": candidate }),
            )
            .await?;
        Self::parse("/check-conflicts", &body)
    }

    async fn merge(
        &self,
        candidate: &GestureDataset,
        decisions: &BTreeMap<String, MergeDecision>,
    ) -> Result<MergeOutcome> {
        let (replacements, rejections) = split_decisions(decisions);
        let body = self
            .post_json(
                "/merge-dataset",
                &serde_json::json!({
                    "dataset": candidate,
                    "replacements": replacements,
                    "rejections": rejections,
                }),
            )
            .await?;
        Self::parse("/merge-dataset", &body)
    }

    async fn stats(&self) -> Result<DatasetStats> {
        let body = self.get_text("/stats").await?;
        Self::parse("/stats", &body)
    }

    async fn delete_label(&self, label: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/delete-gesture"))
            .timeout(self.timeout)
            .json(&serde_json::json!({ "label": label }))
            .send()
            .await
            .map_err(|e| SignshError::Backend {
                message: format!("Request failed: {e}"),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SignshError::UnknownLabel {
                label: label.to_string(),
            });
        }
        Self::read_body("/delete-gesture", response).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.post_empty("/clear-database").await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
