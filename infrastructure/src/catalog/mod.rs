//! Notice catalog HTTP client.
//!
//! Thin client for the remote notice catalog service backing the agent's
//! tools. Failures are mapped onto [`ToolError`] codes so the retry layer
//! can distinguish a missing notice (give up immediately) from a flaky
//! backend (retry).

use std::time::Duration;
use tenderag_domain::ToolError;
use tracing::debug;

/// HTTP client for the notice catalog service.
pub struct NoticeCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl NoticeCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::execution_failed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full record of one notice.
    pub async fn get_notice(&self, notice_id: &str) -> Result<serde_json::Value, ToolError> {
        let url = format!("{}/notices/{}", self.base_url, notice_id);
        debug!("Catalog lookup: {url}");
        let response = self.get(&url).await?;
        self.handle(response, &format!("notice '{notice_id}'")).await
    }

    /// Keyword search over the catalog.
    pub async fn search_notices(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<serde_json::Value, ToolError> {
        let url = format!("{}/notices/search", self.base_url);
        debug!("Catalog search: '{query}' (limit {limit})");
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(map_transport_error)?;
        self.handle(response, "search").await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ToolError> {
        self.client.get(url).send().await.map_err(map_transport_error)
    }

    async fn handle(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<serde_json::Value, ToolError> {
        let status = response.status();
        match status {
            reqwest::StatusCode::NOT_FOUND => Err(ToolError::not_found(subject)),
            reqwest::StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(ToolError::invalid_argument(format!(
                    "Catalog rejected the request for {subject}: {body}"
                )))
            }
            s if !s.is_success() => Err(ToolError::unavailable(format!(
                "Catalog returned {s} for {subject}"
            ))),
            _ => response.json().await.map_err(|e| {
                ToolError::execution_failed(format!("Invalid JSON from catalog: {e}"))
            }),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> ToolError {
    if e.is_timeout() {
        ToolError::timeout("catalog request")
    } else {
        ToolError::unavailable(format!("Catalog unreachable: {e}"))
    }
}
