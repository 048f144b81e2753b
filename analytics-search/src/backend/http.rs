use super::{BackendRequest, SearchBackend};
use crate::config::AnalyticsConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// JSON-over-HTTP search backend client.
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for HttpSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpSearchBackend {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn query(&self, path: &str, request: BackendRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = ?request.method, url = %url, "search backend request");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .query(&request.query_params);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .with_context(|| format!("Failed to send search request to {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Search backend error {}: {}", status, body);
        }

        resp.json().await.context("Failed to parse search response")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
