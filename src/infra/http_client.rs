use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::CrawlConfig;
use crate::error::{IngestError, Result};

/// Fetches a JSON document; the seam HTTP-backed sources are built on
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Single-pass reqwest client: one attempt, no retries
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        debug!("GET {} -> {} ({})", url, resp.status().as_u16(), content_type);

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| IngestError::Source {
            message: format!("{url} did not return JSON ({content_type}): {e}"),
        })
    }
}
