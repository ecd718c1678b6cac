use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::HttpSourceConfig;
use crate::error::{IngestError, Result};
use crate::infra::http_client::HttpClientPort;
use crate::types::{CourseSource, RawRecord};

/// A provider serving its course list as JSON, configured in `[[sources]]`
pub struct HttpJsonSource {
    config: HttpSourceConfig,
    domain: String,
    http: Arc<dyn HttpClientPort>,
}

impl HttpJsonSource {
    pub fn new(config: HttpSourceConfig, http: Arc<dyn HttpClientPort>) -> Self {
        let domain = reqwest::Url::parse(&config.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        Self { config, domain, http }
    }

    /// The record array: the document itself, or the value under `records_pointer`
    fn extract_records(&self, document: Value) -> Result<Vec<RawRecord>> {
        let located = match self.config.records_pointer.as_deref() {
            Some(pointer) => document.pointer(pointer).cloned().ok_or_else(|| IngestError::Source {
                message: format!("{}: nothing at {}", self.config.name, pointer),
            })?,
            None => document,
        };

        match located {
            Value::Array(records) => Ok(records),
            other => Err(IngestError::Source {
                message: format!(
                    "{}: expected an array of records, got {}",
                    self.config.name,
                    json_kind(&other)
                ),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait::async_trait]
impl CourseSource for HttpJsonSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    #[instrument(skip(self), fields(source = %self.config.name))]
    async fn crawl(&self) -> Result<Vec<RawRecord>> {
        let document = self.http.get_json(&self.config.url).await?;
        let records = self.extract_records(document)?;
        info!("Collected {} records from {}", records.len(), self.config.url);
        Ok(records)
    }
}
