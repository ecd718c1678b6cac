use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Raw course record as returned from a provider; no fixed shape
pub type RawRecord = serde_json::Value;

/// The raw payload handed to the orchestrator: records plus source-level failures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPayload {
    pub records: Vec<RawRecord>,
    #[serde(default)]
    pub errors: Vec<SourceErrorEntry>,
}

/// A fetch/parse failure reported by an upstream source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceErrorEntry {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    Online,
    InPerson,
    Hybrid,
}

impl DeliveryMode {
    /// Parse an explicit provider value ("Online", "In Person", "in-person", ...)
    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "online" | "remote" | "virtual" => Some(Self::Online),
            "inperson" | "onsite" | "oncampus" => Some(Self::InPerson),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::InPerson => "in-person",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical course record written to the dataset and consumed by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCourse {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub college: String,
    pub location: String,
    /// `None` when neither an explicit value nor location text was available
    pub delivery_mode: Option<DeliveryMode>,
    pub session: String,
    pub duration: String,
    pub credits: f64,
    pub tuition_amount: Option<f64>,
    pub prerequisites: String,
    pub apply_url: String,
    pub source_url: String,
    pub last_verified_at: DateTime<Utc>,
}

/// Core trait that all course providers must implement
#[async_trait::async_trait]
pub trait CourseSource: Send + Sync {
    /// Unique identifier for this source, used as the `source` tag on its records
    fn name(&self) -> &str;

    /// Host the records come from
    fn domain(&self) -> &str;

    /// Fetch the provider's raw course records in one pass
    async fn crawl(&self) -> Result<Vec<RawRecord>>;
}
