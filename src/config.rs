use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_USER_AGENT, INSTITUTION_EDIT_THRESHOLD, REJECTION_SAMPLE_LIMIT, TITLE_EDIT_THRESHOLD,
    TITLE_TOKEN_THRESHOLD,
};
use crate::error::{IngestError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "COURSE_CRAWLER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub dedupe: DedupeConfig,
    pub report: ReportConfig,
    pub crawl: CrawlConfig,
    pub logging: LoggingConfig,
    pub sources: Vec<HttpSourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub raw_path: PathBuf,
    pub dataset_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("data/crawl-results.json"),
            dataset_path: PathBuf::from("data/courses-enriched.json"),
            report_path: PathBuf::from("data/crawl-report.json"),
        }
    }
}

/// Thresholds used by the near-duplicate check
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    pub title_token_threshold: f64,
    pub title_edit_threshold: f64,
    pub institution_edit_threshold: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            title_token_threshold: TITLE_TOKEN_THRESHOLD,
            title_edit_threshold: TITLE_EDIT_THRESHOLD,
            institution_edit_threshold: INSTITUTION_EDIT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub rejection_sample_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rejection_sample_limit: REJECTION_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Cap on the number of accepted courses written to the dataset
    pub course_limit: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 20,
            course_limit: None,
        }
    }
}

/// Where the JSON log file goes and which directive applies without `RUST_LOG`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "course_crawler.log".to_string(),
            default_filter: "course_crawler=info,warn".to_string(),
        }
    }
}

/// A provider that serves its course list as JSON over HTTP
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSourceConfig {
    pub name: String,
    pub url: String,
    /// JSON pointer to the record array inside the response, e.g. `/data/courses`
    #[serde(default)]
    pub records_pointer: Option<String>,
}

impl Config {
    /// Load from `COURSE_CRAWLER_CONFIG` or `config.toml`; defaults when the file is absent
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let thresholds = [
            ("title_token_threshold", self.dedupe.title_token_threshold),
            ("title_edit_threshold", self.dedupe.title_edit_threshold),
            ("institution_edit_threshold", self.dedupe.institution_edit_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(IngestError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }

        if self.logging.file_name.trim().is_empty() {
            return Err(IngestError::Config("logging.file_name must not be empty".to_string()));
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.default_filter) {
            return Err(IngestError::Config(format!(
                "logging.default_filter '{}' is not a valid directive: {e}",
                self.logging.default_filter
            )));
        }

        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(IngestError::Config("source name must not be empty".to_string()));
            }
            if reqwest::Url::parse(&source.url).is_err() {
                return Err(IngestError::Config(format!(
                    "source '{}' has an invalid url: {}",
                    source.name, source.url
                )));
            }
        }
        Ok(())
    }
}
