use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use course_crawler::apis::select_sources;
use course_crawler::config::{Config, HttpSourceConfig};
use course_crawler::error::IngestError;
use course_crawler::infra::http_client::HttpClientPort;
use course_crawler::pipeline::ingestion::crawl_sources;
use course_crawler::pipeline::orchestrator::run_to_files;
use course_crawler::pipeline::storage::write_json;
use course_crawler::pipeline::Orchestrator;
use course_crawler::types::CanonicalCourse;

/// Every HTTP fetch fails as if the provider were down
struct DownHttp;

#[async_trait]
impl HttpClientPort for DownHttp {
    async fn get_json(&self, url: &str) -> course_crawler::error::Result<Value> {
        Err(IngestError::Source {
            message: format!("{url}: 503 Service Unavailable"),
        })
    }
}

#[tokio::test]
async fn test_builtin_crawl_then_process() -> Result<()> {
    let dir = tempdir()?;
    let raw_path = dir.path().join("crawl-results.json");
    let dataset_path = dir.path().join("courses-enriched.json");
    let report_path = dir.path().join("crawl-report.json");

    let mut config = Config::default();
    config.sources.push(HttpSourceConfig {
        name: "mit_edu".to_string(),
        url: "https://summer.mit.edu/courses.json".to_string(),
        records_pointer: None,
    });

    let sources = select_sources(&config, Arc::new(DownHttp), None)?;
    let payload = crawl_sources(&sources).await;
    assert_eq!(payload.records.len(), 4);
    assert_eq!(payload.errors.len(), 1);
    write_json(&raw_path, &payload)?;

    let timestamp = Utc.with_ymd_and_hms(2026, 7, 4, 8, 30, 0).unwrap();
    let report = run_to_files(
        &Orchestrator::from_config(&config),
        &raw_path,
        &dataset_path,
        &report_path,
        timestamp,
    )?;

    assert_eq!(report.counts.fetched, 4);
    assert_eq!(report.counts.accepted, 4);
    assert_eq!(report.source_error_rates["stanford_edu"].fetched, 2);
    assert_eq!(report.source_error_rates["yale_edu"].accepted, 2);
    assert_eq!(report.source_error_rates["mit_edu"].errors, 1);
    assert_eq!(report.source_error_rates["mit_edu"].error_rate, 1.0);

    let dataset: Vec<CanonicalCourse> = serde_json::from_str(&fs::read_to_string(&dataset_path)?)?;
    let writing = dataset
        .iter()
        .find(|c| c.title == "Creative Writing Workshop")
        .expect("yale course present");
    assert_eq!(writing.college, "Yale University");
    assert_eq!(writing.session, "Session 1");
    assert!(dataset.iter().all(|c| c.last_verified_at == timestamp));
    Ok(())
}

#[tokio::test]
async fn test_selected_sources_only() -> Result<()> {
    let config = Config::default();
    let selected = vec!["yale_edu".to_string()];
    let sources = select_sources(&config, Arc::new(DownHttp), Some(&selected))?;

    let payload = crawl_sources(&sources).await;

    assert!(payload.errors.is_empty());
    assert!(payload.records.iter().all(|r| r["source"] == "yale_edu"));
    Ok(())
}
