pub mod http_json;
pub mod stanford_edu;
pub mod yale_edu;

use std::sync::Arc;

use crate::config::Config;
use crate::constants::{STANFORD_EDU_SOURCE, YALE_EDU_SOURCE};
use crate::error::{IngestError, Result};
use crate::infra::http_client::HttpClientPort;
use crate::types::CourseSource;

use http_json::HttpJsonSource;
use stanford_edu::StanfordEduSource;
use yale_edu::YaleEduSource;

fn create_builtin(name: &str) -> Option<Box<dyn CourseSource>> {
    match name {
        STANFORD_EDU_SOURCE => Some(Box::new(StanfordEduSource::new())),
        YALE_EDU_SOURCE => Some(Box::new(YaleEduSource::new())),
        _ => None,
    }
}

/// Every available source: built-ins first, then configured HTTP sources
pub fn all_sources(config: &Config, http: Arc<dyn HttpClientPort>) -> Vec<Box<dyn CourseSource>> {
    let mut sources: Vec<Box<dyn CourseSource>> = crate::constants::get_builtin_sources()
        .into_iter()
        .filter_map(create_builtin)
        .collect();

    for source in &config.sources {
        sources.push(Box::new(HttpJsonSource::new(source.clone(), http.clone())));
    }
    sources
}

/// Resolve the selected source names; no selection means every source
pub fn select_sources(
    config: &Config,
    http: Arc<dyn HttpClientPort>,
    selected: Option<&[String]>,
) -> Result<Vec<Box<dyn CourseSource>>> {
    let available = all_sources(config, http);
    let Some(selected) = selected.filter(|s| !s.is_empty()) else {
        return Ok(available);
    };

    let missing: Vec<&str> = selected
        .iter()
        .filter(|name| !available.iter().any(|s| s.name() == name.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::UnknownSource(missing.join(", ")));
    }

    // Keep the caller's order
    let mut available = available;
    let mut chosen = Vec::with_capacity(selected.len());
    for name in selected {
        if let Some(pos) = available.iter().position(|s| s.name() == name.as_str()) {
            chosen.push(available.remove(pos));
        }
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSourceConfig;
    use async_trait::async_trait;
    use serde_json::Value;

    struct NoHttp;

    #[async_trait]
    impl HttpClientPort for NoHttp {
        async fn get_json(&self, url: &str) -> Result<Value> {
            Err(IngestError::Source { message: format!("offline: {url}") })
        }
    }

    fn config_with_http_source() -> Config {
        let mut config = Config::default();
        config.sources.push(HttpSourceConfig {
            name: "mit_edu".to_string(),
            url: "https://example.org/mit.json".to_string(),
            records_pointer: None,
        });
        config
    }

    #[test]
    fn test_all_sources_lists_builtins_and_configured() {
        let names: Vec<String> = all_sources(&config_with_http_source(), Arc::new(NoHttp))
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["stanford_edu", "yale_edu", "mit_edu"]);
    }

    #[test]
    fn test_selection_keeps_requested_order() {
        let selected = vec!["yale_edu".to_string(), "stanford_edu".to_string()];
        let sources = select_sources(&Config::default(), Arc::new(NoHttp), Some(&selected)).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["yale_edu", "stanford_edu"]);
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let selected = vec!["yale_edu".to_string(), "hogwarts_edu".to_string()];
        let result = select_sources(&Config::default(), Arc::new(NoHttp), Some(&selected));
        match result {
            Err(IngestError::UnknownSource(names)) => assert_eq!(names, "hogwarts_edu"),
            other => panic!("expected UnknownSource, got {:?}", other.map(|s| s.len())),
        }
    }
}
