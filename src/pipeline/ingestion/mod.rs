// Pipeline ingestion: run source adapters and assemble the raw payload

use serde_json::Value;
use tracing::{info, warn, Instrument};

use crate::types::{CourseSource, RawPayload, RawRecord, SourceErrorEntry};

/// Stamp the adapter name onto a record unless it already names a source
fn tag_record(mut record: RawRecord, source: &str) -> RawRecord {
    if let Value::Object(map) = &mut record {
        map.entry("source")
            .or_insert_with(|| Value::String(source.to_string()));
    }
    record
}

/// Crawl each source once, in order. A failing source becomes one `errors`
/// entry instead of aborting the crawl.
pub async fn crawl_sources(sources: &[Box<dyn CourseSource>]) -> RawPayload {
    let mut payload = RawPayload::default();

    for source in sources {
        let span = tracing::info_span!("Crawling source", source = %source.name(), domain = %source.domain());

        match source.crawl().instrument(span).await {
            Ok(records) => {
                info!(source = %source.name(), "Collected {} records", records.len());
                payload
                    .records
                    .extend(records.into_iter().map(|r| tag_record(r, source.name())));
            }
            Err(e) => {
                warn!(source = %source.name(), "Source failed: {}", e);
                payload.errors.push(SourceErrorEntry {
                    source: Some(source.name().to_string()),
                    message: Some(e.to_string()),
                });
            }
        }
    }

    info!(
        "Crawl finished with {} records and {} source errors",
        payload.records.len(),
        payload.errors.len()
    );
    payload
}
