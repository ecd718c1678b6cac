use chrono::{DateTime, Utc};
use metrics::counter;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::constants::{REJECTION_SAMPLE_LIMIT, UNKNOWN_SOURCE};
use crate::error::Result;
use crate::payload::parse_payload;
use crate::pipeline::processing::dedupe::Deduplicator;
use crate::pipeline::processing::normalize::extract_draft;
use crate::pipeline::processing::normalize::fields::normalize_whitespace;
use crate::pipeline::processing::quality_gate::{DefaultQualityGate, QualityDecision, QualityGate};
use crate::pipeline::report::{RejectionSample, RunCounts, RunReport, SourceTally};
use crate::pipeline::storage::persist_artifacts;
use crate::types::{CanonicalCourse, RawPayload};

/// Terminal state of one raw record within a run
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The record could not be read at all (not a JSON object)
    SourceError,
    Rejected { reason: String },
    Deduplicated { duplicate_of: String },
    Accepted { id: String },
}

/// What a run produced: the accepted dataset in arrival order and its report
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub dataset: Vec<CanonicalCourse>,
    pub report: RunReport,
}

/// Sequences normalize, validate and deduplicate over one raw payload.
///
/// All run state (tallies, accepted list, rejections) lives inside a single
/// [`Orchestrator::run`] call; the orchestrator itself holds only settings.
pub struct Orchestrator {
    quality_gate: Box<dyn QualityGate + Send + Sync>,
    deduplicator: Deduplicator,
    rejection_sample_limit: usize,
    course_limit: Option<usize>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct RunState {
    tallies: BTreeMap<String, SourceTally>,
    accepted: Vec<CanonicalCourse>,
    accepted_ids: HashSet<String>,
    rejections: Vec<RejectionSample>,
    fetched: usize,
    deduped: usize,
}

impl RunState {
    fn tally(&mut self, source: &str) -> &mut SourceTally {
        self.tallies.entry(source.to_string()).or_default()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            quality_gate: Box::new(DefaultQualityGate::new()),
            deduplicator: Deduplicator::new(),
            rejection_sample_limit: REJECTION_SAMPLE_LIMIT,
            course_limit: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            quality_gate: Box::new(DefaultQualityGate::new()),
            deduplicator: Deduplicator::with_config(config.dedupe),
            rejection_sample_limit: config.report.rejection_sample_limit,
            course_limit: config.crawl.course_limit,
        }
    }

    pub fn with_quality_gate(mut self, quality_gate: Box<dyn QualityGate + Send + Sync>) -> Self {
        self.quality_gate = quality_gate;
        self
    }

    /// Shape-check a raw JSON payload, then run it. A malformed payload is the only fatal error.
    pub fn run_value(&self, value: Value, run_timestamp: DateTime<Utc>) -> Result<PipelineOutput> {
        let payload = parse_payload(value)?;
        Ok(self.run(&payload, run_timestamp))
    }

    /// Run the pipeline over an already-parsed payload. Never fails; per-record
    /// problems end up in the report.
    #[instrument(skip_all, fields(records = payload.records.len(), errors = payload.errors.len()))]
    pub fn run(&self, payload: &RawPayload, run_timestamp: DateTime<Utc>) -> PipelineOutput {
        let mut state = RunState::default();

        for error in &payload.errors {
            let source = error
                .source
                .as_deref()
                .map(normalize_whitespace)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
            warn!(
                source = %source,
                "Source reported an error: {}",
                error.message.as_deref().unwrap_or("no details")
            );
            counter!("course_crawler_source_errors_total", "source" => source.clone()).increment(1);
            state.tally(&source).errors += 1;
        }

        for (index, raw) in payload.records.iter().enumerate() {
            let outcome = self.process_record(&mut state, raw, index, run_timestamp);
            debug!(index, ?outcome, "Record processed");
        }

        let counts = RunCounts {
            fetched: state.fetched,
            accepted: state.accepted.len(),
            rejected: state.rejections.len(),
            deduped: state.deduped,
        };

        info!(
            "Processed {} records: accepted {}, rejected {}, deduped {}",
            counts.fetched, counts.accepted, counts.rejected, counts.deduped
        );

        let samples: Vec<RejectionSample> = state
            .rejections
            .into_iter()
            .take(self.rejection_sample_limit)
            .collect();
        let report = RunReport::new(run_timestamp, counts, &state.tallies, samples);

        let mut dataset = state.accepted;
        // A configured limit always keeps at least one course
        if let Some(limit) = self.course_limit.map(|limit| limit.max(1)) {
            if dataset.len() > limit {
                info!("Truncating dataset from {} to {} courses", dataset.len(), limit);
                dataset.truncate(limit);
            }
        }

        PipelineOutput { dataset, report }
    }

    fn process_record(
        &self,
        state: &mut RunState,
        raw: &Value,
        index: usize,
        run_timestamp: DateTime<Utc>,
    ) -> RecordOutcome {
        if !raw.is_object() {
            warn!(index, "Record is not a JSON object, counting as a source error");
            counter!("course_crawler_source_errors_total", "source" => UNKNOWN_SOURCE).increment(1);
            state.tally(UNKNOWN_SOURCE).errors += 1;
            return RecordOutcome::SourceError;
        }

        let draft = extract_draft(raw);
        let source = draft.source.clone();
        state.fetched += 1;
        state.tally(&source).fetched += 1;

        let assessment = self.quality_gate.assess(&draft);
        match assessment.decision {
            QualityDecision::Reject => {
                let reason = assessment.reason();
                debug!(source = %source, index, "Rejected: {}", reason);
                counter!("course_crawler_records_total", "source" => source.clone(), "outcome" => "rejected")
                    .increment(1);
                state.tally(&source).rejected += 1;
                state.rejections.push(RejectionSample {
                    source,
                    title: draft.title.clone(),
                    reason: reason.clone(),
                });
                return RecordOutcome::Rejected { reason };
            }
            QualityDecision::AcceptWithWarnings => {
                debug!(source = %source, index, "Incomplete record: {}", assessment.reason());
            }
            QualityDecision::Accept => {}
        }

        let mut course = draft.finalize(index, run_timestamp);

        if let Some(found) = self.deduplicator.find_duplicate(&course, &state.accepted) {
            debug!(
                source = %source,
                index,
                duplicate_of = %found.existing_id,
                title_token = found.scores.title_token,
                title_edit = found.scores.title_edit,
                institution_edit = found.scores.institution_edit,
                "Near-duplicate dropped"
            );
            counter!("course_crawler_records_total", "source" => source.clone(), "outcome" => "deduped")
                .increment(1);
            state.deduped += 1;
            state.tally(&source).deduped += 1;
            return RecordOutcome::Deduplicated { duplicate_of: found.existing_id };
        }

        // Distinct courses can still slug to the same id
        if state.accepted_ids.contains(&course.id) {
            course.id = unique_id(&course.id, &state.accepted_ids);
        }

        counter!("course_crawler_records_total", "source" => source.clone(), "outcome" => "accepted")
            .increment(1);
        state.tally(&source).accepted += 1;
        state.accepted_ids.insert(course.id.clone());
        let id = course.id.clone();
        state.accepted.push(course);
        RecordOutcome::Accepted { id }
    }
}

/// First `{base}-{n}`, counting from 2, that no accepted course holds yet
fn unique_id(base: &str, taken: &HashSet<String>) -> String {
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Read a raw payload file, run it and persist both artifacts, or nothing on failure
#[instrument(skip(orchestrator), fields(raw = %raw_path.display()))]
pub fn run_to_files(
    orchestrator: &Orchestrator,
    raw_path: &Path,
    dataset_path: &Path,
    report_path: &Path,
    run_timestamp: DateTime<Utc>,
) -> Result<RunReport> {
    let payload = crate::payload::read_payload(raw_path)?;
    let output = orchestrator.run(&payload, run_timestamp);
    persist_artifacts(&output.dataset, &output.report, dataset_path, report_path)?;
    info!(
        "Wrote {} courses to {} and report to {}",
        output.dataset.len(),
        dataset_path.display(),
        report_path.display()
    );
    Ok(output.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn payload(value: Value) -> RawPayload {
        parse_payload(value).unwrap()
    }

    #[test]
    fn test_source_errors_are_counted_per_source() {
        let output = Orchestrator::new().run(
            &payload(json!({
                "records": [
                    { "source": "yale_edu", "title": "Robotics", "college": "Yale University",
                      "applyUrl": "https://summer.yale.edu/robotics", "session": "Session 1" }
                ],
                "errors": [
                    { "source": "yale_edu", "message": "timeout" },
                    { "source": "stanford_edu" },
                    {}
                ]
            })),
            ts(),
        );

        let rates = &output.report.source_error_rates;
        assert_eq!(rates["yale_edu"].errors, 1);
        assert_eq!(rates["yale_edu"].accepted, 1);
        assert!((rates["yale_edu"].error_rate - 0.5).abs() < 1e-12);
        assert_eq!(rates["stanford_edu"].errors, 1);
        assert_eq!(rates["stanford_edu"].error_rate, 1.0);
        assert_eq!(rates["unknown"].errors, 1);
        assert_eq!(output.report.counts.fetched, 1);
    }

    #[test]
    fn test_non_object_record_is_a_source_error() {
        let output = Orchestrator::new().run(&payload(json!({ "records": ["junk", 42] })), ts());
        assert_eq!(output.report.counts.fetched, 0);
        assert_eq!(output.report.source_error_rates["unknown"].errors, 2);
        assert!(output.dataset.is_empty());
    }

    #[test]
    fn test_rejection_samples_are_bounded() {
        let records: Vec<Value> = (0..40).map(|i| json!({ "title": format!("Course {i}") })).collect();
        let output = Orchestrator::new().run(&payload(json!({ "records": records })), ts());

        assert_eq!(output.report.counts.rejected, 40);
        assert_eq!(output.report.rejection_samples.len(), 25);
        assert_eq!(output.report.rejection_samples[0].title.as_deref(), Some("Course 0"));
        assert_eq!(output.report.rejection_samples[0].source, "unknown");
    }

    #[test]
    fn test_colliding_ids_are_disambiguated() {
        // Titles differ only in characters the slug drops
        let output = Orchestrator::new().run(
            &payload(json!({
                "records": [
                    { "title": "Kurs Ä", "college": "X University", "applyUrl": "https://x.edu/a", "session": "S1" },
                    { "title": "Kurs Ö", "college": "X University", "applyUrl": "https://x.edu/b", "session": "S1" }
                ]
            })),
            ts(),
        );

        assert_eq!(output.dataset.len(), 2);
        assert_eq!(output.dataset[0].id, "x-university-kurs");
        assert_eq!(output.dataset[1].id, "x-university-kurs-2");
    }

    #[test]
    fn test_disambiguated_ids_skip_ids_already_taken() {
        let output = Orchestrator::new().run(
            &payload(json!({
                "records": [
                    { "title": "Kurs", "college": "X University", "applyUrl": "https://x.edu/a", "session": "S1" },
                    { "title": "Kurs 2", "college": "X University", "applyUrl": "https://x.edu/b", "session": "S1" },
                    { "title": "Kurs 3", "college": "X University", "applyUrl": "https://x.edu/c", "session": "S1" },
                    { "title": "Kurs Ö", "college": "X University", "applyUrl": "https://x.edu/d", "session": "S1" }
                ]
            })),
            ts(),
        );

        let ids: Vec<&str> = output.dataset.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["x-university-kurs", "x-university-kurs-2", "x-university-kurs-3", "x-university-kurs-4"]
        );
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_late_collision_does_not_reuse_a_suffixed_id() {
        let output = Orchestrator::new().run(
            &payload(json!({
                "records": [
                    { "title": "Kurs", "college": "X University", "applyUrl": "https://x.edu/a", "session": "S1" },
                    { "title": "Kurs Ö", "college": "X University", "applyUrl": "https://x.edu/b", "session": "S1" },
                    { "title": "Kurs 2", "college": "X University", "applyUrl": "https://x.edu/c", "session": "S1" }
                ]
            })),
            ts(),
        );

        let ids: Vec<&str> = output.dataset.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x-university-kurs", "x-university-kurs-2", "x-university-kurs-2-2"]);
    }

    #[test]
    fn test_zero_course_limit_keeps_one_course() {
        let mut config = Config::default();
        config.crawl.course_limit = Some(0);
        let output = Orchestrator::from_config(&config).run(
            &payload(json!({
                "records": [
                    { "title": "AI Bootcamp", "college": "X University", "applyUrl": "https://x.edu/ai", "session": "Summer" },
                    { "title": "Art History", "college": "Y College", "applyUrl": "https://y.edu/art", "session": "Summer" }
                ]
            })),
            ts(),
        );

        assert_eq!(output.dataset.len(), 1);
        assert_eq!(output.dataset[0].title, "AI Bootcamp");
        assert_eq!(output.report.counts.accepted, 2);
    }

    #[test]
    fn test_course_limit_truncates_dataset_only() {
        let mut config = Config::default();
        config.crawl.course_limit = Some(1);
        let output = Orchestrator::from_config(&config).run(
            &payload(json!({
                "records": [
                    { "title": "AI Bootcamp", "college": "X University", "applyUrl": "https://x.edu/ai", "session": "Summer" },
                    { "title": "Art History", "college": "Y College", "applyUrl": "https://y.edu/art", "session": "Summer" }
                ]
            })),
            ts(),
        );

        assert_eq!(output.dataset.len(), 1);
        assert_eq!(output.report.counts.accepted, 2);
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        let result = Orchestrator::new().run_value(json!({ "records": "nope" }), ts());
        assert!(result.is_err());
    }
}
