use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running per-source counters, owned by one orchestrator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTally {
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub deduped: usize,
    pub errors: usize,
}

impl SourceTally {
    /// `(rejected + errors) / (fetched + errors)`, zero when nothing was seen
    pub fn error_rate(&self) -> f64 {
        let denominator = self.fetched + self.errors;
        if denominator == 0 {
            return 0.0;
        }
        (self.rejected + self.errors) as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStats {
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub deduped: usize,
    pub errors: usize,
    pub error_rate: f64,
}

impl From<SourceTally> for SourceStats {
    fn from(tally: SourceTally) -> Self {
        Self {
            fetched: tally.fetched,
            accepted: tally.accepted,
            rejected: tally.rejected,
            deduped: tally.deduped,
            errors: tally.errors,
            error_rate: tally.error_rate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub deduped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionSample {
    pub source: String,
    /// The raw title, if the record had one
    pub title: Option<String>,
    pub reason: String,
}

/// Summary of one pipeline run, persisted next to the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub counts: RunCounts,
    /// Keyed by source name in sorted order
    pub source_error_rates: BTreeMap<String, SourceStats>,
    pub rejection_samples: Vec<RejectionSample>,
}

impl RunReport {
    pub fn new(
        generated_at: DateTime<Utc>,
        counts: RunCounts,
        tallies: &BTreeMap<String, SourceTally>,
        rejection_samples: Vec<RejectionSample>,
    ) -> Self {
        Self {
            generated_at,
            counts,
            source_error_rates: tallies
                .iter()
                .map(|(source, tally)| (source.clone(), SourceStats::from(*tally)))
                .collect(),
            rejection_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_rate_counts_rejections_and_errors() {
        let tally = SourceTally { fetched: 8, accepted: 5, rejected: 2, deduped: 1, errors: 2 };
        assert!((tally.error_rate() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_error_rate_is_zero_without_traffic() {
        assert_eq!(SourceTally::default().error_rate(), 0.0);
    }

    #[test]
    fn test_error_rate_with_only_errors_is_one() {
        let tally = SourceTally { errors: 3, ..Default::default() };
        assert_eq!(tally.error_rate(), 1.0);
    }

    #[test]
    fn test_report_serializes_with_camel_case_keys() {
        let mut tallies = BTreeMap::new();
        tallies.insert("yale_edu".to_string(), SourceTally { fetched: 1, accepted: 1, ..Default::default() });
        let report = RunReport::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
            RunCounts { fetched: 1, accepted: 1, rejected: 0, deduped: 0 },
            &tallies,
            Vec::new(),
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["generatedAt"], "2026-06-01T00:00:00Z");
        assert_eq!(value["counts"]["accepted"], 1);
        assert_eq!(value["sourceErrorRates"]["yale_edu"]["errorRate"], 0.0);
        assert!(value["rejectionSamples"].as_array().unwrap().is_empty());
    }
}
