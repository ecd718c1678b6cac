use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{FIELD_APPLY_URL, FIELD_COLLEGE, FIELD_SCHEDULE_METADATA, FIELD_TITLE};
use crate::pipeline::processing::normalize::CourseDraft;

/// A field (or field group) the quality gate found missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingField {
    Title,
    College,
    ApplyUrl,
    /// None of schedule, session, start date or end date is present
    ScheduleMetadata,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => FIELD_TITLE,
            Self::College => FIELD_COLLEGE,
            Self::ApplyUrl => FIELD_APPLY_URL,
            Self::ScheduleMetadata => FIELD_SCHEDULE_METADATA,
        }
    }

    /// Whether this gap alone keeps a record out of the dataset
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::ScheduleMetadata)
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality Gate decision for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityDecision {
    /// Record is complete
    Accept,
    /// Required fields are present but schedule metadata is not
    AcceptWithWarnings,
    /// A required field is missing
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub decision: QualityDecision,
    /// Missing fields in reporting order: title, college, applyUrl, schedule metadata
    pub missing: Vec<MissingField>,
}

impl QualityAssessment {
    pub fn is_rejected(&self) -> bool {
        self.decision == QualityDecision::Reject
    }

    /// "Missing required field(s): applyUrl, schedule/session metadata"
    pub fn reason(&self) -> String {
        let names: Vec<&str> = self.missing.iter().map(MissingField::as_str).collect();
        format!("Missing required field(s): {}", names.join(", "))
    }
}

/// Trait for implementing Quality Gate assessment logic
pub trait QualityGate {
    fn assess(&self, draft: &CourseDraft) -> QualityAssessment;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultQualityGate;

impl DefaultQualityGate {
    pub fn new() -> Self {
        Self
    }
}

impl QualityGate for DefaultQualityGate {
    fn assess(&self, draft: &CourseDraft) -> QualityAssessment {
        let missing = missing_fields(draft);

        let decision = if missing.iter().any(MissingField::is_blocking) {
            QualityDecision::Reject
        } else if missing.is_empty() {
            QualityDecision::Accept
        } else {
            QualityDecision::AcceptWithWarnings
        };

        QualityAssessment { decision, missing }
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Only absolute http(s) links count as an apply URL
fn is_absolute_url(value: &Option<String>) -> bool {
    value
        .as_deref()
        .and_then(|v| reqwest::Url::parse(v.trim()).ok())
        .is_some_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

pub fn missing_fields(draft: &CourseDraft) -> Vec<MissingField> {
    let mut missing = Vec::new();

    if !is_present(&draft.title) {
        missing.push(MissingField::Title);
    }
    if !is_present(&draft.college) {
        missing.push(MissingField::College);
    }
    if !is_absolute_url(&draft.apply_url) {
        missing.push(MissingField::ApplyUrl);
    }

    let has_schedule = [&draft.schedule, &draft.session, &draft.start_date, &draft.end_date]
        .into_iter()
        .any(is_present);
    if !has_schedule {
        missing.push(MissingField::ScheduleMetadata);
    }

    missing
}

/// Names of the missing fields; an empty list means the record is complete
pub fn validate(draft: &CourseDraft) -> Vec<String> {
    missing_fields(draft)
        .iter()
        .map(|field| field.as_str().to_string())
        .collect()
}
