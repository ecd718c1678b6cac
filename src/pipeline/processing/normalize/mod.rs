//! Maps provider-shaped raw records onto the canonical course schema.
//!
//! Normalization happens in two steps. [`extract_draft`] pulls every field out
//! of the raw record under its provider aliases, normalizing whitespace but
//! leaving absent fields absent, which is what the quality gate inspects.
//! [`CourseDraft::finalize`] then resolves defaults and builds the stable id.

pub mod fields;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::constants::{
    DEFAULT_COLLEGE, DEFAULT_DESCRIPTION, DEFAULT_DURATION, DEFAULT_LOCATION,
    DEFAULT_PREREQUISITES, DEFAULT_PROVIDER_URL, DEFAULT_SESSION, DEFAULT_SUBJECT, SLUG_MAX_LEN,
    UNKNOWN_SOURCE,
};
use crate::pipeline::processing::similarity::normalize_for_similarity;
use crate::types::{CanonicalCourse, DeliveryMode, RawRecord};
use fields::*;

const ONLINE_KEYWORDS: &[&str] = &["online", "remote", "virtual", "zoom", "distance learning"];

/// Every field a raw record offered, before defaults are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub source: String,
    pub native_id: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub college: Option<String>,
    pub location: Option<String>,
    pub delivery_mode: Option<DeliveryMode>,
    pub session: Option<String>,
    pub schedule: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub credits: f64,
    pub tuition_amount: Option<f64>,
    pub prerequisites: Option<String>,
    pub apply_url: Option<String>,
    pub source_url: Option<String>,
}

/// The `source` tag carried by a raw record, or `unknown`
pub fn record_source(raw: &RawRecord) -> String {
    raw.get("source")
        .and_then(Value::as_str)
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Hybrid beats online keywords; any other location text means in-person.
/// Empty location text gives no signal at all.
pub fn infer_delivery_mode(location: &str) -> Option<DeliveryMode> {
    let folded = normalize_for_similarity(location);
    if folded.is_empty() {
        return None;
    }
    if folded.contains("hybrid") {
        return Some(DeliveryMode::Hybrid);
    }
    if ONLINE_KEYWORDS.iter().any(|keyword| folded.contains(keyword)) {
        return Some(DeliveryMode::Online);
    }
    Some(DeliveryMode::InPerson)
}

pub fn extract_draft(raw: &RawRecord) -> CourseDraft {
    let location = pick_text(raw, LOCATION_KEYS);
    let source_url = pick_text(raw, SOURCE_URL_KEYS);

    let delivery_mode = pick_text(raw, DELIVERY_MODE_KEYS)
        .and_then(|explicit| DeliveryMode::parse(&explicit))
        .or_else(|| location.as_deref().and_then(infer_delivery_mode));

    CourseDraft {
        source: record_source(raw),
        native_id: pick_text(raw, NATIVE_ID_KEYS),
        title: pick_text(raw, TITLE_KEYS),
        subject: pick_text(raw, SUBJECT_KEYS),
        description: pick_text(raw, DESCRIPTION_KEYS),
        college: pick_text(raw, COLLEGE_KEYS),
        location,
        delivery_mode,
        session: pick_text(raw, SESSION_KEYS),
        schedule: pick_text(raw, SCHEDULE_KEYS),
        start_date: pick_text(raw, START_DATE_KEYS),
        end_date: pick_text(raw, END_DATE_KEYS),
        duration: parse_duration(raw),
        credits: parse_credits(raw),
        tuition_amount: parse_tuition(raw),
        prerequisites: pick_text(raw, PREREQUISITE_KEYS),
        // The source page stands in for providers without a separate apply link
        apply_url: pick_text(raw, APPLY_URL_KEYS).or_else(|| source_url.clone()),
        source_url,
    }
}

impl CourseDraft {
    /// Resolve defaults and derive the id. `index` is the record's arrival position.
    pub fn finalize(self, index: usize, run_timestamp: DateTime<Utc>) -> CanonicalCourse {
        let title_slug = self
            .title
            .as_deref()
            .map(|t| slugify(t, SLUG_MAX_LEN))
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.native_id
                    .as_deref()
                    .map(|id| slugify(id, SLUG_MAX_LEN))
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| (index + 1).to_string());

        let college = self.college.unwrap_or_else(|| DEFAULT_COLLEGE.to_string());
        let college_slug = slugify(&college, SLUG_MAX_LEN);
        let id = if college_slug.is_empty() {
            title_slug
        } else {
            format!("{college_slug}-{title_slug}")
        };

        let title = self
            .title
            .unwrap_or_else(|| format!("{} Course {}", self.source, index + 1));

        let apply_url = self
            .apply_url
            .or_else(|| self.source_url.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());
        let source_url = self.source_url.unwrap_or_else(|| apply_url.clone());

        CanonicalCourse {
            id,
            title,
            subject: self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            college,
            location: self.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            delivery_mode: self.delivery_mode,
            session: self.session.unwrap_or_else(|| DEFAULT_SESSION.to_string()),
            duration: self.duration.unwrap_or_else(|| DEFAULT_DURATION.to_string()),
            credits: self.credits,
            tuition_amount: self.tuition_amount,
            prerequisites: self
                .prerequisites
                .unwrap_or_else(|| DEFAULT_PREREQUISITES.to_string()),
            apply_url,
            source_url,
            last_verified_at: run_timestamp,
        }
    }
}

/// Raw record to canonical course. Never fails; unusable input degrades to defaults.
pub fn normalize(raw: &RawRecord, index: usize, run_timestamp: DateTime<Utc>) -> CanonicalCourse {
    extract_draft(raw).finalize(index, run_timestamp)
}
