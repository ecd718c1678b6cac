use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::types::RawRecord;

static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("numeric token regex is valid"));

static NON_SLUG_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex is valid"));

// Provider key variants, most specific first
pub const TITLE_KEYS: &[&str] = &["title", "course_name", "headline"];
pub const SUBJECT_KEYS: &[&str] = &["subject", "subject_area", "discipline"];
pub const DESCRIPTION_KEYS: &[&str] = &["description", "summary", "body"];
pub const COLLEGE_KEYS: &[&str] = &["college", "institution", "school", "partner"];
pub const LOCATION_KEYS: &[&str] = &["location", "venue", "room"];
pub const SESSION_KEYS: &[&str] = &["session", "session_label", "term"];
pub const SCHEDULE_KEYS: &[&str] = &["schedule", "meeting_pattern", "schedule_text"];
pub const START_DATE_KEYS: &[&str] = &["startDate", "start_date"];
pub const END_DATE_KEYS: &[&str] = &["endDate", "end_date"];
pub const DURATION_KEYS: &[&str] = &["duration", "duration_text"];
pub const CREDIT_KEYS: &[&str] = &["credits", "credit_hours"];
pub const PREREQUISITE_KEYS: &[&str] = &["prerequisites", "prereq"];
pub const TUITION_KEYS: &[&str] = &["tuitionAmount", "tuition", "cost", "price"];
pub const APPLY_URL_KEYS: &[&str] = &["applyUrl", "apply_url"];
pub const SOURCE_URL_KEYS: &[&str] = &["sourceUrl", "source_url"];
pub const DELIVERY_MODE_KEYS: &[&str] = &["deliveryMode", "delivery_mode"];
pub const NATIVE_ID_KEYS: &[&str] = &["course_id", "courseId"];

/// Collapse internal whitespace runs to one space and trim the ends
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case, hyphenate non-alphanumeric runs, strip edge hyphens, cap the length
pub fn slugify(value: &str, max_len: usize) -> String {
    let lowered = normalize_whitespace(value).to_lowercase();
    let hyphenated = NON_SLUG_RUN.replace_all(&lowered, "-");
    let trimmed = hyphenated.trim_matches('-');
    // The slug is pure ASCII here, so byte truncation is char-safe
    let capped = &trimmed[..trimmed.len().min(max_len)];
    capped.trim_end_matches('-').to_string()
}

/// First non-empty textual value among `keys`, whitespace-normalized
pub fn pick_text(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) => Some(normalize_whitespace(s)).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First value among `keys` that is not null
pub fn pick_value<'a>(raw: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| raw.get(*key).filter(|v| !v.is_null()))
}

/// Non-numeric and negative input degrades to zero
pub fn parse_credits(raw: &RawRecord) -> f64 {
    let parsed = match pick_value(raw, CREDIT_KEYS) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|c| c.is_finite() && *c >= 0.0).unwrap_or(0.0)
}

/// Numeric cost fields are taken directly; strings yield their first numeric token
pub fn parse_tuition(raw: &RawRecord) -> Option<f64> {
    match pick_value(raw, TUITION_KEYS)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => first_numeric_token(s),
        _ => None,
    }
}

/// "$1,200 per session" -> 1200.0
pub fn first_numeric_token(value: &str) -> Option<f64> {
    let without_separators = value.replace(',', "");
    NUMERIC_TOKEN
        .find(&without_separators)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// `duration` text, or `length_weeks` rendered as "N weeks"
pub fn parse_duration(raw: &RawRecord) -> Option<String> {
    if let Some(duration) = pick_text(raw, DURATION_KEYS) {
        return Some(duration);
    }
    let weeks = match raw.get("length_weeks")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (weeks > 0.0).then(|| format!("{weeks} weeks"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slugify_rules() {
        assert_eq!(slugify("  Intro to CS!! ", 90), "intro-to-cs");
        assert_eq!(slugify("--Yale   University--", 90), "yale-university");
        assert_eq!(slugify("***", 90), "");
        let long = "word ".repeat(40);
        let slug = slugify(&long, 90);
        assert!(slug.len() <= 90);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_pick_text_skips_empty_and_uses_aliases() {
        let raw = json!({ "title": "   ", "headline": "Creative   Writing\nWorkshop" });
        assert_eq!(pick_text(&raw, TITLE_KEYS).as_deref(), Some("Creative Writing Workshop"));
        assert_eq!(pick_text(&raw, SUBJECT_KEYS), None);
    }

    #[test]
    fn test_credits_coercion() {
        assert_eq!(parse_credits(&json!({ "credits": 3 })), 3.0);
        assert_eq!(parse_credits(&json!({ "credit_hours": "4.5" })), 4.5);
        assert_eq!(parse_credits(&json!({ "credits": -2 })), 0.0);
        assert_eq!(parse_credits(&json!({ "credits": "lots" })), 0.0);
        assert_eq!(parse_credits(&json!({})), 0.0);
    }

    #[test]
    fn test_tuition_parsing() {
        assert_eq!(parse_tuition(&json!({ "cost": "$1,200" })), Some(1200.0));
        assert_eq!(parse_tuition(&json!({ "tuition": 950.5 })), Some(950.5));
        assert_eq!(parse_tuition(&json!({ "price": "USD 2,499.99 total" })), Some(2499.99));
        assert_eq!(parse_tuition(&json!({ "price": "Free" })), None);
        assert_eq!(parse_tuition(&json!({ "tuition": null, "cost": "300" })), Some(300.0));
        assert_eq!(parse_tuition(&json!({})), None);
    }

    #[test]
    fn test_duration_from_weeks() {
        assert_eq!(parse_duration(&json!({ "length_weeks": 6 })).as_deref(), Some("6 weeks"));
        assert_eq!(parse_duration(&json!({ "duration_text": "4 weeks" })).as_deref(), Some("4 weeks"));
        assert_eq!(parse_duration(&json!({ "length_weeks": 0 })), None);
    }
}
