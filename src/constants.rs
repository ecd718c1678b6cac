/// Source name constants shared by the adapters, the registry and the CLI.

pub const STANFORD_EDU_SOURCE: &str = "stanford_edu";
pub const YALE_EDU_SOURCE: &str = "yale_edu";

/// Source bucket for records and errors that carry no `source` tag
pub const UNKNOWN_SOURCE: &str = "unknown";

// Missing-field names reported by the quality gate
pub const FIELD_TITLE: &str = "title";
pub const FIELD_COLLEGE: &str = "college";
pub const FIELD_APPLY_URL: &str = "applyUrl";
pub const FIELD_SCHEDULE_METADATA: &str = "schedule/session metadata";

// Near-duplicate thresholds
pub const TITLE_TOKEN_THRESHOLD: f64 = 0.6;
pub const TITLE_EDIT_THRESHOLD: f64 = 0.88;
pub const INSTITUTION_EDIT_THRESHOLD: f64 = 0.88;

pub const REJECTION_SAMPLE_LIMIT: usize = 25;
pub const SLUG_MAX_LEN: usize = 90;

// Canonical field defaults
pub const DEFAULT_SUBJECT: &str = "General";
pub const DEFAULT_DESCRIPTION: &str =
    "Official high-school summer course details available at provider link.";
pub const DEFAULT_COLLEGE: &str = "College Program";
pub const DEFAULT_LOCATION: &str = "TBD";
pub const DEFAULT_SESSION: &str = "Summer";
pub const DEFAULT_DURATION: &str = "TBD";
pub const DEFAULT_PREREQUISITES: &str = "See provider details";
pub const DEFAULT_PROVIDER_URL: &str = "https://www.summerschools.com/";

pub const DEFAULT_USER_AGENT: &str = "SummerCoursesCrawler/1.0 (+https://example.org/crawler-info)";

/// All built-in source adapter names
pub fn get_builtin_sources() -> Vec<&'static str> {
    vec![STANFORD_EDU_SOURCE, YALE_EDU_SOURCE]
}
