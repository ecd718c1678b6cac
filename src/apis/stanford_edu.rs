use serde_json::json;
use tracing::{info, instrument};

use crate::constants::STANFORD_EDU_SOURCE;
use crate::error::Result;
use crate::types::{CourseSource, RawRecord};

/// Stanford summer listings, in the provider's own field names
pub struct StanfordEduSource;

impl Default for StanfordEduSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StanfordEduSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CourseSource for StanfordEduSource {
    fn name(&self) -> &str {
        STANFORD_EDU_SOURCE
    }

    fn domain(&self) -> &str {
        "summer.stanford.edu"
    }

    #[instrument(skip(self))]
    async fn crawl(&self) -> Result<Vec<RawRecord>> {
        let records = vec![
            json!({
                "source_url": "https://summer.stanford.edu/courses/cs101",
                "course_name": "Introduction to Computer Science",
                "subject_area": "Computer Science",
                "summary": "Learn the fundamentals of programming with Python.",
                "length_weeks": 6,
                "session_label": "Session 1",
                "credit_hours": 3,
                "meeting_pattern": "Mon, Wed, Fri 9:00 AM - 12:00 PM",
                "venue": "Building A, Room 201",
                "institution": "Stanford University",
                "cost": "$4,250 per session"
            }),
            json!({
                "source_url": "https://summer.stanford.edu/courses/web-bootcamp",
                "course_name": "Web Development Bootcamp",
                "subject_area": "Computer Science",
                "summary": "Build modern websites using HTML, CSS, JavaScript, and React.",
                "length_weeks": 6,
                "session_label": "Session 1",
                "credit_hours": 4,
                "prereq": "Introduction to Computer Science or basic programming knowledge",
                "meeting_pattern": "Tue, Thu 1:00 PM - 4:00 PM",
                "venue": "Hybrid: Building A, Room 203 and Zoom",
                "institution": "Carnegie Mellon University"
            }),
        ];

        info!("Collected {} records from {}", records.len(), self.name());
        Ok(records)
    }
}
