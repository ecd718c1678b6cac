use serde_json::json;
use tracing::{info, instrument};

use crate::constants::YALE_EDU_SOURCE;
use crate::error::Result;
use crate::types::{CourseSource, RawRecord};

pub struct YaleEduSource;

impl Default for YaleEduSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YaleEduSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CourseSource for YaleEduSource {
    fn name(&self) -> &str {
        YALE_EDU_SOURCE
    }

    fn domain(&self) -> &str {
        "summer.yale.edu"
    }

    #[instrument(skip(self))]
    async fn crawl(&self) -> Result<Vec<RawRecord>> {
        let records = vec![
            json!({
                "source_url": "https://summer.yale.edu/programs/creative-writing-workshop",
                "headline": "Creative Writing Workshop",
                "discipline": "English",
                "body": "Develop your voice through fiction, poetry, and creative nonfiction.",
                "duration_text": "6 weeks",
                "term": "Session 1",
                "credits": 3,
                "schedule_text": "Mon, Wed 2:00 PM - 4:00 PM",
                "room": "Humanities Hall, Room 102",
                "school": "Yale University"
            }),
            json!({
                "source_url": "https://summer.yale.edu/programs/american-literature-contemporary-voices",
                "headline": "American Literature: Contemporary Voices",
                "discipline": "English",
                "body": "Explore contemporary American literature from diverse perspectives.",
                "duration_text": "4 weeks",
                "term": "Session 1",
                "credits": 3,
                "schedule_text": "Tue, Thu 10:00 AM - 12:30 PM",
                "room": "Online (live sessions on Zoom)",
                "school": "Yale University",
                "tuition": 2950
            }),
        ];

        info!("Collected {} records from {}", records.len(), self.name());
        Ok(records)
    }
}
