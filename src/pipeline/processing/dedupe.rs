use serde::Serialize;

use crate::config::DedupeConfig;
use crate::pipeline::processing::similarity::{edit_similarity, token_similarity};
use crate::types::CanonicalCourse;

/// Similarity scores between a candidate and one accepted course
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScores {
    pub title_token: f64,
    pub title_edit: f64,
    pub institution_edit: f64,
}

impl SimilarityScores {
    pub fn between(candidate: &CanonicalCourse, existing: &CanonicalCourse) -> Self {
        Self {
            title_token: token_similarity(&candidate.title, &existing.title),
            title_edit: edit_similarity(&candidate.title, &existing.title),
            institution_edit: edit_similarity(&candidate.college, &existing.college),
        }
    }
}

/// The accepted course a candidate was matched against
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    /// Position of the matched course in the accepted list
    pub accepted_index: usize,
    pub existing_id: String,
    pub scores: SimilarityScores,
}

/// Near-duplicate check against the courses accepted so far.
///
/// Titles may match on either measure; the institution must match on edit
/// similarity. The first accepted course that matches wins, even if a later
/// one would score higher, so reruns keep the same record in a chain of
/// near-duplicates.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupeConfig,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DedupeConfig) -> Self {
        Self { config }
    }

    fn scores_match(&self, scores: &SimilarityScores) -> bool {
        let title_matches = scores.title_token >= self.config.title_token_threshold
            || scores.title_edit >= self.config.title_edit_threshold;
        title_matches && scores.institution_edit >= self.config.institution_edit_threshold
    }

    pub fn is_duplicate_of(&self, candidate: &CanonicalCourse, existing: &CanonicalCourse) -> bool {
        self.scores_match(&SimilarityScores::between(candidate, existing))
    }

    /// First accepted course, in acceptance order, that `candidate` duplicates
    pub fn find_duplicate(
        &self,
        candidate: &CanonicalCourse,
        accepted: &[CanonicalCourse],
    ) -> Option<DuplicateMatch> {
        accepted.iter().enumerate().find_map(|(accepted_index, existing)| {
            let scores = SimilarityScores::between(candidate, existing);
            self.scores_match(&scores).then(|| DuplicateMatch {
                accepted_index,
                existing_id: existing.id.clone(),
                scores,
            })
        })
    }
}

/// Near-duplicate check with the default thresholds
pub fn is_duplicate_of(candidate: &CanonicalCourse, existing: &CanonicalCourse) -> bool {
    Deduplicator::new().is_duplicate_of(candidate, existing)
}
