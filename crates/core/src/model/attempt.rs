use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// Sentinel recorded as the user answer for questions left unanswered.
pub const SKIPPED_ANSWER: &str = "Skipped";

/// Per-question history entry appended at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub prompt: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub topic: String,
}

/// Result of one submitted quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptSummary {
    pub score: u32,
    pub topic: String,
    pub difficulty: Difficulty,
    pub records: Vec<QuestionRecord>,
}

impl AttemptSummary {
    /// Number of questions answered correctly.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_correct).count()
    }

    /// Number of questions left unanswered.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.user_answer == SKIPPED_ANSWER)
            .count()
    }
}
