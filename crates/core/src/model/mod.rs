mod attempt;
mod difficulty;
mod identity;
mod question;

pub use attempt::{AttemptSummary, QuestionRecord, SKIPPED_ANSWER};
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use identity::Identity;
pub use question::{Question, QuestionError, fallback_questions};
