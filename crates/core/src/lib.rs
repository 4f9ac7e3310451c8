#![forbid(unsafe_code)]

pub mod error;
pub mod leveling;
pub mod matcher;
pub mod model;
pub mod time;

pub use error::Error;
pub use leveling::{LevelProgress, MAX_LEVEL, level_progress};
pub use matcher::{AnswerKey, is_answer_correct, normalize_answer};
pub use model::{
    AttemptSummary, Difficulty, Identity, ParseDifficultyError, Question, QuestionError,
    QuestionRecord, SKIPPED_ANSWER, fallback_questions,
};
pub use time::Clock;
