use thiserror::Error;

use crate::model::{ParseDifficultyError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Difficulty(#[from] ParseDifficultyError),
}
