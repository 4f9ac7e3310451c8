//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuestionError;

/// Errors emitted by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("question service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question service returned an empty set")]
    Empty,
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by score sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreSinkError {
    #[error("score service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the session state machine and its runner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz topic must not be empty")]
    EmptyTopic,
    #[error("session has not started yet")]
    NotStarted,
    #[error("session already submitted")]
    AlreadySubmitted,
    #[error("question index {index} out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("session state lock poisoned")]
    Poisoned,
}
