use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised while validating a fetched question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt must not be empty")]
    EmptyPrompt,

    #[error("question must carry 2-4 options, got {len}")]
    InvalidOptionCount { len: usize },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// One multiple-choice question as delivered by the generation service.
///
/// `correct_answer` is kept raw: the upstream service sometimes sends the
/// literal option text and sometimes a single letter key (`A`-`D`). The
/// matcher resolves that ambiguity at scoring time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: u32,
    topic: String,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt and
    /// `QuestionError::InvalidOptionCount` when the option list is not 2-4
    /// entries long.
    pub fn new(
        id: u32,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if !(2..=4).contains(&options.len()) {
            return Err(QuestionError::InvalidOptionCount { len: options.len() });
        }

        Ok(Self {
            id,
            topic: topic.into(),
            prompt,
            options,
            correct_answer: correct_answer.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

//
// ─── FALLBACK SET ─────────────────────────────────────────────────────────────
//

/// Single-question backup set used when the generation service fails or
/// returns nothing, so a session never starts empty.
#[must_use]
pub fn fallback_questions() -> Vec<Question> {
    vec![Question {
        id: 0,
        topic: "Physics".to_owned(),
        prompt: "What is the speed of light?".to_owned(),
        options: vec![
            "3x10^8 m/s".to_owned(),
            "Zero".to_owned(),
            "Infinite".to_owned(),
            "Sound speed".to_owned(),
        ],
        correct_answer: "3x10^8 m/s".to_owned(),
    }]
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
