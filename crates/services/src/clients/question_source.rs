use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use quiz_core::{Difficulty, Question};

use crate::error::QuestionSourceError;

//
// ─── CONTRACT ─────────────────────────────────────────────────────────────────
//

/// Request sent to the question-generation service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub user_id: String,
}

/// Source of question sets for new sessions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Generate an ordered question set for the request.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the service is unreachable, answers
    /// with a non-success status, or delivers an empty or unusable payload.
    async fn generate(&self, request: &QuizRequest) -> Result<Vec<Question>, QuestionSourceError>;
}

//
// ─── HTTP SOURCE ──────────────────────────────────────────────────────────────
//

/// Connection settings for the quiz backend.
#[derive(Clone, Debug)]
pub struct QuizApiConfig {
    pub base_url: String,
}

impl QuizApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000";

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `QUIZ_API_BASE_URL`, defaulting to the local
    /// development backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("QUIZ_API_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into());
        Self { base_url }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// HTTP client for the question-generation service.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    config: QuizApiConfig,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn new(config: QuizApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuizApiConfig::from_env())
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn generate(&self, request: &QuizRequest) -> Result<Vec<Question>, QuestionSourceError> {
        let response = self
            .client
            .post(self.config.endpoint("generate-quiz"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        let body: Vec<GeneratedQuestion> = response.json().await?;
        if body.is_empty() {
            return Err(QuestionSourceError::Empty);
        }

        body.into_iter()
            .enumerate()
            .map(|(index, dto)| dto.into_question(index, &request.topic))
            .collect()
    }
}

/// Wire shape of one generated question.
///
/// `topic` is optional on the wire; missing values inherit the session topic.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    topic: Option<String>,
}

impl GeneratedQuestion {
    fn into_question(self, index: usize, session_topic: &str) -> Result<Question, QuestionSourceError> {
        let topic = self
            .topic
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| session_topic.to_owned());
        let id = u32::try_from(index).unwrap_or(u32::MAX);
        Ok(Question::new(
            id,
            topic,
            self.question,
            self.options,
            self.correct_answer,
        )?)
    }
}

//
// ─── STATIC SOURCE ────────────────────────────────────────────────────────────
//

/// Fixed in-memory source for tests and offline runs.
#[derive(Clone, Default)]
pub struct StaticQuestionSource {
    questions: Vec<Question>,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn generate(&self, _request: &QuizRequest) -> Result<Vec<Question>, QuestionSourceError> {
        if self.questions.is_empty() {
            return Err(QuestionSourceError::Empty);
        }
        Ok(self.questions.clone())
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
