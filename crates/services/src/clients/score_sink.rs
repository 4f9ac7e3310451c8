use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use quiz_core::{AttemptSummary, Difficulty, Identity, QuestionRecord};

use crate::clients::question_source::QuizApiConfig;
use crate::error::ScoreSinkError;

//
// ─── CONTRACT ─────────────────────────────────────────────────────────────────
//

/// Payload reported to the score-persistence service after submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub score: u32,
    pub topic: String,
    pub difficulty: Difficulty,
    pub details: Vec<QuestionRecord>,
}

impl ScoreReport {
    /// Assemble a report from an authenticated identity and a submitted
    /// attempt.
    #[must_use]
    pub fn new(identity: &Identity, summary: &AttemptSummary) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            score: summary.score,
            topic: summary.topic.clone(),
            difficulty: summary.difficulty,
            details: summary.records.clone(),
        }
    }
}

/// Destination for submitted attempt scores.
///
/// Callers treat saving as fire-and-forget: a failed save is logged and never
/// affects the submitted session.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Persist one attempt report.
    ///
    /// # Errors
    ///
    /// Returns `ScoreSinkError` when the service is unreachable or rejects
    /// the report.
    async fn save_score(&self, report: &ScoreReport) -> Result<(), ScoreSinkError>;
}

//
// ─── HTTP SINK ────────────────────────────────────────────────────────────────
//

/// HTTP client for the score-persistence service.
#[derive(Clone)]
pub struct HttpScoreSink {
    client: Client,
    config: QuizApiConfig,
}

impl HttpScoreSink {
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
impl ScoreSink for HttpScoreSink {
    async fn save_score(&self, report: &ScoreReport) -> Result<(), ScoreSinkError> {
        let response = self
            .client
            .post(self.config.endpoint("api/save-score"))
            .json(report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoreSinkError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

//
// ─── TEST / OFFLINE SINKS ─────────────────────────────────────────────────────
//

/// Sink that drops every report, for offline runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullScoreSink;

#[async_trait]
impl ScoreSink for NullScoreSink {
    async fn save_score(&self, _report: &ScoreReport) -> Result<(), ScoreSinkError> {
        Ok(())
    }
}

/// Sink that records every report it receives, for tests.
#[derive(Clone, Default)]
pub struct RecordingScoreSink {
    reports: Arc<Mutex<Vec<ScoreReport>>>,
}

impl RecordingScoreSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports saved so far.
    #[must_use]
    pub fn reports(&self) -> Vec<ScoreReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ScoreSink for RecordingScoreSink {
    async fn save_score(&self, report: &ScoreReport) -> Result<(), ScoreSinkError> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
        Ok(())
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> AttemptSummary {
        AttemptSummary {
            score: 100,
            topic: "Physics".to_owned(),
            difficulty: Difficulty::Medium,
            records: vec![QuestionRecord {
                prompt: "What unit measures force?".to_owned(),
                user_answer: "Newton".to_owned(),
                correct_answer: "C".to_owned(),
                is_correct: true,
                topic: "Physics".to_owned(),
            }],
        }
    }

    #[test]
    fn report_serializes_the_persistence_contract() {
        let identity = Identity::new("u-1", "Alex", Some("alex@example.com".to_owned()));
        let report = ScoreReport::new(&identity, &summary());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["username"], "Alex");
        assert_eq!(json["email"], "alex@example.com");
        assert_eq!(json["score"], 100);
        assert_eq!(json["difficulty"], "Medium");
        assert_eq!(json["details"][0]["userAnswer"], "Newton");
        assert_eq!(json["details"][0]["isCorrect"], true);
    }

    #[test]
    fn missing_email_is_omitted_from_the_wire() {
        let identity = Identity::new("u-1", "Alex", None);
        let report = ScoreReport::new(&identity, &summary());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("email").is_none());
    }

    #[tokio::test]
    async fn recording_sink_counts_saves() {
        let sink = RecordingScoreSink::new();
        let identity = Identity::new("u-1", "Alex", None);
        let report = ScoreReport::new(&identity, &summary());

        sink.save_score(&report).await.unwrap();
        sink.save_score(&report).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.reports()[0], report);
    }
}
