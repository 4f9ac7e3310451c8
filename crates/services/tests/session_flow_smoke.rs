use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::time::fixed_clock;
use quiz_core::{Difficulty, Identity, Question};
use services::{
    QuestionSource, QuestionSourceError, QuizRequest, RecordingScoreSink, SessionError,
    SessionRunner, SessionStatus, StaticQuestionSource,
};

fn force_questions() -> Vec<Question> {
    let units = || {
        vec![
            "Joule".to_owned(),
            "Pascal".to_owned(),
            "Newton".to_owned(),
            "Watt".to_owned(),
        ]
    };
    vec![
        Question::new(0, "Physics", "What unit measures force?", units(), "C").unwrap(),
        Question::new(1, "Physics", "What unit measures pressure?", units(), "Pascal").unwrap(),
        Question::new(2, "Physics", "What unit measures energy?", units(), "Joule").unwrap(),
    ]
}

async fn wait_for_reports(sink: &RecordingScoreSink, expected: usize) {
    for _ in 0..100 {
        if sink.len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} report(s), saw {}", sink.len());
}

#[tokio::test]
async fn full_session_scores_and_reports_exactly_once() {
    let source = Arc::new(StaticQuestionSource::new(force_questions()));
    let sink = RecordingScoreSink::new();
    let identity = Identity::new("u-1", "Alex", Some("alex@example.com".to_owned()));

    let mut runner = SessionRunner::new(
        "Physics",
        Difficulty::Medium,
        Some(identity),
        source,
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();
    assert_eq!(runner.status().unwrap(), SessionStatus::InProgress);
    assert_eq!(runner.progress().unwrap().remaining_seconds, 450);

    // Correct (letter key), wrong, correct (full text): 2 x 50 XP.
    runner.select_answer(0, "Newton").unwrap();
    runner.next_question().unwrap();
    runner.select_answer(1, "Watt").unwrap();
    runner.next_question().unwrap();
    runner.select_answer(2, "joule").unwrap();

    let summary = runner.submit().unwrap();
    assert_eq!(summary.score, 100);
    assert_eq!(summary.correct_count(), 2);
    assert_eq!(runner.status().unwrap(), SessionStatus::Submitted);
    assert_eq!(runner.final_score().unwrap(), Some(100));

    wait_for_reports(&sink, 1).await;
    let report = &sink.reports()[0];
    assert_eq!(report.user_id, "u-1");
    assert_eq!(report.score, 100);
    assert_eq!(report.details.len(), 3);

    // A second submit observes Submitted and changes nothing.
    assert_eq!(runner.submit().unwrap_err(), SessionError::AlreadySubmitted);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn guest_sessions_are_never_reported() {
    let source = Arc::new(StaticQuestionSource::new(force_questions()));
    let sink = RecordingScoreSink::new();

    let mut runner = SessionRunner::new(
        "Physics",
        Difficulty::Easy,
        None,
        source,
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();

    runner.select_answer(0, "Newton").unwrap();
    let summary = runner.submit().unwrap();
    assert_eq!(summary.score, 30);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sink.is_empty());
}

struct UnreachableSource;

#[async_trait]
impl QuestionSource for UnreachableSource {
    async fn generate(&self, _request: &QuizRequest) -> Result<Vec<Question>, QuestionSourceError> {
        Err(QuestionSourceError::Empty)
    }
}

#[tokio::test]
async fn fetch_failure_degrades_instead_of_erroring() {
    let sink = RecordingScoreSink::new();
    let identity = Identity::new("u-1", "Alex", None);

    let mut runner = SessionRunner::new(
        "Quantum Physics",
        Difficulty::Hard,
        Some(identity),
        Arc::new(UnreachableSource),
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();

    // Fallback set with the fixed degraded budget, not Hard's 270s slice.
    let progress = runner.progress().unwrap();
    assert_eq!(progress.total, 1);
    assert_eq!(progress.remaining_seconds, 60);

    let question = runner.current_question().unwrap().unwrap();
    runner.select_answer(0, question.correct_answer()).unwrap();
    let summary = runner.submit().unwrap();

    // Degraded sessions still pay the chosen difficulty's reward.
    assert_eq!(summary.score, 80);
    wait_for_reports(&sink, 1).await;
}
