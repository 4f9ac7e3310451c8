use std::sync::Arc;
use std::time::Duration;

use quiz_core::time::fixed_clock;
use quiz_core::{Difficulty, Identity, Question, SKIPPED_ANSWER};
use services::{
    RecordingScoreSink, SessionError, SessionRunner, SessionStatus, StaticQuestionSource,
};

fn two_questions() -> Vec<Question> {
    let options = || vec!["3".to_owned(), "4".to_owned(), "5".to_owned(), "Fish".to_owned()];
    vec![
        Question::new(0, "Math", "What is 2 + 2?", options(), "4").unwrap(),
        Question::new(1, "Math", "What is 2 + 3?", options(), "5").unwrap(),
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

#[tokio::test(start_paused = true)]
async fn countdown_expiry_auto_submits_with_skips() {
    let sink = RecordingScoreSink::new();
    let identity = Identity::new("u-1", "Alex", None);

    let mut runner = SessionRunner::new(
        "Math",
        Difficulty::Easy,
        Some(identity),
        Arc::new(StaticQuestionSource::new(two_questions())),
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();
    assert_eq!(runner.progress().unwrap().remaining_seconds, 120);

    runner.select_answer(0, "4").unwrap();

    // Two Easy questions buy 120 seconds; run the paused clock past that.
    tokio::time::sleep(Duration::from_secs(121)).await;

    assert_eq!(runner.status().unwrap(), SessionStatus::Submitted);
    assert_eq!(runner.final_score().unwrap(), Some(30));
    assert_eq!(runner.progress().unwrap().remaining_seconds, 0);

    wait_for_reports(&sink, 1).await;
    let report = &sink.reports()[0];
    assert_eq!(report.score, 30);
    assert_eq!(report.details[0].user_answer, "4");
    assert!(report.details[0].is_correct);
    assert_eq!(report.details[1].user_answer, SKIPPED_ANSWER);
    assert!(!report.details[1].is_correct);
}

#[tokio::test(start_paused = true)]
async fn racing_manual_submit_after_expiry_is_a_no_op() {
    let sink = RecordingScoreSink::new();
    let identity = Identity::new("u-1", "Alex", None);

    let mut runner = SessionRunner::new(
        "Math",
        Difficulty::Easy,
        Some(identity),
        Arc::new(StaticQuestionSource::new(two_questions())),
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(121)).await;
    assert_eq!(runner.status().unwrap(), SessionStatus::Submitted);

    assert_eq!(runner.submit().unwrap_err(), SessionError::AlreadySubmitted);
    assert_eq!(runner.select_answer(1, "5").unwrap_err(), SessionError::AlreadySubmitted);

    wait_for_reports(&sink, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_stops_after_manual_submission() {
    let sink = RecordingScoreSink::new();

    let mut runner = SessionRunner::new(
        "Math",
        Difficulty::Easy,
        None,
        Arc::new(StaticQuestionSource::new(two_questions())),
        Arc::new(sink.clone()),
        fixed_clock(),
    )
    .unwrap();
    runner.start().await.unwrap();

    // Let a few seconds burn, then submit by hand.
    tokio::time::sleep(Duration::from_secs(5)).await;
    let remaining_at_submit = runner.progress().unwrap().remaining_seconds;
    assert!(remaining_at_submit < 120 && remaining_at_submit > 0);
    runner.submit().unwrap();

    // The countdown must not keep decrementing a submitted session.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(
        runner.progress().unwrap().remaining_seconds,
        remaining_at_submit
    );
    assert_eq!(runner.status().unwrap(), SessionStatus::Submitted);
}
