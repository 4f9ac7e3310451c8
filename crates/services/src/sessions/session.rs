use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

use quiz_core::{
    AttemptSummary, Difficulty, Question, QuestionRecord, SKIPPED_ANSWER, fallback_questions,
    is_answer_correct,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of one quiz attempt.
///
/// Transitions only move forward: `Loading` → `InProgress` → `Submitted`.
/// Retaking a quiz means building a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Question fetch outstanding; no countdown yet.
    Loading,
    /// Countdown running, answers accepted.
    InProgress,
    /// Final score fixed; the session is inert.
    Submitted,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No decrement happened (not in progress, or already at zero).
    Idle,
    /// One second consumed, countdown still running.
    Ticking { remaining_seconds: u32 },
    /// The countdown just hit zero; the caller must submit now.
    Expired,
}

/// Fixed countdown budget for degraded sessions started after a fetch failure.
pub const DEGRADED_TIME_BUDGET_SECS: u32 = 60;

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// The aggregate state of one quiz attempt.
///
/// All mutation goes through the named transitions below. Score and history
/// exist only as the output of `submit`; no second copy is kept anywhere for
/// a racing countdown to go stale against.
pub struct QuizSession {
    topic: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<usize, String>,
    remaining_seconds: u32,
    status: SessionStatus,
    final_score: Option<u32>,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session in `Loading` state for a chosen topic and difficulty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyTopic` if the trimmed topic is empty.
    pub fn new(topic: impl Into<String>, difficulty: Difficulty) -> Result<Self, SessionError> {
        let topic = topic.into().trim().to_owned();
        if topic.is_empty() {
            return Err(SessionError::EmptyTopic);
        }

        Ok(Self {
            topic,
            difficulty,
            questions: Vec::new(),
            current: 0,
            answers: HashMap::new(),
            remaining_seconds: 0,
            status: SessionStatus::Loading,
            final_score: None,
            started_at: None,
            submitted_at: None,
        })
    }

    /// Install the fetched question set and start the countdown.
    ///
    /// An empty set is substituted with the fallback question so the session
    /// never starts without anything to show. The time budget is
    /// `question count × per-question seconds` for the chosen difficulty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` unless the session is still
    /// `Loading`.
    pub fn begin(
        &mut self,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.status != SessionStatus::Loading {
            return Err(SessionError::AlreadySubmitted);
        }

        self.questions = if questions.is_empty() {
            fallback_questions()
        } else {
            questions
        };
        let count = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        self.remaining_seconds = count.saturating_mul(self.difficulty.per_question_seconds());
        self.started_at = Some(started_at);
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Start degraded after a fetch failure: fallback set, minimal budget.
    ///
    /// The failure itself is the caller's to log; from here on the session
    /// behaves like any other.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`QuizSession::begin`].
    pub fn begin_degraded(&mut self, started_at: DateTime<Utc>) -> Result<(), SessionError> {
        if self.status != SessionStatus::Loading {
            return Err(SessionError::AlreadySubmitted);
        }

        self.questions = fallback_questions();
        self.remaining_seconds = DEGRADED_TIME_BUDGET_SECS;
        self.started_at = Some(started_at);
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Record (or overwrite) the answer for a question index.
    ///
    /// Correctness is not evaluated here; scoring happens once, at
    /// submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted`/`AlreadySubmitted` outside
    /// `InProgress` and `SessionError::IndexOutOfRange` for a bad index.
    pub fn select_answer(
        &mut self,
        index: usize,
        answer: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require_in_progress()?;
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }

        self.answers.insert(index, answer.into());
        Ok(())
    }

    /// Move to the next question, clamped to the last index.
    ///
    /// Navigation never touches answers or the countdown. Outside
    /// `InProgress` this is a no-op.
    pub fn next(&mut self) -> usize {
        if self.status == SessionStatus::InProgress {
            self.current = (self.current + 1).min(self.questions.len().saturating_sub(1));
        }
        self.current
    }

    /// Move to the previous question, clamped to index zero.
    pub fn previous(&mut self) -> usize {
        if self.status == SessionStatus::InProgress {
            self.current = self.current.saturating_sub(1);
        }
        self.current
    }

    /// Consume one second of the shared countdown.
    ///
    /// Returns `Expired` exactly on the transition to zero; every call where
    /// no decrement happens (not in progress, already at zero) returns
    /// `Idle`. The countdown can therefore expire at most once per session.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::InProgress || self.remaining_seconds == 0 {
            return TickOutcome::Idle;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Ticking {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    /// Score every question and lock the session.
    ///
    /// Unanswered indices are recorded with the `"Skipped"` sentinel and
    /// evaluated like any other answer. Each correct answer pays the
    /// difficulty's XP reward. The session transitions to `Submitted` and no
    /// later call can change the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before `begin` and
    /// `SessionError::AlreadySubmitted` on any call after the first
    /// successful one; racing callers treat the latter as a no-op.
    pub fn submit(&mut self, submitted_at: DateTime<Utc>) -> Result<AttemptSummary, SessionError> {
        self.require_in_progress()?;

        let xp = self.difficulty.xp_per_question();
        let mut score = 0_u32;
        let mut records = Vec::with_capacity(self.questions.len());

        for (index, question) in self.questions.iter().enumerate() {
            let user_answer = self
                .answers
                .get(&index)
                .map_or(SKIPPED_ANSWER, String::as_str);
            let is_correct =
                is_answer_correct(user_answer, question.correct_answer(), question.options());
            if is_correct {
                score = score.saturating_add(xp);
            }

            records.push(QuestionRecord {
                prompt: question.prompt().to_owned(),
                user_answer: user_answer.to_owned(),
                correct_answer: question.correct_answer().to_owned(),
                is_correct,
                topic: question.topic().to_owned(),
            });
        }

        self.final_score = Some(score);
        self.submitted_at = Some(submitted_at);
        self.status = SessionStatus::Submitted;

        Ok(AttemptSummary {
            score,
            topic: self.topic.clone(),
            difficulty: self.difficulty,
            records,
        })
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Loading => Err(SessionError::NotStarted),
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
            SessionStatus::InProgress => Ok(()),
        }
    }

    //
    // ─── READ ACCESS ──────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.status == SessionStatus::Submitted
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Recorded answer for an index, if any.
    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Final score, present once submitted.
    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Aggregated progress snapshot for display.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answered_count(),
            current: self.current,
            remaining_seconds: self.remaining_seconds,
            is_complete: self.is_submitted(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("topic", &self.topic)
            .field("difficulty", &self.difficulty)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_seconds", &self.remaining_seconds)
            .field("status", &self.status)
            .field("final_score", &self.final_score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
