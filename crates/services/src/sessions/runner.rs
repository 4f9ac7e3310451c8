use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use quiz_core::{AttemptSummary, Clock, Difficulty, Identity, Question};

use super::progress::SessionProgress;
use super::session::{QuizSession, SessionStatus, TickOutcome};
use crate::clients::{QuestionSource, QuizRequest, ScoreReport, ScoreSink};
use crate::error::SessionError;

/// User id sent to the question service when nobody is signed in.
const GUEST_USER_ID: &str = "guest";

/// Drives one quiz session end to end: a single question fetch, the shared
/// one-second countdown, and fire-and-forget score reporting.
///
/// The countdown runs as a spawned task holding only a [`Weak`] reference to
/// the session state; tearing the runner down aborts the task, and a tick
/// that outlives the state exits instead of mutating a discarded session.
/// Timeout and manual submission race through the same lock and the same
/// status check, so at most one of them ever scores the session or reports
/// to the persistence service.
pub struct SessionRunner {
    session: Arc<Mutex<QuizSession>>,
    source: Arc<dyn QuestionSource>,
    sink: Arc<dyn ScoreSink>,
    identity: Option<Identity>,
    clock: Clock,
    ticker: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// Create a runner for one attempt at the given topic and difficulty.
    ///
    /// `identity` is `None` for guest sessions; those are scored locally and
    /// never reported.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyTopic` if the trimmed topic is empty.
    pub fn new(
        topic: impl Into<String>,
        difficulty: Difficulty,
        identity: Option<Identity>,
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn ScoreSink>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let session = QuizSession::new(topic, difficulty)?;
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            source,
            sink,
            identity,
            clock,
            ticker: None,
        })
    }

    /// Fetch the question set and start the countdown.
    ///
    /// A failed or empty fetch is swallowed: the session starts degraded on
    /// the fallback set and the user plays on. The countdown task is spawned
    /// only after the session reaches `InProgress`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` if the session already left
    /// `Loading`, and `SessionError::Poisoned` if the state lock is gone.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let request = {
            let session = self.lock()?;
            QuizRequest {
                topic: session.topic().to_owned(),
                difficulty: session.difficulty(),
                user_id: self
                    .identity
                    .as_ref()
                    .map_or_else(|| GUEST_USER_ID.to_owned(), |id| id.user_id.clone()),
            }
        };

        let fetched = self.source.generate(&request).await;
        let now = self.clock.now();
        {
            let mut session = self.lock()?;
            match fetched {
                Ok(questions) => session.begin(questions, now)?,
                Err(err) => {
                    log::warn!("question generation failed, starting degraded: {err}");
                    session.begin_degraded(now)?;
                }
            }
        }

        self.spawn_ticker();
        Ok(())
    }

    /// Record (or overwrite) the answer for a question index.
    ///
    /// # Errors
    ///
    /// Propagates the state machine's errors; see
    /// [`QuizSession::select_answer`].
    pub fn select_answer(
        &self,
        index: usize,
        answer: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.lock()?.select_answer(index, answer)
    }

    /// Move to the next question; returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn next_question(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.next())
    }

    /// Move to the previous question; returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn previous_question(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.previous())
    }

    /// Submit manually, score the attempt, and fire the persistence report.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` when the countdown (or a
    /// second caller) got there first; callers treat that as a no-op.
    pub fn submit(&self) -> Result<AttemptSummary, SessionError> {
        let summary = self.lock()?.submit(self.clock.now())?;
        report_attempt(&self.sink, self.identity.as_ref(), &summary);
        Ok(summary)
    }

    /// Current lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn status(&self) -> Result<SessionStatus, SessionError> {
        Ok(self.lock()?.status())
    }

    /// Snapshot of the active question, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn current_question(&self) -> Result<Option<Question>, SessionError> {
        Ok(self.lock()?.current_question().cloned())
    }

    /// Aggregated progress snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn progress(&self) -> Result<SessionProgress, SessionError> {
        Ok(self.lock()?.progress())
    }

    /// Final score, present once submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is gone.
    pub fn final_score(&self) -> Result<Option<u32>, SessionError> {
        Ok(self.lock()?.final_score())
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuizSession>, SessionError> {
        self.session.lock().map_err(|_| SessionError::Poisoned)
    }

    fn spawn_ticker(&mut self) {
        let weak = Arc::downgrade(&self.session);
        let sink = Arc::clone(&self.sink);
        let identity = self.identity.clone();
        let clock = self.clock;

        self.ticker = Some(tokio::spawn(run_countdown(weak, sink, identity, clock)));
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// The countdown loop: one decrement per second until the session submits,
/// expires, or is torn down.
async fn run_countdown(
    weak: Weak<Mutex<QuizSession>>,
    sink: Arc<dyn ScoreSink>,
    identity: Option<Identity>,
    clock: Clock,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of a tokio interval completes immediately; consume it so
    // the first decrement lands a full second after start.
    interval.tick().await;

    loop {
        interval.tick().await;

        // The page dropped the runner; leave the torn-down state alone.
        let Some(session) = weak.upgrade() else {
            return;
        };

        let expired_summary = {
            let Ok(mut guard) = session.lock() else {
                return;
            };
            match guard.tick() {
                TickOutcome::Ticking { .. } => None,
                TickOutcome::Expired => {
                    // Must happen under the same lock acquisition as the
                    // expiring tick; a racing manual submit then observes
                    // Submitted and no-ops.
                    guard.submit(clock.now()).ok()
                }
                TickOutcome::Idle => {
                    if guard.is_in_progress() {
                        None
                    } else {
                        // Submitted elsewhere; the countdown's job is done.
                        return;
                    }
                }
            }
        };

        if let Some(summary) = expired_summary {
            report_attempt(&sink, identity.as_ref(), &summary);
            return;
        }
    }
}

/// Fire-and-forget persistence of a submitted attempt.
///
/// Guest sessions are never reported. Failures are logged and dropped: the
/// user already has their result, and `Submitted` is never rolled back.
fn report_attempt(sink: &Arc<dyn ScoreSink>, identity: Option<&Identity>, summary: &AttemptSummary) {
    let Some(identity) = identity else {
        log::debug!("guest session, skipping score report");
        return;
    };

    let report = ScoreReport::new(identity, summary);
    let sink = Arc::clone(sink);
    tokio::spawn(async move {
        if let Err(err) = sink.save_score(&report).await {
            log::warn!("score report failed: {err}");
        }
    });
}
