#![forbid(unsafe_code)]

pub mod clients;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{QuestionSourceError, ScoreSinkError, SessionError};

pub use clients::{
    HttpQuestionSource, HttpScoreSink, NullScoreSink, QuestionSource, QuizApiConfig, QuizRequest,
    RecordingScoreSink, ScoreReport, ScoreSink, StaticQuestionSource,
};

pub use sessions::{
    DEGRADED_TIME_BUDGET_SECS, QuizSession, SessionProgress, SessionRunner, SessionStatus,
    TickOutcome,
};
