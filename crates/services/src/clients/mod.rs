mod question_source;
mod score_sink;

pub use question_source::{
    HttpQuestionSource, QuestionSource, QuizApiConfig, QuizRequest, StaticQuestionSource,
};
pub use score_sink::{HttpScoreSink, NullScoreSink, RecordingScoreSink, ScoreReport, ScoreSink};
