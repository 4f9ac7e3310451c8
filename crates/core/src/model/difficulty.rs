use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing a difficulty label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {raw}")]
pub struct ParseDifficultyError {
    pub raw: String,
}

/// Session difficulty, fixed before the session starts.
///
/// Difficulty drives both the per-question slice of the shared countdown and
/// the XP awarded per correct answer. The two scales are independent choices:
/// harder questions get more time *and* pay more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Seconds of the shared session countdown contributed by each question.
    #[must_use]
    pub fn per_question_seconds(self) -> u32 {
        match self {
            Difficulty::Easy => 60,
            Difficulty::Medium => 150,
            Difficulty::Hard => 270,
        }
    }

    /// XP awarded for each correctly answered question.
    #[must_use]
    pub fn xp_per_question(self) -> u32 {
        match self {
            Difficulty::Easy => 30,
            Difficulty::Medium => 50,
            Difficulty::Hard => 80,
        }
    }

    /// Capitalized wire label, as the question service expects it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_budget_slices() {
        assert_eq!(Difficulty::Easy.per_question_seconds(), 60);
        assert_eq!(Difficulty::Medium.per_question_seconds(), 150);
        assert_eq!(Difficulty::Hard.per_question_seconds(), 270);
    }

    #[test]
    fn xp_rewards() {
        assert_eq!(Difficulty::Easy.xp_per_question(), 30);
        assert_eq!(Difficulty::Medium.xp_per_question(), 50);
        assert_eq!(Difficulty::Hard.xp_per_question(), 80);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("MEDIUM".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn rejects_unknown_labels() {
        let err = "extreme".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.raw, "extreme");
    }

    #[test]
    fn display_matches_wire_label() {
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }
}
