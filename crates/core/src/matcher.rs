//! Answer matching.
//!
//! The question service is inconsistent about `correct_answer`: sometimes it
//! is the full option text, sometimes a single letter key indexing into the
//! option list. This module absorbs that inconsistency in one place so the
//! scoring path never special-cases it.

use std::borrow::Cow;

//
// ─── NORMALIZATION ────────────────────────────────────────────────────────────
//

/// Canonical form used for comparisons: entity-decoded, trimmed, lowercased.
///
/// Upstream question text routinely arrives HTML-escaped (`Don&#039;t`), so
/// both sides are decoded before comparing.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    let decoded: Cow<'_, str> = html_escape::decode_html_entities(raw);
    decoded.trim().to_lowercase()
}

//
// ─── ANSWER KEY ───────────────────────────────────────────────────────────────
//

/// The two shapes a correct answer arrives in, resolved once per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    /// A letter token (`a`-`d`), carried as the option index it names.
    Letter(usize),
    /// Full option text in normalized form.
    Text(String),
}

impl AnswerKey {
    /// Classify a correct answer. Expects input already normalized.
    #[must_use]
    pub fn classify(normalized: &str) -> Self {
        match normalized {
            "a" => Self::Letter(0),
            "b" => Self::Letter(1),
            "c" => Self::Letter(2),
            "d" => Self::Letter(3),
            text => Self::Text(text.to_owned()),
        }
    }
}

//
// ─── MATCHING ─────────────────────────────────────────────────────────────────
//

/// Decide whether a submitted answer matches the canonical correct answer.
///
/// Policy, in order: normalized equality; then, when the correct answer is a
/// letter key, comparison against the option that letter names. A missing
/// correct answer or an out-of-range letter is unmatchable and scores false.
#[must_use]
pub fn is_answer_correct(user_answer: &str, correct_answer: &str, options: &[String]) -> bool {
    let user = normalize_answer(user_answer);
    let correct = normalize_answer(correct_answer);

    if correct.is_empty() {
        return false;
    }
    if user == correct {
        return true;
    }

    match AnswerKey::classify(&correct) {
        AnswerKey::Letter(index) => options
            .get(index)
            .is_some_and(|option| normalize_answer(option) == user),
        AnswerKey::Text(_) => false,
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
