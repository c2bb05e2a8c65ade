//! A question is a prompt/answer pair tagged with an exam domain and a kind.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three recognized question variants.
/// Anything else is rejected at the validation boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Flashcard,
    MultipleChoice,
    PerformanceBased,
}

impl QuestionKind {
    /// Canonical tag stored in the database and written on export.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Flashcard => "flashcard",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::PerformanceBased => "performance_based",
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    /// Case-insensitive; the canonical lowercase tag is what gets stored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flashcard" => Ok(QuestionKind::Flashcard),
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            "performance_based" => Ok(QuestionKind::PerformanceBased),
            other => Err(format!("unrecognized question type '{other}'")),
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub domain: String,
    pub prompt: String,
    pub answer: String,
    pub kind: QuestionKind,
}
