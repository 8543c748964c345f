use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("question topic must not be empty")]
    EmptyTopic,
    #[error("question text must not be empty")]
    EmptyText,
}

/// Difficulty tier assigned by the backend's adaptation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// A question served to the practice loop. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic: String,
    difficulty: Difficulty,
    text: String,
}

impl Question {
    /// Build a question from server data.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the topic or text is blank.
    pub fn new(
        id: QuestionId,
        topic: impl Into<String>,
        difficulty: Difficulty,
        text: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let topic = topic.into();
        let text = text.into();
        if topic.trim().is_empty() {
            return Err(QuestionError::EmptyTopic);
        }
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        Ok(Self {
            id,
            topic,
            difficulty,
            text,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
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
    pub fn text(&self) -> &str {
        &self.text
    }
}
