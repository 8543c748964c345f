use serde::Serialize;
use thiserror::Error;

use crate::model::{Question, QuestionId};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("skill level {0} is outside 0..=1")]
    SkillOutOfRange(f64),
}

/// The backend's running estimate of the user's skill, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SkillLevel(f64);

impl SkillLevel {
    /// # Errors
    ///
    /// Returns `FeedbackError::SkillOutOfRange` for NaN or values outside `0..=1`.
    pub fn new(value: f64) -> Result<Self, FeedbackError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(FeedbackError::SkillOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Rounded percentage for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

/// Result of scoring one submitted answer.
///
/// Produced once per submission and consumed exactly once: either displayed,
/// or its bundled `next_question` is promoted into the practice slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    correct: bool,
    explanation: String,
    skill_update: SkillLevel,
    drift_alert: bool,
    next_question: Option<Question>,
}

impl Feedback {
    #[must_use]
    pub fn new(
        correct: bool,
        explanation: impl Into<String>,
        skill_update: SkillLevel,
        drift_alert: bool,
        next_question: Option<Question>,
    ) -> Self {
        Self {
            correct,
            explanation: explanation.into(),
            skill_update,
            drift_alert,
            next_question,
        }
    }

    #[must_use]
    pub fn correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn skill_update(&self) -> SkillLevel {
        self.skill_update
    }

    #[must_use]
    pub fn drift_alert(&self) -> bool {
        self.drift_alert
    }

    #[must_use]
    pub fn next_question(&self) -> Option<&Question> {
        self.next_question.as_ref()
    }

    /// Take the bundled next question, leaving `None` behind.
    pub fn take_next_question(&mut self) -> Option<Question> {
        self.next_question.take()
    }
}

/// Payload sent to the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub user_answer: String,
    pub time_taken_seconds: u32,
}
