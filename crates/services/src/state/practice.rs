//! The adaptive practice cycle:
//! `Idle -> Fetching -> Presented -> Submitting -> Feedback -> (Presented | Fetching)`.
//!
//! Transitions are pure; the network side lives in `PracticeService`.

use chrono::{DateTime, Utc};

use quiz_core::Clock;
use quiz_core::model::{AnswerSubmission, Feedback, Question, SkillLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PracticePhase {
    #[default]
    Idle,
    Fetching,
    Presented,
    Submitting,
    Feedback,
}

/// Outcome of a successful scoring round, as seen by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    pub correct: bool,
    pub drift_alert: bool,
}

/// Result of asking for the next question while feedback is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The feedback's bundled question is now current; no request needed.
    Promoted,
    /// Feedback carried no question; the loop is now `Fetching`.
    FetchRequired,
    /// Not showing feedback; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PracticeState {
    phase: PracticePhase,
    question: Option<Question>,
    presented_at: Option<DateTime<Utc>>,
    answer: String,
    feedback: Option<Feedback>,
    attempts: u32,
    drift_events: u32,
    skill: Option<SkillLevel>,
    error: Option<String>,
}

impl PracticeState {
    #[must_use]
    pub fn phase(&self) -> PracticePhase {
        self.phase
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Successful submissions this session.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Submissions whose feedback carried a drift alert this session.
    #[must_use]
    pub fn drift_events(&self) -> u32 {
        self.drift_events
    }

    /// Latest skill estimate from feedback, if any arrived this session.
    #[must_use]
    pub fn skill(&self) -> Option<SkillLevel> {
        self.skill
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fetch from any resting phase. Refused while a fetch or submission is outstanding.
    pub fn begin_fetch(&mut self) -> bool {
        if matches!(
            self.phase,
            PracticePhase::Fetching | PracticePhase::Submitting
        ) {
            return false;
        }
        self.enter_fetching();
        true
    }

    /// Start a fetch only when nothing is in play.
    pub fn begin_fetch_if_idle(&mut self) -> bool {
        if self.phase != PracticePhase::Idle {
            return false;
        }
        self.enter_fetching();
        true
    }

    fn enter_fetching(&mut self) {
        self.phase = PracticePhase::Fetching;
        self.question = None;
        self.presented_at = None;
        self.feedback = None;
        self.answer.clear();
        self.error = None;
    }

    pub fn fetch_succeeded(&mut self, question: Question, at: DateTime<Utc>) -> bool {
        if self.phase != PracticePhase::Fetching {
            return false;
        }
        self.present(question, at);
        true
    }

    pub fn fetch_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != PracticePhase::Fetching {
            return false;
        }
        self.phase = PracticePhase::Idle;
        self.error = Some(message.into());
        true
    }

    /// Replace the typed answer. Only editable while a question is presented.
    pub fn set_answer(&mut self, text: impl Into<String>) -> bool {
        if self.phase != PracticePhase::Presented {
            return false;
        }
        self.answer = text.into();
        true
    }

    /// Move to `Submitting` and build the request. `None` when not `Presented`,
    /// which makes a repeated submit a no-op.
    pub fn begin_submit(&mut self, clock: &Clock) -> Option<AnswerSubmission> {
        if self.phase != PracticePhase::Presented {
            return None;
        }
        let question = self.question.as_ref()?;
        let time_taken_seconds = self
            .presented_at
            .map_or(0, |presented_at| clock.seconds_since(presented_at));

        let submission = AnswerSubmission {
            question_id: question.id(),
            user_answer: self.answer.clone(),
            time_taken_seconds,
        };
        self.phase = PracticePhase::Submitting;
        self.error = None;
        Some(submission)
    }

    pub fn submit_succeeded(&mut self, feedback: Feedback) -> Option<Scored> {
        if self.phase != PracticePhase::Submitting {
            return None;
        }
        let scored = Scored {
            correct: feedback.correct(),
            drift_alert: feedback.drift_alert(),
        };
        self.attempts = self.attempts.saturating_add(1);
        if scored.drift_alert {
            self.drift_events = self.drift_events.saturating_add(1);
        }
        self.skill = Some(feedback.skill_update());
        self.feedback = Some(feedback);
        self.phase = PracticePhase::Feedback;
        Some(scored)
    }

    /// Back to `Presented` with the question and typed answer intact; counters untouched.
    pub fn submit_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != PracticePhase::Submitting {
            return false;
        }
        self.phase = PracticePhase::Presented;
        self.error = Some(message.into());
        true
    }

    /// Consume the feedback: promote its bundled question, or fall back to a fetch.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Advance {
        if self.phase != PracticePhase::Feedback {
            return Advance::Ignored;
        }
        let next = self
            .feedback
            .take()
            .and_then(|mut feedback| feedback.take_next_question());

        match next {
            Some(question) => {
                self.present(question, at);
                Advance::Promoted
            }
            None => {
                self.enter_fetching();
                Advance::FetchRequired
            }
        }
    }

    fn present(&mut self, question: Question, at: DateTime<Utc>) {
        self.phase = PracticePhase::Presented;
        self.question = Some(question);
        self.presented_at = Some(at);
        self.feedback = None;
        self.answer.clear();
        self.error = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
