use thiserror::Error;

use crate::model::{Difficulty, NoteId, QuestionId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DraftError {
    #[error("{field} must not be empty")]
    Missing { field: &'static str },
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("attachment file name must not be empty")]
    UnnamedAttachment,
}

/// A question as listed by the admin endpoints, including its answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub topic: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub correct: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub id: NoteId,
    pub title: String,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
}

/// Everything the admin view shows, as of one `list_all` round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminListing {
    pub questions: Vec<QuestionRecord>,
    pub notes: Vec<NoteRecord>,
    pub users: Vec<UserRecord>,
}

/// Unvalidated input for a new question.
#[derive(Debug, Clone, Default)]
pub struct QuestionDraft {
    pub topic: String,
    pub difficulty: String,
    pub text: String,
    pub correct: String,
}

/// Validated payload for `POST /admin/questions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    topic: String,
    difficulty: Difficulty,
    text: String,
    correct: String,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `DraftError` when a field is blank or the difficulty is unknown.
    pub fn validate(self) -> Result<NewQuestion, DraftError> {
        let topic = required(self.topic, "topic")?;
        let text = required(self.text, "text")?;
        let correct = required(self.correct, "correct answer")?;
        let difficulty = self
            .difficulty
            .parse::<Difficulty>()
            .map_err(|_| DraftError::UnknownDifficulty(self.difficulty.clone()))?;
        Ok(NewQuestion {
            topic,
            difficulty,
            text,
            correct,
        })
    }
}

impl NewQuestion {
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

    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }
}

/// Opaque file uploaded alongside a theory note.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Unvalidated input for a new theory note.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Validated payload for `POST /admin/theory-notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    title: String,
    topic: Option<String>,
    content: Option<String>,
    attachment: Option<Attachment>,
}

impl NoteDraft {
    /// # Errors
    ///
    /// Returns `DraftError` when the title is blank or the attachment has no name.
    pub fn validate(self) -> Result<NewNote, DraftError> {
        let title = required(self.title, "title")?;
        if let Some(attachment) = self.attachment.as_ref() {
            if attachment.file_name.trim().is_empty() {
                return Err(DraftError::UnnamedAttachment);
            }
        }
        Ok(NewNote {
            title,
            topic: normalize_optional(self.topic),
            content: normalize_optional(self.content),
            attachment: self.attachment,
        })
    }
}

impl NewNote {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

fn required(value: String, field: &'static str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DraftError::Missing { field });
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
