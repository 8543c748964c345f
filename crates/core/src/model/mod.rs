mod admin;
mod feedback;
mod ids;
mod question;
mod stats;
mod user;

pub use admin::{
    AdminListing, Attachment, DraftError, NewNote, NewQuestion, NoteDraft, NoteRecord,
    QuestionDraft, QuestionRecord, UserRecord,
};
pub use feedback::{AnswerSubmission, Feedback, FeedbackError, SkillLevel};
pub use ids::{AttemptId, NoteId, ParseIdError, QuestionId, UserId};
pub use question::{Difficulty, Question, QuestionError};
pub use stats::{HistoryItem, MasteryError, MasterySnapshot, TopicMastery};
pub use user::{AccessToken, UserProfile};
