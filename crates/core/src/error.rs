use thiserror::Error;

use crate::model::{DraftError, FeedbackError, MasteryError, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Mastery(#[from] MasteryError),
    #[error(transparent)]
    Draft(#[from] DraftError),
}
