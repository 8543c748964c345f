//! The API gateway: every request to the backend goes through a `QuizApi`.

mod http;
mod wire;

use async_trait::async_trait;

use quiz_core::model::{
    AccessToken, AnswerSubmission, Feedback, HistoryItem, MasterySnapshot, NewNote, NewQuestion,
    NoteRecord, Question, QuestionRecord, UserId, UserProfile, UserRecord,
};

use crate::error::ApiError;

pub use http::HttpQuizApi;

/// Token and identity returned by a successful login or signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: AccessToken,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub admin_code: Option<String>,
}

/// Backend contract consumed by the client.
///
/// Responses are validated into domain types at this boundary; a malformed
/// body surfaces as `ApiError::Decode`. Every call except login and signup
/// carries the caller's bearer token.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, ApiError>;

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, ApiError>;

    async fn next_question(&self, token: &AccessToken) -> Result<Question, ApiError>;

    async fn submit_answer(
        &self,
        token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<Feedback, ApiError>;

    async fn topic_mastery(&self, token: &AccessToken) -> Result<MasterySnapshot, ApiError>;

    async fn history(&self, token: &AccessToken) -> Result<Vec<HistoryItem>, ApiError>;

    async fn list_questions(&self, token: &AccessToken) -> Result<Vec<QuestionRecord>, ApiError>;

    async fn create_question(
        &self,
        token: &AccessToken,
        question: &NewQuestion,
    ) -> Result<QuestionRecord, ApiError>;

    async fn list_notes(&self, token: &AccessToken) -> Result<Vec<NoteRecord>, ApiError>;

    async fn create_note(&self, token: &AccessToken, note: &NewNote)
    -> Result<NoteRecord, ApiError>;

    async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserRecord>, ApiError>;

    async fn set_user_admin(
        &self,
        token: &AccessToken,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<UserRecord, ApiError>;
}
