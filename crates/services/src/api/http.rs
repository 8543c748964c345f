use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use quiz_core::model::{
    AccessToken, AnswerSubmission, Feedback, HistoryItem, MasterySnapshot, NewNote, NewQuestion,
    NoteRecord, Question, QuestionRecord, UserId, UserProfile, UserRecord,
};

use super::wire::{
    AuthResponse, ErrorBody, FeedbackWire, HistoryResponse, LoginBody, MasteryResponse,
    NoteWire, QuestionCreateBody, QuestionRecordWire, QuestionWire, SignupBody, UserAdminBody,
    UserWire,
};
use super::{AuthGrant, LoginRequest, QuizApi, SignupRequest};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// `reqwest`-backed gateway bound to one base address.
#[derive(Clone, Debug)]
pub struct HttpQuizApi {
    client: Client,
    base_url: Url,
}

impl HttpQuizApi {
    /// Build a gateway with the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Transport(format!("bad endpoint '{path}': {err}")))
    }

    fn get(&self, path: &str, token: &AccessToken) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .get(self.endpoint(path)?)
            .bearer_auth(token.as_str()))
    }

    fn post(&self, path: &str, token: &AccessToken) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(self.endpoint(path)?)
            .bearer_auth(token.as_str()))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "api response");

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status == StatusCode::FORBIDDEN {
        return Err(ApiError::Forbidden);
    }
    if !status.is_success() {
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_detail);
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            detail,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, ApiError> {
        let body = LoginBody {
            username: &request.username,
            password: &request.password,
        };
        let wire: AuthResponse =
            Self::send(self.client.post(self.endpoint("login")?).json(&body)).await?;
        AuthGrant::try_from(wire)
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, ApiError> {
        let body = SignupBody {
            username: &request.username,
            password: &request.password,
            admin_code: request.admin_code.as_deref(),
        };
        let wire: AuthResponse =
            Self::send(self.client.post(self.endpoint("signup")?).json(&body)).await?;
        AuthGrant::try_from(wire)
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, ApiError> {
        let wire: UserWire = Self::send(self.get("me", token)?).await?;
        Ok(wire.into())
    }

    async fn next_question(&self, token: &AccessToken) -> Result<Question, ApiError> {
        let wire: QuestionWire = Self::send(self.get("get-question", token)?).await?;
        Question::try_from(wire)
    }

    async fn submit_answer(
        &self,
        token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<Feedback, ApiError> {
        let wire: FeedbackWire =
            Self::send(self.post("submit", token)?.json(submission)).await?;
        Feedback::try_from(wire)
    }

    async fn topic_mastery(&self, token: &AccessToken) -> Result<MasterySnapshot, ApiError> {
        let wire: MasteryResponse = Self::send(self.get("stats/topic-mastery", token)?).await?;
        MasterySnapshot::try_from(wire)
    }

    async fn history(&self, token: &AccessToken) -> Result<Vec<HistoryItem>, ApiError> {
        let wire: HistoryResponse = Self::send(self.get("history", token)?).await?;
        Vec::<HistoryItem>::try_from(wire)
    }

    async fn list_questions(&self, token: &AccessToken) -> Result<Vec<QuestionRecord>, ApiError> {
        let wire: Vec<QuestionRecordWire> =
            Self::send(self.get("admin/questions", token)?).await?;
        wire.into_iter().map(QuestionRecord::try_from).collect()
    }

    async fn create_question(
        &self,
        token: &AccessToken,
        question: &NewQuestion,
    ) -> Result<QuestionRecord, ApiError> {
        let body = QuestionCreateBody::from(question);
        let wire: QuestionRecordWire =
            Self::send(self.post("admin/questions", token)?.json(&body)).await?;
        QuestionRecord::try_from(wire)
    }

    async fn list_notes(&self, token: &AccessToken) -> Result<Vec<NoteRecord>, ApiError> {
        let wire: Vec<NoteWire> = Self::send(self.get("admin/theory-notes", token)?).await?;
        Ok(wire.into_iter().map(NoteRecord::from).collect())
    }

    async fn create_note(
        &self,
        token: &AccessToken,
        note: &NewNote,
    ) -> Result<NoteRecord, ApiError> {
        let mut form = Form::new().text("title", note.title().to_string());
        if let Some(topic) = note.topic() {
            form = form.text("topic", topic.to_string());
        }
        if let Some(content) = note.content() {
            form = form.text("content", content.to_string());
        }
        if let Some(attachment) = note.attachment() {
            let mut part =
                Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
            if let Some(content_type) = attachment.content_type.as_deref() {
                part = part.mime_str(content_type)?;
            }
            form = form.part("file", part);
        }

        let wire: NoteWire =
            Self::send(self.post("admin/theory-notes", token)?.multipart(form)).await?;
        Ok(wire.into())
    }

    async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserRecord>, ApiError> {
        let wire: Vec<UserWire> = Self::send(self.get("admin/users", token)?).await?;
        Ok(wire.into_iter().map(UserRecord::from).collect())
    }

    async fn set_user_admin(
        &self,
        token: &AccessToken,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(&format!("admin/users/{user_id}"))?;
        let request = self
            .client
            .patch(url)
            .bearer_auth(token.as_str())
            .json(&UserAdminBody { is_admin });
        let wire: UserWire = Self::send(request).await?;
        Ok(wire.into())
    }
}
