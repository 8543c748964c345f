#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use quiz_core::model::{
    AccessToken, AnswerSubmission, Difficulty, Feedback, HistoryItem, MasterySnapshot, NewNote,
    NewQuestion, NoteId, NoteRecord, Question, QuestionId, QuestionRecord, SkillLevel,
    TopicMastery, UserId, UserProfile, UserRecord,
};
use quiz_core::time::fixed_clock;
use services::api::{AuthGrant, LoginRequest, QuizApi, SignupRequest};
use services::{ApiError, QuizClient};
use storage::{CredentialStore, InMemoryKeyValueStore, KeyValueStore};

pub const LOGIN: &str = "login";
pub const SIGNUP: &str = "signup";
pub const ME: &str = "me";
pub const GET_QUESTION: &str = "get-question";
pub const SUBMIT: &str = "submit";
pub const MASTERY: &str = "topic-mastery";
pub const HISTORY: &str = "history";
pub const LIST_QUESTIONS: &str = "list-questions";
pub const CREATE_QUESTION: &str = "create-question";
pub const LIST_NOTES: &str = "list-notes";
pub const CREATE_NOTE: &str = "create-note";
pub const LIST_USERS: &str = "list-users";
pub const SET_USER_ADMIN: &str = "set-user-admin";

type Queue<T> = VecDeque<Result<T, ApiError>>;

#[derive(Default)]
struct Script {
    auth: Queue<AuthGrant>,
    me: Queue<UserProfile>,
    questions: Queue<Question>,
    feedback: Queue<Feedback>,
    mastery: Queue<MasterySnapshot>,
    history: Queue<Vec<HistoryItem>>,
    list_questions: Queue<Vec<QuestionRecord>>,
    list_users: Queue<Vec<UserRecord>>,
    create_question: Queue<QuestionRecord>,
    create_note: Queue<NoteRecord>,
    set_user_admin: Queue<UserRecord>,
}

/// A response held back until the test releases it.
#[derive(Default)]
pub struct Hold {
    started: Notify,
    release: Notify,
}

impl Hold {
    /// Resolves once the held call has been issued.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Scripted `QuizApi`. Unscripted calls succeed with plain defaults.
#[derive(Default)]
pub struct FakeQuizApi {
    script: Mutex<Script>,
    calls: Mutex<HashMap<&'static str, usize>>,
    holds: Mutex<HashMap<&'static str, Arc<Hold>>>,
    submissions: Mutex<Vec<AnswerSubmission>>,
    signups: Mutex<Vec<SignupRequest>>,
    next_id: AtomicU64,
}

impl FakeQuizApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    pub fn submissions(&self) -> Vec<AnswerSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn signups(&self) -> Vec<SignupRequest> {
        self.signups.lock().unwrap().clone()
    }

    /// Hold the next call to `endpoint` until `Hold::release`.
    pub fn hold(&self, endpoint: &'static str) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        self.holds.lock().unwrap().insert(endpoint, Arc::clone(&hold));
        hold
    }

    pub fn push_auth(&self, result: Result<AuthGrant, ApiError>) {
        self.script.lock().unwrap().auth.push_back(result);
    }

    pub fn push_me(&self, result: Result<UserProfile, ApiError>) {
        self.script.lock().unwrap().me.push_back(result);
    }

    pub fn push_question(&self, result: Result<Question, ApiError>) {
        self.script.lock().unwrap().questions.push_back(result);
    }

    pub fn push_feedback(&self, result: Result<Feedback, ApiError>) {
        self.script.lock().unwrap().feedback.push_back(result);
    }

    pub fn push_mastery(&self, result: Result<MasterySnapshot, ApiError>) {
        self.script.lock().unwrap().mastery.push_back(result);
    }

    pub fn push_history(&self, result: Result<Vec<HistoryItem>, ApiError>) {
        self.script.lock().unwrap().history.push_back(result);
    }

    pub fn push_list_questions(&self, result: Result<Vec<QuestionRecord>, ApiError>) {
        self.script.lock().unwrap().list_questions.push_back(result);
    }

    pub fn push_list_users(&self, result: Result<Vec<UserRecord>, ApiError>) {
        self.script.lock().unwrap().list_users.push_back(result);
    }

    pub fn push_create_question(&self, result: Result<QuestionRecord, ApiError>) {
        self.script.lock().unwrap().create_question.push_back(result);
    }

    pub fn push_set_user_admin(&self, result: Result<UserRecord, ApiError>) {
        self.script.lock().unwrap().set_user_admin.push_back(result);
    }

    fn id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn enter(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
        let hold = self.holds.lock().unwrap().remove(endpoint);
        if let Some(hold) = hold {
            hold.started.notify_one();
            hold.release.notified().await;
        }
    }

    fn take<T>(&self, pick: impl FnOnce(&mut Script) -> &mut Queue<T>) -> Option<Result<T, ApiError>> {
        let mut script = self.script.lock().unwrap();
        pick(&mut script).pop_front()
    }

    fn generated_question(&self) -> Question {
        let id = self.id();
        question(id, "arrays", Difficulty::Easy)
    }
}

#[async_trait]
impl QuizApi for FakeQuizApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, ApiError> {
        self.enter(LOGIN).await;
        self.take(|s| &mut s.auth)
            .unwrap_or_else(|| Ok(grant(&request.username, false)))
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, ApiError> {
        self.enter(SIGNUP).await;
        self.signups.lock().unwrap().push(request.clone());
        self.take(|s| &mut s.auth).unwrap_or_else(|| {
            Ok(grant(&request.username, request.admin_code.is_some()))
        })
    }

    async fn current_user(&self, _token: &AccessToken) -> Result<UserProfile, ApiError> {
        self.enter(ME).await;
        self.take(|s| &mut s.me)
            .unwrap_or_else(|| Ok(profile("ana", false)))
    }

    async fn next_question(&self, _token: &AccessToken) -> Result<Question, ApiError> {
        self.enter(GET_QUESTION).await;
        self.take(|s| &mut s.questions)
            .unwrap_or_else(|| Ok(self.generated_question()))
    }

    async fn submit_answer(
        &self,
        _token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<Feedback, ApiError> {
        self.enter(SUBMIT).await;
        self.submissions.lock().unwrap().push(submission.clone());
        self.take(|s| &mut s.feedback).unwrap_or_else(|| {
            Ok(feedback(true, false, Some(self.generated_question())))
        })
    }

    async fn topic_mastery(&self, _token: &AccessToken) -> Result<MasterySnapshot, ApiError> {
        self.enter(MASTERY).await;
        self.take(|s| &mut s.mastery)
            .unwrap_or_else(|| Ok(MasterySnapshot::default()))
    }

    async fn history(&self, _token: &AccessToken) -> Result<Vec<HistoryItem>, ApiError> {
        self.enter(HISTORY).await;
        self.take(|s| &mut s.history).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_questions(&self, _token: &AccessToken) -> Result<Vec<QuestionRecord>, ApiError> {
        self.enter(LIST_QUESTIONS).await;
        self.take(|s| &mut s.list_questions)
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_question(
        &self,
        _token: &AccessToken,
        question: &NewQuestion,
    ) -> Result<QuestionRecord, ApiError> {
        self.enter(CREATE_QUESTION).await;
        self.take(|s| &mut s.create_question).unwrap_or_else(|| {
            Ok(QuestionRecord {
                id: QuestionId::new(self.id()),
                topic: question.topic().to_string(),
                difficulty: question.difficulty(),
                text: question.text().to_string(),
                correct: question.correct().to_string(),
            })
        })
    }

    async fn list_notes(&self, _token: &AccessToken) -> Result<Vec<NoteRecord>, ApiError> {
        self.enter(LIST_NOTES).await;
        Ok(Vec::new())
    }

    async fn create_note(
        &self,
        _token: &AccessToken,
        note: &NewNote,
    ) -> Result<NoteRecord, ApiError> {
        self.enter(CREATE_NOTE).await;
        self.take(|s| &mut s.create_note).unwrap_or_else(|| {
            Ok(NoteRecord {
                id: NoteId::new(self.id()),
                title: note.title().to_string(),
                topic: note.topic().map(str::to_string),
                content: note.content().map(str::to_string),
                file_url: note
                    .attachment()
                    .map(|file| format!("/uploads/{}", file.file_name)),
            })
        })
    }

    async fn list_users(&self, _token: &AccessToken) -> Result<Vec<UserRecord>, ApiError> {
        self.enter(LIST_USERS).await;
        self.take(|s| &mut s.list_users).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn set_user_admin(
        &self,
        _token: &AccessToken,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<UserRecord, ApiError> {
        self.enter(SET_USER_ADMIN).await;
        self.take(|s| &mut s.set_user_admin).unwrap_or_else(|| {
            Ok(UserRecord {
                id: user_id,
                username: format!("user{user_id}"),
                is_admin,
            })
        })
    }
}

pub fn profile(username: &str, is_admin: bool) -> UserProfile {
    UserProfile::new(UserId::new(1), username, is_admin)
}

pub fn grant(username: &str, is_admin: bool) -> AuthGrant {
    AuthGrant {
        token: AccessToken::new(format!("token-{username}")).unwrap(),
        user: profile(username, is_admin),
    }
}

pub fn question(id: u64, topic: &str, difficulty: Difficulty) -> Question {
    Question::new(QuestionId::new(id), topic, difficulty, format!("Question {id}?")).unwrap()
}

pub fn feedback(correct: bool, drift_alert: bool, next: Option<Question>) -> Feedback {
    Feedback::new(
        correct,
        if correct { "Well done." } else { "Not quite." },
        SkillLevel::new(0.6).unwrap(),
        drift_alert,
        next,
    )
}

pub fn mastery(entries: &[(&str, i64)]) -> MasterySnapshot {
    MasterySnapshot::from_entries(
        entries
            .iter()
            .map(|(topic, percent)| TopicMastery::new(*topic, *percent, 3).unwrap()),
    )
}

pub fn server_error() -> ApiError {
    ApiError::HttpStatus {
        status: 500,
        detail: Some("Internal Server Error".into()),
    }
}

pub struct Harness {
    pub api: Arc<FakeQuizApi>,
    pub kv: Arc<InMemoryKeyValueStore>,
    pub credentials: CredentialStore,
    pub client: QuizClient,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_api(FakeQuizApi::new())
    }

    pub fn with_api(api: Arc<FakeQuizApi>) -> Self {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store: Arc<dyn KeyValueStore> = kv.clone();
        let credentials = CredentialStore::new(store);
        let gateway: Arc<dyn QuizApi> = api.clone();
        let client = QuizClient::new(gateway, credentials.clone(), fixed_clock());
        Self {
            api,
            kv,
            credentials,
            client,
        }
    }

    /// Log in and wait for the default view's refreshes.
    pub async fn signed_in(username: &str, is_admin: bool) -> Self {
        let harness = Self::new();
        harness.api.push_auth(Ok(grant(username, is_admin)));
        harness.client.session().login(username, "pw").await.unwrap();
        harness.client.settle().await;
        harness
    }
}
