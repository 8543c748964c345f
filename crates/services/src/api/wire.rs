//! Request and response bodies exactly as the backend speaks them (snake_case JSON),
//! with conversions into validated domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    AccessToken, AttemptId, Difficulty, Feedback, HistoryItem, MasterySnapshot, NewQuestion,
    NoteId, NoteRecord, Question, QuestionId, QuestionRecord, SkillLevel, TopicMastery, UserId,
    UserProfile, UserRecord,
};

use super::AuthGrant;
use crate::error::ApiError;

fn decode_err(err: impl ToString) -> ApiError {
    ApiError::Decode(err.to_string())
}

// ─── Requests ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignupBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct QuestionCreateBody<'a> {
    pub topic: &'a str,
    pub difficulty: Difficulty,
    pub text: &'a str,
    pub correct: &'a str,
}

impl<'a> From<&'a NewQuestion> for QuestionCreateBody<'a> {
    fn from(question: &'a NewQuestion) -> Self {
        Self {
            topic: question.topic(),
            difficulty: question.difficulty(),
            text: question.text(),
            correct: question.correct(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UserAdminBody {
    pub is_admin: bool,
}

// ─── Responses ─────────────────────────────────────────────────────────────────

/// `{ "detail": ... }` error body. FastAPI-style validation errors send a list.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    pub fn into_detail(self) -> Option<String> {
        match self.detail {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Null => None,
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(text) => text,
                        serde_json::Value::Object(mut fields) => match fields.remove("msg") {
                            Some(serde_json::Value::String(msg)) => msg,
                            _ => serde_json::Value::Object(fields).to_string(),
                        },
                        other => other.to_string(),
                    })
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthResponse {
    access_token: String,
    user: UserWire,
}

impl TryFrom<AuthResponse> for AuthGrant {
    type Error = ApiError;

    fn try_from(wire: AuthResponse) -> Result<Self, Self::Error> {
        let token = AccessToken::new(wire.access_token)
            .ok_or_else(|| decode_err("empty access token"))?;
        Ok(Self {
            token,
            user: wire.user.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserWire {
    id: u64,
    username: String,
    is_admin: bool,
}

impl From<UserWire> for UserProfile {
    fn from(wire: UserWire) -> Self {
        UserProfile::new(UserId::new(wire.id), wire.username, wire.is_admin)
    }
}

impl From<UserWire> for UserRecord {
    fn from(wire: UserWire) -> Self {
        UserRecord {
            id: UserId::new(wire.id),
            username: wire.username,
            is_admin: wire.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QuestionWire {
    id: u64,
    topic: String,
    difficulty: String,
    text: String,
}

impl TryFrom<QuestionWire> for Question {
    type Error = ApiError;

    fn try_from(wire: QuestionWire) -> Result<Self, Self::Error> {
        let difficulty = wire.difficulty.parse::<Difficulty>().map_err(decode_err)?;
        Question::new(QuestionId::new(wire.id), wire.topic, difficulty, wire.text)
            .map_err(decode_err)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FeedbackWire {
    correct: bool,
    explanation: String,
    #[serde(default)]
    next_question: Option<QuestionWire>,
    skill_update: f64,
    drift_alert: bool,
}

impl TryFrom<FeedbackWire> for Feedback {
    type Error = ApiError;

    fn try_from(wire: FeedbackWire) -> Result<Self, Self::Error> {
        let skill = SkillLevel::new(wire.skill_update).map_err(decode_err)?;
        let next_question = wire.next_question.map(Question::try_from).transpose()?;
        Ok(Feedback::new(
            wire.correct,
            wire.explanation,
            skill,
            wire.drift_alert,
            next_question,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MasteryResponse {
    topics: Vec<MasteryWire>,
}

#[derive(Debug, Deserialize)]
struct MasteryWire {
    topic: String,
    percent: i64,
    #[serde(default)]
    total: u32,
}

impl TryFrom<MasteryResponse> for MasterySnapshot {
    type Error = ApiError;

    fn try_from(wire: MasteryResponse) -> Result<Self, Self::Error> {
        let entries = wire
            .topics
            .into_iter()
            .map(|entry| TopicMastery::new(entry.topic, entry.percent, entry.total))
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err)?;
        Ok(MasterySnapshot::from_entries(entries))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryResponse {
    items: Vec<HistoryWire>,
}

#[derive(Debug, Deserialize)]
struct HistoryWire {
    id: u64,
    topic: Option<String>,
    difficulty: Option<String>,
    question: Option<String>,
    user_answer: String,
    correct: bool,
    explanation: Option<String>,
    #[serde(default)]
    time_taken_seconds: Option<u32>,
    created_at: String,
}

impl TryFrom<HistoryResponse> for Vec<HistoryItem> {
    type Error = ApiError;

    fn try_from(wire: HistoryResponse) -> Result<Self, Self::Error> {
        wire.items
            .into_iter()
            .map(|item| {
                let difficulty = item
                    .difficulty
                    .as_deref()
                    .map(str::parse::<Difficulty>)
                    .transpose()
                    .map_err(decode_err)?;
                Ok(HistoryItem {
                    id: AttemptId::new(item.id),
                    topic: item.topic,
                    difficulty,
                    created_at: parse_timestamp(&item.created_at)?,
                    question: item.question,
                    user_answer: item.user_answer,
                    correct: item.correct,
                    explanation: item.explanation,
                    time_taken_seconds: item.time_taken_seconds,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QuestionRecordWire {
    id: u64,
    topic: String,
    difficulty: String,
    text: String,
    correct: String,
}

impl TryFrom<QuestionRecordWire> for QuestionRecord {
    type Error = ApiError;

    fn try_from(wire: QuestionRecordWire) -> Result<Self, Self::Error> {
        Ok(QuestionRecord {
            id: QuestionId::new(wire.id),
            topic: wire.topic,
            difficulty: wire.difficulty.parse().map_err(decode_err)?,
            text: wire.text,
            correct: wire.correct,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct NoteWire {
    id: u64,
    title: String,
    topic: Option<String>,
    content: Option<String>,
    #[serde(default)]
    file_url: Option<String>,
}

impl From<NoteWire> for NoteRecord {
    fn from(wire: NoteWire) -> Self {
        NoteRecord {
            id: NoteId::new(wire.id),
            title: wire.title,
            topic: wire.topic,
            content: wire.content,
            file_url: wire.file_url,
        }
    }
}

/// Accept RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|err| decode_err(format!("bad timestamp '{raw}': {err}")))
}
