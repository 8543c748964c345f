use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{AttemptId, Difficulty};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MasteryError {
    #[error("mastery percent {0} is outside 0..=100")]
    PercentOutOfRange(i64),
    #[error("mastery topic must not be empty")]
    EmptyTopic,
}

/// Per-topic mastery reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMastery {
    topic: String,
    percent: u8,
    attempts: u32,
}

impl TopicMastery {
    /// # Errors
    ///
    /// Returns `MasteryError` if the topic is blank or the percentage is not in `0..=100`.
    pub fn new(topic: impl Into<String>, percent: i64, attempts: u32) -> Result<Self, MasteryError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(MasteryError::EmptyTopic);
        }
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(MasteryError::PercentOutOfRange(percent))?;
        Ok(Self {
            topic,
            percent,
            attempts,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Full topic -> mastery mapping as of one server response.
///
/// Always replaced wholesale; never merged with a previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterySnapshot {
    topics: BTreeMap<String, TopicMastery>,
}

impl MasterySnapshot {
    /// Build a snapshot keyed by topic. A repeated topic keeps the last entry.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = TopicMastery>) -> Self {
        let topics = entries
            .into_iter()
            .map(|entry| (entry.topic.clone(), entry))
            .collect();
        Self { topics }
    }

    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&TopicMastery> {
        self.topics.get(topic)
    }

    /// Entries ordered by topic name.
    pub fn iter(&self) -> impl Iterator<Item = &TopicMastery> {
        self.topics.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// One past attempt, as recorded by the server.
///
/// Topic, difficulty, and question text are absent when the underlying
/// question no longer exists server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: AttemptId,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub created_at: DateTime<Utc>,
    pub question: Option<String>,
    pub user_answer: String,
    pub correct: bool,
    pub explanation: Option<String>,
    pub time_taken_seconds: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_must_be_in_range() {
        assert!(TopicMastery::new("arrays", 0, 0).is_ok());
        assert!(TopicMastery::new("arrays", 100, 3).is_ok());
        assert_eq!(
            TopicMastery::new("arrays", 101, 1).unwrap_err(),
            MasteryError::PercentOutOfRange(101)
        );
        assert_eq!(
            TopicMastery::new("arrays", -1, 1).unwrap_err(),
            MasteryError::PercentOutOfRange(-1)
        );
    }

    #[test]
    fn snapshot_is_keyed_by_topic() {
        let snapshot = MasterySnapshot::from_entries(vec![
            TopicMastery::new("trees", 40, 5).unwrap(),
            TopicMastery::new("arrays", 80, 5).unwrap(),
            TopicMastery::new("trees", 60, 6).unwrap(),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("trees").map(TopicMastery::percent), Some(60));
        let order: Vec<_> = snapshot.iter().map(TopicMastery::topic).collect();
        assert_eq!(order, vec!["arrays", "trees"]);
    }
}
