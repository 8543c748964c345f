use quiz_core::model::{HistoryItem, MasterySnapshot};

/// Cached mastery and history. Each refresh replaces its part wholesale;
/// a failed refresh keeps the last good copy and records the error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    mastery: MasterySnapshot,
    history: Vec<HistoryItem>,
    mastery_error: Option<String>,
    history_error: Option<String>,
}

impl StatsState {
    #[must_use]
    pub fn mastery(&self) -> &MasterySnapshot {
        &self.mastery
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    #[must_use]
    pub fn mastery_error(&self) -> Option<&str> {
        self.mastery_error.as_deref()
    }

    #[must_use]
    pub fn history_error(&self) -> Option<&str> {
        self.history_error.as_deref()
    }

    pub fn apply_mastery(&mut self, snapshot: MasterySnapshot) {
        self.mastery = snapshot;
        self.mastery_error = None;
    }

    pub fn mastery_failed(&mut self, message: impl Into<String>) {
        self.mastery_error = Some(message.into());
    }

    pub fn apply_history(&mut self, items: Vec<HistoryItem>) {
        self.history = items;
        self.history_error = None;
    }

    pub fn history_failed(&mut self, message: impl Into<String>) {
        self.history_error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::TopicMastery;

    fn snapshot(entries: &[(&str, i64)]) -> MasterySnapshot {
        MasterySnapshot::from_entries(
            entries
                .iter()
                .map(|(topic, pct)| TopicMastery::new(*topic, *pct, 1).unwrap()),
        )
    }

    #[test]
    fn mastery_is_replaced_not_merged() {
        let mut stats = StatsState::default();
        stats.apply_mastery(snapshot(&[("arrays", 40), ("graphs", 10)]));
        stats.apply_mastery(snapshot(&[("arrays", 55)]));

        assert_eq!(stats.mastery().len(), 1);
        assert_eq!(stats.mastery().get("arrays").map(TopicMastery::percent), Some(55));
        assert!(stats.mastery().get("graphs").is_none());
    }

    #[test]
    fn failure_keeps_last_good_snapshot() {
        let mut stats = StatsState::default();
        stats.apply_mastery(snapshot(&[("arrays", 40)]));
        stats.mastery_failed("offline");

        assert_eq!(stats.mastery().len(), 1);
        assert_eq!(stats.mastery_error(), Some("offline"));

        stats.apply_mastery(snapshot(&[("arrays", 41)]));
        assert!(stats.mastery_error().is_none());
    }
}
