use quiz_core::model::{HistoryItem, MasterySnapshot};

use crate::context::{ClientContext, Delivery};
use crate::error::ClientError;
use crate::state::Ticket;

const MASTERY_FAILED: &str = "Could not load topic mastery.";
const HISTORY_FAILED: &str = "Could not load history.";

/// Read-through cache of topic mastery and attempt history.
///
/// Both reads return full snapshots, so overlapping refreshes need no
/// sequencing: whichever response lands last wins.
#[derive(Clone)]
pub struct StatsService {
    ctx: ClientContext,
}

impl StatsService {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Fetch topic mastery and replace the cached set wholesale.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or the request fails.
    pub async fn refresh_mastery(&self) -> Result<Delivery, ClientError> {
        let ticket = self.ctx.ticket()?;
        self.refresh_mastery_with(ticket).await
    }

    /// Fetch the attempt history and replace the cached list.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or the request fails.
    pub async fn refresh_history(&self) -> Result<Delivery, ClientError> {
        let ticket = self.ctx.ticket()?;
        self.refresh_history_with(ticket).await
    }

    pub(crate) async fn refresh_mastery_with(&self, ticket: Ticket) -> Result<Delivery, ClientError> {
        match self.ctx.api().topic_mastery(&ticket.token).await {
            Ok(snapshot) => Ok(self.apply_mastery(&ticket, snapshot)),
            Err(err) => {
                let err = self.ctx.fail(&ticket, err, MASTERY_FAILED).await;
                let message = err.to_string();
                self.ctx
                    .apply(&ticket, |state| state.stats_mut().mastery_failed(message));
                Err(err)
            }
        }
    }

    pub(crate) async fn refresh_history_with(&self, ticket: Ticket) -> Result<Delivery, ClientError> {
        match self.ctx.api().history(&ticket.token).await {
            Ok(items) => Ok(self.apply_history(&ticket, items)),
            Err(err) => {
                let err = self.ctx.fail(&ticket, err, HISTORY_FAILED).await;
                let message = err.to_string();
                self.ctx
                    .apply(&ticket, |state| state.stats_mut().history_failed(message));
                Err(err)
            }
        }
    }

    /// Refresh mastery in the background, logging rather than returning failures.
    pub(crate) fn spawn_mastery_refresh(&self, ticket: Ticket) {
        let stats = self.clone();
        self.ctx.spawn(async move {
            if let Err(err) = stats.refresh_mastery_with(ticket).await {
                tracing::debug!(error = %err, "background mastery refresh failed");
            }
        });
    }

    pub(crate) fn spawn_history_refresh(&self, ticket: Ticket) {
        let stats = self.clone();
        self.ctx.spawn(async move {
            if let Err(err) = stats.refresh_history_with(ticket).await {
                tracing::debug!(error = %err, "background history refresh failed");
            }
        });
    }

    fn apply_mastery(&self, ticket: &Ticket, snapshot: MasterySnapshot) -> Delivery {
        let topics = snapshot.len();
        match self
            .ctx
            .apply(ticket, |state| state.stats_mut().apply_mastery(snapshot))
        {
            Some(()) => {
                tracing::debug!(topics, "mastery refreshed");
                Delivery::Applied
            }
            None => Delivery::Stale,
        }
    }

    fn apply_history(&self, ticket: &Ticket, items: Vec<HistoryItem>) -> Delivery {
        let count = items.len();
        match self
            .ctx
            .apply(ticket, |state| state.stats_mut().apply_history(items))
        {
            Some(()) => {
                tracing::debug!(count, "history refreshed");
                Delivery::Applied
            }
            None => Delivery::Stale,
        }
    }
}
