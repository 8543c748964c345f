use crate::context::{ClientContext, Delivery};
use crate::error::ClientError;
use crate::state::{Advance, Scored, Ticket};
use crate::stats_service::StatsService;

const FETCH_FAILED: &str = "Could not load a question. Try again.";
const SUBMIT_FAILED: &str = "Could not submit your answer. Try again.";

/// What became of a `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Scored(Scored),
    /// No question was presented, or a submission was already in flight.
    Ignored,
    /// The session ended while the answer was being scored.
    Stale,
}

/// Drives the question, answer, and feedback cycle against the scoring endpoint.
#[derive(Clone)]
pub struct PracticeService {
    ctx: ClientContext,
    stats: StatsService,
}

impl PracticeService {
    pub(crate) fn new(ctx: ClientContext, stats: StatsService) -> Self {
        Self { ctx, stats }
    }

    /// Fetch a fresh question, discarding any feedback and typed answer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or the request fails.
    pub async fn load_question(&self) -> Result<Delivery, ClientError> {
        let ticket = self.ctx.ticket()?;
        let started = self
            .ctx
            .apply(&ticket, |state| state.practice_mut().begin_fetch())
            .unwrap_or(false);
        if !started {
            return Ok(Delivery::Ignored);
        }
        self.fetch(ticket).await
    }

    /// Fetch a question only when the loop has nothing in play.
    pub(crate) async fn load_question_if_idle(&self, ticket: Ticket) -> Result<Delivery, ClientError> {
        let started = self
            .ctx
            .apply(&ticket, |state| state.practice_mut().begin_fetch_if_idle())
            .unwrap_or(false);
        if !started {
            return Ok(Delivery::Ignored);
        }
        self.fetch(ticket).await
    }

    /// Replace the typed answer. Ignored unless a question is presented.
    pub fn set_answer(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.ctx.update(|state| state.practice_mut().set_answer(text))
    }

    /// Send the typed answer for scoring. Repeated calls while a submission is
    /// outstanding are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or scoring fails. On a
    /// scoring failure the question and typed answer stay in place.
    pub async fn submit(&self) -> Result<SubmitOutcome, ClientError> {
        let ticket = self.ctx.ticket()?;
        let clock = *self.ctx.clock();
        let Some(submission) = self
            .ctx
            .apply(&ticket, |state| state.practice_mut().begin_submit(&clock))
            .flatten()
        else {
            tracing::debug!("submit ignored, no question presented");
            return Ok(SubmitOutcome::Ignored);
        };

        tracing::debug!(
            question = %submission.question_id,
            seconds = submission.time_taken_seconds,
            "submitting answer"
        );
        match self.ctx.api().submit_answer(&ticket.token, &submission).await {
            Ok(feedback) => {
                let scored = self
                    .ctx
                    .apply(&ticket, |state| state.practice_mut().submit_succeeded(feedback));
                match scored {
                    Some(Some(scored)) => {
                        if scored.drift_alert {
                            tracing::info!("skill drift reported for this answer");
                        }
                        self.stats.spawn_mastery_refresh(ticket);
                        Ok(SubmitOutcome::Scored(scored))
                    }
                    Some(None) => Ok(SubmitOutcome::Ignored),
                    None => Ok(SubmitOutcome::Stale),
                }
            }
            Err(err) => {
                let err = self.ctx.fail(&ticket, err, SUBMIT_FAILED).await;
                let message = err.to_string();
                self.ctx
                    .apply(&ticket, |state| state.practice_mut().submit_failed(message));
                Err(err)
            }
        }
    }

    /// Move past the shown feedback. Uses the question bundled with the
    /// feedback when there is one and only fetches when there is not.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or the fallback fetch fails.
    pub async fn next_question(&self) -> Result<Advance, ClientError> {
        let ticket = self.ctx.ticket()?;
        let now = self.ctx.clock().now();
        let advance = self
            .ctx
            .apply(&ticket, |state| state.practice_mut().advance(now))
            .unwrap_or(Advance::Ignored);

        if advance == Advance::FetchRequired {
            tracing::debug!("feedback carried no next question, fetching one");
            self.fetch(ticket).await?;
        }
        Ok(advance)
    }

    async fn fetch(&self, ticket: Ticket) -> Result<Delivery, ClientError> {
        match self.ctx.api().next_question(&ticket.token).await {
            Ok(question) => {
                let now = self.ctx.clock().now();
                let applied = self
                    .ctx
                    .apply(&ticket, |state| state.practice_mut().fetch_succeeded(question, now));
                Ok(match applied {
                    Some(true) => Delivery::Applied,
                    Some(false) => Delivery::Ignored,
                    None => Delivery::Stale,
                })
            }
            Err(err) => {
                let err = self.ctx.fail(&ticket, err, FETCH_FAILED).await;
                let message = err.to_string();
                self.ctx
                    .apply(&ticket, |state| state.practice_mut().fetch_failed(message));
                Err(err)
            }
        }
    }
}
