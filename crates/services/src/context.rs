//! Shared plumbing for the component services: the state container, the
//! gateway, the credential store, and the background task tracker.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::task::TaskTracker;

use quiz_core::Clock;
use storage::CredentialStore;

use crate::api::QuizApi;
use crate::error::{ApiError, AuthError, ClientError};
use crate::state::{AppState, Ticket};

/// Whether a response made it into the state container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// The session changed while the request was in flight; the response was dropped.
    Stale,
    /// The state machine was not in a phase that accepts this response.
    Ignored,
}

#[derive(Clone)]
pub(crate) struct ClientContext {
    api: Arc<dyn QuizApi>,
    credentials: CredentialStore,
    clock: Clock,
    state: Arc<Mutex<AppState>>,
    tasks: TaskTracker,
}

impl ClientContext {
    pub(crate) fn new(api: Arc<dyn QuizApi>, credentials: CredentialStore, clock: Clock) -> Self {
        Self {
            api,
            credentials,
            clock,
            state: Arc::new(Mutex::new(AppState::default())),
            tasks: TaskTracker::new(),
        }
    }

    pub(crate) fn api(&self) -> &dyn QuizApi {
        self.api.as_ref()
    }

    pub(crate) fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn ticket(&self) -> Result<Ticket, AuthError> {
        self.read(AppState::ticket).ok_or(AuthError::NotAuthenticated)
    }

    /// Run `f` only if `ticket` still belongs to the live session.
    pub(crate) fn apply<R>(&self, ticket: &Ticket, f: impl FnOnce(&mut AppState) -> R) -> Option<R> {
        self.update(|state| {
            if state.accepts(ticket) {
                Some(f(state))
            } else {
                tracing::debug!(epoch = ticket.epoch.value(), "discarding stale response");
                None
            }
        })
    }

    /// Drop the session in memory, then forget the persisted credentials.
    pub(crate) async fn end_session(&self, reason: Option<String>) -> Result<(), ClientError> {
        self.update(|state| {
            state.sign_out();
            state.set_auth_message(reason);
        });
        self.credentials.clear().await?;
        Ok(())
    }

    /// Map a failed call to a `ClientError`. A 401 on a still-current ticket
    /// ends the session the same way `logout` does.
    pub(crate) async fn fail(
        &self,
        ticket: &Ticket,
        err: ApiError,
        message: &'static str,
    ) -> ClientError {
        if !err.invalidates_session() {
            tracing::warn!(error = %err, "{message}");
            return ClientError::from_api(err, message);
        }
        if self.read(|state| state.accepts(ticket)) {
            tracing::info!("server rejected the session token, signing out");
            let reason = Some(AuthError::SessionExpired.to_string());
            if let Err(clear_err) = self.end_session(reason).await {
                tracing::warn!(error = %clear_err, "could not clear stored credentials");
            }
        }
        ClientError::Auth(AuthError::SessionExpired)
    }

    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Wait for every background task spawned so far, including ones they spawn.
    ///
    /// Only one caller may settle at a time: the tracker is reopened when the
    /// first caller finishes, which leaves a concurrent caller's `wait` pending
    /// until the next close. The terminal loop and the tests settle from a
    /// single task.
    pub(crate) async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}
