use quiz_core::model::{
    AdminListing, NoteDraft, NoteRecord, QuestionDraft, QuestionRecord, UserId, UserRecord,
};

use crate::context::{ClientContext, Delivery};
use crate::error::{ApiError, AuthError, ClientError};
use crate::state::Ticket;

const LIST_FAILED: &str = "Could not load admin records.";
const CREATE_QUESTION_FAILED: &str = "Could not create the question.";
const CREATE_NOTE_FAILED: &str = "Could not create the note.";
const SET_ADMIN_FAILED: &str = "Could not update the user.";

/// Question, note, and user management. Only usable while an admin has the
/// admin view open.
#[derive(Clone)]
pub struct AdminService {
    ctx: ClientContext,
}

impl AdminService {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Reload questions, notes, and users in parallel and replace the cache.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the admin view is not open or any read fails.
    pub async fn list_all(&self) -> Result<Delivery, ClientError> {
        let ticket = self.admin_ticket()?;
        self.list_all_with(ticket).await
    }

    pub(crate) async fn list_all_with(&self, ticket: Ticket) -> Result<Delivery, ClientError> {
        let api = self.ctx.api();
        let token = &ticket.token;
        let listed = tokio::try_join!(
            api.list_questions(token),
            api.list_notes(token),
            api.list_users(token),
        );

        match listed {
            Ok((questions, notes, users)) => {
                let listing = AdminListing {
                    questions,
                    notes,
                    users,
                };
                Ok(self
                    .ctx
                    .apply(&ticket, |state| state.admin_mut().apply_listing(listing))
                    .map_or(Delivery::Stale, |()| Delivery::Applied))
            }
            Err(err) => Err(self.fail(&ticket, err, LIST_FAILED).await),
        }
    }

    pub(crate) fn spawn_list_all(&self, ticket: Ticket) {
        let admin = self.clone();
        self.ctx.spawn(async move {
            if let Err(err) = admin.list_all_with(ticket).await {
                tracing::debug!(error = %err, "background admin listing failed");
            }
        });
    }

    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an incomplete draft (no request is
    /// made), or any other `ClientError` if the server call fails.
    pub async fn create_question(
        &self,
        draft: QuestionDraft,
    ) -> Result<QuestionRecord, ClientError> {
        let ticket = self.admin_ticket()?;
        let question = draft
            .validate()
            .map_err(|err| ClientError::Validation(err.to_string()))?;

        match self.ctx.api().create_question(&ticket.token, &question).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "question created");
                self.resync(ticket).await;
                Ok(record)
            }
            Err(err) => Err(self.fail(&ticket, err, CREATE_QUESTION_FAILED).await),
        }
    }

    /// Create a theory note, with its attachment sent as an opaque file part.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an incomplete draft (no request is
    /// made), or any other `ClientError` if the server call fails.
    pub async fn create_note(&self, draft: NoteDraft) -> Result<NoteRecord, ClientError> {
        let ticket = self.admin_ticket()?;
        let note = draft
            .validate()
            .map_err(|err| ClientError::Validation(err.to_string()))?;

        match self.ctx.api().create_note(&ticket.token, &note).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "note created");
                self.resync(ticket).await;
                Ok(record)
            }
            Err(err) => Err(self.fail(&ticket, err, CREATE_NOTE_FAILED).await),
        }
    }

    /// # Errors
    ///
    /// Returns `ClientError` if the admin view is not open or the server rejects the change.
    pub async fn set_user_admin(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<UserRecord, ClientError> {
        let ticket = self.admin_ticket()?;
        match self
            .ctx
            .api()
            .set_user_admin(&ticket.token, user_id, is_admin)
            .await
        {
            Ok(record) => {
                tracing::info!(user = %record.id, is_admin = record.is_admin, "admin flag updated");
                self.resync(ticket).await;
                Ok(record)
            }
            Err(err) => Err(self.fail(&ticket, err, SET_ADMIN_FAILED).await),
        }
    }

    fn admin_ticket(&self) -> Result<Ticket, ClientError> {
        let ticket = self.ctx.ticket()?;
        if !self.ctx.read(|state| state.admin_view_open()) {
            return Err(AuthError::AdminRequired.into());
        }
        Ok(ticket)
    }

    /// Drop the cached listing and reload it. The mutation already succeeded,
    /// so a failed reload is only logged.
    async fn resync(&self, ticket: Ticket) {
        self.ctx.apply(&ticket, |state| state.admin_mut().invalidate());
        if let Err(err) = self.list_all_with(ticket).await {
            tracing::warn!(error = %err, "admin listing resync failed");
        }
    }

    async fn fail(&self, ticket: &Ticket, err: ApiError, message: &'static str) -> ClientError {
        let err = self.ctx.fail(ticket, err, message).await;
        let text = err.to_string();
        self.ctx.apply(ticket, |state| state.admin_mut().failed(text));
        err
    }
}
