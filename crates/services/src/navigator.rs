use crate::admin_service::AdminService;
use crate::context::ClientContext;
use crate::error::{AuthError, ClientError};
use crate::practice_service::PracticeService;
use crate::state::{Navigation, Refresh, RouteRejection, Ticket, View};
use crate::stats_service::StatsService;

/// Switches the active view and kicks off the data it shows.
///
/// Refreshes run in the background and are never cancelled when the view is
/// left; they are dropped only if the session changed underneath them.
#[derive(Clone)]
pub struct Navigator {
    ctx: ClientContext,
    practice: PracticeService,
    stats: StatsService,
    admin: AdminService,
}

impl Navigator {
    pub(crate) fn new(
        ctx: ClientContext,
        practice: PracticeService,
        stats: StatsService,
        admin: AdminService,
    ) -> Self {
        Self {
            ctx,
            practice,
            stats,
            admin,
        }
    }

    /// Enter `target`. A rejected transition leaves the current view in place.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when anonymous and
    /// `AuthError::AdminRequired` for the admin view without the capability.
    pub fn navigate(&self, target: View) -> Result<View, ClientError> {
        let (navigation, ticket) = self
            .ctx
            .update(|state| (state.navigate(target), state.ticket()));

        match (navigation, ticket) {
            (Navigation::Entered(view), Some(ticket)) => {
                tracing::debug!(%view, "entered view");
                self.run(view.entry_refreshes(), &ticket);
                Ok(view)
            }
            (Navigation::Rejected(RouteRejection::AdminRequired), _) => {
                tracing::debug!(%target, "navigation rejected, admin required");
                Err(AuthError::AdminRequired.into())
            }
            _ => Err(AuthError::NotAuthenticated.into()),
        }
    }

    /// Enter the default view, as after sign-in or a restored session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when anonymous.
    pub fn enter_default(&self) -> Result<View, ClientError> {
        self.navigate(View::default())
    }

    /// Reload what the active view shows without replacing a question in play.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when anonymous.
    pub fn refresh_active(&self) -> Result<View, ClientError> {
        let ticket = self.ctx.ticket()?;
        let view = self.ctx.read(|state| state.active_view());
        self.run(view.manual_refreshes(), &ticket);
        Ok(view)
    }

    fn run(&self, refreshes: &[Refresh], ticket: &Ticket) {
        for refresh in refreshes {
            match refresh {
                Refresh::Mastery => self.stats.spawn_mastery_refresh(ticket.clone()),
                Refresh::History => self.stats.spawn_history_refresh(ticket.clone()),
                Refresh::AdminListing => self.admin.spawn_list_all(ticket.clone()),
                Refresh::QuestionIfIdle => {
                    let practice = self.practice.clone();
                    let ticket = ticket.clone();
                    self.ctx.spawn(async move {
                        if let Err(err) = practice.load_question_if_idle(ticket).await {
                            tracing::debug!(error = %err, "background question fetch failed");
                        }
                    });
                }
            }
        }
    }
}
