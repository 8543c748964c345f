use std::sync::Arc;

use quiz_core::Clock;
use storage::{CredentialStore, Storage};

use crate::admin_service::AdminService;
use crate::api::{HttpQuizApi, QuizApi};
use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::error::ClientInitError;
use crate::navigator::Navigator;
use crate::practice_service::PracticeService;
use crate::session_manager::SessionManager;
use crate::state::AppState;
use crate::stats_service::StatsService;

/// Assembles the component services around one shared state container.
#[derive(Clone)]
pub struct QuizClient {
    ctx: ClientContext,
    session: SessionManager,
    navigator: Navigator,
    practice: PracticeService,
    stats: StatsService,
    admin: AdminService,
}

impl QuizClient {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, credentials: CredentialStore, clock: Clock) -> Self {
        let ctx = ClientContext::new(api, credentials, clock);
        let stats = StatsService::new(ctx.clone());
        let admin = AdminService::new(ctx.clone());
        let practice = PracticeService::new(ctx.clone(), stats.clone());
        let navigator = Navigator::new(ctx.clone(), practice.clone(), stats.clone(), admin.clone());
        let session = SessionManager::new(ctx.clone(), navigator.clone());

        Self {
            ctx,
            session,
            navigator,
            practice,
            stats,
            admin,
        }
    }

    /// Build a client talking HTTP to the configured backend, with credentials
    /// persisted in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `ClientInitError` if the HTTP client cannot be built or the
    /// credential database cannot be opened.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, ClientInitError> {
        let api: Arc<dyn QuizApi> = Arc::new(HttpQuizApi::new(config)?);
        let storage = Storage::sqlite(&config.credentials_db).await?;
        let credentials = CredentialStore::new(Arc::clone(&storage.kv));
        Ok(Self::new(api, credentials, Clock::default_clock()))
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn practice(&self) -> &PracticeService {
        &self.practice
    }

    #[must_use]
    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    #[must_use]
    pub fn admin(&self) -> &AdminService {
        &self.admin
    }

    /// A copy of the current state, for rendering or assertions.
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.ctx.read(Clone::clone)
    }

    /// Wait until all background refreshes have finished.
    ///
    /// Must not be called from several tasks at once.
    pub async fn settle(&self) {
        self.ctx.settle().await;
    }
}
