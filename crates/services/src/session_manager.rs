use quiz_core::model::UserProfile;
use storage::{StorageError, StoredCredentials};

use crate::api::{AuthGrant, LoginRequest, SignupRequest};
use crate::context::ClientContext;
use crate::error::{ApiError, AuthError, ClientError};
use crate::navigator::Navigator;

const AUTH_UNAVAILABLE: &str = "Could not reach the server. Try again.";
const PROFILE_FAILED: &str = "Could not load your profile.";

/// Owns the anonymous/authenticated lifecycle and keeps the credential store
/// in step with it.
#[derive(Clone)]
pub struct SessionManager {
    ctx: ClientContext,
    navigator: Navigator,
}

impl SessionManager {
    pub(crate) fn new(ctx: ClientContext, navigator: Navigator) -> Self {
        Self { ctx, navigator }
    }

    /// Adopt persisted credentials without asking the server. The first 401
    /// afterwards demotes the session again.
    ///
    /// Returns whether a session was restored. Unreadable credentials are
    /// cleared and the client stays anonymous.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the credential store cannot be read or cleared.
    pub async fn restore(&self) -> Result<bool, ClientError> {
        let stored = match self.ctx.credentials().load().await {
            Ok(stored) => stored,
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(%reason, "stored profile is unreadable, discarding credentials");
                self.ctx.credentials().clear().await?;
                None
            }
            Err(err) => return Err(err.into()),
        };

        let Some(StoredCredentials { token, user }) = stored else {
            tracing::debug!("no stored session");
            return Ok(false);
        };

        tracing::info!(user = user.username(), "restored stored session");
        self.ctx.update(|state| state.sign_in(token, user));
        self.navigator.enter_default()?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for any rejection, whatever the
    /// server's reason, and `ClientError::Network` when the server cannot be reached.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result = self.ctx.api().login(&request).await;
        self.complete_auth(result).await
    }

    /// Register a new account. `admin_code` is forwarded as given; the server
    /// decides whether it grants the admin capability.
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::login`].
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        admin_code: Option<&str>,
    ) -> Result<UserProfile, ClientError> {
        let request = SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
            admin_code: admin_code.map(str::to_string),
        };
        let result = self.ctx.api().signup(&request).await;
        self.complete_auth(result).await
    }

    /// End the session: state first, so in-flight responses are dropped, then
    /// the persisted credentials.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the credential store cannot be cleared.
    pub async fn logout(&self) -> Result<(), ClientError> {
        tracing::info!("signing out");
        self.ctx.end_session(None).await
    }

    /// Re-read the signed-in user from the server and persist the new profile.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no session is active or the request fails.
    pub async fn refresh_profile(&self) -> Result<UserProfile, ClientError> {
        let ticket = self.ctx.ticket()?;
        let user = match self.ctx.api().current_user(&ticket.token).await {
            Ok(user) => user,
            Err(err) => return Err(self.ctx.fail(&ticket, err, PROFILE_FAILED).await),
        };

        let updated = self
            .ctx
            .apply(&ticket, |state| state.update_profile(user.clone()))
            .unwrap_or(false);
        if updated {
            self.ctx
                .credentials()
                .save(&StoredCredentials {
                    token: ticket.token,
                    user: user.clone(),
                })
                .await?;
        }
        Ok(user)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.ctx.read(|state| state.session().user().cloned())
    }

    async fn complete_auth(
        &self,
        result: Result<AuthGrant, ApiError>,
    ) -> Result<UserProfile, ClientError> {
        let grant = match result {
            Ok(grant) => grant,
            Err(err) => {
                let err = classify_auth_failure(err);
                tracing::warn!(error = %err, "authentication failed");
                let message = err.to_string();
                self.ctx.update(|state| state.set_auth_message(Some(message)));
                return Err(err);
            }
        };

        let AuthGrant { token, user } = grant;
        self.ctx
            .credentials()
            .save(&StoredCredentials {
                token: token.clone(),
                user: user.clone(),
            })
            .await?;
        tracing::info!(user = user.username(), admin = user.is_admin(), "signed in");
        self.ctx.update(|state| state.sign_in(token, user.clone()));
        self.navigator.enter_default()?;
        Ok(user)
    }
}

/// Anything the server answers is reported as invalid credentials; only a
/// failure to get an answer at all is a network error.
fn classify_auth_failure(err: ApiError) -> ClientError {
    let unreachable = match &err {
        ApiError::Http(_) | ApiError::Transport(_) | ApiError::Decode(_) => true,
        ApiError::HttpStatus { status, .. } => *status >= 500,
        _ => false,
    };
    if unreachable {
        ClientError::Network {
            message: AUTH_UNAVAILABLE,
            source: err,
        }
    } else {
        AuthError::InvalidCredentials.into()
    }
}
