//! In-memory client state. Everything here is synchronous; the services
//! mutate it under a short lock and never hold that lock across a request.

mod admin;
mod practice;
mod router;
mod stats;

pub use admin::AdminState;
pub use practice::{Advance, PracticePhase, PracticeState, Scored};
pub use router::{Navigation, Refresh, RouteRejection, UnknownView, View, ViewRouter};
pub use stats::StatsState;

use quiz_core::model::{AccessToken, UserProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        token: AccessToken,
        user: UserProfile,
    },
}

impl Session {
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(user),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token, .. } => Some(token),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(UserProfile::is_admin)
    }
}

/// Bumped on every sign-in and sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Captured when a request starts; a response is applied only while its
/// epoch is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub token: AccessToken,
    pub epoch: SessionEpoch,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    session: Session,
    epoch: SessionEpoch,
    router: ViewRouter,
    practice: PracticeState,
    stats: StatsState,
    admin: AdminState,
    auth_message: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    #[must_use]
    pub fn active_view(&self) -> View {
        self.router.active()
    }

    #[must_use]
    pub fn practice(&self) -> &PracticeState {
        &self.practice
    }

    pub fn practice_mut(&mut self) -> &mut PracticeState {
        &mut self.practice
    }

    #[must_use]
    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsState {
        &mut self.stats
    }

    #[must_use]
    pub fn admin(&self) -> &AdminState {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut AdminState {
        &mut self.admin
    }

    /// Message from the last failed login or signup, or the reason the
    /// session ended.
    #[must_use]
    pub fn auth_message(&self) -> Option<&str> {
        self.auth_message.as_deref()
    }

    pub fn set_auth_message(&mut self, message: Option<String>) {
        self.auth_message = message;
    }

    pub fn sign_in(&mut self, token: AccessToken, user: UserProfile) {
        self.reset_components();
        self.session = Session::Authenticated { token, user };
        self.epoch = self.epoch.next();
        self.auth_message = None;
    }

    pub fn sign_out(&mut self) {
        self.reset_components();
        self.session = Session::Anonymous;
        self.epoch = self.epoch.next();
    }

    /// Replace the profile of the signed-in user, keeping the token.
    /// Losing admin capability while on the admin view drops back to the default view.
    pub fn update_profile(&mut self, profile: UserProfile) -> bool {
        let Session::Authenticated { user, .. } = &mut self.session else {
            return false;
        };
        *user = profile;
        if self.router.active() == View::Admin && !self.session.is_admin() {
            self.router.reset();
            self.admin.reset();
        }
        true
    }

    pub fn navigate(&mut self, target: View) -> Navigation {
        self.router.navigate(target, &self.session)
    }

    #[must_use]
    pub fn ticket(&self) -> Option<Ticket> {
        self.session.token().map(|token| Ticket {
            token: token.clone(),
            epoch: self.epoch,
        })
    }

    #[must_use]
    pub fn accepts(&self, ticket: &Ticket) -> bool {
        self.session.is_authenticated() && ticket.epoch == self.epoch
    }

    #[must_use]
    pub fn admin_view_open(&self) -> bool {
        self.session.is_admin() && self.router.active() == View::Admin
    }

    fn reset_components(&mut self) {
        self.router.reset();
        self.practice.reset();
        self.stats.reset();
        self.admin.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::UserId;

    fn token() -> AccessToken {
        AccessToken::new("tok").unwrap()
    }

    fn signed_in(is_admin: bool) -> AppState {
        let mut state = AppState::default();
        state.sign_in(token(), UserProfile::new(UserId::new(3), "ana", is_admin));
        state
    }

    #[test]
    fn ticket_goes_stale_after_sign_out() {
        let mut state = signed_in(false);
        let ticket = state.ticket().unwrap();
        assert!(state.accepts(&ticket));

        state.sign_out();
        assert!(!state.accepts(&ticket));
        assert!(state.ticket().is_none());
    }

    #[test]
    fn ticket_from_previous_session_is_rejected_after_relogin() {
        let mut state = signed_in(false);
        let old = state.ticket().unwrap();
        state.sign_out();
        state.sign_in(token(), UserProfile::new(UserId::new(3), "ana", false));
        assert!(!state.accepts(&old));
        assert!(state.accepts(&state.ticket().unwrap()));
    }

    #[test]
    fn sign_out_resets_view_and_components() {
        let mut state = signed_in(true);
        state.navigate(View::Admin);
        state.stats_mut().history_failed("x");
        state.sign_out();

        assert_eq!(state.active_view(), View::Quiz);
        assert_eq!(state.stats(), &StatsState::default());
        assert_eq!(state.session(), &Session::Anonymous);
    }

    #[test]
    fn losing_admin_leaves_admin_view() {
        let mut state = signed_in(true);
        assert_eq!(state.navigate(View::Admin), Navigation::Entered(View::Admin));
        assert!(state.admin_view_open());

        state.update_profile(UserProfile::new(UserId::new(3), "ana", false));
        assert_eq!(state.active_view(), View::Quiz);
        assert!(!state.admin_view_open());
    }

    #[test]
    fn profile_update_is_ignored_when_anonymous() {
        let mut state = AppState::default();
        assert!(!state.update_profile(UserProfile::new(UserId::new(1), "x", true)));
        assert!(!state.session().is_authenticated());
    }
}
