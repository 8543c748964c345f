use std::fmt;
use std::str::FromStr;

use super::Session;

/// The mutually exclusive top-level surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Quiz,
    History,
    Admin,
}

/// Data a view reloads when it is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Mastery,
    History,
    AdminListing,
    /// Fetch a question only if the practice loop has none in play.
    QuestionIfIdle,
}

impl View {
    #[must_use]
    pub fn entry_refreshes(self) -> &'static [Refresh] {
        match self {
            Self::Quiz => &[Refresh::Mastery, Refresh::QuestionIfIdle],
            Self::History => &[Refresh::Mastery, Refresh::History],
            Self::Admin => &[Refresh::AdminListing],
        }
    }

    /// What a manual "refresh" reloads; never replaces a question in play.
    #[must_use]
    pub fn manual_refreshes(self) -> &'static [Refresh] {
        match self {
            Self::Quiz => &[Refresh::Mastery],
            Self::History => &[Refresh::Mastery, Refresh::History],
            Self::Admin => &[Refresh::AdminListing],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::History => "history",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownView(pub String);

impl fmt::Display for UnknownView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown view: {}", self.0)
    }
}

impl std::error::Error for UnknownView {}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiz" | "practice" => Ok(Self::Quiz),
            "history" => Ok(Self::History),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRejection {
    NotAuthenticated,
    AdminRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Entered(View),
    Rejected(RouteRejection),
}

/// Holds the active view. Rejected transitions leave it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRouter {
    active: View,
}

impl ViewRouter {
    #[must_use]
    pub fn active(&self) -> View {
        self.active
    }

    pub fn navigate(&mut self, target: View, session: &Session) -> Navigation {
        let Some(user) = session.user() else {
            return Navigation::Rejected(RouteRejection::NotAuthenticated);
        };
        if target == View::Admin && !user.is_admin() {
            return Navigation::Rejected(RouteRejection::AdminRequired);
        }
        self.active = target;
        Navigation::Entered(target)
    }

    pub fn reset(&mut self) {
        self.active = View::default();
    }
}
