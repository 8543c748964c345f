use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::UserId;

/// Bearer token issued by the backend on login or signup.
///
/// The value is opaque to the client. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token, returning `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Identity of the signed-in user as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    username: String,
    is_admin: bool,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            username: username.into(),
            is_admin,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the account carries the admin capability.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_rejected() {
        assert!(AccessToken::new("   ").is_none());
        assert!(AccessToken::new("").is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("secret-value").unwrap();
        let printed = format!("{token:?}");
        assert!(!printed.contains("secret-value"));
    }

    #[test]
    fn profile_serializes_with_snake_case_keys() {
        let profile = UserProfile::new(UserId::new(3), "ada", true);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["username"], "ada");
        assert_eq!(json["is_admin"], true);
    }
}
