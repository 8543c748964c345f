//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Transport-level outcome of a failed gateway call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("session is missing or no longer valid")]
    Unauthorized,
    #[error("operation not permitted for this account")]
    Forbidden,
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, detail: Option<String> },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the server no longer accepts the current token.
    #[must_use]
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True when the server rejected the payload itself rather than failing to serve it.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus {
                status: 400 | 404 | 409 | 422,
                ..
            }
        )
    }

    fn detail(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("your session has expired, please log in again")]
    SessionExpired,
    #[error("you are not logged in")]
    NotAuthenticated,
    #[error("this area requires an admin account")]
    AdminRequired,
}

/// Errors returned by component operations. `Display` is the user-visible message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{message}")]
    Network {
        message: &'static str,
        #[source]
        source: ApiError,
    },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Classify a non-session-ending gateway failure, using `message` when the
    /// server gave no better explanation.
    #[must_use]
    pub fn from_api(source: ApiError, message: &'static str) -> Self {
        if matches!(source, ApiError::Forbidden) {
            return Self::Auth(AuthError::AdminRequired);
        }
        if source.is_rejection() {
            let detail = source.detail().unwrap_or(message).to_string();
            return Self::Validation(detail);
        }
        Self::Network { message, source }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Auth(AuthError::SessionExpired))
    }
}

/// Errors emitted while bootstrapping the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientInitError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
