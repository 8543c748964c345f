//! The persisted-credential contract: exactly two keys, written together on
//! authentication, cleared together on logout, read once at startup.

use std::sync::Arc;

use quiz_core::model::{AccessToken, UserProfile};

use crate::repository::{KeyValueStore, StorageError};

pub const TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user_profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: AccessToken,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read persisted credentials.
    ///
    /// Returns `Ok(None)` unless both keys are present and the token is non-blank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored profile cannot be decoded,
    /// or other storage errors from the backend.
    pub async fn load(&self) -> Result<Option<StoredCredentials>, StorageError> {
        let token = self.kv.get(TOKEN_KEY).await?;
        let user = self.kv.get(USER_KEY).await?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };
        let Some(token) = AccessToken::new(token) else {
            return Ok(None);
        };
        let user: UserProfile = serde_json::from_str(&user)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredCredentials { token, user }))
    }

    /// Persist token and profile together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be encoded or the write fails.
    pub async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        let user = serde_json::to_string(&credentials.user)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv
            .put_all(&[(TOKEN_KEY, credentials.token.as_str()), (USER_KEY, &user)])
            .await
    }

    /// Remove both keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove_all(&[TOKEN_KEY, USER_KEY]).await
    }
}
