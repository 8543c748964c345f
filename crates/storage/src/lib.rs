#![forbid(unsafe_code)]

pub mod credentials;
pub mod repository;
pub mod sqlite;

pub use credentials::{CredentialStore, StoredCredentials, TOKEN_KEY, USER_KEY};
pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};
