//! Session store abstraction
//!
//! Values are stored as JSON so any backend (memory, Redis, SQL) can hold
//! them without knowing the engine's types.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::models::SessionId;

/// Session key holding the serialized profile set
pub const PROFILES_KEY: &str = "boomerang.profiles";

/// Prefix of the per-client request-state keys
const STATE_KEY_PREFIX: &str = "boomerang.state.";

/// Session key holding the request state issued for a client
#[must_use]
pub fn state_key(client_name: &str) -> String {
    format!("{STATE_KEY_PREFIX}{}", client_name.to_lowercase())
}

/// Key/value storage scoped by session identifier
///
/// Implementations must make [`SessionStore::take`] atomic per session key:
/// when two callers race on the same key, at most one of them receives the
/// value. Backend outages are reported as [`StorageError`], never swallowed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an empty session and return its identifier
    async fn create_session(&self) -> Result<SessionId, StorageError>;

    /// Read a value, `None` when the session or key does not exist
    async fn get(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, creating the session if needed
    async fn set(&self, session: &SessionId, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove a value if present
    async fn delete(&self, session: &SessionId, key: &str) -> Result<(), StorageError>;

    /// Atomically read and remove a value
    async fn take(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError>;

    /// Move all values of a session under a freshly generated identifier
    ///
    /// The old identifier no longer resolves afterwards.
    async fn renew_session(&self, session: &SessionId) -> Result<SessionId, StorageError>;
}

/// Read and deserialize a value
///
/// # Errors
///
/// Returns an error if the backend fails or the stored value does not match `T`
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn SessionStore,
    session: &SessionId,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(session, key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and write a value
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails
pub async fn set_typed<T: Serialize>(
    store: &dyn SessionStore,
    session: &SessionId,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(value)?;
    store.set(session, key, value).await
}

/// Atomically read, remove and deserialize a value
///
/// # Errors
///
/// Returns an error if the backend fails or the stored value does not match `T`
pub async fn take_typed<T: DeserializeOwned>(
    store: &dyn SessionStore,
    session: &SessionId,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.take(session, key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_is_case_insensitive() {
        assert_eq!(state_key("GitHub"), "boomerang.state.github");
        assert_eq!(state_key("github"), state_key("GITHUB"));
    }
}
