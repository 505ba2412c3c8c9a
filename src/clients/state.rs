//! Request state: the single-use correlation data guarding a callback
//!
//! A client issues a [`RequestState`] right before redirecting the browser to
//! its provider and stores it in the session under the client's state key.
//! The callback engine takes it back out exactly once.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::models::SessionId;
use crate::session::store::{set_typed, state_key, take_typed, SessionStore};
use crate::utils::crypto::generate_state_token;

/// Default lifetime of an issued request state, in seconds
pub const DEFAULT_STATE_TTL_SECONDS: i64 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestState {
    /// Random token echoed back by the provider (OAuth `state`, SAML `RelayState`)
    pub token: String,
    /// URL the user originally asked for before being sent to log in
    pub requested_url: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Protocol-specific extras such as a nonce or PKCE verifier
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl RequestState {
    /// Issue a fresh state with a random token
    ///
    /// A lifetime reaching past the representable range saturates.
    #[must_use]
    pub fn issue(requested_url: Option<String>, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            token: generate_state_token(),
            requested_url,
            issued_at,
            expires_at: issued_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Compare a provider-echoed token with the stored one in constant time
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        let expected = self.token.as_bytes();
        let received = received.as_bytes();
        if expected.len() != received.len() {
            return false;
        }
        expected
            .iter()
            .zip(received)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Store a request state for a client, replacing any earlier one
///
/// # Errors
///
/// Returns an error if the session store write fails
pub async fn save_request_state(
    store: &dyn SessionStore,
    session: &SessionId,
    client_name: &str,
    state: &RequestState,
) -> Result<(), StorageError> {
    set_typed(store, session, &state_key(client_name), state).await
}

/// Atomically take a client's request state out of the session
///
/// # Errors
///
/// Returns an error if the session store fails or holds an unreadable state
pub async fn consume_request_state(
    store: &dyn SessionStore,
    session: &SessionId,
    client_name: &str,
) -> Result<Option<RequestState>, StorageError> {
    take_typed(store, session, &state_key(client_name)).await
}
