//! Mock objects and fake implementations for testing
//!
//! [`MockClient`] behaves like an authorization-code client whose token
//! exchange always succeeds with a scripted credential status.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::constants::{TEST_EMAIL, TEST_SUBJECT};
use crate::clients::{IndirectClient, RequestState};
use crate::error::{ClientError, StorageError};
use crate::models::{CallbackRequest, Credentials, SessionId};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::validation::CallbackValidator;

/// Credential status the mocked token exchange yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    Valid,
    Expired,
    Invalid,
}

/// Scriptable indirect client
pub struct MockClient {
    name: String,
    outcome: MockOutcome,
    subject: String,
    failure_redirect: Option<String>,
    validations: AtomicUsize,
    renewals: Mutex<Vec<(SessionId, SessionId)>>,
}

impl MockClient {
    /// Client returning valid credentials for [`TEST_SUBJECT`]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: MockOutcome::Valid,
            subject: TEST_SUBJECT.to_string(),
            failure_redirect: None,
            validations: AtomicUsize::new(0),
            renewals: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a shared default client
    #[must_use]
    pub fn shared(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: MockOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Redirect the browser to `location` instead of failing on client errors
    #[must_use]
    pub fn with_failure_redirect(mut self, location: &str) -> Self {
        self.failure_redirect = Some(location.to_string());
        self
    }

    /// Number of times the provider callback was validated
    #[must_use]
    pub fn validation_count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    /// Session rotations this client was notified about
    ///
    /// # Panics
    ///
    /// Panics if the renewal log mutex was poisoned.
    #[must_use]
    pub fn renewals(&self) -> Vec<(SessionId, SessionId)> {
        self.renewals.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndirectClient for MockClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate_callback(
        &self,
        request: &CallbackRequest,
        state: &RequestState,
    ) -> Result<Credentials, ClientError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        let validated = CallbackValidator::validate_and_extract(request, state)?;

        let credentials = match self.outcome {
            MockOutcome::Valid => Credentials::valid(&self.subject),
            MockOutcome::Expired => Credentials::expired(&self.subject),
            MockOutcome::Invalid => Credentials::invalid(&self.subject),
        };
        Ok(credentials
            .with_attribute("email", TEST_EMAIL)
            .with_attribute("code", validated.code))
    }

    fn failure_redirect_url(&self, _error: &ClientError) -> Option<String> {
        self.failure_redirect.clone()
    }

    async fn on_session_renewed(&self, old: &SessionId, new: &SessionId) {
        if let Ok(mut renewals) = self.renewals.lock() {
            renewals.push((old.clone(), new.clone()));
        }
    }
}

/// Session store whose writes always fail
///
/// Reads go to an in-memory store (seed it through [`FailingSessionStore::inner`])
/// unless the store was created with [`FailingSessionStore::unavailable`].
#[derive(Clone, Default)]
pub struct FailingSessionStore {
    inner: InMemorySessionStore,
    fail_reads: bool,
}

impl FailingSessionStore {
    /// Store that rejects writes but serves reads
    #[must_use]
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Store that rejects every operation
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            fail_reads: true,
        }
    }

    /// Backing store used for reads
    #[must_use]
    pub fn inner(&self) -> &InMemorySessionStore {
        &self.inner
    }

    fn outage() -> StorageError {
        StorageError::Unavailable("simulated backend outage".to_string())
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads {
            Err(Self::outage())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn create_session(&self) -> Result<SessionId, StorageError> {
        Err(Self::outage())
    }

    async fn get(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError> {
        self.check_reads()?;
        self.inner.get(session, key).await
    }

    async fn set(&self, _session: &SessionId, _key: &str, _value: Value) -> Result<(), StorageError> {
        Err(Self::outage())
    }

    async fn delete(&self, session: &SessionId, key: &str) -> Result<(), StorageError> {
        self.check_reads()?;
        self.inner.delete(session, key).await
    }

    async fn take(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError> {
        self.check_reads()?;
        self.inner.take(session, key).await
    }

    async fn renew_session(&self, _session: &SessionId) -> Result<SessionId, StorageError> {
        Err(Self::outage())
    }
}
