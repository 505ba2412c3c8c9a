//! In-memory session store backed by a sharded concurrent map

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::store::SessionStore;
use crate::error::StorageError;
use crate::models::SessionId;
use crate::settings::BoomerangSettings;

#[derive(Default)]
struct SessionEntry {
    values: HashMap<String, Value>,
    last_access: DateTime<Utc>,
}

impl SessionEntry {
    fn touch(&mut self) {
        self.last_access = Utc::now();
    }
}

/// Process-local session store
///
/// Each session's map is guarded by its shard lock, so `take` is atomic
/// per session. Cloning shares the same underlying storage.
///
/// With an idle timeout, sessions untouched for longer read as absent and
/// are dropped on the next [`InMemorySessionStore::purge_idle`], which also
/// runs whenever a session is created. Without one, nothing is ever evicted,
/// which only suits tests and short-lived processes.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<SessionId, SessionEntry>>,
    idle_timeout: Option<Duration>,
}

impl InMemorySessionStore {
    /// Store without eviction
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store evicting sessions idle for longer than `idle_timeout`
    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout: Some(idle_timeout),
        }
    }

    /// Store whose idle timeout is the configured session duration
    #[must_use]
    pub fn from_settings(settings: &BoomerangSettings) -> Self {
        let hours = i64::try_from(settings.session.session_duration_hours).unwrap_or(i64::MAX);
        Self::with_idle_timeout(Duration::try_hours(hours).unwrap_or(Duration::MAX))
    }

    /// Number of stored sessions, idle ones not yet purged included
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn contains_session(&self, session: &SessionId) -> bool {
        self.sessions
            .get(session)
            .is_some_and(|entry| !self.is_idle(&entry))
    }

    /// Snapshot of all keys stored for a session
    #[must_use]
    pub fn keys(&self, session: &SessionId) -> Vec<String> {
        self.sessions
            .get(session)
            .filter(|entry| !self.is_idle(entry))
            .map(|entry| entry.values.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every idle session and return how many were removed
    pub fn purge_idle(&self) -> usize {
        if self.idle_timeout.is_none() {
            return 0;
        }
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !self.is_idle(entry));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            log::debug!("Purged {purged} idle session(s)");
        }
        purged
    }

    fn is_idle(&self, entry: &SessionEntry) -> bool {
        self.idle_timeout.is_some_and(|timeout| {
            entry
                .last_access
                .checked_add_signed(timeout)
                .is_some_and(|deadline| Utc::now() >= deadline)
        })
    }

    fn generate_id() -> SessionId {
        SessionId::new(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self) -> Result<SessionId, StorageError> {
        self.purge_idle();
        let id = Self::generate_id();
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                values: HashMap::new(),
                last_access: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.sessions.get_mut(session).and_then(|mut entry| {
            if self.is_idle(&entry) {
                return None;
            }
            entry.touch();
            entry.values.get(key).cloned()
        }))
    }

    async fn set(&self, session: &SessionId, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entry = self.sessions.entry(session.clone()).or_default();
        // An idle session starts over instead of resurrecting old values
        if self.is_idle(&entry) {
            entry.values.clear();
        }
        entry.touch();
        entry.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, session: &SessionId, key: &str) -> Result<(), StorageError> {
        if let Some(mut entry) = self.sessions.get_mut(session) {
            entry.values.remove(key);
        }
        Ok(())
    }

    async fn take(&self, session: &SessionId, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.sessions.get_mut(session).and_then(|mut entry| {
            if self.is_idle(&entry) {
                return None;
            }
            entry.touch();
            entry.values.remove(key)
        }))
    }

    async fn renew_session(&self, session: &SessionId) -> Result<SessionId, StorageError> {
        let values = self
            .sessions
            .remove(session)
            .filter(|(_, entry)| !self.is_idle(entry))
            .map(|(_, entry)| entry.values)
            .unwrap_or_default();
        let renewed = Self::generate_id();
        self.sessions.insert(
            renewed.clone(),
            SessionEntry {
                values,
                last_access: Utc::now(),
            },
        );
        log::debug!("Renewed session {session} as {renewed}");
        Ok(renewed)
    }
}
