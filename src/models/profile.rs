//! User profiles and the session-scoped profile collection

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identity attributes of an authenticated subject, tagged with the client
/// that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub client_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: client_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Ordered collection of profiles, at most one per client name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet(Vec<UserProfile>);

impl ProfileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn singleton(profile: UserProfile) -> Self {
        Self(vec![profile])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find the profile produced by the given client
    #[must_use]
    pub fn get(&self, client_name: &str) -> Option<&UserProfile> {
        self.0.iter().find(|p| p.client_name == client_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProfile> {
        self.0.iter()
    }

    /// Replace the entry sharing the profile's client name, or append it
    pub fn upsert(&mut self, profile: UserProfile) {
        match self
            .0
            .iter_mut()
            .find(|existing| existing.client_name == profile.client_name)
        {
            Some(slot) => *slot = profile,
            None => self.0.push(profile),
        }
    }
}
