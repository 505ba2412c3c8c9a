use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome classification of a credential exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Valid,
    Expired,
    Invalid,
}

/// Result of exchanging provider callback parameters with the provider
///
/// The engine treats these as opaque apart from the status; turning them into
/// a profile is the client's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub subject: String,
    pub attributes: Map<String, Value>,
    pub status: CredentialStatus,
}

impl Credentials {
    #[must_use]
    pub fn valid(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            attributes: Map::new(),
            status: CredentialStatus::Valid,
        }
    }

    #[must_use]
    pub fn expired(subject: impl Into<String>) -> Self {
        Self {
            status: CredentialStatus::Expired,
            ..Self::valid(subject)
        }
    }

    #[must_use]
    pub fn invalid(subject: impl Into<String>) -> Self {
        Self {
            status: CredentialStatus::Invalid,
            ..Self::valid(subject)
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == CredentialStatus::Valid
    }
}
