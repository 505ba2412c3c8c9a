//! Error taxonomy for callback completion
//!
//! Every error raised while completing a callback is categorized here and
//! converted into exactly one [`LogicalAction`] at the engine boundary.

use crate::models::LogicalAction;
use thiserror::Error;

/// Failures of the session store backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be encoded or decoded
    #[error("Session value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by an indirect client while validating a callback
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider-echoed state does not match the stored request state
    #[error("State mismatch: {0}")]
    StateMismatch(String),
    /// The provider reported that authentication was denied or failed
    #[error("Provider denied authentication: {error}")]
    Denied {
        error: String,
        description: Option<String>,
    },
    /// Required callback parameters are missing or unusable
    #[error("Malformed callback: {0}")]
    Malformed(String),
    /// Credentials could not be turned into a user profile
    #[error("Profile creation failed: {0}")]
    Profile(String),
}

/// Categorized failure of one callback invocation
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("No client name in request and no default client configured")]
    MissingClientHint,
    #[error("Unknown client: {0}")]
    UnknownClient(String),
    #[error("State validation failed: {0}")]
    StateValidation(String),
    #[error("Provider denied authentication: {0}")]
    ProviderDenied(String),
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ClientError> for CallbackError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::StateMismatch(msg) => Self::StateValidation(msg),
            ClientError::Denied { error, description } => Self::ProviderDenied(match description {
                Some(description) => format!("{error} ({description})"),
                None => error,
            }),
            ClientError::Malformed(msg) | ClientError::Profile(msg) => Self::MalformedCallback(msg),
        }
    }
}

impl CallbackError {
    /// Whether this failure indicates broken wiring or backend trouble (5xx)
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Storage(_))
    }

    /// Convert into the single logical action the engine returns
    #[must_use]
    pub fn into_action(self) -> LogicalAction {
        let diagnostic = self.to_string();
        match self {
            Self::Configuration(_) | Self::Storage(_) => LogicalAction::internal_error(diagnostic),
            Self::StateValidation(_) => LogicalAction::forbidden(diagnostic),
            Self::MissingClientHint
            | Self::UnknownClient(_)
            | Self::ProviderDenied(_)
            | Self::MalformedCallback(_) => LogicalAction::bad_request(diagnostic),
        }
    }
}
