//! Capability interface implemented once per supported protocol
//!
//! OAuth, OIDC, SAML or CAS clients each implement [`IndirectClient`]; the
//! callback engine never looks past this trait.

use async_trait::async_trait;

use super::state::RequestState;
use crate::error::ClientError;
use crate::models::{CallbackRequest, Credentials, SessionId, UserProfile};

/// An identity provider reached through a browser round-trip
#[async_trait]
pub trait IndirectClient: Send + Sync {
    /// Unique client name, also used to tag produced profiles
    fn name(&self) -> &str;

    /// Validate the provider callback against the consumed request state
    /// and exchange its parameters for credentials
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider-echoed state does not match `state`
    /// - The provider reported a denial
    /// - Required callback parameters are missing or malformed
    async fn validate_callback(
        &self,
        request: &CallbackRequest,
        state: &RequestState,
    ) -> Result<Credentials, ClientError>;

    /// Turn verified credentials into a user profile
    ///
    /// The default copies the subject and every credential attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be mapped to a profile
    async fn build_profile(&self, credentials: &Credentials) -> Result<UserProfile, ClientError> {
        let mut profile = UserProfile::new(credentials.subject.clone(), self.name());
        for (name, value) in &credentials.attributes {
            profile.attributes.insert(name.clone(), value.clone());
        }
        Ok(profile)
    }

    /// Where to send the browser when the provider denied authentication
    ///
    /// `None` keeps the default bad-request outcome.
    fn failure_redirect_url(&self, _error: &ClientError) -> Option<String> {
        None
    }

    /// Called after the session identifier was rotated
    ///
    /// Clients that index server-side data by session id (for instance SAML
    /// logout correlation) can re-key it here.
    async fn on_session_renewed(&self, _old: &SessionId, _new: &SessionId) {}
}
