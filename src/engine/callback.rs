//! Callback completion algorithm
//!
//! The step order is load-bearing: request state is consumed before the
//! profile is built, and the profile is written before the session is
//! renewed. The redirect target is resolved before renewal so that a
//! configuration failure never leaves the browser holding a dead session id.

use log::debug;

use crate::actions::ActionAdapter;
use crate::clients::{consume_request_state, IndirectClient, RequestState};
use crate::config::{CallbackOptions, Config, EffectiveOptions};
use crate::error::{CallbackError, ClientError};
use crate::models::{
    CallbackRequest, CredentialStatus, Credentials, LogicalAction, RedirectAction, SessionId,
    UserProfile,
};
use crate::profile::ProfileManager;
use crate::utils::logging::LoggingHelper;
use crate::validation::validate_post_auth_redirect;

/// Stateless callback completion engine
///
/// Holds no data of its own: everything comes from the request, the
/// explicitly passed [`Config`] and the call-site [`CallbackOptions`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CallbackLogic;

impl CallbackLogic {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Complete a callback and render the outcome through `adapter`
    pub async fn perform<A: ActionAdapter>(
        &self,
        request: &CallbackRequest,
        config: Option<&Config>,
        adapter: &A,
        options: &CallbackOptions,
    ) -> A::Output {
        let action = self.execute(request, config, options).await;
        adapter.adapt(action)
    }

    /// Complete a callback and return the logical action
    ///
    /// Every failure is categorized and converted here; nothing escapes
    /// uncategorized.
    pub async fn execute(
        &self,
        request: &CallbackRequest,
        config: Option<&Config>,
        options: &CallbackOptions,
    ) -> LogicalAction {
        match Self::complete(request, config, options).await {
            Ok(action) => action,
            Err(error) => {
                LoggingHelper::log_callback_failure(&error);
                error.into_action()
            }
        }
    }

    async fn complete(
        request: &CallbackRequest,
        config: Option<&Config>,
        options: &CallbackOptions,
    ) -> Result<LogicalAction, CallbackError> {
        // Step 1: configuration must exist before anything touches a provider
        let config = config.ok_or_else(|| {
            CallbackError::Configuration("no configuration supplied to callback".to_string())
        })?;
        let effective = options.resolve(config.defaults());
        debug!("Callback policy: {effective:?}");

        // Steps 2-3: pick the client
        let client_name = Self::client_name(request, config, &effective)?;
        let client = config.clients().resolve(&client_name)?;
        LoggingHelper::log_callback_received(client.name(), request.session_id());

        // Step 4: consume the request state, then let the client validate
        let session = request.session_id().ok_or_else(|| {
            CallbackError::StateValidation("callback carries no session".to_string())
        })?;
        let state = Self::consume_state(config, session, client.as_ref()).await?;
        let credentials = match client.validate_callback(request, &state).await {
            Ok(credentials) => credentials,
            Err(error) => return Self::client_failure(client.as_ref(), error),
        };
        Self::check_credentials(&credentials)?;

        // Step 5: build the profile
        let profile = ProfileManager::build(client.as_ref(), &credentials).await?;

        // Step 6: persist according to policy
        if effective.save_in_session {
            let stored = ProfileManager::new(config.session_store())
                .store_profile(session, profile.clone(), effective.multi_profile)
                .await?;
            LoggingHelper::log_profile_saved(client.name(), &profile.id, stored.len());
        }

        // Step 7: compute the redirect target while the old session still resolves
        let location =
            Self::redirect_target(state.requested_url.as_deref(), effective.default_url.as_deref())?;

        // Step 8: rotate the session id only once the profile write returned
        let renewed_session = if effective.renew_session {
            Some(Self::renew_session(config, session, client.as_ref()).await?)
        } else {
            None
        };
        LoggingHelper::log_callback_completed(client.name(), &location);

        // Step 9
        Ok(LogicalAction::Redirect(RedirectAction {
            location,
            renewed_session,
            profile: Self::stateless_profile(&effective, profile),
        }))
    }

    /// Request hint first, then the effective default client
    fn client_name(
        request: &CallbackRequest,
        config: &Config,
        effective: &EffectiveOptions,
    ) -> Result<String, CallbackError> {
        request
            .client_hint(config.clients().client_name_parameter())
            .map(ToString::to_string)
            .or_else(|| effective.default_client.clone())
            .ok_or(CallbackError::MissingClientHint)
    }

    /// Take the state out of the session, whatever happens next
    async fn consume_state(
        config: &Config,
        session: &SessionId,
        client: &dyn IndirectClient,
    ) -> Result<RequestState, CallbackError> {
        let state = consume_request_state(config.session_store(), session, client.name())
            .await?
            .ok_or_else(|| {
                CallbackError::StateValidation(format!(
                    "no request state for client '{}' (missing or already used)",
                    client.name()
                ))
            })?;

        if state.is_expired() {
            return Err(CallbackError::StateValidation(format!(
                "request state for client '{}' expired at {}",
                client.name(),
                state.expires_at
            )));
        }
        Ok(state)
    }

    /// Provider denials may be turned into a client redirect; every other
    /// client error, state mismatch included, keeps its category
    fn client_failure(
        client: &dyn IndirectClient,
        error: ClientError,
    ) -> Result<LogicalAction, CallbackError> {
        if matches!(error, ClientError::Denied { .. }) {
            if let Some(location) = client.failure_redirect_url(&error) {
                LoggingHelper::log_client_failure_redirect(client.name(), &error, &location);
                return Ok(LogicalAction::redirect(location));
            }
        }
        Err(error.into())
    }

    fn check_credentials(credentials: &Credentials) -> Result<(), CallbackError> {
        match credentials.status {
            CredentialStatus::Valid => Ok(()),
            CredentialStatus::Expired => Err(CallbackError::StateValidation(
                "provider returned expired credentials".to_string(),
            )),
            CredentialStatus::Invalid => Err(CallbackError::MalformedCallback(
                "provider returned invalid credentials".to_string(),
            )),
        }
    }

    async fn renew_session(
        config: &Config,
        session: &SessionId,
        client: &dyn IndirectClient,
    ) -> Result<SessionId, CallbackError> {
        let renewed = config.session_store().renew_session(session).await?;
        client.on_session_renewed(session, &renewed).await;
        LoggingHelper::log_session_renewed(client.name());
        Ok(renewed)
    }

    /// Saved requested URL if it is safe, else the default URL
    fn redirect_target(
        requested_url: Option<&str>,
        default_url: Option<&str>,
    ) -> Result<String, CallbackError> {
        if let Some(requested) = requested_url.filter(|url| !url.trim().is_empty()) {
            match validate_post_auth_redirect(requested) {
                Ok(valid) => return Ok(valid),
                Err(e) => log::warn!("Ignoring saved requested URL: {e}"),
            }
        }

        default_url.map(ToString::to_string).ok_or_else(|| {
            CallbackError::Configuration("no redirect target: set a default URL".to_string())
        })
    }

    fn stateless_profile(effective: &EffectiveOptions, profile: UserProfile) -> Option<UserProfile> {
        if effective.save_in_session {
            None
        } else {
            Some(profile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClient;

    #[test]
    fn test_redirect_target_prefers_saved_url() {
        assert_eq!(
            CallbackLogic::redirect_target(Some("/dashboard"), Some("/home")).unwrap(),
            "/dashboard"
        );
        assert_eq!(
            CallbackLogic::redirect_target(None, Some("/home")).unwrap(),
            "/home"
        );
    }

    #[test]
    fn test_unsafe_saved_url_falls_back_to_default() {
        assert_eq!(
            CallbackLogic::redirect_target(Some("javascript:alert(1)"), Some("/home")).unwrap(),
            "/home"
        );
    }

    #[test]
    fn test_no_target_is_configuration_error() {
        assert!(matches!(
            CallbackLogic::redirect_target(None, None),
            Err(CallbackError::Configuration(_))
        ));
        assert!(matches!(
            CallbackLogic::redirect_target(Some("  "), None),
            Err(CallbackError::Configuration(_))
        ));
    }

    #[test]
    fn test_credential_status_mapping() {
        assert!(CallbackLogic::check_credentials(&Credentials::valid("a")).is_ok());
        assert!(matches!(
            CallbackLogic::check_credentials(&Credentials::expired("a")),
            Err(CallbackError::StateValidation(_))
        ));
        assert!(matches!(
            CallbackLogic::check_credentials(&Credentials::invalid("a")),
            Err(CallbackError::MalformedCallback(_))
        ));
    }

    #[test]
    fn test_only_denials_follow_client_redirect() {
        let client = MockClient::new("github").with_failure_redirect("/login?error=denied");

        let denied = ClientError::Denied {
            error: "access_denied".to_string(),
            description: None,
        };
        let action = CallbackLogic::client_failure(&client, denied).unwrap();
        assert_eq!(action.as_redirect().unwrap().location, "/login?error=denied");

        let forged = ClientError::StateMismatch("forged".to_string());
        assert!(matches!(
            CallbackLogic::client_failure(&client, forged),
            Err(CallbackError::StateValidation(_))
        ));

        let malformed = ClientError::Malformed("missing code".to_string());
        assert!(matches!(
            CallbackLogic::client_failure(&client, malformed),
            Err(CallbackError::MalformedCallback(_))
        ));
    }
}
