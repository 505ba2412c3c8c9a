//! Provider callback parameter checks
//!
//! Most redirect-based protocols send back an authorization artifact, the
//! state token and, on failure, an error code. These helpers break the
//! common validation into focused steps so protocol clients can share them.

use log::{debug, warn};

use crate::clients::RequestState;
use crate::error::ClientError;
use crate::models::CallbackRequest;

/// Parameter names used by OAuth 2.0 style callbacks
pub const CODE_PARAMETER: &str = "code";
pub const STATE_PARAMETER: &str = "state";
pub const ERROR_PARAMETER: &str = "error";
pub const ERROR_DESCRIPTION_PARAMETER: &str = "error_description";

/// Callback validator with structured validation steps
pub struct CallbackValidator;

/// Data extracted from a callback that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCallback {
    pub code: String,
}

impl CallbackValidator {
    /// Main validation entry point for authorization-code callbacks
    ///
    /// An echoed state is verified before anything else, so a forged
    /// callback is reported as a state failure even when it also carries
    /// a provider error.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state parameter does not match the stored request state
    /// - The provider returned an error code
    /// - The authorization code is missing or empty
    /// - The state parameter is missing or empty
    pub fn validate_and_extract(
        request: &CallbackRequest,
        state: &RequestState,
    ) -> Result<ValidatedCallback, ClientError> {
        debug!("Starting callback parameter validation");

        // Step 1: Verify the echoed state when there is one
        let received_state = request.non_blank_parameter(STATE_PARAMETER);
        if let Some(received) = received_state {
            Self::verify_state(received, state)?;
        }

        // Step 2: Check for provider errors
        Self::validate_provider_error(request)?;

        // Step 3: Extract and validate authorization code
        let code = Self::extract_authorization_code(request)?;

        // Step 4: A successful callback must echo the state
        if received_state.is_none() {
            Self::extract_state_parameter(request)?;
        }

        Ok(ValidatedCallback { code })
    }

    /// Providers return an error code instead of an authorization code when
    /// authentication fails or is cancelled
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Denied` when the error parameter is present
    pub fn validate_provider_error(request: &CallbackRequest) -> Result<(), ClientError> {
        if let Some(error) = request.non_blank_parameter(ERROR_PARAMETER) {
            warn!("Provider returned error: {error}");
            return Err(ClientError::Denied {
                error: error.to_string(),
                description: request
                    .non_blank_parameter(ERROR_DESCRIPTION_PARAMETER)
                    .map(ToString::to_string),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClientError::Malformed` when the code is missing or blank
    pub fn extract_authorization_code(request: &CallbackRequest) -> Result<String, ClientError> {
        request
            .non_blank_parameter(CODE_PARAMETER)
            .map(ToString::to_string)
            .ok_or_else(|| {
                warn!("No authorization code received in callback");
                ClientError::Malformed("missing authorization code".to_string())
            })
    }

    /// # Errors
    ///
    /// Returns `ClientError::Malformed` when the state is missing or blank
    pub fn extract_state_parameter(request: &CallbackRequest) -> Result<&str, ClientError> {
        request.non_blank_parameter(STATE_PARAMETER).ok_or_else(|| {
            warn!("No state parameter received in callback");
            ClientError::Malformed("missing state parameter".to_string())
        })
    }

    /// # Errors
    ///
    /// Returns `ClientError::StateMismatch` when the tokens differ
    pub fn verify_state(received: &str, state: &RequestState) -> Result<(), ClientError> {
        if state.matches(received) {
            debug!("Callback state verified");
            Ok(())
        } else {
            Err(ClientError::StateMismatch(
                "received state does not match stored request state".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionId;
    use chrono::Duration;
    use std::collections::HashMap;

    fn create_test_callback(
        code: Option<&str>,
        state: Option<&str>,
        error: Option<&str>,
    ) -> CallbackRequest {
        let mut params = HashMap::new();
        if let Some(code) = code {
            params.insert(CODE_PARAMETER.to_string(), code.to_string());
        }
        if let Some(state) = state {
            params.insert(STATE_PARAMETER.to_string(), state.to_string());
        }
        if let Some(error) = error {
            params.insert(ERROR_PARAMETER.to_string(), error.to_string());
        }
        CallbackRequest::new(params, Some(SessionId::from("sid")))
    }

    fn stored_state() -> RequestState {
        RequestState::issue(None, Duration::minutes(5))
    }

    #[test]
    fn test_provider_error_validation() {
        let with_error = create_test_callback(None, None, Some("access_denied"));
        assert!(matches!(
            CallbackValidator::validate_provider_error(&with_error),
            Err(ClientError::Denied { ref error, .. }) if error == "access_denied"
        ));

        let without_error = create_test_callback(Some("c"), Some("s"), None);
        assert!(CallbackValidator::validate_provider_error(&without_error).is_ok());
    }

    #[test]
    fn test_authorization_code_extraction() {
        let with_code = create_test_callback(Some("valid_auth_code"), Some("s"), None);
        assert_eq!(
            CallbackValidator::extract_authorization_code(&with_code).unwrap(),
            "valid_auth_code"
        );

        let without_code = create_test_callback(None, Some("s"), None);
        assert!(CallbackValidator::extract_authorization_code(&without_code).is_err());

        let empty_code = create_test_callback(Some("   "), Some("s"), None);
        assert!(CallbackValidator::extract_authorization_code(&empty_code).is_err());
    }

    #[test]
    fn test_state_parameter_extraction() {
        let empty_state = create_test_callback(Some("c"), Some("  "), None);
        assert!(matches!(
            CallbackValidator::extract_state_parameter(&empty_state),
            Err(ClientError::Malformed(_))
        ));
    }

    #[test]
    fn test_full_validation() {
        let state = stored_state();

        let valid = create_test_callback(Some("code-1"), Some(&state.token), None);
        let validated = CallbackValidator::validate_and_extract(&valid, &state).unwrap();
        assert_eq!(validated.code, "code-1");

        let mismatched = create_test_callback(Some("code-1"), Some("forged"), None);
        assert!(matches!(
            CallbackValidator::validate_and_extract(&mismatched, &state),
            Err(ClientError::StateMismatch(_))
        ));
    }

    #[test]
    fn test_state_is_verified_before_provider_error() {
        let state = stored_state();

        let forged_denial = create_test_callback(None, Some("forged"), Some("access_denied"));
        assert!(matches!(
            CallbackValidator::validate_and_extract(&forged_denial, &state),
            Err(ClientError::StateMismatch(_))
        ));

        let genuine_denial =
            create_test_callback(None, Some(&state.token), Some("access_denied"));
        assert!(matches!(
            CallbackValidator::validate_and_extract(&genuine_denial, &state),
            Err(ClientError::Denied { .. })
        ));

        let stateless_denial = create_test_callback(None, None, Some("access_denied"));
        assert!(matches!(
            CallbackValidator::validate_and_extract(&stateless_denial, &state),
            Err(ClientError::Denied { .. })
        ));

        let missing_state = create_test_callback(Some("code-1"), None, None);
        assert!(matches!(
            CallbackValidator::validate_and_extract(&missing_state, &state),
            Err(ClientError::Malformed(_))
        ));
    }
}
