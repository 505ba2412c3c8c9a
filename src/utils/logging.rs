// Centralized logging for the callback lifecycle
use log::{debug, error, info, warn};

use crate::error::{CallbackError, ClientError};
use crate::models::SessionId;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a callback about to be processed
    pub fn log_callback_received(client_name: &str, session: Option<&SessionId>) {
        debug!(
            "Processing callback for client {} (session {})",
            client_name,
            if session.is_some() { "present" } else { "missing" }
        );
    }

    /// Log a profile written to the session
    pub fn log_profile_saved(client_name: &str, profile_id: &str, profile_count: usize) {
        info!(
            "Saved profile {profile_id} from {client_name} in session ({profile_count} profile(s) stored)"
        );
    }

    /// Log a session identifier rotation
    pub fn log_session_renewed(client_name: &str) {
        info!("Renewed session after {client_name} login");
    }

    /// Log a successful callback
    pub fn log_callback_completed(client_name: &str, location: &str) {
        info!("Callback for {client_name} completed, redirecting to {location}");
    }

    /// Log a client-supplied redirect after a failed validation
    pub fn log_client_failure_redirect(client_name: &str, error: &ClientError, location: &str) {
        warn!("Callback for {client_name} failed ({error}), client redirects to {location}");
    }

    /// Log a categorized callback failure at a level matching its severity
    ///
    /// The message is the server-side diagnostic; it never reaches the response.
    pub fn log_callback_failure(error: &CallbackError) {
        match error {
            CallbackError::Configuration(_) | CallbackError::Storage(_) => {
                error!("Callback failed: {error}");
            }
            CallbackError::StateValidation(_) => {
                warn!("Rejected callback (possible CSRF or replay): {error}");
            }
            CallbackError::MissingClientHint
            | CallbackError::UnknownClient(_)
            | CallbackError::ProviderDenied(_)
            | CallbackError::MalformedCallback(_) => {
                info!("Rejected callback: {error}");
            }
        }
    }

    /// Log settings-driven endpoint wiring at startup
    pub fn log_endpoint_configured(path: &str, client_names: &[&str]) {
        info!("🎯 Callback endpoint {path} serving clients: {client_names:?}");
    }
}
