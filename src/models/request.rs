use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier of a browser session in the session store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Read-only view of an inbound callback exchange
///
/// Parameters are the merged query and form values sent back by the
/// identity provider. The session identifier is only present when the
/// browser presented a valid session cookie.
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    params: HashMap<String, String>,
    cookies: HashMap<String, String>,
    session_id: Option<SessionId>,
}

impl CallbackRequest {
    #[must_use]
    pub fn new(params: HashMap<String, String>, session_id: Option<SessionId>) -> Self {
        Self {
            params,
            cookies: HashMap::new(),
            session_id,
        }
    }

    /// Attach the raw cookies of the inbound request
    #[must_use]
    pub fn with_cookies(mut self, cookies: HashMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Get a callback parameter by name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get a callback parameter, treating blank values as absent
    #[must_use]
    pub fn non_blank_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.params
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Client name requested through the given parameter, if any
    #[must_use]
    pub fn client_hint(&self, parameter_name: &str) -> Option<&str> {
        self.non_blank_parameter(parameter_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(params: &[(&str, &str)]) -> CallbackRequest {
        let params = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CallbackRequest::new(params, Some(SessionId::from("sid-1")))
    }

    #[test]
    fn test_blank_client_hint_is_ignored() {
        let request = request_with(&[("client_name", "   ")]);
        assert_eq!(request.client_hint("client_name"), None);
    }

    #[test]
    fn test_client_hint_is_trimmed() {
        let request = request_with(&[("client_name", " github ")]);
        assert_eq!(request.client_hint("client_name"), Some("github"));
        assert_eq!(request.client_hint("other"), None);
    }

    #[test]
    fn test_cookie_lookup() {
        let request = request_with(&[])
            .with_cookies(HashMap::from([("theme".to_string(), "dark".to_string())]));
        assert_eq!(request.cookie("theme"), Some("dark"));
        assert_eq!(request.cookie("missing"), None);
    }

    #[test]
    fn test_session_id_display() {
        let request = request_with(&[]);
        assert_eq!(request.session_id().map(ToString::to_string).as_deref(), Some("sid-1"));
    }
}
