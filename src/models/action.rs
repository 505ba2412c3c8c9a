//! Transport-agnostic description of the response a callback produces

use super::profile::UserProfile;
use super::request::SessionId;

/// Successful completion: where to send the browser next
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectAction {
    pub location: String,
    /// New session identifier when the session was renewed
    pub renewed_session: Option<SessionId>,
    /// Profile for stateless continuation, only set when it was not saved in session
    pub profile: Option<UserProfile>,
}

/// Result of one engine invocation
///
/// Failure variants carry a diagnostic meant for server-side logging only.
/// Adapters must not copy it into the response.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalAction {
    Redirect(RedirectAction),
    Forbidden { diagnostic: String },
    BadRequest { diagnostic: String },
    InternalError { diagnostic: String },
}

/// Discriminant of a [`LogicalAction`], handy for comparisons and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Redirect,
    Forbidden,
    BadRequest,
    InternalError,
}

impl LogicalAction {
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(RedirectAction {
            location: location.into(),
            renewed_session: None,
            profile: None,
        })
    }

    #[must_use]
    pub fn forbidden(diagnostic: impl Into<String>) -> Self {
        Self::Forbidden {
            diagnostic: diagnostic.into(),
        }
    }

    #[must_use]
    pub fn bad_request(diagnostic: impl Into<String>) -> Self {
        Self::BadRequest {
            diagnostic: diagnostic.into(),
        }
    }

    #[must_use]
    pub fn internal_error(diagnostic: impl Into<String>) -> Self {
        Self::InternalError {
            diagnostic: diagnostic.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Redirect(_) => ActionKind::Redirect,
            Self::Forbidden { .. } => ActionKind::Forbidden,
            Self::BadRequest { .. } => ActionKind::BadRequest,
            Self::InternalError { .. } => ActionKind::InternalError,
        }
    }

    /// HTTP status code this action maps to
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ActionKind::Redirect => 302,
            ActionKind::Forbidden => 403,
            ActionKind::BadRequest => 400,
            ActionKind::InternalError => 500,
        }
    }

    #[must_use]
    pub fn as_redirect(&self) -> Option<&RedirectAction> {
        match self {
            Self::Redirect(redirect) => Some(redirect),
            _ => None,
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Redirect(_) => None,
            Self::Forbidden { diagnostic }
            | Self::BadRequest { diagnostic }
            | Self::InternalError { diagnostic } => Some(diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LogicalAction::redirect("/").status_code(), 302);
        assert_eq!(LogicalAction::forbidden("x").status_code(), 403);
        assert_eq!(LogicalAction::bad_request("x").status_code(), 400);
        assert_eq!(LogicalAction::internal_error("x").status_code(), 500);
    }

    #[test]
    fn test_redirect_has_no_diagnostic() {
        let action = LogicalAction::redirect("/home");
        assert_eq!(action.diagnostic(), None);
        assert_eq!(action.as_redirect().map(|r| r.location.as_str()), Some("/home"));
    }
}
