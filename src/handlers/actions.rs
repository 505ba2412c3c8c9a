//! actix-web rendering of logical actions

use actix_web::{http::header, HttpResponse};
use serde_json::json;

use crate::actions::ActionAdapter;
use crate::models::{LogicalAction, RedirectAction};
use crate::session::SessionCookies;

/// Global instance of pre-serialized error bodies
static CACHED_RESPONSES: std::sync::LazyLock<CachedResponses> =
    std::sync::LazyLock::new(CachedResponses::new);

/// Fixed error bodies; diagnostics stay in the logs
struct CachedResponses {
    forbidden: String,
    bad_request: String,
    server_error: String,
}

impl CachedResponses {
    fn new() -> Self {
        Self {
            forbidden: Self::create_json(
                "access_denied",
                "The authentication callback could not be verified",
            ),
            bad_request: Self::create_json(
                "invalid_request",
                "The authentication callback is malformed or invalid",
            ),
            server_error: Self::create_json("server_error", "An internal server error occurred"),
        }
    }

    fn create_json(error: &str, description: &str) -> String {
        json!({
            "error": error,
            "error_description": description
        })
        .to_string()
    }

    fn forbidden(&self) -> HttpResponse {
        HttpResponse::Forbidden()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.forbidden.clone())
    }

    fn bad_request(&self) -> HttpResponse {
        HttpResponse::BadRequest()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.bad_request.clone())
    }

    fn server_error(&self) -> HttpResponse {
        HttpResponse::InternalServerError()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.server_error.clone())
    }
}

/// Renders logical actions as actix-web responses
pub struct ActixActionAdapter<'a> {
    cookies: &'a SessionCookies,
}

impl<'a> ActixActionAdapter<'a> {
    #[must_use]
    pub fn new(cookies: &'a SessionCookies) -> Self {
        Self { cookies }
    }

    fn redirect(&self, redirect: &RedirectAction) -> HttpResponse {
        let mut response = HttpResponse::Found();
        response.insert_header((header::LOCATION, redirect.location.as_str()));

        // A renewed session is only reachable through a fresh cookie
        if let Some(session) = &redirect.renewed_session {
            match self.cookies.create_session_cookie(session) {
                Ok(cookie) => {
                    response.cookie(cookie);
                }
                Err(e) => {
                    log::error!("Failed to sign renewed session cookie: {e}");
                    return CACHED_RESPONSES.server_error();
                }
            }
        }

        response.finish()
    }
}

impl ActionAdapter for ActixActionAdapter<'_> {
    type Output = HttpResponse;

    fn adapt(&self, action: LogicalAction) -> HttpResponse {
        match action {
            LogicalAction::Redirect(redirect) => self.redirect(&redirect),
            LogicalAction::Forbidden { .. } => CACHED_RESPONSES.forbidden(),
            LogicalAction::BadRequest { .. } => CACHED_RESPONSES.bad_request(),
            LogicalAction::InternalError { .. } => CACHED_RESPONSES.server_error(),
        }
    }
}
