use actix_web::{cookie::Cookie, HttpRequest};
use anyhow::Result;

use crate::models::SessionId;
use crate::settings::BoomerangSettings;
use crate::utils::crypto::{sign_value, verify_signed_value};

/// Default name of the session-identifier cookie
pub const SESSION_COOKIE_NAME: &str = "boomerang_session";

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: actix_web::cookie::SameSite,
    pub path: String,
    pub max_age: actix_web::cookie::time::Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            // Lax so the cookie survives the top-level redirect back from the provider
            same_site: actix_web::cookie::SameSite::Lax,
            path: "/".to_string(),
            max_age: actix_web::cookie::time::Duration::hours(24),
        }
    }
}

/// Reads and writes the HMAC-signed session-identifier cookie
#[derive(Clone)]
pub struct SessionCookies {
    cookie_name: String,
    signing_key: Vec<u8>,
    cookie_secure: bool,
    session_duration_hours: u64,
}

impl SessionCookies {
    #[must_use]
    pub fn new(signing_key: &[u8], cookie_secure: bool, session_duration_hours: u64) -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            signing_key: signing_key.to_vec(),
            cookie_secure,
            session_duration_hours,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &BoomerangSettings) -> Self {
        Self {
            cookie_name: settings.cookies.name.clone(),
            signing_key: settings.session.session_secret.as_bytes().to_vec(),
            cookie_secure: settings.cookies.secure,
            session_duration_hours: settings.session.session_duration_hours,
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Extract and verify the session identifier from the request cookie
    ///
    /// Returns `None` when the cookie is missing or its signature is invalid.
    #[must_use]
    pub fn session_id_from_request(&self, req: &HttpRequest) -> Option<SessionId> {
        let cookie = req.cookie(&self.cookie_name)?;
        self.verify(cookie.value())
    }

    /// Verify a raw cookie value
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        match verify_signed_value(value, &self.signing_key) {
            Ok(id) => Some(SessionId::new(id)),
            Err(e) => {
                log::warn!("Rejected session cookie: {e}");
                None
            }
        }
    }

    /// Create a signed session cookie for the given identifier
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails
    pub fn create_session_cookie(&self, session: &SessionId) -> Result<Cookie<'static>> {
        let options = CookieOptions {
            max_age: actix_web::cookie::time::Duration::hours(
                i64::try_from(self.session_duration_hours).unwrap_or(24),
            ),
            ..Default::default()
        };
        let value = sign_value(session.as_str(), &self.signing_key)?;

        Ok(Cookie::build(self.cookie_name.clone(), value)
            .http_only(options.http_only)
            .secure(self.cookie_secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .max_age(options.max_age)
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    const KEY: &[u8] = b"cookie_test_key_that_is_long_enough";

    #[actix_web::test]
    async fn test_cookie_round_trip_through_request() {
        let cookies = SessionCookies::new(KEY, true, 12);
        let cookie = cookies
            .create_session_cookie(&SessionId::from("abc"))
            .unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.same_site(),
            Some(actix_web::cookie::SameSite::Lax)
        );

        let req = test::TestRequest::default().cookie(cookie).to_http_request();
        assert_eq!(cookies.session_id_from_request(&req), Some(SessionId::from("abc")));
    }

    #[actix_web::test]
    async fn test_forged_cookie_is_ignored() {
        let cookies = SessionCookies::new(KEY, false, 12);
        let forged = Cookie::new(SESSION_COOKIE_NAME, "abc.not-a-signature");
        let req = test::TestRequest::default().cookie(forged).to_http_request();
        assert_eq!(cookies.session_id_from_request(&req), None);
    }

    #[::core::prelude::v1::test]
    fn test_insecure_setting_disables_secure_flag() {
        let cookies = SessionCookies::new(KEY, false, 1);
        let cookie = cookies.create_session_cookie(&SessionId::from("x")).unwrap();
        assert_eq!(cookie.secure(), Some(false));
    }
}
