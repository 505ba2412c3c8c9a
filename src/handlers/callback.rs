//! actix-web callback endpoint

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use super::actions::ActixActionAdapter;
use crate::config::{CallbackOptions, Config};
use crate::engine::CallbackLogic;
use crate::models::CallbackRequest;
use crate::session::SessionCookies;
use crate::settings::BoomerangSettings;
use crate::utils::logging::LoggingHelper;

/// Per-application callback endpoint state
///
/// `config` is optional so that a host mounting the endpoint before wiring
/// its clients gets an internal error instead of a panic.
#[derive(Clone)]
pub struct CallbackEndpoint {
    config: Option<Arc<Config>>,
    options: CallbackOptions,
    cookies: SessionCookies,
}

impl CallbackEndpoint {
    #[must_use]
    pub fn new(config: Option<Arc<Config>>, options: CallbackOptions, cookies: SessionCookies) -> Self {
        Self {
            config,
            options,
            cookies,
        }
    }

    /// Endpoint using the cookie settings; policy values are left to the `Config` defaults
    #[must_use]
    pub fn from_settings(config: Option<Arc<Config>>, settings: &BoomerangSettings) -> Self {
        Self::new(config, CallbackOptions::default(), SessionCookies::from_settings(settings))
    }

    /// Replace the call-site policy overrides
    #[must_use]
    pub fn with_options(mut self, options: CallbackOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &CallbackOptions {
        &self.options
    }

    /// Mount the endpoint for GET and POST (`form_post` providers) on `path`
    pub fn configure(self, cfg: &mut web::ServiceConfig, path: &str) {
        if let Some(config) = &self.config {
            LoggingHelper::log_endpoint_configured(path, &config.clients().names());
        } else {
            LoggingHelper::log_endpoint_configured(path, &[]);
        }

        cfg.app_data(web::Data::new(self))
            .route(path, web::get().to(callback))
            .route(path, web::post().to(callback));
    }

    /// Build the engine request from the HTTP request
    fn callback_request(
        &self,
        req: &HttpRequest,
        query: HashMap<String, String>,
        form: Option<HashMap<String, String>>,
    ) -> CallbackRequest {
        let mut params = query;
        // Form parameters win over query parameters
        if let Some(form) = form {
            params.extend(form);
        }

        let cookies = req
            .cookies()
            .map(|jar| {
                jar.iter()
                    .map(|c| (c.name().to_string(), c.value().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        CallbackRequest::new(params, self.cookies.session_id_from_request(req)).with_cookies(cookies)
    }
}

/// Callback handler shared by the GET and POST routes
pub async fn callback(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    form: Option<web::Form<HashMap<String, String>>>,
    endpoint: web::Data<CallbackEndpoint>,
) -> HttpResponse {
    let request =
        endpoint.callback_request(&req, query.into_inner(), form.map(web::Form::into_inner));
    let adapter = ActixActionAdapter::new(&endpoint.cookies);

    CallbackLogic::new()
        .perform(
            &request,
            endpoint.config.as_deref(),
            &adapter,
            &endpoint.options,
        )
        .await
}
