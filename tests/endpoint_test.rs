// HTTP-level tests for the actix-web callback endpoint
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{http::header, test, App};
use boomerang::clients::{IndirectClient, RequestState};
use boomerang::config::CallbackOptions;
use boomerang::handlers::CallbackEndpoint;
use boomerang::models::SessionId;
use boomerang::profile::ProfileManager;
use boomerang::session::{InMemorySessionStore, SessionStore};
use boomerang::settings::BoomerangSettings;
use boomerang::testing::constants::{TEST_CODE, TEST_DEFAULT_URL};
use boomerang::testing::{MockClient, TestFixtures};
use serde_json::Value;

fn endpoint(store: &Arc<InMemorySessionStore>) -> CallbackEndpoint {
    let clients: Vec<Arc<dyn IndirectClient>> = vec![MockClient::shared("github")];
    let config = TestFixtures::config(clients, store.clone());
    CallbackEndpoint::new(
        Some(Arc::new(config)),
        CallbackOptions::default(),
        TestFixtures::session_cookies(),
    )
}

fn callback_uri(state: &RequestState) -> String {
    format!(
        "/callback?client_name=github&code={TEST_CODE}&state={}",
        state.token
    )
}

async fn issue(store: &Arc<InMemorySessionStore>, requested_url: Option<&str>) -> (SessionId, RequestState) {
    let session = store.create_session().await.unwrap();
    let state = TestFixtures::issue_state(store.as_ref(), &session, "github", requested_url).await;
    (session, state)
}

#[actix_web::test]
async fn test_get_callback_redirects_to_requested_url() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (session, state) = issue(&store, Some("/dashboard")).await;
    let cookie = TestFixtures::session_cookies()
        .create_session_cookie(&session)
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&callback_uri(&state))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    // Session id unchanged, so no new cookie
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let profiles = ProfileManager::new(store.as_ref()).load(&session).await.unwrap();
    assert_eq!(profiles.len(), 1);
}

#[actix_web::test]
async fn test_form_post_callback_prefers_form_parameters() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (session, state) = issue(&store, None).await;
    let cookie = TestFixtures::session_cookies()
        .create_session_cookie(&session)
        .unwrap();

    let form = HashMap::from([
        ("code".to_string(), TEST_CODE.to_string()),
        ("state".to_string(), state.token.clone()),
    ]);
    let req = test::TestRequest::post()
        .uri("/callback?client_name=github&state=stale-query-value")
        .cookie(cookie)
        .set_form(&form)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), TEST_DEFAULT_URL);
}

#[actix_web::test]
async fn test_callback_without_session_cookie_is_forbidden() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (_, state) = issue(&store, None).await;
    let req = test::TestRequest::get().uri(&callback_uri(&state)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "access_denied");
    assert!(!body.to_string().contains(&state.token));
}

#[actix_web::test]
async fn test_forged_session_cookie_is_forbidden() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (session, state) = issue(&store, None).await;
    let forged = actix_web::cookie::Cookie::new(
        "boomerang_session",
        format!("{session}.forged-signature"),
    );
    let req = test::TestRequest::get()
        .uri(&callback_uri(&state))
        .cookie(forged)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn test_missing_client_name_is_bad_request() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (session, state) = issue(&store, None).await;
    let cookie = TestFixtures::session_cookies()
        .create_session_cookie(&session)
        .unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/callback?code={TEST_CODE}&state={}", state.token))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_request");
}

#[actix_web::test]
async fn test_renewed_session_is_sent_as_new_cookie() {
    let store = TestFixtures::session_store();
    let endpoint = endpoint(&store).with_options(CallbackOptions::new().renew_session(true));
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let (session, state) = issue(&store, None).await;
    let cookies = TestFixtures::session_cookies();
    let req = test::TestRequest::get()
        .uri(&callback_uri(&state))
        .cookie(cookies.create_session_cookie(&session).unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    let cookie = resp.response().cookies().next().expect("session cookie");
    let renewed = cookies.verify(cookie.value()).expect("signed cookie");
    assert_ne!(renewed, session);

    let profiles = ProfileManager::new(store.as_ref()).load(&renewed).await.unwrap();
    assert!(profiles.get("github").is_some());
}

#[actix_web::test]
async fn test_endpoint_without_configuration_is_internal_error() {
    let endpoint = CallbackEndpoint::new(None, CallbackOptions::default(), TestFixtures::session_cookies());
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, "/callback")),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/callback?client_name=github&code=x&state=y")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "server_error");
}

#[actix_web::test]
async fn test_endpoint_from_settings_uses_cookie_settings() {
    let mut settings = BoomerangSettings::default();
    settings.session.session_secret = "settings_secret_that_is_long_enough".to_string();
    settings.cookies.name = "app_session".to_string();

    let store = TestFixtures::session_store();
    let clients: Vec<Arc<dyn IndirectClient>> = vec![MockClient::shared("github")];
    let config = TestFixtures::config_with_defaults(
        clients,
        store.clone(),
        settings.callback_defaults(),
    );
    let endpoint = CallbackEndpoint::from_settings(Some(Arc::new(config)), &settings);
    let app = test::init_service(
        App::new().configure(|cfg| endpoint.configure(cfg, &settings.callback.path)),
    )
    .await;

    let (session, state) = issue(&store, None).await;
    let cookie = boomerang::SessionCookies::from_settings(&settings)
        .create_session_cookie(&session)
        .unwrap();
    assert_eq!(cookie.name(), "app_session");

    let req = test::TestRequest::get()
        .uri(&callback_uri(&state))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    // Built-in settings default URL
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}
