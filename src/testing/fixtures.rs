//! Test fixtures providing pre-wired configurations and callback requests

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;

use super::constants::{TEST_CODE, TEST_COOKIE_KEY, TEST_DEFAULT_URL};
use crate::clients::{save_request_state, ClientRegistry, IndirectClient, RequestState};
use crate::config::{CallbackOptions, Config};
use crate::models::{CallbackRequest, SessionId};
use crate::session::{InMemorySessionStore, SessionCookies, SessionStore};
use crate::validation::callback::{CODE_PARAMETER, STATE_PARAMETER};

/// Central fixture provider for callback tests
pub struct TestFixtures;

impl TestFixtures {
    #[must_use]
    pub fn session_store() -> Arc<InMemorySessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    /// Cookie codec signing with [`TEST_COOKIE_KEY`]
    #[must_use]
    pub fn session_cookies() -> SessionCookies {
        SessionCookies::new(TEST_COOKIE_KEY, false, 1)
    }

    /// Configuration with the given clients and [`TEST_DEFAULT_URL`] as default URL
    ///
    /// # Panics
    ///
    /// Panics if the clients cannot be registered.
    #[must_use]
    pub fn config(clients: Vec<Arc<dyn IndirectClient>>, store: Arc<dyn SessionStore>) -> Config {
        Self::config_with_defaults(
            clients,
            store,
            CallbackOptions::new().default_url(TEST_DEFAULT_URL),
        )
    }

    /// Configuration with explicit policy defaults
    ///
    /// # Panics
    ///
    /// Panics if the clients cannot be registered.
    #[must_use]
    pub fn config_with_defaults(
        clients: Vec<Arc<dyn IndirectClient>>,
        store: Arc<dyn SessionStore>,
        defaults: CallbackOptions,
    ) -> Config {
        let registry = clients
            .into_iter()
            .fold(ClientRegistry::builder(), |builder, client| {
                builder.register_arc(client)
            })
            .build()
            .unwrap();

        Config::builder()
            .clients(registry)
            .session_store(store)
            .defaults(defaults)
            .build()
            .unwrap()
    }

    /// Issue and store a request state, as the login redirect would
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the write.
    pub async fn issue_state(
        store: &dyn SessionStore,
        session: &SessionId,
        client_name: &str,
        requested_url: Option<&str>,
    ) -> RequestState {
        let state = RequestState::issue(requested_url.map(ToString::to_string), Duration::minutes(10));
        save_request_state(store, session, client_name, &state)
            .await
            .unwrap();
        state
    }

    /// Provider callback parameters echoing `state`
    #[must_use]
    pub fn callback_params(client_name: &str, state: &RequestState) -> HashMap<String, String> {
        HashMap::from([
            ("client_name".to_string(), client_name.to_string()),
            (CODE_PARAMETER.to_string(), TEST_CODE.to_string()),
            (STATE_PARAMETER.to_string(), state.token.clone()),
        ])
    }

    /// Well-formed callback for `client_name` in `session`
    #[must_use]
    pub fn callback_request(
        client_name: &str,
        session: &SessionId,
        state: &RequestState,
    ) -> CallbackRequest {
        CallbackRequest::new(
            Self::callback_params(client_name, state),
            Some(session.clone()),
        )
    }
}
