//! Process-wide callback configuration
//!
//! A [`Config`] is built once at startup and shared read-only (usually behind
//! an `Arc`) by every callback invocation. Policy values are tri-state: each
//! call site may override them through [`CallbackOptions`], and unset values
//! fall back to the configuration and then to built-in defaults.

use std::sync::Arc;

use crate::clients::ClientRegistry;
use crate::error::CallbackError;
use crate::session::SessionStore;

/// Built-in default for saving profiles in the session
pub const DEFAULT_SAVE_IN_SESSION: bool = true;
/// Built-in default for keeping one profile per client
pub const DEFAULT_MULTI_PROFILE: bool = false;
/// Built-in default for rotating the session id after login
pub const DEFAULT_RENEW_SESSION: bool = false;

/// Tri-state callback policy values
///
/// `None` means "not set at this level".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackOptions {
    pub default_url: Option<String>,
    pub save_in_session: Option<bool>,
    pub multi_profile: Option<bool>,
    pub renew_session: Option<bool>,
    pub default_client: Option<String>,
}

impl CallbackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn save_in_session(mut self, value: bool) -> Self {
        self.save_in_session = Some(value);
        self
    }

    #[must_use]
    pub fn multi_profile(mut self, value: bool) -> Self {
        self.multi_profile = Some(value);
        self
    }

    #[must_use]
    pub fn renew_session(mut self, value: bool) -> Self {
        self.renew_session = Some(value);
        self
    }

    #[must_use]
    pub fn default_client(mut self, name: impl Into<String>) -> Self {
        self.default_client = Some(name.into());
        self
    }

    /// Resolve every option against the configured defaults
    #[must_use]
    pub fn resolve(&self, configured: &CallbackOptions) -> EffectiveOptions {
        EffectiveOptions {
            default_url: resolve_option(
                non_blank(self.default_url.clone()),
                non_blank(configured.default_url.clone()),
                None,
            ),
            save_in_session: resolve_option(
                self.save_in_session,
                configured.save_in_session,
                Some(DEFAULT_SAVE_IN_SESSION),
            )
            .unwrap_or(DEFAULT_SAVE_IN_SESSION),
            multi_profile: resolve_option(
                self.multi_profile,
                configured.multi_profile,
                Some(DEFAULT_MULTI_PROFILE),
            )
            .unwrap_or(DEFAULT_MULTI_PROFILE),
            renew_session: resolve_option(
                self.renew_session,
                configured.renew_session,
                Some(DEFAULT_RENEW_SESSION),
            )
            .unwrap_or(DEFAULT_RENEW_SESSION),
            default_client: resolve_option(
                non_blank(self.default_client.clone()),
                non_blank(configured.default_client.clone()),
                None,
            ),
        }
    }
}

/// Three-level precedence: call site, then configuration, then built-in
#[must_use]
pub fn resolve_option<T>(call_site: Option<T>, configured: Option<T>, built_in: Option<T>) -> Option<T> {
    call_site.or(configured).or(built_in)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Policy values after precedence resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    pub default_url: Option<String>,
    pub save_in_session: bool,
    pub multi_profile: bool,
    pub renew_session: bool,
    pub default_client: Option<String>,
}

/// Immutable wiring of clients, session storage and policy defaults
#[derive(Clone)]
pub struct Config {
    clients: ClientRegistry,
    session_store: Arc<dyn SessionStore>,
    defaults: CallbackOptions,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("clients", &self.clients)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    #[must_use]
    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    #[must_use]
    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    /// Configuration-level policy defaults
    #[must_use]
    pub fn defaults(&self) -> &CallbackOptions {
        &self.defaults
    }
}

/// Assembles a [`Config`]
#[derive(Default)]
pub struct ConfigBuilder {
    clients: Option<ClientRegistry>,
    session_store: Option<Arc<dyn SessionStore>>,
    defaults: CallbackOptions,
}

impl ConfigBuilder {
    #[must_use]
    pub fn clients(mut self, clients: ClientRegistry) -> Self {
        self.clients = Some(clients);
        self
    }

    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    #[must_use]
    pub fn defaults(mut self, defaults: CallbackOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Finish the configuration
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::Configuration` if the client registry or the
    /// session store is missing
    pub fn build(self) -> Result<Config, CallbackError> {
        let clients = self
            .clients
            .ok_or_else(|| CallbackError::Configuration("no client registry".to_string()))?;
        let session_store = self
            .session_store
            .ok_or_else(|| CallbackError::Configuration("no session store".to_string()))?;

        if clients.is_empty() {
            log::warn!("Callback configuration has no clients; every callback will be rejected");
        }

        Ok(Config {
            clients,
            session_store,
            defaults: self.defaults,
        })
    }
}
