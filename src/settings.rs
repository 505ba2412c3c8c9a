use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::clients::registry::{ClientRegistryBuilder, DEFAULT_CLIENT_NAME_PARAMETER};
use crate::clients::ClientRegistry;
use crate::clients::state::DEFAULT_STATE_TTL_SECONDS;
use crate::config::CallbackOptions;
use crate::session::SESSION_COOKIE_NAME;
use crate::utils::crypto::generate_secret;

/// Name of the settings file looked up in the working and secrets directories
pub const SETTINGS_FILE_NAME: &str = "Settings.toml";

/// Environment variable pointing at a directory with an overriding settings file
pub const SECRETS_DIR_ENV: &str = "BOOMERANG_SECRETS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoomerangSettings {
    pub callback: CallbackSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

/// Callback endpoint and policy defaults
///
/// The policy values are optional so that an unset value defers to the
/// built-in default instead of pinning it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackSettings {
    /// Path the callback endpoint is mounted on
    pub path: String,
    /// Where to go after login when no URL was requested
    pub default_url: Option<String>,
    pub save_in_session: Option<bool>,
    pub multi_profile: Option<bool>,
    pub renew_session: Option<bool>,
    /// Client used when the callback does not name one
    pub default_client: Option<String>,
    /// Request parameter carrying the client name
    pub client_name_parameter: String,
    /// Lifetime of issued request state
    pub state_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub session_duration_hours: u64,
    /// Key for signing session cookies, generated when empty
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        Self {
            path: "/callback".to_string(),
            default_url: Some("/".to_string()),
            save_in_session: None,
            multi_profile: None,
            renew_session: None,
            default_client: None,
            client_name_parameter: DEFAULT_CLIENT_NAME_PARAMETER.to_string(),
            state_ttl_seconds: DEFAULT_STATE_TTL_SECONDS.unsigned_abs(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_duration_hours: 24,
            session_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BoomerangSettings {
    /// Load settings from configuration files and environment variables,
    /// then initialize logging
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings(Path::new("."))?;
        Self::apply_env_overrides(&mut settings);

        Self::initialize_logging(&settings.logging)?;
        Ok(settings)
    }

    /// Initialize `env_logger`, `RUST_LOG` taking precedence over the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if a logger was already installed
    pub fn initialize_logging(logging: &LoggingSettings) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&logging.level))
            .try_init()
            .context("Failed to initialize logger")
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `BOOMERANG_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in `base_dir` (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    pub fn load_base_settings(base_dir: &Path) -> Result<Self> {
        let mut settings = Self::default();

        let default_config_path = base_dir.join(SETTINGS_FILE_NAME);
        if default_config_path.exists() {
            settings = Self::read_settings_file(&default_config_path)?;
            log::info!("✓ Loaded base settings from {}", default_config_path.display());
        }

        if let Ok(secrets_dir) = std::env::var(SECRETS_DIR_ENV) {
            let secrets_path = Path::new(&secrets_dir).join(SETTINGS_FILE_NAME);
            if secrets_path.exists() {
                settings = Self::read_settings_file(&secrets_path)?;
                log::info!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "ℹ {SECRETS_DIR_ENV} set but no {SETTINGS_FILE_NAME} found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    fn read_settings_file(path: &Path) -> Result<Self> {
        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        basic_toml::from_str(&toml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_callback_env_overrides(&mut settings.callback);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for callback settings
    pub fn apply_callback_env_overrides(callback: &mut CallbackSettings) {
        if let Ok(path) = std::env::var("BOOMERANG_CALLBACK_PATH") {
            callback.path = path;
        }
        if let Ok(default_url) = std::env::var("BOOMERANG_DEFAULT_URL") {
            callback.default_url = Some(default_url);
        }
        if let Ok(default_client) = std::env::var("BOOMERANG_DEFAULT_CLIENT") {
            callback.default_client = Some(default_client);
        }
        if let Ok(parameter) = std::env::var("BOOMERANG_CLIENT_NAME_PARAMETER") {
            callback.client_name_parameter = parameter;
        }
        Self::apply_bool_env_override("BOOMERANG_SAVE_IN_SESSION", &mut callback.save_in_session);
        Self::apply_bool_env_override("BOOMERANG_MULTI_PROFILE", &mut callback.multi_profile);
        Self::apply_bool_env_override("BOOMERANG_RENEW_SESSION", &mut callback.renew_session);
        Self::apply_numeric_env_override(
            "BOOMERANG_STATE_TTL_SECONDS",
            &mut callback.state_ttl_seconds,
        );
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        Self::apply_numeric_env_override(
            "SESSION_DURATION_HOURS",
            &mut session_settings.session_duration_hours,
        );
        Self::handle_session_secret_override(session_settings);
    }

    /// Helper function to apply numeric environment variable overrides
    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.parse::<u64>() {
                *target = value;
            }
        }
    }

    /// Helper function to apply tri-state boolean overrides; unparsable values are ignored
    fn apply_bool_env_override(env_var: &str, target: &mut Option<bool>) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.trim().parse::<bool>() {
                *target = Some(value);
            }
        }
    }

    /// Helper function to handle session secret environment override and generation
    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        // Generate random session secret if no environment variable was set and current value is empty
        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = generate_secret();
            Self::warn_about_generated_secret();
        }
    }

    fn warn_about_generated_secret() {
        log::warn!("⚠️  Using auto-generated session secret");
        log::warn!("🔒 For production use, set the SESSION_SECRET environment variable");
        log::warn!("   or configure session_secret in Settings.toml");
        log::warn!("💡 Session cookies will be invalidated on each restart unless explicitly configured");
    }

    /// Apply environment overrides for cookie settings
    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
        if let Ok(name) = std::env::var("BOOMERANG_COOKIE_NAME") {
            cookie_settings.name = name;
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Configuration-level callback policy defaults
    #[must_use]
    pub fn callback_defaults(&self) -> CallbackOptions {
        CallbackOptions {
            default_url: self.callback.default_url.clone(),
            save_in_session: self.callback.save_in_session,
            multi_profile: self.callback.multi_profile,
            renew_session: self.callback.renew_session,
            default_client: self.callback.default_client.clone(),
        }
    }

    /// Registry builder reading the client name from the configured parameter
    #[must_use]
    pub fn client_registry_builder(&self) -> ClientRegistryBuilder {
        ClientRegistry::builder()
            .client_name_parameter(self.callback.client_name_parameter.clone())
    }

    /// Lifetime of request state issued at login-redirect time
    ///
    /// Values too large to represent fall back to the default lifetime.
    #[must_use]
    pub fn state_ttl(&self) -> Duration {
        i64::try_from(self.callback.state_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| {
                log::warn!(
                    "⚠️  state_ttl_seconds {} is out of range, using {DEFAULT_STATE_TTL_SECONDS}s",
                    self.callback.state_ttl_seconds
                );
                Duration::seconds(DEFAULT_STATE_TTL_SECONDS)
            })
    }
}
