#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the boomerang library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod actions;
pub mod clients;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod session;
pub mod settings;
pub mod utils;
pub mod validation;

// Test utilities for unit tests and, behind the `testing` feature, integration tests
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use actions::{ActionAdapter, PassthroughAdapter};
pub use clients::{ClientRegistry, IndirectClient, RequestState};
pub use config::{CallbackOptions, Config};
pub use engine::CallbackLogic;
pub use error::{CallbackError, ClientError, StorageError};
pub use handlers::{ActixActionAdapter, CallbackEndpoint};
pub use models::{CallbackRequest, Credentials, LogicalAction, ProfileSet, SessionId, UserProfile};
pub use session::{InMemorySessionStore, SessionCookies, SessionStore};
pub use settings::BoomerangSettings;
