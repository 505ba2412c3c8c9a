//! Testing utilities for the callback engine
//!
//! Available to unit tests and, with the `testing` feature, to integration tests.
//!
//! - [`fixtures`] - Pre-wired configurations, sessions and callback requests
//! - [`mock`] - Scriptable indirect client and failing session store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boomerang::testing::{fixtures::TestFixtures, mock::MockClient};
//!
//! let store = TestFixtures::session_store();
//! let client = MockClient::shared("github");
//! let config = TestFixtures::config(vec![client], store.clone());
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::{FailingSessionStore, MockClient, MockOutcome};

/// Common test constants
pub mod constants {
    /// Authorization code returned by mocked providers
    pub const TEST_CODE: &str = "test_authorization_code";

    /// Subject of the profile produced by [`super::MockClient`]
    pub const TEST_SUBJECT: &str = "123456789";

    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Default URL used by test configurations
    pub const TEST_DEFAULT_URL: &str = "/home";

    /// Cookie signing key for tests (256 bits)
    pub const TEST_COOKIE_KEY: &[u8] = b"test_key_32_bytes_long_for_test_";
}
