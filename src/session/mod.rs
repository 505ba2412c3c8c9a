//! Session Store Adapter
//!
//! This module provides the session abstraction the callback engine relies on:
//!
//! - [`store`] - The `SessionStore` trait, typed helpers and well-known keys
//! - [`memory`] - Concurrency-safe in-memory backend
//! - [`cookie`] - Signed session-identifier cookies for the actix-web layer

pub mod cookie;
pub mod memory;
pub mod store;

// Re-export commonly used items for convenience
pub use cookie::{SessionCookies, SESSION_COOKIE_NAME};
pub use memory::InMemorySessionStore;
pub use store::{get_typed, set_typed, state_key, take_typed, SessionStore, PROFILES_KEY};
