//! Indirect clients and their registry
//!
//! - [`client`] - The `IndirectClient` capability the engine depends on
//! - [`registry`] - Name-based lookup of configured clients
//! - [`state`] - Single-use request state written before the provider redirect

pub mod client;
pub mod registry;
pub mod state;

pub use client::IndirectClient;
pub use registry::{ClientRegistry, ClientRegistryBuilder, DEFAULT_CLIENT_NAME_PARAMETER};
pub use state::{consume_request_state, save_request_state, RequestState};
