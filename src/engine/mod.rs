//! Callback Engine
//!
//! Completes the login of an indirect client when the browser comes back
//! from the identity provider. See [`CallbackLogic`] for the algorithm.

pub mod callback;

pub use callback::CallbackLogic;
