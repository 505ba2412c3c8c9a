//! Core data types shared by the callback engine and its collaborators
//!
//! Everything here is transport-agnostic: the actix-web layer converts
//! inbound requests into a [`CallbackRequest`] and renders a
//! [`LogicalAction`] back into an HTTP response.

pub mod action;
pub mod credentials;
pub mod profile;
pub mod request;

pub use action::{ActionKind, LogicalAction, RedirectAction};
pub use credentials::{CredentialStatus, Credentials};
pub use profile::{ProfileSet, UserProfile};
pub use request::{CallbackRequest, SessionId};
