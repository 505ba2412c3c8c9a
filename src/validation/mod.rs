//! Validation Module
//!
//! # Modules
//!
//! - [`callback`] - Reusable checks on provider callback parameters
//! - [`redirect`] - Post-authentication redirect URL validation
//!
//! # Usage
//!
//! ```ignore
//! // Inside an IndirectClient implementation
//! use boomerang::validation::CallbackValidator;
//!
//! let code = CallbackValidator::validate_and_extract(request, state)?;
//! ```

pub mod callback;
pub mod redirect;

pub use callback::{CallbackValidator, ValidatedCallback};
pub use redirect::validate_post_auth_redirect;
