// HTTP surface for the callback engine
pub mod actions;
pub mod callback;

pub use actions::ActixActionAdapter;
pub use callback::{callback, CallbackEndpoint};
