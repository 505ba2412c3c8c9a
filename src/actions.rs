//! Action Adapter boundary
//!
//! The engine produces exactly one [`LogicalAction`] per callback; an adapter
//! turns it into whatever the hosting transport needs. The actix-web adapter
//! lives in [`crate::handlers::actions`].

use crate::models::LogicalAction;

/// Renders a logical action into a transport response
pub trait ActionAdapter {
    type Output;

    /// Convert the action; no further business logic may happen downstream
    fn adapt(&self, action: LogicalAction) -> Self::Output;
}

/// Adapter that hands the logical action back unchanged
///
/// Useful for embedding the engine in non-HTTP hosts and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughAdapter;

impl ActionAdapter for PassthroughAdapter {
    type Output = LogicalAction;

    fn adapt(&self, action: LogicalAction) -> LogicalAction {
        action
    }
}
