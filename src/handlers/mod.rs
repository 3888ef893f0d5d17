//! Command handlers.
//!
//! Each handler is an async function that:
//! 1. Receives a routed command (verb, args, actor, chat)
//! 2. Performs business logic through the services
//! 3. Returns a [`crate::models::Reply`] for the host layer to render

/// Authentication and onboarding
pub mod auth;
/// Start/end/cancel/status/timezone
pub mod fasting;
/// Statistics and history
pub mod stats;

/// Callback strings carried by inline-keyboard buttons.
pub mod actions {
    pub const END_FAST: &str = "fast:end";
    pub const CANCEL_FAST: &str = "fast:cancel";
    pub const WEEK_STATS: &str = "stats:week";
    pub const MONTH_STATS: &str = "stats:month";
}
