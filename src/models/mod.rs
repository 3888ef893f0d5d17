//! Typed records persisted in the key-value stores, plus the
//! request/reply types crossing the transport boundary.
//!
//! Every struct here is a plain data shape; behavior lives in the services.
//! Persisted records carry serde derives with a camelCase JSON wire format
//! and RFC 3339 timestamps.

/// Acting-user identity
pub mod actor;
/// API key, chat-auth, and rate-limit records
pub mod auth;
/// Per-user fasting record and entries
pub mod fasting;
/// Inbound commands and outbound replies
pub mod message;

pub use actor::Actor;
pub use auth::{ApiKeyRecord, ChatAuthRecord, RateLimitRecord};
pub use fasting::{CurrentFast, FastEntry, UserFastingRecord};
pub use message::{Button, CommandRequest, Keyboard, Reply};
