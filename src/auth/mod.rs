//! API-key issuance, hashing and the chat authentication gate.

pub mod gate;
pub mod keys;
pub mod rate_limit;

pub use gate::{AuthDetails, AuthGate, AuthOutcome, IssueKeyError};
pub use keys::{hash_api_key, looks_like_api_key, KeyGenError, KeyGenerator};
pub use rate_limit::{RateLimitVerdict, RateLimiter};
