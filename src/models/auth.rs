//! Authentication and rate-limit records.
//!
//! Three record kinds, each living in its own logical store:
//! - [`ApiKeyRecord`] under `"sha256:" + hex` — the issued key, keyed by its
//!   hash so the store never holds plaintext key material.
//! - [`ChatAuthRecord`] under the decimal chat id — which key a chat is
//!   authenticated with.
//! - [`RateLimitRecord`] under the decimal chat id — failed-attempt tracking,
//!   deleted on success and expired by store TTL otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::actor::Actor;

/// An issued API key, stored under the hash of its plaintext.
///
/// Immutable once written; revocation is deletion of the record, which the
/// gate observes as a dangling hash reference and cleans up after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    /// Display name shown to the chat on successful authentication.
    pub name: String,
    /// Instant after which the key no longer authenticates.
    pub expiry: DateTime<Utc>,
    /// Issuance instant, kept for provisioning audits.
    pub created: DateTime<Utc>,
}

/// Links a chat to the key it authenticated with. Overwritten wholesale on
/// re-authentication; a chat holds at most one association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAuthRecord {
    /// `"sha256:" + 64 lowercase hex` reference into the key store.
    pub api_key_hash: String,
    pub authenticated_at: DateTime<Utc>,
    pub authenticated_by: Actor,
}

/// Failed-authentication tracking for one chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub failed_attempts: u32,
    pub first_attempt_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
    /// Set once the attempt count reaches a lockout tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn chat_auth_round_trips_camel_case() {
        let record = ChatAuthRecord {
            api_key_hash: format!("sha256:{}", "ab".repeat(32)),
            authenticated_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
            authenticated_by: Actor::new(7, "Ada"),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("apiKeyHash"));
        assert!(json.contains("authenticatedAt"));
        let back: ChatAuthRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn rate_limit_omits_absent_lockout() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let record = RateLimitRecord {
            failed_attempts: 1,
            first_attempt_at: now,
            last_attempt_at: now,
            locked_until: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("lockedUntil"));

        let back: RateLimitRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.locked_until, None);
    }
}
