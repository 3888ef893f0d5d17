//! Failed-authentication rate limiting with escalating lockouts.
//!
//! Each chat gets a [`RateLimitRecord`] that counts consecutive failed
//! attempts. The count decides both the lockout window and the record's
//! store TTL (housekeeping — the TTL only cleans up abandoned records, the
//! lockout itself is always checked against the clock):
//!
//! | attempts | lockout | record TTL |
//! |----------|---------|------------|
//! | 1–2      | none    | 24 h       |
//! | 3–4      | 15 min  | 1 h        |
//! | 5–9      | 1 h     | 2 h        |
//! | ≥10      | 24 h    | 25 h       |
//!
//! Successful authentication deletes the record entirely, so the next
//! failure starts a fresh count at 1.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::SharedClock;
use crate::models::auth::RateLimitRecord;
use crate::store::{self, KvStore, StoreError};

/// Outcome of a pre-credential rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitVerdict {
    /// No active lockout; the credential may be checked.
    Allowed,
    /// Locked out until the given instant. The credential must not be
    /// checked and the counter must not advance.
    Locked { until: DateTime<Utc> },
}

/// Lockout and housekeeping parameters for an attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tier {
    lockout: Option<Duration>,
    ttl_seconds: u64,
}

fn tier_for(attempts: u32) -> Tier {
    match attempts {
        0..=2 => Tier {
            lockout: None,
            ttl_seconds: 24 * 3600,
        },
        3..=4 => Tier {
            lockout: Some(Duration::minutes(15)),
            ttl_seconds: 3600,
        },
        5..=9 => Tier {
            lockout: Some(Duration::hours(1)),
            ttl_seconds: 2 * 3600,
        },
        _ => Tier {
            lockout: Some(Duration::hours(24)),
            ttl_seconds: 25 * 3600,
        },
    }
}

/// Per-chat failed-attempt tracker backed by the rate-limit store.
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    fn record_key(chat_id: i64) -> String {
        chat_id.to_string()
    }

    /// Whether the chat is currently locked out.
    ///
    /// Runs before any credential check; a `Locked` verdict wins even if the
    /// presented key would be valid, and does not advance the counter.
    pub async fn check(&self, chat_id: i64) -> Result<RateLimitVerdict, StoreError> {
        let key = Self::record_key(chat_id);
        let record: Option<RateLimitRecord> = store::get_record(self.store.as_ref(), &key).await?;
        if let Some(record) = record {
            if let Some(until) = record.locked_until {
                if self.clock.now() < until {
                    return Ok(RateLimitVerdict::Locked { until });
                }
            }
        }
        Ok(RateLimitVerdict::Allowed)
    }

    /// Record one failed attempt and apply the tier it lands in.
    ///
    /// Returns the updated record so callers can surface the attempt count
    /// or lockout deadline.
    pub async fn record_failure(&self, chat_id: i64) -> Result<RateLimitRecord, StoreError> {
        let key = Self::record_key(chat_id);
        let now = self.clock.now();
        let previous: Option<RateLimitRecord> = store::get_record(self.store.as_ref(), &key).await?;

        let failed_attempts = previous.as_ref().map_or(1, |r| r.failed_attempts + 1);
        let tier = tier_for(failed_attempts);
        let record = RateLimitRecord {
            failed_attempts,
            first_attempt_at: previous.map_or(now, |r| r.first_attempt_at),
            last_attempt_at: now,
            locked_until: tier.lockout.map(|window| now + window),
        };

        if let Some(until) = record.locked_until {
            tracing::warn!(chat_id, failed_attempts, %until, "auth lockout engaged");
        }

        store::put_record(self.store.as_ref(), &key, &record, Some(tier.ttl_seconds)).await?;
        Ok(record)
    }

    /// Forget the chat's failures entirely. Called on successful
    /// authentication; the next failure starts again at 1.
    pub async fn clear(&self, chat_id: i64) -> Result<(), StoreError> {
        self.store.delete(&Self::record_key(chat_id)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryKvStore;

    fn limiter_at(store: Arc<dyn KvStore>, now: DateTime<Utc>) -> RateLimiter {
        RateLimiter::new(store, Arc::new(FixedClock(now)))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn tiers_match_escalation_table() {
        assert_eq!(tier_for(1).lockout, None);
        assert_eq!(tier_for(2).lockout, None);
        assert_eq!(tier_for(2).ttl_seconds, 24 * 3600);
        assert_eq!(tier_for(3).lockout, Some(Duration::minutes(15)));
        assert_eq!(tier_for(4).ttl_seconds, 3600);
        assert_eq!(tier_for(5).lockout, Some(Duration::hours(1)));
        assert_eq!(tier_for(9).ttl_seconds, 2 * 3600);
        assert_eq!(tier_for(10).lockout, Some(Duration::hours(24)));
        assert_eq!(tier_for(25).ttl_seconds, 25 * 3600);
    }

    #[tokio::test]
    async fn first_two_failures_do_not_lock() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());

        let first = limiter.record_failure(7).await.unwrap();
        assert_eq!(first.failed_attempts, 1);
        assert_eq!(first.locked_until, None);

        let second = limiter.record_failure(7).await.unwrap();
        assert_eq!(second.failed_attempts, 2);
        assert_eq!(second.locked_until, None);
        assert_eq!(second.first_attempt_at, t0());

        assert_eq!(limiter.check(7).await.unwrap(), RateLimitVerdict::Allowed);
    }

    #[tokio::test]
    async fn third_failure_locks_for_fifteen_minutes() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());

        for _ in 0..3 {
            limiter.record_failure(7).await.unwrap();
        }
        let verdict = limiter.check(7).await.unwrap();
        assert_eq!(
            verdict,
            RateLimitVerdict::Locked {
                until: t0() + Duration::minutes(15)
            }
        );
    }

    #[tokio::test]
    async fn fifth_failure_locks_an_hour_tenth_a_day() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());

        for _ in 0..5 {
            limiter.record_failure(7).await.unwrap();
        }
        assert_eq!(
            limiter.check(7).await.unwrap(),
            RateLimitVerdict::Locked {
                until: t0() + Duration::hours(1)
            }
        );

        for _ in 0..5 {
            limiter.record_failure(7).await.unwrap();
        }
        assert_eq!(
            limiter.check(7).await.unwrap(),
            RateLimitVerdict::Locked {
                until: t0() + Duration::hours(24)
            }
        );
    }

    #[tokio::test]
    async fn lockout_expires_by_clock() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());
        for _ in 0..3 {
            limiter.record_failure(7).await.unwrap();
        }

        // Same store, clock moved past the 15-minute window.
        let later = limiter_at(store, t0() + Duration::minutes(16));
        assert_eq!(later.check(7).await.unwrap(), RateLimitVerdict::Allowed);
    }

    #[tokio::test]
    async fn clear_resets_the_count_to_one() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());
        for _ in 0..4 {
            limiter.record_failure(7).await.unwrap();
        }

        limiter.clear(7).await.unwrap();
        assert_eq!(limiter.check(7).await.unwrap(), RateLimitVerdict::Allowed);

        let fresh = limiter.record_failure(7).await.unwrap();
        assert_eq!(fresh.failed_attempts, 1);
        assert_eq!(fresh.locked_until, None);
    }

    #[tokio::test]
    async fn chats_are_tracked_independently() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let limiter = limiter_at(store.clone(), t0());
        for _ in 0..3 {
            limiter.record_failure(7).await.unwrap();
        }

        assert!(matches!(
            limiter.check(7).await.unwrap(),
            RateLimitVerdict::Locked { .. }
        ));
        assert_eq!(limiter.check(8).await.unwrap(), RateLimitVerdict::Allowed);
    }
}
