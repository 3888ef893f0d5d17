//! Fasting session state machine.
//!
//! This service owns every transition of a user's record:
//! - Starting a fast (Idle -> Active)
//! - Ending a fast (Active -> Idle, appending to history)
//! - Cancelling a fast (Active -> Idle, discarding)
//! - Timezone updates
//!
//! # Atomicity
//!
//! Each transition is a single read-modify-write of the user's record; the
//! store's `put` is the atomicity boundary. Two racing commands for the
//! same user can interleave get/put with last-write-wins on the record.
//! Telegram delivers a chat's messages serially in practice, so no
//! optimistic-concurrency token is layered on top.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::clock::SharedClock;
use crate::models::{Actor, CurrentFast, FastEntry, UserFastingRecord};
use crate::store::{self, KvStore, StoreError};

/// A rejected transition, or a storage failure underneath one.
///
/// Rejections never mutate the stored record.
#[derive(Debug, Error)]
pub enum FastingError {
    #[error("A fast is already active (started {since})")]
    AlreadyFasting { since: DateTime<Utc> },
    #[error("No active fast")]
    NotFasting,
    #[error("End time {ended_at} must be after the start time {started_at}")]
    NonPositiveDuration {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// State machine over per-user fasting records.
pub struct FastingService {
    store: Arc<dyn KvStore>,
    clock: SharedClock,
    default_timezone: Tz,
}

impl FastingService {
    pub fn new(store: Arc<dyn KvStore>, clock: SharedClock, default_timezone: Tz) -> Self {
        Self {
            store,
            clock,
            default_timezone,
        }
    }

    fn record_key(user_id: i64) -> String {
        format!("user:{user_id}")
    }

    /// Load the user's record, or a fresh one if none is stored yet.
    ///
    /// Records are created lazily: nothing is written until the first
    /// transition persists.
    pub async fn load(&self, user_id: i64) -> Result<UserFastingRecord, FastingError> {
        let record =
            store::get_record(self.store.as_ref(), &Self::record_key(user_id)).await?;
        Ok(record.unwrap_or_else(|| UserFastingRecord::new(self.default_timezone.name())))
    }

    async fn save(&self, user_id: i64, record: &UserFastingRecord) -> Result<(), FastingError> {
        store::put_record(self.store.as_ref(), &Self::record_key(user_id), record, None).await?;
        Ok(())
    }

    /// The record's timezone, falling back to the configured default when
    /// the stored string does not name a real IANA zone.
    pub fn timezone_of(&self, record: &UserFastingRecord) -> Tz {
        match record.timezone.parse() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::debug!(zone = %record.timezone, "stored timezone unparseable, using default");
                self.default_timezone
            }
        }
    }

    /// Start a fast.
    ///
    /// # Process
    ///
    /// 1. Load the record
    /// 2. Refuse if a fast is already open (never clobber it)
    /// 3. Set `current_fast` to `explicit_start` or now, persist
    ///
    /// # Errors
    ///
    /// - `AlreadyFasting`: a session is open; the record is unchanged
    /// - `Store`: the backing store failed
    pub async fn start_fast(
        &self,
        user_id: i64,
        actor: &Actor,
        explicit_start: Option<DateTime<Utc>>,
    ) -> Result<CurrentFast, FastingError> {
        let mut record = self.load(user_id).await?;
        if let Some(current) = &record.current_fast {
            return Err(FastingError::AlreadyFasting {
                since: current.started_at,
            });
        }

        let current = CurrentFast {
            started_at: explicit_start.unwrap_or_else(|| self.clock.now()),
            started_by: actor.clone(),
        };
        record.current_fast = Some(current.clone());
        self.save(user_id, &record).await?;

        tracing::info!(user_id, started_at = %current.started_at, "fast started");
        Ok(current)
    }

    /// End the open fast and append it to history.
    ///
    /// # Process
    ///
    /// 1. Load the record; refuse if no fast is open
    /// 2. Compute `duration = (explicit_end or now) - started_at`
    /// 3. Refuse a non-positive duration rather than record a corrupt entry
    /// 4. Append the entry, clear `current_fast`, persist
    ///
    /// # Errors
    ///
    /// - `NotFasting`: no session is open
    /// - `NonPositiveDuration`: the end does not strictly follow the start;
    ///   the session stays open
    /// - `Store`: the backing store failed
    pub async fn end_fast(
        &self,
        user_id: i64,
        actor: &Actor,
        explicit_end: Option<DateTime<Utc>>,
    ) -> Result<FastEntry, FastingError> {
        let mut record = self.load(user_id).await?;
        let Some(current) = record.current_fast.clone() else {
            return Err(FastingError::NotFasting);
        };

        let ended_at = explicit_end.unwrap_or_else(|| self.clock.now());
        let duration_ms = (ended_at - current.started_at).num_milliseconds();
        if duration_ms <= 0 {
            return Err(FastingError::NonPositiveDuration {
                started_at: current.started_at,
                ended_at,
            });
        }

        let entry = FastEntry {
            started_at: current.started_at,
            ended_at,
            duration_ms,
            ended_by: actor.clone(),
        };
        record.history.push(entry.clone());
        record.current_fast = None;
        self.save(user_id, &record).await?;

        tracing::info!(user_id, duration_ms, "fast ended");
        Ok(entry)
    }

    /// Discard the open fast without recording history.
    ///
    /// Returns the discarded session so callers can describe what was
    /// thrown away.
    pub async fn cancel_fast(&self, user_id: i64) -> Result<CurrentFast, FastingError> {
        let mut record = self.load(user_id).await?;
        let Some(current) = record.current_fast.take() else {
            return Err(FastingError::NotFasting);
        };
        self.save(user_id, &record).await?;

        tracing::info!(user_id, started_at = %current.started_at, "fast cancelled");
        Ok(current)
    }

    /// Update the record's timezone. Valid whether or not a fast is open.
    ///
    /// The zone is already parsed; storage keeps the canonical IANA name.
    pub async fn set_timezone(&self, user_id: i64, zone: Tz) -> Result<(), FastingError> {
        let mut record = self.load(user_id).await?;
        record.timezone = zone.name().to_string();
        self.save(user_id, &record).await?;

        tracing::info!(user_id, zone = zone.name(), "timezone updated");
        Ok(())
    }
}
