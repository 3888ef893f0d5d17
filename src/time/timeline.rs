//! Ordering and bounds checks for adjusted timestamps.
//!
//! An adjusted instant has to stay causally sane: not in the future, not
//! unreasonably far in the past, and consistent with whatever open session
//! it would start or end. Checks are pure — nothing here reads the clock
//! or touches storage.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::CurrentFast;

/// How far back a retroactive start or end may reach.
pub const MAX_BACKDATE_DAYS: i64 = 7;

/// Which session boundary the candidate instant is meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl Boundary {
    fn verb(self) -> &'static str {
        match self {
            Boundary::Start => "start",
            Boundary::End => "end",
        }
    }
}

/// A rejected candidate instant. Display strings are shown to the user
/// verbatim; nothing is mutated on rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Cannot {verb} a fast in the future", verb = .boundary.verb())]
    InFuture { boundary: Boundary },
    #[error(
        "Cannot {verb} a fast more than {MAX_BACKDATE_DAYS} days ago",
        verb = .boundary.verb()
    )]
    TooFarPast { boundary: Boundary },
    #[error(
        "New start time {candidate} must be before the current fast's start {active_start}"
    )]
    StartNotBeforeActive {
        candidate: DateTime<Utc>,
        active_start: DateTime<Utc>,
    },
    #[error("End time {candidate} must be after the fast's start {start}")]
    EndNotAfterStart {
        candidate: DateTime<Utc>,
        start: DateTime<Utc>,
    },
}

/// Validate a candidate instant for a session boundary.
///
/// `open` is the user's current open session, if any. For a `Start`
/// candidate with an open session the candidate must strictly predate the
/// session's start; for an `End` candidate it must strictly follow it.
/// Equal instants are rejected in both directions.
pub fn check_timeline(
    candidate: DateTime<Utc>,
    now: DateTime<Utc>,
    open: Option<&CurrentFast>,
    boundary: Boundary,
) -> Result<(), TimelineError> {
    if candidate > now {
        return Err(TimelineError::InFuture { boundary });
    }
    if candidate < now - Duration::days(MAX_BACKDATE_DAYS) {
        return Err(TimelineError::TooFarPast { boundary });
    }

    if let Some(open) = open {
        match boundary {
            Boundary::Start if candidate >= open.started_at => {
                return Err(TimelineError::StartNotBeforeActive {
                    candidate,
                    active_start: open.started_at,
                });
            }
            Boundary::End if candidate <= open.started_at => {
                return Err(TimelineError::EndNotAfterStart {
                    candidate,
                    start: open.started_at,
                });
            }
            _ => {}
        }
    }
    Ok(())
}
