//! Error types and user-facing message mapping.
//!
//! This module aggregates the per-module error enums and decides how each
//! is rendered back to the chat. The split mirrors what the command
//! boundary needs: validation problems carry their own explanation,
//! internal failures are hidden behind a generic message.

use thiserror::Error;

use crate::auth::gate::IssueKeyError;
use crate::services::fasting::FastingError;
use crate::store::StoreError;
use crate::time::{TimeAdjustError, TimelineError};

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation errors**: malformed time input, out-of-range fields,
///   timeline violations, illegal state transitions. User-correctable;
///   their `Display` text is the reply.
/// - **Internal errors**: storage and key-generation failures. Logged in
///   full, surfaced as a generic "try again".
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    TimeAdjust(#[from] TimeAdjustError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Fasting(#[from] FastingError),

    #[error(transparent)]
    IssueKey(#[from] IssueKeyError),
}

/// Reply for failures the user can do nothing about.
const GENERIC_FAILURE: &str = "Something went wrong on our side. Please try again.";

impl BotError {
    /// The text shown to the chat for this error.
    ///
    /// Validation and state-transition errors explain themselves; internal
    /// failures map to [`GENERIC_FAILURE`] so store details never leak
    /// into chat messages.
    pub fn user_message(&self) -> String {
        match self {
            BotError::TimeAdjust(err) => err.to_string(),
            BotError::Timeline(err) => err.to_string(),
            BotError::Fasting(FastingError::Store(_)) => GENERIC_FAILURE.to_string(),
            BotError::Fasting(err) => err.to_string(),
            BotError::Store(_) | BotError::IssueKey(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether this error should be logged as a system failure rather than
    /// a user mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            BotError::Store(_) | BotError::IssueKey(_) | BotError::Fasting(FastingError::Store(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_speak_for_themselves() {
        let err = BotError::from(TimeAdjustError::InvalidHour { hour: 25 });
        assert_eq!(err.user_message(), "Invalid hour: 25. Must be 0-23");
        assert!(!err.is_internal());

        let err = BotError::from(FastingError::NotFasting);
        assert_eq!(err.user_message(), "No active fast");
        assert!(!err.is_internal());
    }

    #[test]
    fn storage_failures_stay_generic() {
        let err = BotError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.is_internal());

        let nested = BotError::from(FastingError::Store(StoreError::Backend("boom".into())));
        assert_eq!(nested.user_message(), GENERIC_FAILURE);
        assert!(nested.is_internal());
    }
}
