//! Fasting records persisted per user.
//!
//! One [`UserFastingRecord`] per user, stored as a JSON blob under
//! `"user:" + user id`. Field names are camelCase on the wire so records
//! written by earlier deployments keep deserializing unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::actor::Actor;

/// Fallback zone for records written before the timezone field existed.
/// New records are created with the configured default instead.
fn legacy_default_timezone() -> String {
    "Europe/Paris".to_string()
}

/// Everything the bot knows about one user's fasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFastingRecord {
    /// IANA zone name used for wall-clock rendering and statistics windows.
    #[serde(default = "legacy_default_timezone")]
    pub timezone: String,

    /// The open session, if any. Present exactly when the user is fasting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_fast: Option<CurrentFast>,

    /// Closed sessions, appended in the order they were ended.
    #[serde(default)]
    pub history: Vec<FastEntry>,
}

impl UserFastingRecord {
    /// A fresh record for a user seen for the first time.
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            current_fast: None,
            history: Vec::new(),
        }
    }

    /// Whether a fast is currently open.
    pub fn is_fasting(&self) -> bool {
        self.current_fast.is_some()
    }
}

/// An open fasting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentFast {
    pub started_at: DateTime<Utc>,
    pub started_by: Actor,
}

/// A closed fasting session.
///
/// Invariants, enforced where entries are created (`FastingService::end_fast`):
/// `ended_at > started_at` and `duration_ms == ended_at - started_at` in
/// milliseconds exactly. The duration is stored alongside the instants for
/// wire compatibility, never computed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastEntry {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_ms: i64,
    pub ended_by: Actor,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn record_serializes_camel_case() {
        let record = UserFastingRecord {
            timezone: "Europe/Paris".to_string(),
            current_fast: Some(CurrentFast {
                started_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
                started_by: Actor::new(42, "Ada"),
            }),
            history: vec![],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("currentFast").is_some());
        assert!(json["currentFast"].get("startedAt").is_some());
        assert!(json["currentFast"].get("startedBy").is_some());
    }

    #[test]
    fn entry_duration_uses_wire_name() {
        let entry = FastEntry {
            started_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            duration_ms: 3_600_000,
            ended_by: Actor::new(42, "Ada"),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["duration"], 3_600_000);
        assert!(json.get("durationMs").is_none());
    }

    #[test]
    fn legacy_blob_without_timezone_still_decodes() {
        let raw = r#"{"history":[]}"#;
        let record: UserFastingRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.timezone, "Europe/Paris");
        assert!(!record.is_fasting());
        assert!(record.history.is_empty());
    }

    #[test]
    fn idle_record_omits_current_fast_field() {
        let record = UserFastingRecord::new("Europe/Paris");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("currentFast"));
    }
}
