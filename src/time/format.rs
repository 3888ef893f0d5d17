//! Display helpers for durations and zone-local instants.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Render a duration as `1d 2h 5m` / `2h 5m` / `5m`.
///
/// Sub-minute spans render as `0m`; negative input is clamped to zero
/// rather than rendered with a sign.
pub fn format_duration_ms(duration_ms: i64) -> String {
    let clamped = duration_ms.max(0);
    let days = clamped / DAY_MS;
    let hours = (clamped % DAY_MS) / HOUR_MS;
    let minutes = (clamped % HOUR_MS) / MINUTE_MS;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Duration in hours, rounded to one decimal place.
pub fn hours_1dp(duration_ms: i64) -> f64 {
    (duration_ms as f64 / HOUR_MS as f64 * 10.0).round() / 10.0
}

/// Instant as `YYYY-MM-DD HH:MM` in the given zone.
pub fn format_local_datetime(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// Instant as `HH:MM` in the given zone.
pub fn format_local_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}
