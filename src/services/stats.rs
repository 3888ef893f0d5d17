//! Statistics over closed fasting entries.
//!
//! Pure functions: nothing here touches storage or the system clock, so
//! callers pass "now" and the user's timezone explicitly. Window
//! boundaries are local-midnight instants computed in that zone.
//!
//! Aggregation over an empty window returns zeros rather than failing;
//! "no data" is a valid answer, not an error.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::FastEntry;
use crate::time::hours_1dp;

/// Aggregate over a filtered slice of history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastStatistics {
    pub total_fasts: usize,
    /// Summed duration in hours, rounded to one decimal.
    pub total_hours: f64,
    pub average_duration_ms: i64,
    pub longest_fast_ms: i64,
}

impl FastStatistics {
    pub const ZERO: FastStatistics = FastStatistics {
        total_fasts: 0,
        total_hours: 0.0,
        average_duration_ms: 0,
        longest_fast_ms: 0,
    };
}

/// Midnight of `date` in `tz` as a UTC instant.
///
/// When a DST jump removes midnight, 01:00 stands in for it; if that is
/// missing too the zone is doing something tzdb-exotic and plain UTC
/// midnight is used. Ambiguous midnights resolve to their first
/// occurrence.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    for hour in [0u32, 1] {
        let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => continue,
        }
    }
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Monday 00:00 of the current week, local to `tz`.
pub fn week_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let days_back = local.weekday().num_days_from_monday() as i64;
    local_midnight(local.date_naive() - chrono::Duration::days(days_back), tz)
}

/// The 1st of the current month at 00:00, local to `tz`.
pub fn month_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let first = local
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| local.date_naive());
    local_midnight(first, tz)
}

fn aggregate<'a>(entries: impl Iterator<Item = &'a FastEntry>) -> FastStatistics {
    let mut total_fasts = 0;
    let mut total_ms: i64 = 0;
    let mut longest_fast_ms: i64 = 0;
    for entry in entries {
        total_fasts += 1;
        total_ms += entry.duration_ms;
        longest_fast_ms = longest_fast_ms.max(entry.duration_ms);
    }
    if total_fasts == 0 {
        return FastStatistics::ZERO;
    }
    FastStatistics {
        total_fasts,
        total_hours: hours_1dp(total_ms),
        average_duration_ms: total_ms / total_fasts as i64,
        longest_fast_ms,
    }
}

/// Entries that ended on or after this week's Monday-midnight boundary.
pub fn weekly_stats(history: &[FastEntry], now: DateTime<Utc>, tz: Tz) -> FastStatistics {
    let boundary = week_start(now, tz);
    aggregate(history.iter().filter(|e| e.ended_at >= boundary))
}

/// Entries that ended on or after the 1st-of-month midnight boundary.
pub fn monthly_stats(history: &[FastEntry], now: DateTime<Utc>, tz: Tz) -> FastStatistics {
    let boundary = month_start(now, tz);
    aggregate(history.iter().filter(|e| e.ended_at >= boundary))
}

/// Last chronological entry, if any.
pub fn last_fast(history: &[FastEntry]) -> Option<&FastEntry> {
    history.last()
}

/// The last `n` entries, most recent first.
pub fn recent_fasts(history: &[FastEntry], n: usize) -> Vec<&FastEntry> {
    history.iter().rev().take(n).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::Actor;

    const HOUR_MS: i64 = 3_600_000;

    fn paris() -> Tz {
        "Europe/Paris".parse().unwrap()
    }

    fn entry_ending(ended_at: DateTime<Utc>, hours: i64) -> FastEntry {
        FastEntry {
            started_at: ended_at - Duration::hours(hours),
            ended_at,
            duration_ms: hours * HOUR_MS,
            ended_by: Actor::new(1, "Dana"),
        }
    }

    #[test]
    fn week_starts_on_monday_local_midnight() {
        // Wednesday afternoon in Paris (UTC+1 in January).
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        assert_eq!(
            week_start(now, paris()),
            Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn sunday_still_belongs_to_the_running_week() {
        // Sunday 2024-01-21 steps back six days to Monday the 15th.
        let now = Utc.with_ymd_and_hms(2024, 1, 21, 15, 0, 0).unwrap();
        assert_eq!(
            week_start(now, paris()),
            Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        assert_eq!(
            week_start(now, paris()),
            Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_boundary_is_zone_dependent() {
        // 2024-01-14T23:30Z is still Sunday in UTC but already Monday
        // 00:30 in Paris.
        let now = Utc.with_ymd_and_hms(2024, 1, 14, 23, 30, 0).unwrap();
        assert_eq!(
            week_start(now, paris()),
            Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap()
        );
        let utc: Tz = "UTC".parse().unwrap();
        assert_eq!(
            week_start(now, utc),
            Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_starts_on_the_first_local_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        assert_eq!(
            month_start(now, paris()),
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_midnight_falls_forward_to_one_am() {
        // Paraguay sprang forward at 00:00 on 2023-10-01, so that
        // midnight never happened; the boundary lands on 01:00 -03.
        let asuncion: Tz = "America/Asuncion".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2023, 10, 15, 12, 0, 0).unwrap();
        assert_eq!(
            month_start(now, asuncion),
            Utc.with_ymd_and_hms(2023, 10, 1, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekly_stats_filter_on_the_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        let boundary = Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();
        let history = vec![
            entry_ending(boundary - Duration::seconds(1), 10), // last week
            entry_ending(boundary, 16),                        // exactly on it
            entry_ending(boundary + Duration::hours(30), 14),  // this week
        ];

        let stats = weekly_stats(&history, now, paris());
        assert_eq!(stats.total_fasts, 2);
        assert_eq!(stats.total_hours, 30.0);
        assert_eq!(stats.average_duration_ms, 15 * HOUR_MS);
        assert_eq!(stats.longest_fast_ms, 16 * HOUR_MS);
    }

    #[test]
    fn empty_windows_are_all_zero() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        assert_eq!(weekly_stats(&[], now, paris()), FastStatistics::ZERO);

        let stale = vec![entry_ending(now - Duration::days(40), 12)];
        assert_eq!(monthly_stats(&stale, now, paris()), FastStatistics::ZERO);
    }

    #[test]
    fn monthly_window_is_wider_than_weekly() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        let history = vec![
            entry_ending(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap(), 12),
            entry_ending(Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap(), 16),
        ];

        assert_eq!(weekly_stats(&history, now, paris()).total_fasts, 1);
        assert_eq!(monthly_stats(&history, now, paris()).total_fasts, 2);
    }

    #[test]
    fn average_uses_whole_milliseconds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap();
        let history = vec![
            entry_ending(now - Duration::hours(20), 15),
            entry_ending(now - Duration::hours(2), 16),
        ];
        let stats = weekly_stats(&history, now, paris());
        assert_eq!(stats.average_duration_ms, 15 * HOUR_MS + HOUR_MS / 2);
        assert_eq!(stats.total_hours, 31.0);
    }

    #[test]
    fn last_and_recent_read_from_the_tail() {
        assert!(last_fast(&[]).is_none());

        let base = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let history: Vec<FastEntry> = (0..4)
            .map(|i| entry_ending(base + Duration::days(i), 12 + i))
            .collect();

        assert_eq!(last_fast(&history).unwrap().duration_ms, 15 * HOUR_MS);

        let recent = recent_fasts(&history, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].duration_ms, 15 * HOUR_MS);
        assert_eq!(recent[1].duration_ms, 14 * HOUR_MS);

        assert_eq!(recent_fasts(&history, 10).len(), 4);
    }
}
