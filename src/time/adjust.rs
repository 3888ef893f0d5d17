//! Parsing of user-supplied time adjustments.
//!
//! Commands like `/fast -2h` or `/endfast 14:30` carry a free-text token
//! that shifts the recorded instant away from "now". Two grammars are
//! accepted, tried in order:
//!
//! 1. Relative: optional sign, positive integer, unit (`h`, `m`, `d`).
//!    A bare amount counts backwards (`2h` means two hours ago).
//! 2. Absolute: `HH:MM`, interpreted as that wall-clock time today in the
//!    user's timezone and converted through the zone's real offset for
//!    that date, DST included.
//!
//! Empty input means "no adjustment" and is not an error.

use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// A rejected adjustment token. Display strings are shown to the user
/// verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeAdjustError {
    /// Relative amount was zero, negative, non-numeric or out of range.
    #[error("Invalid time amount: {raw}")]
    InvalidAmount { raw: String },
    #[error("Invalid hour: {hour}. Must be 0-23")]
    InvalidHour { hour: u32 },
    #[error("Invalid minute: {minute}. Must be 0-59")]
    InvalidMinute { minute: u32 },
    /// The wall-clock time falls inside a DST gap and never occurs on
    /// this date in the given zone.
    #[error("Time {time} does not exist today in {zone}")]
    NonexistentLocalTime { time: String, zone: Tz },
    #[error(
        "Invalid time format: {input}. Use a relative offset like 2h, 30m or +1h, or a clock time like 14:30"
    )]
    InvalidFormat { input: String },
}

/// Parse an adjustment token against a base instant.
///
/// Returns `Ok(None)` when the trimmed input is empty (the caller proceeds
/// with the base instant unchanged). The result is a concrete instant; it
/// is not range-checked here — timeline validation owns the
/// future/backdating rules.
pub fn parse_adjustment(
    input: &str,
    base: DateTime<Utc>,
    tz: Tz,
) -> Result<Option<DateTime<Utc>>, TimeAdjustError> {
    let token = input.trim();
    if token.is_empty() {
        return Ok(None);
    }

    if let Some(shifted) = try_relative(token, base)? {
        return Ok(Some(shifted));
    }
    if token.contains(':') {
        return absolute(token, base, tz).map(Some);
    }

    Err(TimeAdjustError::InvalidFormat {
        input: token.to_string(),
    })
}

/// Relative branch. `Ok(None)` means the token does not look relative at
/// all (no unit suffix) and the next grammar should be tried; a token with
/// a unit suffix but a bad amount is an error, not a fallthrough.
fn try_relative(
    token: &str,
    base: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, TimeAdjustError> {
    let (negative, body) = match token.strip_prefix('+') {
        Some(rest) => (false, rest),
        None => match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (true, token),
        },
    };
    let Some(amount_str) = body
        .strip_suffix('h')
        .or_else(|| body.strip_suffix('m'))
        .or_else(|| body.strip_suffix('d'))
    else {
        return Ok(None);
    };
    // Unit char back out of the body; body and token keep it for messages.
    let unit = body.as_bytes()[body.len() - 1] as char;

    let invalid = || TimeAdjustError::InvalidAmount {
        raw: token.to_string(),
    };
    if amount_str.is_empty() || !amount_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let amount: i64 = amount_str.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let span = match unit {
        'h' => Duration::try_hours(amount),
        'm' => Duration::try_minutes(amount),
        _ => Duration::try_days(amount),
    }
    .ok_or_else(invalid)?;

    let shifted = if negative {
        base.checked_sub_signed(span)
    } else {
        base.checked_add_signed(span)
    };
    shifted.map(Some).ok_or_else(invalid)
}

/// Absolute branch: `HH:MM` on the base instant's local date in `tz`.
fn absolute(token: &str, base: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, TimeAdjustError> {
    let malformed = || TimeAdjustError::InvalidFormat {
        input: token.to_string(),
    };
    let (hour_str, minute_str) = token.split_once(':').ok_or_else(malformed)?;

    if hour_str.is_empty() || hour_str.len() > 2 || !hour_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if minute_str.len() != 2 || !minute_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let hour: u32 = hour_str.parse().map_err(|_| malformed())?;
    let minute: u32 = minute_str.parse().map_err(|_| malformed())?;
    if hour > 23 {
        return Err(TimeAdjustError::InvalidHour { hour });
    }
    if minute > 59 {
        return Err(TimeAdjustError::InvalidMinute { minute });
    }

    // "Today" is the base instant's date in the target zone, not in UTC.
    let local_date = base.with_timezone(&tz).date_naive();
    let naive = local_date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(malformed)?;
    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // Clocks fell back; the wall time happens twice. Take the first.
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(TimeAdjustError::NonexistentLocalTime {
                time: format!("{hour:02}:{minute:02}"),
                zone: tz,
            });
        }
    };
    Ok(resolved.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn paris() -> Tz {
        "Europe/Paris".parse().unwrap()
    }

    fn parse(input: &str) -> Result<Option<DateTime<Utc>>, TimeAdjustError> {
        parse_adjustment(input, base(), paris())
    }

    #[test]
    fn bare_amount_counts_backwards() {
        let parsed = parse("2h").unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn explicit_plus_counts_forwards() {
        let parsed = parse("+1h").unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap());
    }

    #[test]
    fn minutes_and_days_units() {
        assert_eq!(
            parse("30m").unwrap().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
        );
        assert_eq!(
            parse("-45m").unwrap().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 0).unwrap()
        );
        assert_eq!(
            parse("1d").unwrap().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 14, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_input_is_no_adjustment() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn zero_amount_is_rejected_with_the_raw_token() {
        let err = parse("-0h").unwrap_err();
        assert_eq!(err.to_string(), "Invalid time amount: -0h");
        assert_eq!(parse("0m").unwrap_err().to_string(), "Invalid time amount: 0m");
    }

    #[test]
    fn non_numeric_amount_is_an_amount_error() {
        assert_eq!(parse("xh").unwrap_err().to_string(), "Invalid time amount: xh");
        assert_eq!(
            parse("+abcm").unwrap_err().to_string(),
            "Invalid time amount: +abcm"
        );
    }

    #[test]
    fn absurdly_large_amount_is_rejected_not_wrapped() {
        assert!(matches!(
            parse("99999999999999999999h").unwrap_err(),
            TimeAdjustError::InvalidAmount { .. }
        ));
        assert!(matches!(
            parse("9999999999d").unwrap_err(),
            TimeAdjustError::InvalidAmount { .. }
        ));
    }

    #[test]
    fn out_of_range_hour_names_the_field() {
        let err = parse("25:00").unwrap_err();
        assert_eq!(err.to_string(), "Invalid hour: 25. Must be 0-23");
    }

    #[test]
    fn out_of_range_minute_names_the_field() {
        let err = parse("14:75").unwrap_err();
        assert_eq!(err.to_string(), "Invalid minute: 75. Must be 0-59");
    }

    #[test]
    fn absolute_time_uses_the_zone_offset() {
        // Paris in January is UTC+1, so 14:00 local is 13:00Z.
        let parsed = parse("14:00").unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 13, 0, 0).unwrap());
    }

    #[test]
    fn absolute_time_uses_summer_offset_in_summer() {
        let summer_base = Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap();
        let parsed = parse_adjustment("14:00", summer_base, paris()).unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn single_digit_hour_is_accepted() {
        let parsed = parse("9:05").unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 0).unwrap());
    }

    #[test]
    fn today_is_computed_in_the_target_zone() {
        // 16:00Z on Jan 15 is already Jan 16, 01:00 in Tokyo.
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let late_base = Utc.with_ymd_and_hms(2024, 1, 15, 16, 0, 0).unwrap();
        let parsed = parse_adjustment("23:00", late_base, tokyo).unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 16, 14, 0, 0).unwrap());
    }

    #[test]
    fn dst_gap_time_is_rejected() {
        // US clocks jump 02:00 -> 03:00 on 2024-03-10; 02:30 never happens.
        let new_york: Tz = "America/New_York".parse().unwrap();
        let gap_base = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let err = parse_adjustment("02:30", gap_base, new_york).unwrap_err();
        assert_eq!(
            err,
            TimeAdjustError::NonexistentLocalTime {
                time: "02:30".into(),
                zone: new_york,
            }
        );
    }

    #[test]
    fn dst_fold_time_takes_the_earliest_instant() {
        // Paris repeats 02:30 on 2024-10-27; the first pass is UTC+2.
        let fold_base = Utc.with_ymd_and_hms(2024, 10, 27, 12, 0, 0).unwrap();
        let parsed = parse_adjustment("02:30", fold_base, paris()).unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn unrecognized_tokens_get_the_generic_format_error() {
        for input in ["banana", "12-30", "h2", "7:5", "1:234", ":30", "12:"] {
            let err = parse(input).unwrap_err();
            assert!(
                matches!(err, TimeAdjustError::InvalidFormat { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn format_error_names_the_accepted_forms() {
        let message = parse("soon").unwrap_err().to_string();
        assert!(message.contains("soon"));
        assert!(message.contains("2h"));
        assert!(message.contains("14:30"));
    }
}
