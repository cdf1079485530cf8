//! `born_at` timestamp normalization
//!
//! The source encodes birth timestamps as null, epoch seconds, epoch
//! milliseconds or free-text dates. Everything is resolved to a UTC instant
//! with the zone stripped. Nothing in this module fails a record: values that
//! cannot be understood become `None`.
//!
//! Epoch `0` is read as "unknown" and yields `None`, so 1970-01-01T00:00:00Z
//! cannot be represented. Downstream consumers rely on this.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

/// Numeric values above this magnitude are epoch milliseconds
const MILLIS_THRESHOLD: f64 = 1e10;

/// Largest accepted epoch second (signed 32-bit bound)
const MAX_EPOCH_SECONDS: i64 = 2_147_483_647;

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M%z",
];

/// Date-time formats without a zone, tried in order
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%B %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M",
    // asctime
    "%a %b %d %H:%M:%S %Y",
    "%a %b %e %H:%M:%S %Y",
];

/// Date-only formats, read as midnight
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%Y%m%d",
];

/// Trailing zone names that mean UTC
const UTC_DESIGNATORS: &[&str] = &["utc", "gmt", "z"];

/// Time followed by an hour-only offset such as `+01`
fn hour_offset_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(.*\d:\d{2}(?::\d{2}(?:\.\d+)?)?)\s*([+-])(\d{2})$").ok())
        .as_ref()
}

/// Normalize a raw `born_at` value
///
/// # Examples
///
/// ```
/// use animal_etl::core::transform::timestamp::normalize_timestamp;
/// use serde_json::json;
///
/// let from_millis = normalize_timestamp(Some(&json!(1700000000000_i64)));
/// let from_text = normalize_timestamp(Some(&json!("2023-11-14T22:13:20Z")));
/// assert!(from_millis.is_some());
/// assert_eq!(from_millis, from_text);
///
/// assert_eq!(normalize_timestamp(Some(&json!(0))), None);
/// assert_eq!(normalize_timestamp(Some(&json!("not a date"))), None);
/// ```
pub fn normalize_timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => from_epoch(number),
        Some(Value::String(text)) => parse_datetime_str(text),
        Some(other) => {
            tracing::debug!(value = %other, "Ignoring born_at value of unsupported type");
            None
        }
    }
}

/// Convert an epoch number (seconds, or milliseconds above 1e10) to a
/// zone-stripped UTC instant
pub fn from_epoch(number: &Number) -> Option<NaiveDateTime> {
    let (seconds, nanos) = if let Some(raw) = number.as_i64() {
        if (raw as f64).abs() > MILLIS_THRESHOLD {
            (
                raw.div_euclid(1000),
                (raw.rem_euclid(1000) * 1_000_000) as u32,
            )
        } else {
            (raw, 0)
        }
    } else {
        let raw = number.as_f64()?;
        let seconds = if raw.abs() > MILLIS_THRESHOLD {
            raw / 1000.0
        } else {
            raw
        };

        if seconds.abs() > MAX_EPOCH_SECONDS as f64 {
            tracing::warn!(value = %number, "Timestamp seems too large, skipping");
            return None;
        }

        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
        (whole as i64, nanos)
    };

    if seconds == 0 && nanos == 0 {
        return None;
    }

    if seconds.abs() > MAX_EPOCH_SECONDS {
        tracing::warn!(value = %number, "Timestamp seems too large, skipping");
        return None;
    }

    DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
}

/// Parse free-text date input permissively
///
/// Zoned input is converted to UTC before the zone is dropped; zone-less
/// input is kept as written. Empty, `"null"` and `"none"` (any case) are
/// treated as absent.
pub fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() || matches!(trimmed.to_lowercase().as_str(), "null" | "none") {
        return None;
    }

    let parsed = parse_zoned(trimmed)
        .or_else(|| expand_hour_offset(trimmed).and_then(|text| parse_zoned(&text)))
        .or_else(|| parse_naive(strip_utc_designator(trimmed)));

    if parsed.is_none() {
        tracing::warn!(value = trimmed, "Could not parse date string");
    }

    parsed
}

/// `...22:13:20+01` becomes `...22:13:20+0100`
fn expand_hour_offset(text: &str) -> Option<String> {
    hour_offset_pattern()?
        .captures(text)
        .map(|caps| format!("{}{}{}00", &caps[1], &caps[2], &caps[3]))
}

/// Drop a trailing `UTC`, `GMT` or `Z` (any case) that follows a digit
fn strip_utc_designator(text: &str) -> &str {
    let lower = text.to_ascii_lowercase();
    UTC_DESIGNATORS
        .iter()
        .find_map(|zone| {
            let rest = lower.strip_suffix(zone)?;
            let head = text[..rest.len()].trim_end();
            head.ends_with(|c: char| c.is_ascii_digit()).then_some(head)
        })
        .unwrap_or(text)
}

fn parse_zoned(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.naive_utc())
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn test_absent_and_null() {
        assert_eq!(normalize_timestamp(None), None);
        assert_eq!(normalize_timestamp(Some(&Value::Null)), None);
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(
            normalize_timestamp(Some(&json!(1700000000))),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
    }

    #[test]
    fn test_epoch_millis_keeps_fraction() {
        let parsed = normalize_timestamp(Some(&json!(1700000000250_i64))).unwrap();
        assert_eq!(
            parsed,
            at(2023, 11, 14, 22, 13, 20) + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_epoch_float_seconds() {
        assert_eq!(
            normalize_timestamp(Some(&json!(1700000000.0))),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
    }

    #[test]
    fn test_epoch_zero_is_unknown() {
        assert_eq!(normalize_timestamp(Some(&json!(0))), None);
        assert_eq!(normalize_timestamp(Some(&json!(0.0))), None);
    }

    #[test]
    fn test_out_of_range_discarded() {
        // Above 1e10 is read as milliseconds, so this is ~3.2e9 seconds
        assert_eq!(normalize_timestamp(Some(&json!(3_200_000_000_000_i64))), None);
        assert_eq!(normalize_timestamp(Some(&json!(2_147_483_648_i64))), None);
        assert!(normalize_timestamp(Some(&json!(2_147_483_647_i64))).is_some());
    }

    #[test]
    fn test_negative_epoch() {
        assert_eq!(
            normalize_timestamp(Some(&json!(-86400))),
            Some(at(1969, 12, 31, 0, 0, 0))
        );
    }

    #[test]
    fn test_zoned_string_converted_to_utc() {
        assert_eq!(
            parse_datetime_str("2023-11-15T00:13:20+02:00"),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
        assert_eq!(
            parse_datetime_str("Tue, 14 Nov 2023 22:13:20 +0000"),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
    }

    #[test]
    fn test_naive_string_kept_as_is() {
        assert_eq!(
            parse_datetime_str("2023-11-14 22:13:20"),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
        assert_eq!(
            parse_datetime_str("  2023-11-14T22:13  "),
            Some(at(2023, 11, 14, 22, 13, 0))
        );
    }

    #[test]
    fn test_date_only_strings() {
        assert_eq!(parse_datetime_str("2020-02-29"), Some(at(2020, 2, 29, 0, 0, 0)));
        assert_eq!(parse_datetime_str("03/15/2019"), Some(at(2019, 3, 15, 0, 0, 0)));
        assert_eq!(parse_datetime_str("Jan 5, 2001"), Some(at(2001, 1, 5, 0, 0, 0)));
    }

    #[test]
    fn test_utc_zone_names() {
        let expected = Some(at(2023, 11, 14, 22, 13, 20));
        assert_eq!(parse_datetime_str("2023-11-14 22:13:20 UTC"), expected);
        assert_eq!(parse_datetime_str("2023-11-14T22:13:20 gmt"), expected);
        assert_eq!(parse_datetime_str("2023-11-14T22:13:20Z"), expected);
        assert_eq!(parse_datetime_str("Sunday"), None);
    }

    #[test]
    fn test_asctime_and_month_names() {
        assert_eq!(
            parse_datetime_str("Tue Nov 14 22:13:20 2023"),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
        assert_eq!(parse_datetime_str("Nov 14 2023"), Some(at(2023, 11, 14, 0, 0, 0)));
        assert_eq!(
            parse_datetime_str("14 November 2023 22:13"),
            Some(at(2023, 11, 14, 22, 13, 0))
        );
        assert_eq!(parse_datetime_str("05-Jan-2001"), Some(at(2001, 1, 5, 0, 0, 0)));
    }

    #[test]
    fn test_hour_only_offset() {
        assert_eq!(
            parse_datetime_str("2023-11-14T22:13:20+01"),
            Some(at(2023, 11, 14, 21, 13, 20))
        );
        assert_eq!(
            parse_datetime_str("2023-11-14 22:13:20 -05"),
            Some(at(2023, 11, 15, 3, 13, 20))
        );
    }

    #[test]
    fn test_sentinel_strings() {
        assert_eq!(parse_datetime_str(""), None);
        assert_eq!(parse_datetime_str("   "), None);
        assert_eq!(parse_datetime_str("NULL"), None);
        assert_eq!(parse_datetime_str("None"), None);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_datetime_str("sometime last spring"), None);
        assert_eq!(parse_datetime_str("2023-13-45"), None);
    }

    #[test]
    fn test_unsupported_types_are_none() {
        assert_eq!(normalize_timestamp(Some(&json!(true))), None);
        assert_eq!(normalize_timestamp(Some(&json!([2023, 11, 14]))), None);
        assert_eq!(normalize_timestamp(Some(&json!({"year": 2023}))), None);
    }
}
