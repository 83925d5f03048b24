//! Lenient field parsers shared by the cleaner and the CSV readers.
//!
//! Both functions are total: malformed input yields `None` or `0`, never an
//! error, so a single bad cell cannot fail a whole run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Layouts without an offset; parsed values are taken to be UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses an upload timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, with or without offset),
/// space-separated timestamps with an offset (`2024-01-01 00:00:00+00:00`),
/// naive timestamps (read as UTC), and bare dates (midnight UTC).
/// Returns `None` for empty or unrecognised input.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Coerces a count cell (views, likes, comments) to a non-negative integer.
///
/// Integer text parses directly; finite decimal text is truncated toward
/// zero. Empty, non-numeric, negative, and non-finite input all yield `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_count(raw: &str) -> u64 {
    let s = raw.trim();
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }

    match s.parse::<f64>() {
        // `as` saturates at u64::MAX for huge values.
        Ok(v) if v.is_finite() && v >= 1.0 => v.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_zulu() {
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00Z"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn parses_rfc3339_with_offset_into_utc() {
        assert_eq!(
            parse_timestamp("2024-08-15T18:30:00+02:00"),
            Some(utc(2024, 8, 15, 16, 30, 0))
        );
    }

    #[test]
    fn parses_space_separated_with_offset() {
        assert_eq!(
            parse_timestamp("2024-08-15 16:00:00+00:00"),
            Some(utc(2024, 8, 15, 16, 0, 0))
        );
    }

    #[test]
    fn parses_naive_timestamps_as_utc() {
        assert_eq!(
            parse_timestamp("2024-08-15T16:00:00"),
            Some(utc(2024, 8, 15, 16, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2024-08-15 16:00:00"),
            Some(utc(2024, 8, 15, 16, 0, 0))
        );
    }

    #[test]
    fn parses_fractional_seconds() {
        let parsed = parse_timestamp("2024-08-15T16:00:00.250").expect("should parse");
        assert_eq!(parsed.second(), 0);
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let parsed = parse_timestamp("2024-01-03").expect("should parse");
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 1, 3));
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            parse_timestamp("  2024-01-01T00:00:00Z \n"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn rejects_garbage_and_empty() {
        for raw in ["", "   ", "yesterday", "2024-13-01", "2024-02-30T00:00:00Z", "12/01/2024"] {
            assert_eq!(parse_timestamp(raw), None, "input {raw:?} should not parse");
        }
    }

    #[test]
    fn coerce_count_parses_integers() {
        assert_eq!(coerce_count("100"), 100);
        assert_eq!(coerce_count(" 42 "), 42);
        assert_eq!(coerce_count("0"), 0);
    }

    #[test]
    fn coerce_count_truncates_decimals() {
        assert_eq!(coerce_count("12.9"), 12);
        assert_eq!(coerce_count("1e3"), 1000);
    }

    #[test]
    fn coerce_count_never_fails() {
        for raw in ["", "bad", "-5", "-0.5", "0.4", "NaN", "inf", "-inf", "1,234", "--3", "12abc"] {
            assert_eq!(coerce_count(raw), 0, "input {raw:?} should coerce to 0");
        }
    }
}
