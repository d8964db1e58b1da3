//! Centralized timestamp parsing.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Failure to parse a timestamp string.
#[derive(Debug, Error)]
pub enum TimestampParseError {
    #[error("timestamp is empty")]
    Empty,

    #[error("unsupported timestamp format: {0:?}")]
    Unsupported(String),
}

/// Excel 1900 date system: day 0 is 1899-12-30.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values above this are assumed to be Excel dates rather than some
/// other numeric field that leaked in.
const EXCEL_SERIAL_MIN: f64 = 20_000.0;

/// Parse common timestamp formats into a UTC datetime.
///
/// Supports:
/// - ISO8601 with offset or trailing `Z`, or naive (`2026-01-17T12:00:00`)
/// - bare date (`2026-01-17`, midnight UTC)
/// - `"YYYY-MM-DD HH:MM:SS"`
/// - US dates `MM/DD/YYYY` and `MM/DD/YY`
/// - Excel serial dates (> 20000), truncated to midnight
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimestampParseError::Empty);
    }

    // Excel serial date (common in .xlsx XML).
    if let Ok(serial) = s.parse::<f64>() {
        if serial > EXCEL_SERIAL_MIN {
            let (y, m, d) = EXCEL_EPOCH;
            let base = NaiveDate::from_ymd_opt(y, m, d)
                .expect("valid epoch")
                .and_hms_opt(0, 0, 0)
                .expect("valid midnight");
            let dt = base + Duration::days(serial.trunc() as i64);
            return Ok(Utc.from_utc_datetime(&dt.date().and_hms_opt(0, 0, 0).expect("midnight")));
        }
    }

    // ISO8601 with explicit offset (handles the trailing-Z form too).
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Naive ISO8601 / "YYYY-MM-DD HH:MM:SS".
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    // Bare date, then US date formats.
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0).expect("midnight");
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    Err(TimestampParseError::Unsupported(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_iso8601_with_offset() {
        let dt = parse_timestamp("2026-01-17T12:00:00+00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-17T12:00:00+00:00");
    }

    #[test]
    fn parses_iso8601_z_suffix() {
        let dt = parse_timestamp("2026-01-17T12:00:00Z").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn parses_naive_datetime() {
        let dt = parse_timestamp("2026-01-17 12:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-17T12:30:00+00:00");
    }

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let dt = parse_timestamp("2026-01-17").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-17T00:00:00+00:00");
    }

    #[test]
    fn parses_us_date_formats() {
        let long = parse_timestamp("01/17/2026").unwrap();
        let short = parse_timestamp("1/17/26").unwrap();
        assert_eq!(long, short);
        assert_eq!(long.to_rfc3339(), "2026-01-17T00:00:00+00:00");
    }

    #[test]
    fn parses_excel_serial() {
        // 46031 days after 1899-12-30 is 2026-01-09.
        let dt = parse_timestamp("46031").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-09T00:00:00+00:00");
    }

    #[test]
    fn small_numbers_are_not_dates() {
        assert!(parse_timestamp("123").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_timestamp("next tuesday"),
            Err(TimestampParseError::Unsupported(_))
        ));
        assert!(matches!(parse_timestamp("  "), Err(TimestampParseError::Empty)));
    }
}
