//! Date/time utilities
//!
//! Loose parsing of the date inputs accepted by the date filters, and the
//! output formats the drivers need (RFC 3339 / W3C, RFC 822, plain dates).

use crate::core::error::{XmlError, XmlResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// RFC 3339 with a `+hh:mm` offset, also the W3C datetime profile
pub const RFC3339_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// RFC 822 with a four digit year, as used by RSS
pub const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Build the fixed offset for a number of seconds east of UTC
pub fn offset(seconds: i32) -> XmlResult<FixedOffset> {
    FixedOffset::east_opt(seconds)
        .ok_or_else(|| XmlError::BadValue(format!("Invalid UTC offset: {} seconds", seconds)))
}

/// Parse a date input
///
/// Accepted inputs:
/// - a Unix timestamp in seconds (`1241182983`)
/// - `now`
/// - RFC 3339 (`2009-05-01T13:03:03+02:00`)
/// - RFC 2822 (`Fri, 01 May 2009 13:03:03 +0000`)
/// - `YYYY-MM-DD hh:mm:ss`, `YYYY-MM-DDThh:mm:ss` or `YYYY-MM-DD`, read in
///   the given offset
///
/// The result is expressed in `tz`.
///
/// # Example
///
/// ```rust
/// use xmlkit::utils::datetime::{format, offset, parse_datetime, DATE_FORMAT};
///
/// let tz = offset(0).unwrap();
/// let dt = parse_datetime("2020-01-02 10:00:00", tz).unwrap();
/// assert_eq!(format(&dt, DATE_FORMAT), "2020-01-02");
/// ```
pub fn parse_datetime(value: &str, tz: FixedOffset) -> XmlResult<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(XmlError::BadValue("Empty date/time string".to_string()));
    }

    if value.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().with_timezone(&tz));
    }

    if let Ok(timestamp) = value.parse::<i64>() {
        return DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.with_timezone(&tz))
            .ok_or_else(|| XmlError::BadValue(format!("Timestamp out of range: {}", value)));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Ok(dt.with_timezone(&tz));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return localize(naive, tz, value);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| XmlError::BadValue(format!("Invalid date: {}", value)))?;
        return localize(naive, tz, value);
    }

    Err(XmlError::BadValue(format!(
        "Unrecognized date/time: {}",
        value
    )))
}

fn localize(naive: NaiveDateTime, tz: FixedOffset, value: &str) -> XmlResult<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| XmlError::BadValue(format!("Ambiguous local time: {}", value)))
}

/// Format a date/time with a chrono format string
pub fn format(dt: &DateTime<FixedOffset>, fmt: &str) -> String {
    dt.format(fmt).to_string()
}

/// Parse `value` and re-format it
pub fn reformat(value: &str, utc_offset_seconds: i32, fmt: &str) -> XmlResult<String> {
    let dt = parse_datetime(value, offset(utc_offset_seconds)?)?;
    Ok(format(&dt, fmt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        offset(0).unwrap()
    }

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_datetime("1241182983", utc()).unwrap();
        assert_eq!(format(&dt, RFC3339_FORMAT), "2009-05-01T13:03:03+00:00");
        assert_eq!(format(&dt, RFC822_FORMAT), "Fri, 01 May 2009 13:03:03 +0000");
    }

    #[test]
    fn test_parse_rfc3339_converts_offset() {
        let dt = parse_datetime("2009-05-01T15:03:03+02:00", utc()).unwrap();
        assert_eq!(format(&dt, RFC3339_FORMAT), "2009-05-01T13:03:03+00:00");
    }

    #[test]
    fn test_parse_rfc2822() {
        let dt = parse_datetime("Fri, 01 May 2009 13:03:03 +0000", utc()).unwrap();
        assert_eq!(format(&dt, DATE_FORMAT), "2009-05-01");
    }

    #[test]
    fn test_parse_naive_in_offset() {
        let tz = offset(3600).unwrap();
        let dt = parse_datetime("2020-01-02", tz).unwrap();
        assert_eq!(format(&dt, RFC3339_FORMAT), "2020-01-02T00:00:00+01:00");

        let dt = parse_datetime("2020-01-02 10:30:00", tz).unwrap();
        assert_eq!(format(&dt, RFC3339_FORMAT), "2020-01-02T10:30:00+01:00");
    }

    #[test]
    fn test_parse_invalid() {
        for value in ["", "yesterday-ish", "2020-13-45"] {
            assert!(matches!(parse_datetime(value, utc()), Err(XmlError::BadValue(_))));
        }
        assert!(offset(100_000).is_err());
    }

    #[test]
    fn test_reformat() {
        assert_eq!(reformat("2020-01-02", 0, DATE_FORMAT).unwrap(), "2020-01-02");
    }
}
