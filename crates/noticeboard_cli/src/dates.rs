//! Conversions between user-facing date strings and epoch milliseconds.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses RFC 3339, or a local wall-clock time such as `2026-10-16 09:30`.
pub fn parse_datetime(value: &str) -> Result<i64, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .ok_or_else(|| format!("`{value}` does not exist in the local time zone"));
        }
    }

    Err(format!(
        "invalid date `{value}`; expected RFC 3339 or \"YYYY-MM-DD HH:MM\""
    ))
}

/// Formats epoch milliseconds as local `YYYY-MM-DD HH:MM`.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => epoch_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_epoch_ms, parse_datetime};

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(parse_datetime("1970-01-01T00:01:00Z"), Ok(60_000));
        assert_eq!(parse_datetime("1970-01-01T01:00:00+01:00"), Ok(0));
    }

    #[test]
    fn local_formats_round_trip_through_display() {
        let parsed = parse_datetime("2026-10-16 09:30").unwrap();
        assert_eq!(format_epoch_ms(parsed), "2026-10-16 09:30");
        assert_eq!(parse_datetime("2026-10-16T09:30"), Ok(parsed));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime("next tuesday").unwrap_err();
        assert!(err.contains("invalid date"));
    }
}
