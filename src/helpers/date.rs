//! Display timestamps for chat messages.
//!
//! Every message carries its creation time as a short `HH:MM DD/MM/YYYY`
//! string. Optimistic messages use the local clock, history records use the
//! timestamp sent by the chat service.

use chrono::{DateTime, FixedOffset, Local, TimeZone};

const DISPLAY_FORMAT: &str = "%H:%M %d/%m/%Y";

/// Timestamp layouts accepted from the chat service, tried in order.
/// The service emits PostgreSQL-style values such as `2026-01-22 19:17:31.887+01`.
const API_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised timestamp `{0}`")]
pub struct TimestampError(pub String);

/// Format a timestamp in its own time zone.
pub fn pretty_format<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn pretty_format_now() -> String {
    pretty_format(&Local::now())
}

/// Parse a timestamp as sent by the chat service.
pub fn parse_api_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date);
    }
    API_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| TimestampError(raw.to_string()))
}

/// Format a chat service timestamp in the local time zone.
pub fn pretty_format_from_api(raw: &str) -> Result<String, TimestampError> {
    let date = parse_api_timestamp(raw)?;
    Ok(pretty_format(&date.with_timezone(&Local)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_format_uses_day_of_month() {
        let date = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 22, 9, 5, 31)
            .unwrap();
        assert_eq!(pretty_format(&date), "09:05 22/01/2026");
    }

    #[test]
    fn test_parse_api_timestamp_hour_offset() {
        let date = parse_api_timestamp("2026-01-22 19:17:31.887+01").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 3600);
        assert_eq!(pretty_format(&date), "19:17 22/01/2026");
    }

    #[test]
    fn test_parse_api_timestamp_without_fraction() {
        let date = parse_api_timestamp("2026-03-02 08:00:00+02:00").unwrap();
        assert_eq!(pretty_format(&date), "08:00 02/03/2026");
    }

    #[test]
    fn test_parse_api_timestamp_rfc3339() {
        let date = parse_api_timestamp("2025-12-31T23:59:59Z").unwrap();
        assert_eq!(pretty_format(&date), "23:59 31/12/2025");
    }

    #[test]
    fn test_parse_api_timestamp_rejects_garbage() {
        let err = parse_api_timestamp("yesterday").unwrap_err();
        assert_eq!(err, TimestampError("yesterday".to_string()));
    }

    #[test]
    fn test_pretty_format_from_api_is_local_time() {
        let raw = "2026-01-22 19:17:31.887+01";
        let expected = pretty_format(&parse_api_timestamp(raw).unwrap().with_timezone(&Local));
        assert_eq!(pretty_format_from_api(raw).unwrap(), expected);
    }

    #[test]
    fn test_pretty_format_now_shape() {
        let now = pretty_format_now();
        assert_eq!(now.len(), "00:00 01/01/2026".len());
        assert_eq!(&now[2..3], ":");
    }
}
