//! Timestamp parsing for command-line input.

use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDateTime, NaiveTime};

const FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a full timestamp, or `HH:MM` meaning today at that time.
pub fn parse_timestamp(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();

    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }

    NaiveTime::parse_from_str(s, "%H:%M")
        .map(|t| Local::now().date_naive().and_time(t))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

/// `--at` value if given, otherwise the current local time.
pub fn timestamp_or_now(input: Option<&String>) -> AppResult<NaiveDateTime> {
    match input {
        Some(s) => parse_timestamp(s),
        None => Ok(Local::now().naive_local()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn accepts_space_and_iso_forms() {
        let a = parse_timestamp("2025-03-01 08:30").unwrap();
        let b = parse_timestamp("2025-03-01T08:30:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bare_time_means_today() {
        let ts = parse_timestamp("07:45").unwrap();
        assert_eq!(ts.date(), Local::now().date_naive());
        assert_eq!((ts.hour(), ts.minute()), (7, 45));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_timestamp("yesterday-ish"),
            Err(AppError::InvalidTimestamp(_))
        ));
    }
}
