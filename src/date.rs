//! Front matter date parsing and display.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%B %d, %Y";

/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}

pub fn format_date(date: NaiveDateTime) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_as_midnight() {
        let date = parse_date("2024-03-01").unwrap();
        assert_eq!(date.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        let date = parse_date("2020-05-01T12:30:00.000+02:00").unwrap();
        assert_eq!(date.to_string(), "2020-05-01 10:30:00");
    }

    #[test]
    fn parses_space_separated_datetime() {
        assert!(parse_date("2021-12-31 23:59:59").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("last tuesday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn formats_long_month() {
        let date = parse_date("2024-01-05").unwrap();
        assert_eq!(format_date(date), "January 05, 2024");
    }
}
