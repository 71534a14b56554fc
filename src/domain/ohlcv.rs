//! OHLCV bar representation.

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub asset: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare `YYYY-MM-DD`
/// (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_timestamp() {
        let ts = parse_timestamp("2016-10-01 08:30:00").unwrap();
        assert_eq!(ts.to_string(), "2016-10-01 08:30:00");
    }

    #[test]
    fn parses_iso_timestamp() {
        let ts = parse_timestamp("2016-10-01T08:30:00").unwrap();
        assert_eq!(ts.to_string(), "2016-10-01 08:30:00");
    }

    #[test]
    fn bare_date_is_midnight() {
        let ts = parse_timestamp(" 2017-07-01 ").unwrap();
        assert_eq!(ts.to_string(), "2017-07-01 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2017-13-40").is_none());
    }
}
