//! Time utilities: ISO-8601 due-date parsing into naive local time.
//!
//! Offsets are accepted but dropped; the wall-clock time as written is what
//! gets compared against "now".

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::TriageError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a due date like "2025-03-14", "2025-03-14T17:00:00" or
/// "2025-03-14T17:00:00Z". Date-only values resolve to midnight.
pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, TriageError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.naive_local());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| TriageError::InvalidDueDate(raw.to_string()))
}

/// Current local wall-clock time without zone information.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(parse_due_date("2025-03-14").unwrap(), ndt(2025, 3, 14, 0, 0));
    }

    #[test]
    fn test_datetime_variants() {
        assert_eq!(parse_due_date("2025-03-14T17:30:00").unwrap(), ndt(2025, 3, 14, 17, 30));
        assert_eq!(parse_due_date("2025-03-14 17:30").unwrap(), ndt(2025, 3, 14, 17, 30));
        assert_eq!(parse_due_date("2025-03-14T17:30").unwrap(), ndt(2025, 3, 14, 17, 30));
    }

    #[test]
    fn test_offset_keeps_wall_time() {
        assert_eq!(parse_due_date("2025-03-14T17:30:00Z").unwrap(), ndt(2025, 3, 14, 17, 30));
        assert_eq!(parse_due_date("2025-03-14T17:30:00+05:00").unwrap(), ndt(2025, 3, 14, 17, 30));
    }

    #[test]
    fn test_garbage_is_error() {
        let err = parse_due_date("invalid-date").unwrap_err();
        assert_eq!(err, TriageError::InvalidDueDate("invalid-date".to_string()));
        assert!(parse_due_date("2025-02-30").is_err());
    }
}
