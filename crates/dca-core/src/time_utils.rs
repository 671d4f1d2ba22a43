use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use tracing::debug;

// ── System timezone detection ─────────────────────────────────────────────────

/// IANA name of the system timezone, or `"UTC"` when it cannot be read.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Naive layouts the backend emits for timestamps without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

// ── Calendar dates ────────────────────────────────────────────────────────────

/// Extract the calendar date a record belongs to, as written.
///
/// Accepts a bare `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive
/// date-time. The date component is taken verbatim without any timezone
/// conversion, so `2024-01-01T23:30:00-06:00` is `2024-01-01`.
/// Returns `None` when no date can be recovered.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.date())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses backend timestamps into UTC.
///
/// Timestamps without an offset are read in the handler's default timezone
/// (the server's, normally UTC).
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Unknown names fall back to UTC.
    pub fn new(tz_name: &str) -> Self {
        Self {
            default_tz: resolve_timezone(tz_name),
        }
    }

    /// RFC 3339, one of the naive layouts, or a bare date (midnight).
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                if let chrono::LocalResult::Single(dt) = self.default_tz.from_local_datetime(&naive)
                {
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }

        // A bare date is midnight in the default timezone.
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            if let chrono::LocalResult::Single(dt) = self.default_tz.from_local_datetime(&midnight)
            {
                return Some(dt.with_timezone(&Utc));
            }
        }

        debug!(timestamp = s, "unparseable timestamp");
        None
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

/// `true` for a recognised IANA timezone name.
pub fn is_valid_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

/// Parse an IANA name, falling back to UTC.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        debug!(
            "unrecognised timezone \"{}\", falling back to UTC",
            tz_name
        );
        Tz::UTC
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    // ── parse_calendar_date ──────────────────────────────────────────────────

    #[test]
    fn test_calendar_date_plain() {
        let d = parse_calendar_date("2024-01-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 15));
    }

    #[test]
    fn test_calendar_date_iso_with_time() {
        let d = parse_calendar_date("2024-01-15T10:30:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let d = parse_calendar_date("2024-01-15T10:30:00.123456").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let d = parse_calendar_date("2024-01-15 10:30:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_calendar_date_keeps_written_day_despite_offset() {
        let d = parse_calendar_date("2024-01-01T23:30:00-06:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let d = parse_calendar_date("2024-01-01T00:10:00Z").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_calendar_date_rejects_garbage() {
        assert!(parse_calendar_date("").is_none());
        assert!(parse_calendar_date("   ").is_none());
        assert!(parse_calendar_date("not-a-date").is_none());
        assert!(parse_calendar_date("2024-13-45").is_none());
    }

    // ── resolve_timezone ─────────────────────────────────────────────────────

    #[test]
    fn test_resolve_timezone() {
        assert_eq!(resolve_timezone("America/Guatemala"), Tz::America__Guatemala);
        assert_eq!(resolve_timezone("Mars/Olympus"), Tz::UTC);
        assert_eq!(resolve_timezone(""), Tz::UTC);
        assert!(is_valid_timezone("UTC"));
        assert!(!is_valid_timezone("Mars/Olympus"));
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Invalid/Timezone");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    // ── TimezoneHandler::parse_timestamp ─────────────────────────────────────

    #[test]
    fn test_parse_timestamp_z_suffix() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler
            .parse_timestamp("2024-01-15T12:00:00+02:00")
            .unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_timestamp_uses_default_tz() {
        // Guatemala is UTC-6 with no DST.
        let handler = TimezoneHandler::new("America/Guatemala");
        let dt = handler.parse_timestamp("2024-01-15T10:00:00").unwrap();
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn test_parse_bare_date() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-03-01").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 1, 0));
    }

    #[test]
    fn test_parse_timestamp_empty_and_garbage() {
        let handler = TimezoneHandler::new("UTC");
        assert!(handler.parse_timestamp("").is_none());
        assert!(handler.parse_timestamp("not-a-date").is_none());
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
