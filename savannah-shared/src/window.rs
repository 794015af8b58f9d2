use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

/// Half-open UTC interval `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("end_date must be after start_date")]
    EndNotAfterStart,
    #[error("Invalid {field}: {value}")]
    Unparseable { field: &'static str, value: String },
    #[error("Provide either ?date=YYYY-MM-DD or ?start_date=&end_date=")]
    Missing,
    #[error("Date is out of range")]
    OutOfRange,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if end <= start {
            return Err(WindowError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// `[midnight, next midnight)` of a calendar day in UTC.
    pub fn day(date: NaiveDate) -> Result<Self, WindowError> {
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or(WindowError::OutOfRange)?;
        Self::new(midnight(date), midnight(next))
    }

    /// `[from 00:00, to + 1 day 00:00)`; rejects `to < from`.
    pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> Result<Self, WindowError> {
        if to < from {
            return Err(WindowError::EndNotAfterStart);
        }
        let end = to
            .checked_add_days(Days::new(1))
            .ok_or(WindowError::OutOfRange)?;
        Self::new(midnight(from), midnight(end))
    }

    /// Resolves `?date=` or `?start_date=&end_date=` query parameters.
    /// An explicit range wins when both bounds are present.
    pub fn from_query(
        date: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, WindowError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        if let (Some(start), Some(end)) = (present(start_date), present(end_date)) {
            let start = parse_instant("start_date", start)?;
            let end = parse_instant("end_date", end)?;
            return Self::new(start, end);
        }

        let date = present(date).ok_or(WindowError::Missing)?;
        let instant = parse_instant("date", date)?;
        Self::day(instant.date_naive())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (read as UTC midnight).
pub fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, WindowError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(midnight)
        .map_err(|_| WindowError::Unparseable {
            field,
            value: value.to_string(),
        })
}

/// Serde adapter for instants that may arrive as RFC 3339 or `YYYY-MM-DD`.
pub mod flexible_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant("date", &raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_is_utc_midnight_to_midnight() {
        let window = DateWindow::from_query(Some("2025-03-14"), None, None).unwrap();
        assert_eq!(window.start().to_rfc3339(), "2025-03-14T00:00:00+00:00");
        assert_eq!(window.end().to_rfc3339(), "2025-03-15T00:00:00+00:00");
        assert!(window.contains(window.start()));
        assert!(!window.contains(window.end()));
    }

    #[test]
    fn test_timestamp_date_snaps_to_its_utc_day() {
        let window = DateWindow::from_query(Some("2025-03-14T18:30:00+02:00"), None, None).unwrap();
        assert_eq!(window, DateWindow::day(ymd(2025, 3, 14)).unwrap());
    }

    #[test]
    fn test_range_must_move_forward() {
        assert_eq!(
            DateWindow::from_query(None, Some("2025-03-14"), Some("2025-03-14")),
            Err(WindowError::EndNotAfterStart)
        );
        assert_eq!(
            DateWindow::from_query(None, Some("2025-03-15"), Some("2025-03-14")),
            Err(WindowError::EndNotAfterStart)
        );
        assert!(DateWindow::from_query(None, Some("2025-03-14"), Some("2025-03-16")).is_ok());
    }

    #[test]
    fn test_missing_and_garbage_input() {
        assert_eq!(DateWindow::from_query(None, None, None), Err(WindowError::Missing));
        assert_eq!(DateWindow::from_query(None, Some("2025-03-14"), None), Err(WindowError::Missing));
        assert!(matches!(
            DateWindow::from_query(Some("next tuesday"), None, None),
            Err(WindowError::Unparseable { field: "date", .. })
        ));
    }

    #[test]
    fn test_flexible_instant_accepts_bare_dates() {
        #[derive(serde::Deserialize)]
        struct Stamped {
            #[serde(with = "flexible_instant")]
            at: DateTime<Utc>,
        }
        let stamped: Stamped = serde_json::from_str(r#"{"at":"2025-03-14"}"#).unwrap();
        assert_eq!(stamped.at, DateWindow::day(ymd(2025, 3, 14)).unwrap().start());
    }

    #[test]
    fn test_inclusive_days() {
        let window = DateWindow::days_inclusive(ymd(2025, 1, 1), ymd(2025, 1, 1)).unwrap();
        assert_eq!(window, DateWindow::day(ymd(2025, 1, 1)).unwrap());
        assert!(DateWindow::days_inclusive(ymd(2025, 1, 2), ymd(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_last_representable_day_is_rejected_not_overflowed() {
        assert_eq!(
            DateWindow::from_query(Some("+262142-12-31"), None, None),
            Err(WindowError::OutOfRange)
        );
        assert_eq!(DateWindow::day(NaiveDate::MAX), Err(WindowError::OutOfRange));
        assert_eq!(
            DateWindow::days_inclusive(ymd(2025, 1, 1), NaiveDate::MAX),
            Err(WindowError::OutOfRange)
        );
    }
}
