//! Timestamp handling for scheduling requests.
//!
//! Requests carry ISO-8601 timestamps either as naive local times
//! (`2025-06-15T14:00:00`, interpreted in the request's timezone) or with an
//! explicit offset (`2025-06-15T14:00:00Z`). [`ScheduleTime`] keeps that
//! distinction so the calendar payload can forward the caller's intent, while
//! [`ScheduleTime::resolve`] turns either form into an instant for ordering
//! checks.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// Accepted layouts for timestamps without an offset.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A parsed request timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTime {
    /// Wall-clock time, to be read in the request's timezone.
    Local(NaiveDateTime),
    /// An absolute instant with its original offset.
    Fixed(DateTime<FixedOffset>),
}

impl ScheduleTime {
    /// Parses a request timestamp.
    ///
    /// `field` is the wire name used in the error message.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::Fixed(dt));
        }

        LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(Self::Local)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                field,
                value: value.to_string(),
            })
    }

    /// Resolves this timestamp to an instant.
    ///
    /// Local times inside a DST fold resolve to the earlier instant; local
    /// times inside a DST gap are rejected.
    pub fn resolve(&self, field: &'static str, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
        match self {
            Self::Fixed(dt) => Ok(dt.with_timezone(&Utc)),
            Self::Local(naive) => match tz.from_local_datetime(naive) {
                LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => Err(ValidationError::NonexistentLocalTime {
                    field,
                    value: naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    timezone: tz.name().to_string(),
                }),
            },
        }
    }

    /// Formats the timestamp the way the calendar API expects `dateTime`.
    ///
    /// Local times are sent without an offset so that the accompanying
    /// `timeZone` applies.
    pub fn to_api_string(&self) -> String {
        match self {
            Self::Local(naive) => naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::Fixed(dt) => dt.to_rfc3339(),
        }
    }
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn naive_with_seconds() {
            let t = ScheduleTime::parse("startTime", "2025-06-15T14:00:00").unwrap();
            assert_eq!(t, ScheduleTime::Local(naive(2025, 6, 15, 14, 0)));
        }

        #[test]
        fn naive_without_seconds() {
            let t = ScheduleTime::parse("startTime", "2025-06-15T14:30").unwrap();
            assert_eq!(t, ScheduleTime::Local(naive(2025, 6, 15, 14, 30)));
        }

        #[test]
        fn naive_with_fraction() {
            let t = ScheduleTime::parse("startTime", "2025-06-15T14:00:00.000").unwrap();
            assert_eq!(t, ScheduleTime::Local(naive(2025, 6, 15, 14, 0)));
        }

        #[test]
        fn with_offset() {
            let t = ScheduleTime::parse("endTime", "2025-06-15T14:00:00+02:00").unwrap();
            assert!(matches!(t, ScheduleTime::Fixed(_)));
            let utc = t.resolve("endTime", Tz::UTC).unwrap();
            assert_eq!(utc.to_rfc3339(), "2025-06-15T12:00:00+00:00");
        }

        #[test]
        fn rejects_garbage() {
            let err = ScheduleTime::parse("startTime", "next tuesday").unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidTimestamp {
                    field: "startTime",
                    value: "next tuesday".to_string(),
                }
            );
        }
    }

    mod resolving {
        use super::*;

        #[test]
        fn local_time_uses_zone() {
            let tz = parse_timezone("America/Los_Angeles").unwrap();
            let t = ScheduleTime::Local(naive(2025, 6, 15, 14, 0));
            let utc = t.resolve("startTime", tz).unwrap();
            // PDT is UTC-7 in June
            assert_eq!(utc.to_rfc3339(), "2025-06-15T21:00:00+00:00");
        }

        #[test]
        fn dst_gap_is_rejected() {
            let tz = parse_timezone("America/New_York").unwrap();
            let t = ScheduleTime::Local(naive(2025, 3, 9, 2, 30));
            let err = t.resolve("startTime", tz).unwrap_err();
            assert!(matches!(err, ValidationError::NonexistentLocalTime { .. }));
        }

        #[test]
        fn dst_fold_takes_earliest() {
            let tz = parse_timezone("America/New_York").unwrap();
            let t = ScheduleTime::Local(naive(2025, 11, 2, 1, 30));
            let utc = t.resolve("startTime", tz).unwrap();
            // First 01:30 is still EDT (UTC-4)
            assert_eq!(utc.to_rfc3339(), "2025-11-02T05:30:00+00:00");
        }
    }

    #[test]
    fn api_string_keeps_form() {
        let local = ScheduleTime::parse("startTime", "2025-06-15T14:00").unwrap();
        assert_eq!(local.to_api_string(), "2025-06-15T14:00:00");

        let fixed = ScheduleTime::parse("startTime", "2025-06-15T14:00:00Z").unwrap();
        assert_eq!(fixed.to_api_string(), "2025-06-15T14:00:00+00:00");
    }

    #[test]
    fn timezone_parsing() {
        assert_eq!(parse_timezone("UTC").unwrap(), Tz::UTC);
        assert_eq!(parse_timezone(" Europe/Paris ").unwrap(), Tz::Europe__Paris);
        assert_eq!(
            parse_timezone("Nowhere/Special").unwrap_err(),
            ValidationError::UnknownTimezone("Nowhere/Special".to_string())
        );
    }
}
