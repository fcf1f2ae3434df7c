//! Timestamp handling for the ÖBB timetable API.
//!
//! The API exchanges departure and arrival times as local wall-clock
//! timestamps without a zone suffix, e.g. `2024-03-15T14:30:00.000`.
//! The paginator feeds a timestamp it received back into the next request,
//! so parsing and formatting must agree on exactly this textual form.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Layout used for the seconds-precision part of every API timestamp.
const BASE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layout accepted when parsing; the fractional part is optional.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A timestamp as sent and received by the timetable API.
///
/// Formatting emits milliseconds with trailing zeros trimmed, and omits the
/// fraction entirely when it is zero. Sub-millisecond precision is dropped
/// at construction so that format and parse are exact inverses.
///
/// # Examples
///
/// ```
/// use oebb::domain::ApiTime;
///
/// let t = ApiTime::parse("2024-03-15T14:30:00.000").unwrap();
/// assert_eq!(t.to_string(), "2024-03-15T14:30:00");
/// assert_eq!(t.clock(), "14:30");
///
/// let t = ApiTime::parse("2024-03-15T14:30:05.250").unwrap();
/// assert_eq!(t.to_string(), "2024-03-15T14:30:05.25");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiTime(NaiveDateTime);

impl ApiTime {
    /// Create a timestamp, truncating to millisecond precision.
    pub fn new(datetime: NaiveDateTime) -> Self {
        let millis = datetime.nanosecond() / 1_000_000;
        let truncated = datetime
            .with_nanosecond(millis * 1_000_000)
            .unwrap_or(datetime);
        Self(truncated)
    }

    /// Parse an API timestamp (`YYYY-MM-DDTHH:MM:SS[.fff]`).
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        NaiveDateTime::parse_from_str(s.trim(), PARSE_FORMAT)
            .map(Self::new)
            .map_err(|_| TimeError::new("expected YYYY-MM-DDTHH:MM:SS[.fff]"))
    }

    /// Parse a wall-clock time in "HH:MM" format on the given date.
    ///
    /// # Examples
    ///
    /// ```
    /// use oebb::domain::ApiTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let t = ApiTime::parse_clock("07:05", date).unwrap();
    /// assert_eq!(t.to_string(), "2024-03-15T07:05:00");
    ///
    /// assert!(ApiTime::parse_clock("705", date).is_err());
    /// assert!(ApiTime::parse_clock("24:00", date).is_err());
    /// ```
    pub fn parse_clock(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self(date.and_time(time)))
    }

    /// Returns the underlying date and time.
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns the time of day as "HH:MM".
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.0.hour(), self.0.minute())
    }

    /// Add a duration, returning `None` on overflow.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self)
    }
}

impl From<NaiveDateTime> for ApiTime {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::new(datetime)
    }
}

impl fmt::Debug for ApiTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiTime({self})")
    }
}

impl fmt::Display for ApiTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(BASE_FORMAT))?;

        let millis = self.0.nanosecond() / 1_000_000;
        if millis == 0 {
            return Ok(());
        }

        let fraction = format!("{millis:03}");
        write!(f, ".{}", fraction.trim_end_matches('0'))
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
