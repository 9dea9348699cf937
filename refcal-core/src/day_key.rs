//! Calendar-day keys for the availability index.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::constants::MIDNIGHT_FORMAT;
use crate::error::{RefCalError, RefCalResult};

/// One calendar day, addressed the way the availability document nests it:
/// year, 0-based month, day of month.
///
/// Ordering is chronological. The `Display` form (`2023:2:15`) is the flat
/// store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey {
    year: i32,
    month0: u32,
    day: u32,
}

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        DayKey {
            year: date.year(),
            month0: date.month0(),
            day: date.day(),
        }
    }

    /// Parse an ISO date or date-time. The calendar date is taken as written;
    /// offsets are not applied.
    ///
    /// Accepts `2023-03-15`, `2023-03-15T00:00:00`, `2023-03-15T00:00:00.000`
    /// and RFC 3339 (`2023-03-15T00:00:00Z`, `...+02:00`).
    pub fn parse(s: &str) -> RefCalResult<Self> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_date(dt.date_naive()));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self::from_date(dt.date()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|_| RefCalError::InvalidDate(s.to_string()))
    }

    /// Rebuild a key from the string segments of a document path.
    /// Returns None unless the segments name a real calendar day.
    pub fn from_path(year: &str, month0: &str, day: &str) -> Option<Self> {
        let year: i32 = year.parse().ok()?;
        let month0: u32 = month0.parse().ok()?;
        let day: u32 = day.parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, day)?;
        Some(Self::from_date(date))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn date(&self) -> NaiveDate {
        // Fields only ever come from a valid NaiveDate.
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, self.day).unwrap_or_default()
    }

    /// Document path segments: `("2023", "2", "15")`.
    pub fn path(&self) -> (String, String, String) {
        (
            self.year.to_string(),
            self.month0.to_string(),
            self.day.to_string(),
        )
    }

    /// Date at midnight, e.g. `2023-03-15T00:00:00`.
    pub fn to_midnight_string(&self) -> String {
        self.date().format(MIDNIGHT_FORMAT).to_string()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.year, self.month0, self.day)
    }
}
