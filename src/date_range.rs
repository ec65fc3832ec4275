// Check-out date resolution for package detail views
// Dates are plain calendar dates. Nothing here goes through a timestamp or a timezone.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateRangeError {
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
}

// Check-in / check-out pair, both inclusive calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    // Build the range for a package of `nights` starting at `check_in`
    pub fn for_package(check_in: NaiveDate, nights: u32) -> Self {
        Self {
            check_in,
            check_out: resolve_checkout(check_in, nights),
        }
    }
}

// Duration counts the arrival day: check-out lands nights - 1 days after check-in.
// Zero nights is clamped to one so check-out never precedes check-in.
pub fn resolve_checkout(check_in: NaiveDate, nights: u32) -> NaiveDate {
    let nights = if nights == 0 {
        tracing::warn!(%check_in, "package duration of 0 nights clamped to 1");
        1
    } else {
        nights
    };

    // Rebuild from components so the arithmetic only ever sees a calendar day
    let (year, month, day) = (check_in.year(), check_in.month(), check_in.day());
    let start = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(check_in);

    start
        .checked_add_days(Days::new(u64::from(nights - 1)))
        .unwrap_or(NaiveDate::MAX)
}

// Parse a `YYYY-MM-DD` string as produced by date pickers
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, DateRangeError> {
    let trimmed = value.trim();
    // Date pickers sometimes hand over a full ISO timestamp; only the date part counts
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DateRangeError::InvalidDate(value.to_string()))
}
