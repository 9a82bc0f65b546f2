//! Calendar date policy for due dates.
//!
//! Due dates carry no time of day. They are exchanged as `YYYY-MM-DD` and
//! compared against "today" at day granularity, where today comes from an
//! injectable [`Clock`].

use chrono::{NaiveDate, Utc};
use thiserror::Error;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Message reported when a date string does not match [`DATE_FORMAT`].
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Use YYYY-MM-DD";

/// Message reported when a new todo's due date lies before today.
pub const PAST_DUE_DATE_MESSAGE: &str = "Due date cannot be in the past";

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date, time of day discarded.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The date string did not match `YYYY-MM-DD` or named an impossible day.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date format. Use YYYY-MM-DD")]
pub struct InvalidDateFormat;

/// Parse a calendar date in strict `YYYY-MM-DD` form.
///
/// An empty string means "no date" and yields `Ok(None)`. Anything else must
/// be exactly four year digits, two month digits and two day digits separated
/// by dashes, and must name a real day.
pub fn parse_date(s: &str) -> Result<Option<NaiveDate>, InvalidDateFormat> {
    if s.is_empty() {
        return Ok(None);
    }

    let bytes = s.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(InvalidDateFormat);
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(Some)
        .map_err(|_| InvalidDateFormat)
}

/// Whether `date` falls strictly before `today`.
pub fn is_before_today(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}
