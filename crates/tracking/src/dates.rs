//! Calendar date keys
//!
//! Every date in this crate is a timezone-naive civil date. Keys are parsed
//! and formatted strictly as `YYYY-MM-DD`, so the year and month read back
//! from a key never depend on the timezone the process runs in.

use chrono::{Duration, Local, NaiveDate};

/// Persisted date key format
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A string that is not a valid `YYYY-MM-DD` calendar date
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date key {0:?}, expected YYYY-MM-DD")]
pub struct DateKeyError(pub String);

/// Parse a `YYYY-MM-DD` key
pub fn parse_date_key(key: &str) -> Result<NaiveDate, DateKeyError> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
        .map_err(|_| DateKeyError(key.to_string()))
}

/// Format a date as its `YYYY-MM-DD` key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Today's civil date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Every calendar date from `start` to `end` inclusive, ascending.
///
/// Empty when `end` is before `start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Number of calendar dates in the inclusive range (0 when `end < start`)
pub fn day_count(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        0
    } else {
        (end - start).num_days() as usize + 1
    }
}

/// The `days` calendar dates ending at `end` inclusive, as `(start, end)`
pub fn trailing_range(end: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let span = i64::from(days.max(1)) - 1;
    (end - Duration::days(span), end)
}
