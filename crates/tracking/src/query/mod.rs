//! Query API for display
//!
//! Provides month-oriented views over the stored daily records.

mod month;

pub use month::{DayRow, MonthKey, MonthView, month_view};
