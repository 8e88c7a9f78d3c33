//! Month query functions

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::today;
use crate::models::{DailyRecord, FragmentKind};
use crate::storage::DateStore;

/// A calendar month. `month0` is zero-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month0: u32,
}

impl MonthKey {
    /// Returns `None` unless `month0` is in `0..12`
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        (month0 < 12).then_some(Self { year, month0 })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::from_date(today())
    }

    pub fn prev(self) -> Self {
        if self.month0 == 0 {
            Self {
                year: self.year - 1,
                month0: 11,
            }
        } else {
            Self {
                month0: self.month0 - 1,
                ..self
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month0 == 11 {
            Self {
                year: self.year + 1,
                month0: 0,
            }
        } else {
            Self {
                month0: self.month0 + 1,
                ..self
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }

    /// Every civil date of the month, ascending
    pub fn days(self) -> Vec<NaiveDate> {
        match self.first_day() {
            Some(first) => first.iter_days().take_while(|d| self.contains(*d)).collect(),
            None => Vec::new(),
        }
    }

    /// Display label, e.g. "October 2025"
    pub fn label(self) -> String {
        match self.first_day() {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month0 + 1),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One calendar day of a month view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub date: NaiveDate,
    /// Stored record, if anything was tracked that day
    pub record: Option<DailyRecord>,
}

impl DayRow {
    pub fn has(&self, kind: FragmentKind) -> bool {
        self.record.as_ref().is_some_and(|r| r.has(kind))
    }
}

/// A month of daily rows, one per calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub month: MonthKey,
    pub days: Vec<DayRow>,
}

impl MonthView {
    /// Days carrying a fragment of `kind`
    pub fn count(&self, kind: FragmentKind) -> usize {
        self.days.iter().filter(|row| row.has(kind)).count()
    }

    /// Days with at least one fragment
    pub fn recorded_days(&self) -> usize {
        self.days
            .iter()
            .filter(|row| row.record.as_ref().is_some_and(|r| !r.is_empty()))
            .count()
    }
}

/// Build the view of `month` from the store
///
/// Every calendar day gets a row, in order, whether or not it has data.
pub fn month_view(store: &DateStore, month: MonthKey) -> MonthView {
    let mut records = store.get_for_month(month.year, month.month0);
    let days = month
        .days()
        .into_iter()
        .map(|date| DayRow {
            date,
            record: records.remove(&date),
        })
        .collect();

    MonthView { month, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date_key;
    use crate::models::{CaloriesData, DietData};
    use crate::storage::InMemoryKeyValueStore;
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        parse_date_key(s).unwrap()
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let january = MonthKey::new(2025, 0).unwrap();
        assert_eq!(january.prev(), MonthKey::new(2024, 11).unwrap());
        assert_eq!(january.prev().next(), january);

        let december = MonthKey::new(2025, 11).unwrap();
        assert_eq!(december.next(), MonthKey::new(2026, 0).unwrap());
    }

    #[test]
    fn test_month_key_validation() {
        assert!(MonthKey::new(2025, 12).is_none());
        assert_eq!(
            MonthKey::from_date(date("2025-10-31")),
            MonthKey::new(2025, 9).unwrap()
        );
    }

    #[test]
    fn test_month_days() {
        assert_eq!(MonthKey::new(2024, 1).unwrap().days().len(), 29);
        assert_eq!(MonthKey::new(2025, 1).unwrap().days().len(), 28);

        let october = MonthKey::new(2025, 9).unwrap().days();
        assert_eq!(october.len(), 31);
        assert_eq!(october.first(), Some(&date("2025-10-01")));
        assert_eq!(october.last(), Some(&date("2025-10-31")));
    }

    #[test]
    fn test_label() {
        let october = MonthKey::new(2025, 9).unwrap();
        assert_eq!(october.label(), "October 2025");
        assert_eq!(october.to_string(), "October 2025");
    }

    #[test]
    fn test_month_view() {
        let store = DateStore::new(Arc::new(InMemoryKeyValueStore::new()));
        let diet = DietData {
            calories_consumed: 1900,
            protein: 120.0,
            fat: 60.0,
            carbs: 180.0,
            sugar: 25.0,
        };
        store.merge_fragment(date("2025-09-30"), diet.clone().into()).unwrap();
        store.merge_fragment(date("2025-10-01"), diet.into()).unwrap();
        store
            .merge_fragment(
                date("2025-10-31"),
                CaloriesData::from_reported_total(2300, 500, 1600).into(),
            )
            .unwrap();

        let view = month_view(&store, MonthKey::new(2025, 9).unwrap());

        assert_eq!(view.days.len(), 31);
        assert_eq!(view.recorded_days(), 2);
        assert_eq!(view.count(FragmentKind::Diet), 1);
        assert_eq!(view.count(FragmentKind::Calories), 1);
        assert_eq!(view.count(FragmentKind::Sleep), 0);
        assert!(view.days[0].has(FragmentKind::Diet));
        assert!(view.days[1].record.is_none());
        assert!(view.days[30].has(FragmentKind::Calories));
    }
}
