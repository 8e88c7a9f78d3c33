//! Daily record model and the partial update merged into it

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fragments::{CaloriesData, DietData, Fragment, FragmentKind, OtherMetrics, SleepData};

/// All tracking data for one calendar date
///
/// The date is the record's identity; the store holds at most one record
/// per date. Each fragment is independently present or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<DietData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<CaloriesData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<OtherMetrics>,
}

impl DailyRecord {
    /// Create an empty record for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep: None,
            diet: None,
            calories: None,
            other: None,
        }
    }

    /// Merge an update into this record.
    ///
    /// Every category present in `update` replaces the stored fragment
    /// wholesale. Categories absent from `update` are left untouched.
    pub fn apply(&mut self, update: DailyUpdate) {
        let DailyUpdate {
            sleep,
            diet,
            calories,
            other,
        } = update;

        if let Some(sleep) = sleep {
            self.sleep = Some(sleep);
        }
        if let Some(diet) = diet {
            self.diet = Some(diet);
        }
        if let Some(calories) = calories {
            self.calories = Some(calories);
        }
        if let Some(other) = other {
            self.other = Some(other);
        }
    }

    pub fn has(&self, kind: FragmentKind) -> bool {
        match kind {
            FragmentKind::Sleep => self.sleep.is_some(),
            FragmentKind::Diet => self.diet.is_some(),
            FragmentKind::Calories => self.calories.is_some(),
            FragmentKind::Other => self.other.is_some(),
        }
    }

    /// Categories present on this record, in display order
    pub fn kinds(&self) -> Vec<FragmentKind> {
        FragmentKind::ALL
            .into_iter()
            .filter(|k| self.has(*k))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    /// Burned minus consumed, when both diet and calories are known
    pub fn calorie_balance(&self) -> Option<i64> {
        let diet = self.diet.as_ref()?;
        let calories = self.calories.as_ref()?;
        Some(calories.calories_burned_total - diet.calories_consumed)
    }
}

/// A partial write for one date: one optional slot per category
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyUpdate {
    pub sleep: Option<SleepData>,
    pub diet: Option<DietData>,
    pub calories: Option<CaloriesData>,
    pub other: Option<OtherMetrics>,
}

impl DailyUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sleep(mut self, sleep: SleepData) -> Self {
        self.sleep = Some(sleep);
        self
    }

    pub fn with_diet(mut self, diet: DietData) -> Self {
        self.diet = Some(diet);
        self
    }

    pub fn with_calories(mut self, calories: CaloriesData) -> Self {
        self.calories = Some(calories);
        self
    }

    pub fn with_other(mut self, other: OtherMetrics) -> Self {
        self.other = Some(other);
        self
    }

    /// Put a fragment in its slot, replacing any fragment of the same kind
    pub fn insert(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Sleep(data) => self.sleep = Some(data),
            Fragment::Diet(data) => self.diet = Some(data),
            Fragment::Calories(data) => self.calories = Some(data),
            Fragment::Other(data) => self.other = Some(data),
        }
    }

    /// Number of categories carried by this update
    pub fn len(&self) -> usize {
        [
            self.sleep.is_some(),
            self.diet.is_some(),
            self.calories.is_some(),
            self.other.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Fragment> for DailyUpdate {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        let mut update = DailyUpdate::new();
        for fragment in iter {
            update.insert(fragment);
        }
        update
    }
}
