//! Manual entry of daily metrics
//!
//! Entries are merged into the store like synced data, so a manual diet
//! entry never disturbs the sleep synced for the same day.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;

use crate::dates::date_key;
use crate::models::{CaloriesData, DailyUpdate, DietData, OtherMetrics, SleepData};
use crate::storage::DateStore;

/// Burn components entered alongside a diet entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaloriesInput {
    pub active: i64,
    pub bmr: i64,
    pub unregistered: i64,
}

/// Body and cardio values of a manual entry; the total load is derived
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OtherMetricsInput {
    pub weight_morning: f64,
    pub resting_hr: u32,
    pub cardio_load: u32,
    pub unregistered_cardio_load: u32,
}

/// Writes manually entered fragments into the store
pub struct EntryHandler {
    store: DateStore,
}

impl EntryHandler {
    pub fn new(store: DateStore) -> Self {
        Self { store }
    }

    /// Record sleep for `date`, replacing any stored sleep
    pub fn record_sleep(&self, date: NaiveDate, sleep: SleepData) -> Result<()> {
        validate_sleep(&sleep)?;
        info!("Recording sleep for {}", date_key(date));
        self.store
            .merge_for_date(date, DailyUpdate::new().with_sleep(sleep))
    }

    /// Record diet for `date` together with the calories burned.
    ///
    /// The burned total is the sum of the components and the deficit is
    /// total minus consumed. Returns the derived calories fragment.
    pub fn record_diet(
        &self,
        date: NaiveDate,
        diet: DietData,
        burned: CaloriesInput,
    ) -> Result<CaloriesData> {
        let calories = CaloriesData::from_components(
            burned.active,
            burned.bmr,
            burned.unregistered,
            diet.calories_consumed,
        );
        info!(
            "Recording diet for {} (deficit {})",
            date_key(date),
            calories.calories_deficit
        );
        self.store.merge_for_date(
            date,
            DailyUpdate::new()
                .with_diet(diet)
                .with_calories(calories.clone()),
        )?;
        Ok(calories)
    }

    /// Record weight, resting heart rate and cardio load for `date`
    pub fn record_other(&self, date: NaiveDate, input: OtherMetricsInput) -> Result<OtherMetrics> {
        if !input.weight_morning.is_finite() || input.weight_morning < 0.0 {
            anyhow::bail!("Invalid weight {}", input.weight_morning);
        }

        let other = OtherMetrics::new(
            input.weight_morning,
            input.resting_hr,
            input.cardio_load,
            input.unregistered_cardio_load,
        );
        info!("Recording other metrics for {}", date_key(date));
        self.store
            .merge_for_date(date, DailyUpdate::new().with_other(other.clone()))?;
        Ok(other)
    }
}

fn validate_sleep(sleep: &SleepData) -> Result<()> {
    if sleep.sleep_score > 100 {
        anyhow::bail!("Sleep score must be 0-100, got {}", sleep.sleep_score);
    }
    let hours = [
        sleep.time_in_bed,
        sleep.time_fully_asleep,
        sleep.nap_fully_asleep.unwrap_or(0.0),
    ];
    if hours.iter().any(|h| !h.is_finite() || *h < 0.0) {
        anyhow::bail!("Sleep durations must be non-negative hours");
    }
    Ok(())
}
