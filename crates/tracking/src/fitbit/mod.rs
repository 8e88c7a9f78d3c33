//! Fitbit Web API integration
//!
//! This module provides:
//! - OAuth2 authorization code flow and token storage
//! - A blocking HTTP client for the sleep, activity, weight and heart endpoints
//! - Normalization of API responses into metric fragments
//! - The [`DayFetcher`](crate::sync::DayFetcher) implementation used by range sync

mod auth;
mod client;
mod fetcher;
mod normalize;

pub use auth::FitbitAuth;
pub use client::FitbitClient;
pub use fetcher::FitbitFetcher;
pub use normalize::{cardio_load, normalize_calories, normalize_other, normalize_sleep};

/// Fitbit API response types
pub mod api {
    use serde::Deserialize;

    /// Response from `/sleep/date/{date}.json`
    #[derive(Debug, Default, Deserialize)]
    pub struct SleepResponse {
        #[serde(default)]
        pub sleep: Vec<SleepLog>,
        pub summary: Option<SleepSummary>,
    }

    /// One sleep period (main sleep or nap)
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SleepLog {
        #[serde(default)]
        pub is_main_sleep: bool,
        /// Minutes
        #[serde(default)]
        pub time_in_bed: u32,
        #[serde(default)]
        pub minutes_asleep: u32,
        /// Local timestamp, e.g. `2025-10-05T23:12:30.000`
        pub start_time: String,
        pub end_time: String,
        pub average_heart_rate: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SleepSummary {
        pub score: Option<f64>,
        pub total_minutes_asleep: Option<u32>,
    }

    /// Response from `/activities/date/{date}.json`
    #[derive(Debug, Default, Deserialize)]
    pub struct ActivityResponse {
        pub summary: Option<ActivitySummary>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ActivitySummary {
        pub calories_out: Option<i64>,
        pub activity_calories: Option<i64>,
        #[serde(rename = "caloriesBMR")]
        pub calories_bmr: Option<i64>,
        pub very_active_minutes: Option<u32>,
        pub fairly_active_minutes: Option<u32>,
    }

    /// Response from `/body/log/weight/date/{date}.json`
    #[derive(Debug, Default, Deserialize)]
    pub struct WeightResponse {
        #[serde(default)]
        pub weight: Vec<WeightLog>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WeightLog {
        pub weight: f64,
    }

    /// Response from `/activities/heart/date/{date}/1d.json`
    #[derive(Debug, Default, Deserialize)]
    pub struct HeartResponse {
        #[serde(rename = "activities-heart", default)]
        pub activities_heart: Vec<HeartDay>,
    }

    #[derive(Debug, Deserialize)]
    pub struct HeartDay {
        pub value: HeartValue,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HeartValue {
        pub resting_heart_rate: Option<u32>,
    }
}
