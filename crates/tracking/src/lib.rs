//! Tracking crate - Business logic for personal health tracking
//!
//! This crate provides platform-independent tracking functionality including:
//! - Domain models (DailyRecord and its sleep/diet/calories/other fragments)
//! - Storage trait abstractions and the date-keyed merge store
//! - Fitbit API client and OAuth authentication
//! - Sequential, per-date fault tolerant range sync
//! - Month queries and manual entry
//!
//! This crate has zero UI dependencies.

pub mod config;
pub mod dates;
pub mod entries;
pub mod fitbit;
pub mod models;
pub mod query;
pub mod storage;
pub mod sync;

pub use config::{FitbitCredentials, SyncSettings};
pub use dates::{DateKeyError, date_key, parse_date_key, today};
pub use entries::{CaloriesInput, EntryHandler, OtherMetricsInput};
pub use fitbit::{FitbitAuth, FitbitClient, FitbitFetcher};
pub use models::{
    CaloriesData, DailyRecord, DailyUpdate, DietData, Fragment, FragmentKind, OtherMetrics,
    SleepData,
};
pub use query::{DayRow, MonthKey, MonthView, month_view};
pub use storage::{DateStore, InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
pub use sync::{
    // Sync execution
    DateRangeSyncer, SyncOptions, SyncResult,
    // Fetch contract
    DayFetcher, FetchError,
    // Progress and cancellation
    CancellationToken, ChannelObserver, SyncObserver, SyncProgress,
    // Sync timing (for status reporting)
    sync_due,
};
