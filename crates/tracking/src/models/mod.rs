//! Domain models for daily tracking data

mod fragments;
mod record;

pub use fragments::{CaloriesData, DietData, Fragment, FragmentKind, OtherMetrics, SleepData};
pub use record::{DailyRecord, DailyUpdate};
