//! External fetch contract for one calendar date

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::DailyUpdate;

/// Why a date could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not authenticated with the data source")]
    NotAuthenticated,
    #[error("request to {endpoint} failed with HTTP {status}")]
    Http { status: u16, endpoint: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Http { status, .. } => *status == 429 || *status >= 500,
            FetchError::NotAuthenticated | FetchError::Decode(_) => false,
        }
    }
}

/// Source of daily metrics for a date.
///
/// Returns the fragments found for `date`; an empty update means nothing
/// was recorded that day. Authentication is the implementor's concern.
pub trait DayFetcher: Send + Sync {
    fn fetch_day(&self, date: NaiveDate) -> Result<DailyUpdate, FetchError>;
}
