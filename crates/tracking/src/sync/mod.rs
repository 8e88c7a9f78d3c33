//! Sync engine for fetching and storing daily metrics
//!
//! Dates are processed one after another; re-syncing a date merges the
//! same fragments again, so every operation can be safely retried.

mod cancel;
mod fetcher;
mod progress;
mod range;
mod timing;

pub use cancel::CancellationToken;
pub use fetcher::{DayFetcher, FetchError};
pub use progress::{ChannelObserver, SyncObserver, SyncProgress};
pub use range::{DateRangeSyncer, SyncOptions, SyncResult};
pub use timing::sync_due;
