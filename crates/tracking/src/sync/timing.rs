//! Sync timing utilities
//!
//! Pure functions that can be tested without a clock or a store.

use chrono::NaiveDate;

/// Check whether a new sync is due given the last-sync marker.
///
/// # Arguments
/// * `last_sync` - End date of the last completed range sync (None if never synced)
/// * `today` - Current civil date
/// * `max_age_days` - Days the marker may lag behind `today` before a sync is due
///
/// # Returns
/// `true` if never synced or the marker is more than `max_age_days` old
pub fn sync_due(last_sync: Option<NaiveDate>, today: NaiveDate, max_age_days: u32) -> bool {
    match last_sync {
        Some(last) => (today - last).num_days() > i64::from(max_age_days),
        None => true,
    }
}
