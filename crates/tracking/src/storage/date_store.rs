//! Date-keyed tracking data with merge-on-write semantics

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use log::{debug, error, warn};

use super::KeyValueStore;
use crate::dates::{date_key, parse_date_key};
use crate::models::{DailyRecord, DailyUpdate, Fragment};

/// Key holding the serialized `date -> DailyRecord` mapping
pub const TRACKING_DATA_KEY: &str = "tracking-data";

/// Key holding the end date of the last completed range sync
pub const LAST_SYNC_DATE_KEY: &str = "last-sync-date";

/// Persistent mapping from calendar date to [`DailyRecord`]
///
/// The whole mapping is stored as one JSON value, so every write is a
/// read-modify-write of the entire set.
///
/// # Single writer
///
/// [`DateStore::merge_for_date`] is not atomic across callers: two
/// concurrent merges can each read the old set and the second save drops
/// the first one's change. Share a `DateStore` between threads only if
/// writes are serialized by the caller.
#[derive(Clone)]
pub struct DateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl DateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load every stored record.
    ///
    /// Best effort: an unreadable or malformed store is logged and treated
    /// as empty rather than surfaced as an error. Writers must use
    /// [`DateStore::try_load_all`] instead.
    pub fn load_all(&self) -> BTreeMap<NaiveDate, DailyRecord> {
        match self.try_load_all() {
            Ok(records) => records,
            Err(e) => {
                warn!("Treating tracking data as empty: {:#}", e);
                BTreeMap::new()
            }
        }
    }

    /// Load every stored record, failing on a read error or malformed data.
    pub fn try_load_all(&self) -> Result<BTreeMap<NaiveDate, DailyRecord>> {
        let Some(raw) = self
            .kv
            .load(TRACKING_DATA_KEY)
            .context("Failed to read tracking data")?
        else {
            return Ok(BTreeMap::new());
        };

        let mut records: BTreeMap<NaiveDate, DailyRecord> =
            serde_json::from_str(&raw).context("Malformed tracking data")?;

        // The map key is authoritative for a record's identity
        for (date, record) in records.iter_mut() {
            if record.date != *date {
                debug!(
                    "Record under {} carried date {}, using the key",
                    date_key(*date),
                    date_key(record.date)
                );
                record.date = *date;
            }
        }

        Ok(records)
    }

    /// Replace the entire stored set in a single write.
    ///
    /// Write failures are logged and returned.
    pub fn save_all(&self, records: &BTreeMap<NaiveDate, DailyRecord>) -> Result<()> {
        let result = serde_json::to_string(records)
            .context("Failed to serialize tracking data")
            .and_then(|json| self.kv.save(TRACKING_DATA_KEY, &json));

        if let Err(e) = &result {
            error!("Error saving tracking data: {:#}", e);
        }
        result
    }

    /// Get the record for one date
    pub fn get_for_date(&self, date: NaiveDate) -> Option<DailyRecord> {
        self.load_all().remove(&date)
    }

    /// Merge `update` into the record for `date`, creating it if needed.
    ///
    /// Each category present in `update` replaces the stored fragment;
    /// categories absent from `update` keep their stored value.
    ///
    /// Nothing is written when the existing data cannot be read, since
    /// saving would replace it with only this date.
    pub fn merge_for_date(&self, date: NaiveDate, update: DailyUpdate) -> Result<()> {
        let mut records = self.try_load_all().with_context(|| {
            format!("Refusing to write {}: stored data is unreadable", date_key(date))
        })?;
        let categories = update.len();

        records
            .entry(date)
            .or_insert_with(|| DailyRecord::new(date))
            .apply(update);

        self.save_all(&records)
            .with_context(|| format!("Failed to save data for {}", date_key(date)))?;

        debug!("Merged {} fragment(s) into {}", categories, date_key(date));
        Ok(())
    }

    /// Merge a single fragment into the record for `date`
    pub fn merge_fragment(&self, date: NaiveDate, fragment: Fragment) -> Result<()> {
        self.merge_for_date(date, std::iter::once(fragment).collect())
    }

    /// All records in a calendar month. `month0` is zero-based (0 = January).
    pub fn get_for_month(&self, year: i32, month0: u32) -> BTreeMap<NaiveDate, DailyRecord> {
        self.load_all()
            .into_iter()
            .filter(|(date, _)| date.year() == year && date.month0() == month0)
            .collect()
    }

    /// Remove all tracking data. The last-sync marker is kept.
    pub fn clear_all(&self) -> Result<()> {
        self.kv
            .remove(TRACKING_DATA_KEY)
            .context("Failed to clear tracking data")
    }

    /// End date of the last completed range sync
    pub fn last_sync_date(&self) -> Option<NaiveDate> {
        match self.kv.load(LAST_SYNC_DATE_KEY) {
            Ok(Some(raw)) => match parse_date_key(&raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("Ignoring stored last sync date: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read last sync date: {:#}", e);
                None
            }
        }
    }

    pub fn set_last_sync_date(&self, date: NaiveDate) -> Result<()> {
        self.kv
            .save(LAST_SYNC_DATE_KEY, &date_key(date))
            .context("Failed to save last sync date")
    }
}
