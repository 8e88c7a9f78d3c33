//! Sequential sync of an inclusive date range

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{CancellationToken, DayFetcher, SyncObserver, SyncProgress};
use crate::dates::{date_key, day_count, days_inclusive, today, trailing_range};
use crate::storage::DateStore;

/// Tuning for range syncs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Pause between consecutive dates, to stay under the source's rate limit
    pub request_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(100),
        }
    }
}

/// Final tally of a range sync
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncResult {
    /// Number of dates in the requested range
    pub total: usize,
    /// Dates fetched (and merged, if anything was found)
    pub success: usize,
    /// Dates whose fetch or merge failed
    pub failed: usize,
    /// One message per failed date, in date order
    pub errors: Vec<String>,
    /// Stopped early by a cancellation token
    pub cancelled: bool,
    /// Whether the last-sync marker was written
    pub marker_saved: bool,
    /// Duration of the sync operation
    pub duration_ms: u64,
}

impl SyncResult {
    /// Every date in the range was processed without error
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed == 0 && self.success == self.total
    }
}

/// Drives a [`DayFetcher`] over a date range, merging each date into a
/// [`DateStore`].
///
/// Dates are fetched strictly one at a time, in ascending order. A failed
/// date is recorded and skipped; it never aborts the range.
pub struct DateRangeSyncer {
    fetcher: Arc<dyn DayFetcher>,
    store: DateStore,
    options: SyncOptions,
    cancel: CancellationToken,
}

impl DateRangeSyncer {
    pub fn new(fetcher: Arc<dyn DayFetcher>, store: DateStore) -> Self {
        Self {
            fetcher,
            store,
            options: SyncOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop between dates once `cancel` is triggered
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &DateStore {
        &self.store
    }

    /// Sync every date from `start` to `end` inclusive.
    ///
    /// `observer` is notified once per processed date. When the range runs
    /// to completion, `end` is saved as the last-sync marker regardless of
    /// how many dates failed. An empty range (`end < start`) does nothing.
    pub fn sync_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        observer: &mut dyn SyncObserver,
    ) -> SyncResult {
        let started = Instant::now();
        let total = day_count(start, end);
        let mut result = SyncResult {
            total,
            ..Default::default()
        };

        if total == 0 {
            debug!(
                "Empty sync range {} to {}, nothing to do",
                date_key(start),
                date_key(end)
            );
            result.duration_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        info!(
            "Syncing {} date(s) from {} to {}",
            total,
            date_key(start),
            date_key(end)
        );

        let mut progress = SyncProgress {
            total,
            ..Default::default()
        };

        for (index, date) in days_inclusive(start, end).enumerate() {
            if index > 0 && !self.options.request_delay.is_zero() {
                std::thread::sleep(self.options.request_delay);
            }

            if self.cancel.is_cancelled() {
                info!("Sync cancelled before {}", date_key(date));
                result.cancelled = true;
                break;
            }

            match self.sync_one(date) {
                Ok(()) => result.success += 1,
                Err(e) => {
                    let message = format!("Failed to sync {}: {:#}", date_key(date), e);
                    warn!("{}", message);
                    progress.errors.push(message);
                    result.failed += 1;
                }
            }

            progress.completed = index + 1;
            progress.current = Some(date);
            observer.on_progress(&progress);
        }

        if !result.cancelled {
            result.marker_saved = match self.store.set_last_sync_date(end) {
                Ok(()) => true,
                Err(e) => {
                    error!("Error saving last sync date: {:#}", e);
                    false
                }
            };
        }

        result.errors = progress.errors;
        result.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Sync finished: {} succeeded, {} failed, {} ms",
            result.success, result.failed, result.duration_ms
        );
        result
    }

    /// Sync one date, propagating any failure.
    ///
    /// Does not touch the last-sync marker.
    pub fn sync_date(&self, date: NaiveDate) -> Result<()> {
        self.sync_one(date)
            .with_context(|| format!("Failed to sync {}", date_key(date)))
    }

    /// Sync today's date, returning the date that was synced
    pub fn sync_today(&self) -> Result<NaiveDate> {
        let date = today();
        self.sync_date(date)?;
        Ok(date)
    }

    /// Sync the `days` calendar dates ending at `end` inclusive
    pub fn sync_trailing(
        &self,
        end: NaiveDate,
        days: u32,
        observer: &mut dyn SyncObserver,
    ) -> SyncResult {
        let (start, end) = trailing_range(end, days);
        self.sync_range(start, end, observer)
    }

    /// Sync the 7 calendar dates ending today
    pub fn sync_last_week(&self, observer: &mut dyn SyncObserver) -> SyncResult {
        self.sync_trailing(today(), 7, observer)
    }

    /// Sync the 30 calendar dates ending today
    pub fn sync_last_month(&self, observer: &mut dyn SyncObserver) -> SyncResult {
        self.sync_trailing(today(), 30, observer)
    }

    fn sync_one(&self, date: NaiveDate) -> Result<()> {
        let update = self.fetcher.fetch_day(date)?;
        if update.is_empty() {
            debug!("No data for {}", date_key(date));
            return Ok(());
        }
        self.store.merge_for_date(date, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date_key;
    use crate::models::{CaloriesData, DailyUpdate, DietData, SleepData};
    use crate::storage::{InMemoryKeyValueStore, KeyValueStore, TRACKING_DATA_KEY};
    use crate::sync::{ChannelObserver, FetchError};
    use chrono::NaiveTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::mpsc;

    /// Replays canned results; dates without a script return no data
    #[derive(Default)]
    struct ScriptedFetcher {
        script: HashMap<NaiveDate, Result<DailyUpdate, FetchError>>,
        calls: Mutex<Vec<NaiveDate>>,
        cancel_after_first: Option<CancellationToken>,
    }

    impl ScriptedFetcher {
        fn with(mut self, key: &str, result: Result<DailyUpdate, FetchError>) -> Self {
            self.script.insert(date(key), result);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|d| date_key(*d))
                .collect()
        }
    }

    impl DayFetcher for ScriptedFetcher {
        fn fetch_day(&self, date: NaiveDate) -> Result<DailyUpdate, FetchError> {
            self.calls.lock().unwrap().push(date);
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            self.script
                .get(&date)
                .cloned()
                .unwrap_or_else(|| Ok(DailyUpdate::new()))
        }
    }

    /// Reads fine, refuses every write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("read-only medium")
        }

        fn remove(&self, _key: &str) -> Result<()> {
            anyhow::bail!("read-only medium")
        }
    }

    fn date(s: &str) -> NaiveDate {
        parse_date_key(s).unwrap()
    }

    fn sleep() -> SleepData {
        SleepData {
            time_in_bed: 8.0,
            time_fully_asleep: 7.2,
            sleep_score: 84,
            avg_sleep_hr: 54,
            sleep_from: NaiveTime::from_hms_opt(23, 0, 0),
            sleep_to: NaiveTime::from_hms_opt(7, 0, 0),
            nap_from: None,
            nap_to: None,
            nap_fully_asleep: None,
        }
    }

    fn no_delay() -> SyncOptions {
        SyncOptions {
            request_delay: Duration::ZERO,
        }
    }

    fn syncer(
        fetcher: ScriptedFetcher,
    ) -> (DateRangeSyncer, Arc<ScriptedFetcher>, Arc<InMemoryKeyValueStore>) {
        let fetcher = Arc::new(fetcher);
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let syncer = DateRangeSyncer::new(fetcher.clone(), DateStore::new(kv.clone()))
            .with_options(no_delay());
        (syncer, fetcher, kv)
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(SyncOptions::default().request_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_empty_range_is_a_no_op() {
        let (syncer, fetcher, kv) = syncer(ScriptedFetcher::default());
        let mut notified = 0;
        let result = syncer.sync_range(
            date("2025-10-05"),
            date("2025-10-01"),
            &mut |_: &SyncProgress| notified += 1,
        );

        assert_eq!((result.total, result.success, result.failed), (0, 0, 0));
        assert!(result.errors.is_empty());
        assert!(!result.marker_saved);
        assert_eq!(notified, 0);
        assert!(fetcher.calls().is_empty());
        assert!(kv.is_empty());
    }

    #[test]
    fn test_one_failure_does_not_abort_range() {
        let fetcher = ScriptedFetcher::default()
            .with("2025-10-01", Ok(DailyUpdate::new().with_sleep(sleep())))
            .with("2025-10-02", Err(FetchError::Transport("connection reset".into())))
            .with("2025-10-03", Ok(DailyUpdate::new().with_sleep(sleep())));
        let (syncer, _, _) = syncer(fetcher);

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-03"), &mut ());

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("2025-10-02"));
        assert!(result.errors[0].contains("connection reset"));

        let stored: Vec<String> = syncer
            .store()
            .load_all()
            .keys()
            .map(|d| date_key(*d))
            .collect();
        assert_eq!(stored, vec!["2025-10-01", "2025-10-03"]);
    }

    #[test]
    fn test_progress_in_order_once_per_date() {
        let fetcher = ScriptedFetcher::default()
            .with("2025-10-31", Err(FetchError::NotAuthenticated));
        let (syncer, fetcher, _) = syncer(fetcher);

        let mut snapshots: Vec<SyncProgress> = Vec::new();
        let result = syncer.sync_range(
            date("2025-10-30"),
            date("2025-11-02"),
            &mut |p: &SyncProgress| snapshots.push(p.clone()),
        );

        let currents: Vec<String> = snapshots
            .iter()
            .map(|p| date_key(p.current.unwrap()))
            .collect();
        assert_eq!(
            currents,
            vec!["2025-10-30", "2025-10-31", "2025-11-01", "2025-11-02"]
        );
        assert_eq!(fetcher.calls(), currents);

        let completed: Vec<usize> = snapshots.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4]);
        assert!(snapshots.iter().all(|p| p.total == 4));
        assert!(snapshots[0].errors.is_empty());
        assert_eq!(snapshots[1].errors.len(), 1);

        let last = snapshots.last().unwrap();
        assert_eq!(last.completed, result.success + result.failed);
        assert_eq!(last.completed, result.total);
        assert_eq!(last.errors, result.errors);
    }

    #[test]
    fn test_zero_fragment_day_is_success_without_write() {
        let (syncer, _, kv) = syncer(ScriptedFetcher::default());

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-01"), &mut ());

        assert_eq!((result.success, result.failed), (1, 0));
        assert!(result.is_complete());
        assert_eq!(kv.load(TRACKING_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn test_marker_saved_despite_failures() {
        let fetcher = ScriptedFetcher::default().with(
            "2025-10-02",
            Err(FetchError::Http {
                status: 500,
                endpoint: "/sleep/date/2025-10-02.json".into(),
            }),
        );
        let (syncer, _, _) = syncer(fetcher);

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-02"), &mut ());

        assert!(result.marker_saved);
        assert!(!result.is_complete());
        assert_eq!(syncer.store().last_sync_date(), Some(date("2025-10-02")));
    }

    #[test]
    fn test_merge_keeps_existing_fragments() {
        let diet = DietData {
            calories_consumed: 2100,
            protein: 150.0,
            fat: 70.0,
            carbs: 200.0,
            sugar: 30.0,
        };
        let fetcher = ScriptedFetcher::default()
            .with("2025-10-01", Ok(DailyUpdate::new().with_sleep(sleep())));
        let (syncer, _, _) = syncer(fetcher);
        syncer
            .store()
            .merge_fragment(date("2025-10-01"), diet.clone().into())
            .unwrap();

        syncer.sync_range(date("2025-10-01"), date("2025-10-01"), &mut ());

        let record = syncer.store().get_for_date(date("2025-10-01")).unwrap();
        assert_eq!(record.diet, Some(diet));
        assert_eq!(record.sleep, Some(sleep()));
    }

    #[test]
    fn test_write_failure_counts_as_failed_date() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with("2025-10-01", Ok(DailyUpdate::new().with_sleep(sleep()))),
        );
        let syncer = DateRangeSyncer::new(fetcher, DateStore::new(Arc::new(ReadOnlyStore)))
            .with_options(no_delay());

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-02"), &mut ());

        assert_eq!((result.success, result.failed), (1, 1));
        assert!(result.errors[0].starts_with("Failed to sync 2025-10-01"));
        assert!(!result.marker_saved);
    }

    #[test]
    fn test_unreadable_history_fails_the_date_and_is_kept() {
        let fetcher = ScriptedFetcher::default()
            .with("2025-10-01", Ok(DailyUpdate::new().with_sleep(sleep())));
        let (syncer, _, kv) = syncer(fetcher);
        let history = r#"{"2025-09-01": {"date": "2025-09-01", "sleep": {"sleepScore": "good"}}}"#;
        kv.save(TRACKING_DATA_KEY, history).unwrap();

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-01"), &mut ());

        assert_eq!((result.success, result.failed), (0, 1));
        assert!(result.errors[0].contains("unreadable"));
        assert_eq!(kv.load(TRACKING_DATA_KEY).unwrap().as_deref(), Some(history));
    }

    #[test]
    fn test_cancellation_keeps_merged_dates() {
        let token = CancellationToken::new();
        let fetcher = ScriptedFetcher {
            cancel_after_first: Some(token.clone()),
            ..Default::default()
        }
        .with("2025-10-01", Ok(DailyUpdate::new().with_sleep(sleep())));
        let (syncer, fetcher, _) = syncer(fetcher);
        let syncer = syncer.with_cancellation(token);

        let mut notified = 0;
        let result = syncer.sync_range(
            date("2025-10-01"),
            date("2025-10-05"),
            &mut |_: &SyncProgress| notified += 1,
        );

        assert!(result.cancelled);
        assert_eq!(result.total, 5);
        assert_eq!((result.success, result.failed), (1, 0));
        assert_eq!(notified, 1);
        assert_eq!(fetcher.calls(), vec!["2025-10-01"]);
        assert!(!result.marker_saved);
        assert_eq!(syncer.store().last_sync_date(), None);
        assert!(syncer.store().get_for_date(date("2025-10-01")).is_some());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (syncer, fetcher, _) = syncer(ScriptedFetcher::default());
        let syncer = syncer.with_cancellation(token);

        let result = syncer.sync_range(date("2025-10-01"), date("2025-10-03"), &mut ());

        assert!(result.cancelled);
        assert_eq!((result.success, result.failed), (0, 0));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_sync_date_propagates_error() {
        let fetcher =
            ScriptedFetcher::default().with("2025-10-01", Err(FetchError::NotAuthenticated));
        let (syncer, _, _) = syncer(fetcher);

        let err = syncer.sync_date(date("2025-10-01")).unwrap_err();
        assert!(format!("{:#}", err).contains("2025-10-01"));
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::NotAuthenticated)
        ));
        assert_eq!(syncer.store().last_sync_date(), None);
    }

    #[test]
    fn test_sync_date_merges() {
        let calories = CaloriesData::from_reported_total(2400, 700, 1650);
        let fetcher = ScriptedFetcher::default().with(
            "2025-10-01",
            Ok(DailyUpdate::new().with_calories(calories.clone())),
        );
        let (syncer, _, _) = syncer(fetcher);

        syncer.sync_date(date("2025-10-01")).unwrap();
        let record = syncer.store().get_for_date(date("2025-10-01")).unwrap();
        assert_eq!(record.calories, Some(calories));
        assert_eq!(syncer.store().last_sync_date(), None);
    }

    #[test]
    fn test_sync_trailing_crosses_month() {
        let (syncer, fetcher, _) = syncer(ScriptedFetcher::default());

        let result = syncer.sync_trailing(date("2025-03-02"), 7, &mut ());

        assert_eq!(result.total, 7);
        assert_eq!(
            fetcher.calls(),
            vec![
                "2025-02-24",
                "2025-02-25",
                "2025-02-26",
                "2025-02-27",
                "2025-02-28",
                "2025-03-01",
                "2025-03-02"
            ]
        );
        assert_eq!(syncer.store().last_sync_date(), Some(date("2025-03-02")));
    }

    #[test]
    fn test_sync_last_week_ends_today() {
        let (syncer, fetcher, _) = syncer(ScriptedFetcher::default());
        let mut observer = ChannelObserver::new(mpsc::channel().0);

        let result = syncer.sync_last_week(&mut observer);

        assert_eq!(result.total, 7);
        let calls = fetcher.calls();
        assert_eq!(calls.last().cloned(), Some(date_key(today())));
    }

    #[test]
    fn test_sync_last_month_covers_thirty_days() {
        let (syncer, fetcher, _) = syncer(ScriptedFetcher::default());
        let (tx, rx) = mpsc::channel();

        let result = syncer.sync_last_month(&mut ChannelObserver::new(tx));

        assert_eq!(result.total, 30);
        assert_eq!(fetcher.calls().len(), 30);
        let received: Vec<SyncProgress> = rx.try_iter().collect();
        assert_eq!(received.len(), 30);
        assert!(received.last().unwrap().is_finished());
    }
}
