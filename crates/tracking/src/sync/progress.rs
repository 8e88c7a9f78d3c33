//! Progress reporting for range syncs

use chrono::NaiveDate;
use std::sync::mpsc::Sender;

/// Snapshot taken after each processed date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncProgress {
    /// Dates in the range
    pub total: usize,
    /// Dates processed so far, including `current`
    pub completed: usize,
    /// Date just processed
    pub current: Option<NaiveDate>,
    /// Per-date failure messages accumulated so far
    pub errors: Vec<String>,
}

impl SyncProgress {
    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress snapshots.
///
/// Called synchronously on the syncing thread, once per date in ascending
/// order. A slow observer delays the whole range.
pub trait SyncObserver {
    fn on_progress(&mut self, progress: &SyncProgress);
}

impl<F> SyncObserver for F
where
    F: FnMut(&SyncProgress),
{
    fn on_progress(&mut self, progress: &SyncProgress) {
        self(progress)
    }
}

/// Observer that ignores every snapshot
impl SyncObserver for () {
    fn on_progress(&mut self, _progress: &SyncProgress) {}
}

/// Forwards owned snapshots to another thread
pub struct ChannelObserver {
    sender: Sender<SyncProgress>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<SyncProgress>) -> Self {
        Self { sender }
    }
}

impl SyncObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &SyncProgress) {
        // A dropped receiver only means nobody is watching anymore
        let _ = self.sender.send(progress.clone());
    }
}
