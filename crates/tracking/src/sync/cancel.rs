use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag for stopping a range sync between dates.
///
/// Clones observe the same flag. Dates already merged stay merged.
///
/// This is for embedders that drive [`DateRangeSyncer`] from another
/// thread (a UI or a service). The `daybook` CLI does not install a
/// Ctrl-C handler. Interrupting it kills the process, and the last sync
/// date is only written once a whole range has run.
///
/// [`DateRangeSyncer`]: super::DateRangeSyncer
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }
}
