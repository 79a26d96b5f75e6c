//! Thread-safe handle around a [`MetricsHistory`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::aggregator::{HistoryView, LatestPoints, MetricsHistory};
use crate::types::Snapshot;

/// Cloneable, lock-protected metrics history.
///
/// Every call holds the lock for its whole duration, so a snapshot is always
/// appended to all three series and trimmed before any other caller observes
/// or modifies the history. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<Mutex<MetricsHistory>>,
}

impl SharedHistory {
    /// Wraps an existing history.
    #[must_use]
    pub fn new(history: MetricsHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    /// Handles one feed event and returns the updated view.
    ///
    /// Returns `None`, without touching the history, when `snapshot` is `None`.
    #[allow(clippy::significant_drop_tightening)] // Record and view must see the same state
    pub fn on_snapshot(&self, snapshot: Option<&Snapshot>) -> Option<HistoryView> {
        let mut history = self.inner.lock();
        history.on_snapshot(snapshot).then(|| history.view())
    }

    /// Copies the current series out.
    #[must_use]
    pub fn view(&self) -> HistoryView {
        self.inner.lock().view()
    }

    /// The points derived from the most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<LatestPoints> {
        self.inner.lock().latest()
    }

    /// The most recently recorded raw snapshot.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.inner.lock().last_snapshot().cloned()
    }

    /// Points retained per family.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum points retained per family.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Snapshots recorded since creation.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.inner.lock().updates()
    }

    /// Drops all points.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl From<MetricsHistory> for SharedHistory {
    fn from(history: MetricsHistory) -> Self {
        Self::new(history)
    }
}
