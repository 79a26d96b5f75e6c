//! Snapshot feed: the single entry point for broker statistics.
//!
//! Providers push `Option<Snapshot>` into a [`SnapshotFeed`]. One task drains
//! the channel in arrival order and hands each event to
//! [`DashboardState::ingest`], so snapshots are recorded one at a time no
//! matter how many producers exist.

use std::sync::Arc;

use broker_metrics::Snapshot;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;

/// Cloneable sender side of the snapshot feed.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    tx: mpsc::Sender<Option<Snapshot>>,
}

impl SnapshotFeed {
    /// Queue a feed event, waiting for room.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::FeedClosed` if the feed task has stopped.
    pub async fn push(&self, snapshot: Option<Snapshot>) -> DashboardResult<()> {
        self.tx
            .send(snapshot)
            .await
            .map_err(|_| DashboardError::FeedClosed)
    }

    /// Queue a feed event without waiting.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::FeedFull` if the queue is full, or
    /// `DashboardError::FeedClosed` if the feed task has stopped.
    pub fn try_push(&self, snapshot: Option<Snapshot>) -> DashboardResult<()> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DashboardError::FeedFull,
            mpsc::error::TrySendError::Closed(_) => DashboardError::FeedClosed,
        })
    }

    /// Returns `true` once the feed task has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start the feed task for `state`.
///
/// The task runs until every [`SnapshotFeed`] clone is dropped. `buffer` is
/// clamped to at least 1.
#[must_use]
pub fn spawn_feed(state: Arc<DashboardState>, buffer: usize) -> (SnapshotFeed, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(buffer.max(1));

    let handle = tokio::spawn(async move {
        let mut received: u64 = 0;
        while let Some(event) = rx.recv().await {
            received += 1;
            state.ingest(event);
        }
        info!(received, "snapshot feed closed");
    });

    debug!(buffer, "snapshot feed started");
    (SnapshotFeed { tx }, handle)
}
