//! Shared state for the dashboard server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use broker_metrics::{HistoryView, MetricsHistory, SharedHistory, Snapshot};
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::DashboardResult;
use crate::types::LiveUpdate;

/// Shared state for the dashboard server.
#[derive(Debug)]
pub struct DashboardState {
    /// Dashboard configuration.
    config: Arc<DashboardConfig>,
    /// Metrics history fed by the snapshot feed, including the last raw snapshot.
    history: SharedHistory,
    /// Broadcast channel for live updates.
    update_tx: broadcast::Sender<LiveUpdate>,
    /// Number of active WebSocket connections.
    ws_connections: AtomicUsize,
    /// Server start time.
    start_time: Instant,
}

impl DashboardState {
    /// Create a new dashboard state with an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured history capacity is zero.
    pub fn new(config: DashboardConfig) -> DashboardResult<Self> {
        let history = MetricsHistory::with_capacity(config.history_capacity)?;
        Ok(Self::with_history(config, history.into()))
    }

    /// Create a dashboard state around an existing history handle.
    #[must_use]
    pub fn with_history(config: DashboardConfig, history: SharedHistory) -> Self {
        let (update_tx, _) = broadcast::channel(1024);
        Self {
            config: Arc::new(config),
            history,
            update_tx,
            ws_connections: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Get a handle to the metrics history.
    #[must_use]
    pub fn history(&self) -> SharedHistory {
        self.history.clone()
    }

    /// Record one feed event and notify subscribers.
    ///
    /// The series and the raw snapshot are updated under one lock. A `None`
    /// event changes nothing and publishes nothing. Returns the history view
    /// after a recorded snapshot.
    ///
    /// Updates are published in ingest order only when there is a single
    /// caller; in the server that is the feed task.
    pub fn ingest(&self, snapshot: Option<Snapshot>) -> Option<HistoryView> {
        let Some(view) = self.history.on_snapshot(snapshot.as_ref()) else {
            debug!("empty feed event ignored");
            return None;
        };

        let receivers = self.publish(LiveUpdate::HistoryUpdated {
            history: view.clone(),
        });
        debug!(updates = view.updates, receivers, "published history update");

        Some(view)
    }

    /// Get the current history.
    #[must_use]
    pub fn get_history(&self) -> HistoryView {
        self.history.view()
    }

    /// Get the most recently recorded snapshot.
    #[must_use]
    pub fn get_last_snapshot(&self) -> Option<Snapshot> {
        self.history.last_snapshot()
    }

    /// Subscribe to live updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LiveUpdate> {
        self.update_tx.subscribe()
    }

    /// Number of live update receivers currently subscribed.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    /// Publish a live update to all subscribers.
    ///
    /// Returns the number of subscribers that received the update.
    pub fn publish(&self, update: LiveUpdate) -> usize {
        self.update_tx.send(update).unwrap_or(0)
    }

    /// Get the number of active WebSocket connections.
    #[must_use]
    pub fn ws_connection_count(&self) -> usize {
        self.ws_connections.load(Ordering::Relaxed)
    }

    /// Increment the WebSocket connection count.
    ///
    /// Returns `true` if the connection was allowed, `false` if limit reached.
    pub fn add_ws_connection(&self) -> bool {
        let current = self.ws_connections.fetch_add(1, Ordering::Relaxed);
        if current >= self.config.max_ws_connections {
            self.ws_connections.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Decrement the WebSocket connection count.
    pub fn remove_ws_connection(&self) {
        self.ws_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Reserve a WebSocket slot, released when the returned guard drops.
    ///
    /// Returns `None` if the connection limit is reached.
    #[must_use]
    pub fn acquire_ws_connection(self: &Arc<Self>) -> Option<WsConnectionGuard> {
        self.add_ws_connection().then(|| WsConnectionGuard {
            state: Arc::clone(self),
        })
    }

    /// Get server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Holds one WebSocket connection slot.
#[derive(Debug)]
pub struct WsConnectionGuard {
    state: Arc<DashboardState>,
}

impl Drop for WsConnectionGuard {
    fn drop(&mut self) {
        self.state.remove_ws_connection();
    }
}
