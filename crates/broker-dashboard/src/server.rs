//! Dashboard server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::feed::{spawn_feed, SnapshotFeed};
use crate::routes::create_router;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// Dashboard server for the broker metrics charts.
///
/// Owns the metrics history and its snapshot feed, and serves the history
/// over REST plus WebSocket and SSE live updates.
#[derive(Debug, Clone)]
pub struct DashboardServer {
    state: Arc<DashboardState>,
    feed: SnapshotFeed,
}

impl DashboardServer {
    /// Create a new dashboard server and start its snapshot feed.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured history capacity is zero.
    pub fn new(config: DashboardConfig) -> DashboardResult<Self> {
        let feed_buffer = config.feed_buffer;
        let state = Arc::new(DashboardState::new(config)?);
        let (feed, _task) = spawn_feed(state.clone(), feed_buffer);
        Ok(Self { state, feed })
    }

    /// Get the dashboard state for external access.
    #[must_use]
    pub fn state(&self) -> Arc<DashboardState> {
        self.state.clone()
    }

    /// Get a sender for broker snapshots.
    #[must_use]
    pub fn feed(&self) -> SnapshotFeed {
        self.feed.clone()
    }

    /// Publish a live update to all connected clients.
    ///
    /// Returns the number of clients that received the update.
    pub fn publish(&self, update: LiveUpdate) -> usize {
        self.state.publish(update)
    }

    /// Get the number of active WebSocket connections.
    #[must_use]
    pub fn ws_connection_count(&self) -> usize {
        self.state.ws_connection_count()
    }

    /// Start the dashboard server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> DashboardResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DashboardError::BindFailed(addr, e))?;

        info!(addr = %addr, "Dashboard server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| DashboardError::Internal(e.to_string()))?;

        Ok(())
    }

    /// Start the dashboard server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> DashboardResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DashboardError::BindFailed(addr, e))?;

        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while running.
    pub async fn serve_on<F>(&self, listener: TcpListener, shutdown: F) -> DashboardResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(addr = %addr, "Dashboard server listening");
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| DashboardError::Internal(e.to_string()))?;

        info!("Dashboard server shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    ///
    /// Useful for testing or embedding in another server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}
