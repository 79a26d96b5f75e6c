//! Dashboard server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use broker_metrics::HISTORY_CAPACITY;

/// Shortest accepted WebSocket heartbeat interval.
pub const MIN_WS_PING_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Points retained per metric family.
    pub history_capacity: usize,
    /// Queued snapshots the feed accepts before producers wait.
    pub feed_buffer: usize,
    /// Maximum WebSocket connections allowed.
    pub max_ws_connections: usize,
    /// WebSocket ping interval for keepalive.
    pub ws_ping_interval: Duration,
    /// CORS allowed origins (empty means all).
    pub cors_origins: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            history_capacity: HISTORY_CAPACITY,
            feed_buffer: 64,
            max_ws_connections: 1000,
            ws_ping_interval: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Set the number of points kept per family.
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the feed channel size.
    #[must_use]
    pub const fn with_feed_buffer(mut self, size: usize) -> Self {
        self.feed_buffer = size;
        self
    }

    /// Set the maximum WebSocket connections.
    #[must_use]
    pub const fn with_max_ws_connections(mut self, max: usize) -> Self {
        self.max_ws_connections = max;
        self
    }

    /// Set the WebSocket ping interval. Zero is raised to
    /// [`MIN_WS_PING_INTERVAL`].
    #[must_use]
    pub const fn with_ws_ping_interval(mut self, interval: Duration) -> Self {
        self.ws_ping_interval = if interval.is_zero() {
            MIN_WS_PING_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Add a CORS allowed origin.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.feed_buffer, 64);
        assert_eq!(config.max_ws_connections, 1000);
        assert_eq!(config.ws_ping_interval, Duration::from_secs(30));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_config_new() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 9000);
        let config = DashboardConfig::new(addr);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.history_capacity, 30);
    }

    #[test]
    fn test_config_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 9000);
        let config = DashboardConfig::new(addr)
            .with_history_capacity(60)
            .with_feed_buffer(8)
            .with_max_ws_connections(500)
            .with_ws_ping_interval(Duration::from_secs(60))
            .with_cors_origin("http://localhost:3000")
            .with_cors_origin("https://dashboard.example.com");

        assert_eq!(config.history_capacity, 60);
        assert_eq!(config.feed_buffer, 8);
        assert_eq!(config.max_ws_connections, 500);
        assert_eq!(config.ws_ping_interval, Duration::from_secs(60));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.cors_origins.contains(&"http://localhost:3000".to_string()));
    }

    #[test]
    fn test_zero_ping_interval_raised() {
        let config = DashboardConfig::default().with_ws_ping_interval(Duration::ZERO);

        assert_eq!(config.ws_ping_interval, MIN_WS_PING_INTERVAL);
    }
}
