//! Command-line argument parsing with clap.

use std::net::SocketAddr;
use std::time::Duration;

use broker_metrics::HISTORY_CAPACITY;
use clap::Parser;

use crate::config::DashboardConfig;

/// Broker metrics dashboard API.
#[derive(Parser, Debug, Clone)]
#[command(name = "broker-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to serve the API on.
    #[arg(short, long, env = "BROKER_DASHBOARD_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Points kept per chart series.
    #[arg(long, env = "BROKER_DASHBOARD_CAPACITY", default_value_t = HISTORY_CAPACITY)]
    pub capacity: usize,

    /// Snapshots queued before producers wait.
    #[arg(long, default_value_t = 64)]
    pub feed_buffer: usize,

    /// Maximum concurrent WebSocket clients.
    #[arg(long, default_value_t = 1000)]
    pub max_ws_connections: usize,

    /// Seconds between WebSocket heartbeats.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub ws_ping_secs: u64,

    /// Allowed CORS origin (repeatable; none means any).
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,

    /// Feed synthetic snapshots instead of waiting for a provider.
    #[arg(long, env = "BROKER_DASHBOARD_SIMULATE")]
    pub simulate: bool,

    /// Milliseconds between synthetic snapshots.
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    pub simulate_interval_ms: u64,
}

impl Cli {
    /// Build the server configuration from the parsed arguments.
    #[must_use]
    pub fn config(&self) -> DashboardConfig {
        self.cors_origins.iter().fold(
            DashboardConfig::new(self.bind)
                .with_history_capacity(self.capacity)
                .with_feed_buffer(self.feed_buffer)
                .with_max_ws_connections(self.max_ws_connections)
                .with_ws_ping_interval(Duration::from_secs(self.ws_ping_secs)),
            |config, origin| config.with_cors_origin(origin.clone()),
        )
    }

    /// Interval between synthetic snapshots.
    #[must_use]
    pub const fn simulate_interval(&self) -> Duration {
        Duration::from_millis(self.simulate_interval_ms)
    }
}
