//! # broker-dashboard
//!
//! Live broker metrics API for the device-management dashboard.
//!
//! This crate owns a [`broker_metrics::MetricsHistory`], feeds it through a
//! single-consumer snapshot channel, and serves the resulting chart series over
//! REST, WebSocket and Server-Sent Events, built on the axum HTTP framework.
//!
//! ## Example
//!
//! ```rust,no_run
//! use broker_dashboard::{DashboardConfig, DashboardServer};
//! use broker_metrics::Snapshot;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = DashboardServer::new(DashboardConfig::default()).unwrap();
//!
//!     // A provider pushes snapshots as they become available.
//!     let feed = server.feed();
//!     feed.push(None).await.unwrap(); // nothing yet: ignored
//!     feed.push(Some(Snapshot::default())).await.unwrap();
//!
//!     // server.serve("0.0.0.0:8080".parse().unwrap()).await.unwrap();
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/health` | GET | Liveness and uptime |
//! | `/api/history` | GET | Rate, throughput and connection series |
//! | `/api/history/{family}` | GET | One series (`rates`, `throughput`, `connections`) |
//! | `/api/snapshot` | GET | Most recent raw snapshot |
//! | `/api/events` | GET | SSE stream of live updates |
//! | `/api/ws` | GET | WebSocket stream of live updates |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod simulate;
pub mod state;
pub mod types;
pub mod websocket;

// Re-export main types
pub use cli::Cli;
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use feed::{spawn_feed, SnapshotFeed};
pub use server::DashboardServer;
pub use state::DashboardState;
pub use types::{FamilyHistoryResponse, LiveUpdate};
