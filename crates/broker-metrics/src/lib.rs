//! Bounded, chart-ready history of MQTT broker statistics.
#![forbid(unsafe_code)]
//!
//! `broker-metrics` turns a stream of broker statistics snapshots into three
//! fixed-size time series that a dashboard can draw directly.
//!
//! # Features
//!
//! - **Three families per snapshot**: message rates, throughput in KB/s, and
//!   connection counts, all stamped with one arrival label
//! - **Bounded**: 30 points per family by default, oldest dropped first
//! - **Null-tolerant**: a missing snapshot is a no-op, never an empty point
//! - **Shareable**: [`SharedHistory`] serializes concurrent callers
//!
//! # Example
//!
//! ```rust
//! use broker_metrics::{MetricsHistory, Snapshot};
//!
//! let mut history = MetricsHistory::new();
//!
//! // Nothing available yet.
//! history.on_snapshot(None);
//! assert!(history.is_empty());
//!
//! let snapshot = Snapshot {
//!     connected_clients: 12,
//!     subscriptions: 7,
//!     throughput_inbound: 2048.0,
//!     ..Snapshot::default()
//! };
//! history.on_snapshot(Some(&snapshot));
//!
//! let view = history.view();
//! assert_eq!(view.connections[0].clients, 12);
//! assert_eq!(view.throughput[0].inbound, 2.0);
//! ```

#![doc(html_root_url = "https://docs.rs/broker-metrics/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregator;
pub mod buffer;
pub mod clock;
pub mod convert;
pub mod error;
pub mod shared;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{FamilySeries, HistoryView, LatestPoints, MetricsHistory};
pub use buffer::{HistoryBuffer, HISTORY_CAPACITY};
pub use clock::{Clock, FixedClock, SequenceClock, SystemClock};
pub use convert::{bytes_to_kib_per_sec, round_half_up, BYTES_PER_KIB};
pub use error::{MetricsError, Result};
pub use shared::SharedHistory;
pub use types::{ConnectionPoint, MetricFamily, RatePoint, SeriesPoint, Snapshot, ThroughputPoint};
