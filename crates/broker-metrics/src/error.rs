//! Error types for the broker-metrics crate.

use thiserror::Error;

/// Errors that can occur when building or addressing a metrics history.
///
/// Recording a snapshot never fails; these only come from constructors and
/// parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// The requested buffer capacity cannot hold any point.
    #[error("invalid history capacity: {capacity} (must be at least 1)")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// The metric family name is not one of `rates`, `throughput`, `connections`.
    #[error("unknown metric family: {name}")]
    UnknownFamily {
        /// The name that failed to parse.
        name: String,
    },
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
