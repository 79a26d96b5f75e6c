//! Core types for the metrics history.
//!
//! This module provides the fundamental types used throughout the broker-metrics crate:
//! - [`Snapshot`]: One reading of broker statistics, supplied from outside
//! - [`MetricFamily`]: The three chart families a snapshot is split into
//! - [`RatePoint`], [`ThroughputPoint`], [`ConnectionPoint`]: Derived, labeled points
//! - [`SeriesPoint`]: The common read interface over the three point types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::convert::{bytes_to_kib_per_sec, round_half_up};
use crate::error::{MetricsError, Result};

/// A single reading of broker statistics.
///
/// Snapshots carry no timestamp of their own; the history labels them on
/// arrival. Counts are cumulative or instantaneous integers, the four rates are
/// floating point and are not validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Clients currently connected.
    pub connected_clients: u64,
    /// Clients known to the broker but not connected.
    pub disconnected_clients: u64,
    /// Connected plus disconnected clients.
    pub total_clients: u64,
    /// Active subscriptions.
    pub subscriptions: u64,
    /// Retained messages held by the broker.
    pub retained_messages: u64,
    /// Cumulative messages sent.
    pub messages_sent: u64,
    /// Cumulative messages received.
    pub messages_received: u64,
    /// Cumulative PUBLISH messages.
    pub messages_published: u64,
    /// Cumulative dropped messages.
    pub messages_dropped: u64,
    /// Cumulative bytes sent.
    pub bytes_sent: u64,
    /// Cumulative bytes received.
    pub bytes_received: u64,
    /// Messages published per second.
    pub message_rate_published: f64,
    /// Messages received per second.
    pub message_rate_received: f64,
    /// Inbound bytes per second.
    pub throughput_inbound: f64,
    /// Outbound bytes per second.
    pub throughput_outbound: f64,
}

impl Snapshot {
    /// Returns `true` if any of the four rate fields is NaN or infinite.
    #[must_use]
    pub fn has_non_finite_rate(&self) -> bool {
        [
            self.message_rate_published,
            self.message_rate_received,
            self.throughput_inbound,
            self.throughput_outbound,
        ]
        .iter()
        .any(|v| !v.is_finite())
    }
}

/// The three chart families derived from every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricFamily {
    /// Published / received messages per second.
    #[serde(rename = "rates")]
    Rate,
    /// Inbound / outbound KB per second.
    Throughput,
    /// Connected clients and subscriptions.
    Connections,
}

impl MetricFamily {
    /// All families, in display order.
    pub const ALL: [Self; 3] = [Self::Rate, Self::Throughput, Self::Connections];

    /// Returns the family name used in URLs and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rate => "rates",
            Self::Throughput => "throughput",
            Self::Connections => "connections",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricFamily {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rate" | "rates" => Ok(Self::Rate),
            "throughput" => Ok(Self::Throughput),
            "connection" | "connections" => Ok(Self::Connections),
            _ => Err(MetricsError::UnknownFamily {
                name: s.to_string(),
            }),
        }
    }
}

/// Common read interface over the three point types.
pub trait SeriesPoint: Clone + fmt::Debug + Serialize {
    /// The family this point belongs to.
    const FAMILY: MetricFamily;

    /// Series names, in the order [`SeriesPoint::values`] yields them.
    const SERIES: &'static [&'static str];

    /// The arrival label shared by all points of one snapshot.
    fn timestamp(&self) -> &str;

    /// Series name to value pairs.
    fn values(&self) -> Vec<(&'static str, f64)>;
}

/// Message rate point, messages per second rounded to whole numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    /// Arrival label (`HH:MM:SS`).
    pub timestamp: String,
    /// Rounded published messages per second.
    pub published: f64,
    /// Rounded received messages per second.
    pub received: f64,
}

impl RatePoint {
    /// Derives a rate point from a snapshot.
    #[must_use]
    pub fn from_snapshot(timestamp: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            timestamp: timestamp.into(),
            published: round_half_up(snapshot.message_rate_published),
            received: round_half_up(snapshot.message_rate_received),
        }
    }
}

impl SeriesPoint for RatePoint {
    const FAMILY: MetricFamily = MetricFamily::Rate;
    const SERIES: &'static [&'static str] = &["published", "received"];

    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn values(&self) -> Vec<(&'static str, f64)> {
        vec![("published", self.published), ("received", self.received)]
    }
}

/// Throughput point in whole KB per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    /// Arrival label (`HH:MM:SS`).
    pub timestamp: String,
    /// Inbound KB/s.
    pub inbound: f64,
    /// Outbound KB/s.
    pub outbound: f64,
}

impl ThroughputPoint {
    /// Derives a throughput point from a snapshot, converting bytes/s to KB/s.
    #[must_use]
    pub fn from_snapshot(timestamp: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            timestamp: timestamp.into(),
            inbound: bytes_to_kib_per_sec(snapshot.throughput_inbound),
            outbound: bytes_to_kib_per_sec(snapshot.throughput_outbound),
        }
    }
}

impl SeriesPoint for ThroughputPoint {
    const FAMILY: MetricFamily = MetricFamily::Throughput;
    const SERIES: &'static [&'static str] = &["inbound", "outbound"];

    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn values(&self) -> Vec<(&'static str, f64)> {
        vec![("inbound", self.inbound), ("outbound", self.outbound)]
    }
}

/// Connection counts, copied from the snapshot unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    /// Arrival label (`HH:MM:SS`).
    pub timestamp: String,
    /// Connected clients.
    pub clients: u64,
    /// Active subscriptions.
    pub subscriptions: u64,
}

impl ConnectionPoint {
    /// Derives a connection point from a snapshot.
    #[must_use]
    pub fn from_snapshot(timestamp: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            timestamp: timestamp.into(),
            clients: snapshot.connected_clients,
            subscriptions: snapshot.subscriptions,
        }
    }
}

impl SeriesPoint for ConnectionPoint {
    const FAMILY: MetricFamily = MetricFamily::Connections;
    const SERIES: &'static [&'static str] = &["clients", "subscriptions"];

    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("clients", self.clients as f64),
            ("subscriptions", self.subscriptions as f64),
        ]
    }
}
