//! The metrics history aggregator.
//!
//! [`MetricsHistory`] turns a stream of broker [`Snapshot`]s into three
//! bounded, chart-ready series: message rates, throughput and connection
//! counts. Every recorded snapshot appends exactly one point to each series,
//! all three stamped with the same arrival label, so the series stay in
//! lock-step.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::buffer::{HistoryBuffer, HISTORY_CAPACITY};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::types::{ConnectionPoint, MetricFamily, RatePoint, Snapshot, ThroughputPoint};

/// Bounded history of the three metric families.
///
/// Not synchronized: callers that feed it from several tasks go through
/// [`SharedHistory`](crate::SharedHistory) or a single consumer task.
pub struct MetricsHistory {
    rates: HistoryBuffer<RatePoint>,
    throughput: HistoryBuffer<ThroughputPoint>,
    connections: HistoryBuffer<ConnectionPoint>,
    last_snapshot: Option<Snapshot>,
    updates: u64,
    clock: Arc<dyn Clock>,
}

impl MetricsHistory {
    /// Creates an empty history holding 30 points per family, labelled by the
    /// local wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rates: HistoryBuffer::new(),
            throughput: HistoryBuffer::new(),
            connections: HistoryBuffer::new(),
            last_snapshot: None,
            updates: 0,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates an empty history holding `capacity` points per family.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            rates: HistoryBuffer::with_capacity(capacity)?,
            throughput: HistoryBuffer::with_capacity(capacity)?,
            connections: HistoryBuffer::with_capacity(capacity)?,
            last_snapshot: None,
            updates: 0,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the label source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Handles one feed event.
    ///
    /// `None` means "no data yet" and changes nothing; no label is taken from
    /// the clock. Returns `true` if a snapshot was recorded.
    pub fn on_snapshot(&mut self, snapshot: Option<&Snapshot>) -> bool {
        match snapshot {
            Some(snapshot) => {
                self.record(snapshot);
                true
            }
            None => {
                trace!("no snapshot available, history unchanged");
                false
            }
        }
    }

    /// Records a snapshot into all three series under one arrival label.
    ///
    /// Non-finite rates are recorded as they are.
    pub fn record(&mut self, snapshot: &Snapshot) {
        if snapshot.has_non_finite_rate() {
            warn!(
                published = snapshot.message_rate_published,
                received = snapshot.message_rate_received,
                inbound = snapshot.throughput_inbound,
                outbound = snapshot.throughput_outbound,
                "snapshot carries non-finite rates"
            );
        }

        let timestamp = self.clock.now_label();

        // Derive everything before touching the buffers.
        let rate = RatePoint::from_snapshot(timestamp.clone(), snapshot);
        let throughput = ThroughputPoint::from_snapshot(timestamp.clone(), snapshot);
        let connections = ConnectionPoint::from_snapshot(timestamp, snapshot);

        let evicted = self.rates.push(rate);
        self.throughput.push(throughput);
        self.connections.push(connections);
        self.last_snapshot = Some(snapshot.clone());
        self.updates += 1;

        debug!(
            updates = self.updates,
            len = self.rates.len(),
            evicted,
            "recorded broker snapshot"
        );
    }

    /// Message rate series, oldest first.
    #[must_use]
    pub const fn rates(&self) -> &HistoryBuffer<RatePoint> {
        &self.rates
    }

    /// Throughput series, oldest first.
    #[must_use]
    pub const fn throughput(&self) -> &HistoryBuffer<ThroughputPoint> {
        &self.throughput
    }

    /// Connection series, oldest first.
    #[must_use]
    pub const fn connections(&self) -> &HistoryBuffer<ConnectionPoint> {
        &self.connections
    }

    /// Points retained per family. The three series always agree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns `true` until the first snapshot is recorded (or after `clear`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Maximum points retained per family.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.rates.capacity()
    }

    /// Snapshots recorded since creation. Not reduced by eviction or `clear`.
    #[must_use]
    pub const fn updates(&self) -> u64 {
        self.updates
    }

    /// The points derived from the most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<LatestPoints> {
        Some(LatestPoints {
            rate: self.rates.latest()?.clone(),
            throughput: self.throughput.latest()?.clone(),
            connections: self.connections.latest()?.clone(),
        })
    }

    /// The raw snapshot behind the newest points, as received.
    #[must_use]
    pub const fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    /// Drops all points and the last snapshot, keeping capacity and the
    /// update count.
    pub fn clear(&mut self) {
        self.rates.clear();
        self.throughput.clear();
        self.connections.clear();
        self.last_snapshot = None;
        debug!("cleared metrics history");
    }

    /// Copies the current series out for readers.
    #[must_use]
    pub fn view(&self) -> HistoryView {
        HistoryView {
            capacity: self.capacity(),
            updates: self.updates,
            rates: self.rates.to_vec(),
            throughput: self.throughput.to_vec(),
            connections: self.connections.to_vec(),
        }
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetricsHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsHistory")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

/// The three points produced by one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPoints {
    /// Message rate point.
    pub rate: RatePoint,
    /// Throughput point.
    pub throughput: ThroughputPoint,
    /// Connection point.
    pub connections: ConnectionPoint,
}

/// Read-only copy of the history, handed to chart consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryView {
    /// Maximum points per family.
    pub capacity: usize,
    /// Snapshots recorded so far.
    pub updates: u64,
    /// Message rate series, oldest first.
    pub rates: Vec<RatePoint>,
    /// Throughput series, oldest first.
    pub throughput: Vec<ThroughputPoint>,
    /// Connection series, oldest first.
    pub connections: Vec<ConnectionPoint>,
}

impl HistoryView {
    /// An empty view with the default capacity.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            updates: 0,
            rates: Vec::new(),
            throughput: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Points per family.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns `true` if no point is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Extracts one family's series.
    #[must_use]
    pub fn family(&self, family: MetricFamily) -> FamilySeries {
        match family {
            MetricFamily::Rate => FamilySeries::Rates(self.rates.clone()),
            MetricFamily::Throughput => FamilySeries::Throughput(self.throughput.clone()),
            MetricFamily::Connections => FamilySeries::Connections(self.connections.clone()),
        }
    }
}

/// One family's series, serialized as a bare array of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FamilySeries {
    /// Message rate points.
    Rates(Vec<RatePoint>),
    /// Throughput points.
    Throughput(Vec<ThroughputPoint>),
    /// Connection points.
    Connections(Vec<ConnectionPoint>),
}

impl FamilySeries {
    /// The family these points belong to.
    #[must_use]
    pub const fn family(&self) -> MetricFamily {
        match self {
            Self::Rates(_) => MetricFamily::Rate,
            Self::Throughput(_) => MetricFamily::Throughput,
            Self::Connections(_) => MetricFamily::Connections,
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Rates(points) => points.len(),
            Self::Throughput(points) => points.len(),
            Self::Connections(points) => points.len(),
        }
    }

    /// Returns `true` if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
