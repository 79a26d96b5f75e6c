//! Bounded, FIFO-evicting history of series points.
//!
//! This module provides the [`HistoryBuffer`] which keeps the most recent
//! points of one metric family in arrival order.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::error::{MetricsError, Result};

/// Default number of points retained per family.
pub const HISTORY_CAPACITY: usize = 30;

/// An ordered, bounded sequence of points.
///
/// Points are appended at the back. Once the buffer holds more than its
/// capacity the oldest points are dropped from the front, so index 0 is always
/// the oldest retained point. Equal points and equal timestamps are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer<P> {
    capacity: usize,
    points: VecDeque<P>,
}

impl<P> HistoryBuffer<P> {
    /// Creates an empty buffer with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            points: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Creates an empty buffer holding at most `capacity` points.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MetricsError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            points: VecDeque::with_capacity(capacity + 1),
        })
    }

    /// Appends a point and evicts from the front down to capacity.
    ///
    /// Returns the number of points evicted.
    pub fn push(&mut self, point: P) -> usize {
        self.points.push_back(point);
        let mut evicted = 0;
        while self.points.len() > self.capacity {
            self.points.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Maximum number of retained points.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no point has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` once the buffer holds `capacity` points.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    /// The oldest retained point.
    #[must_use]
    pub fn first(&self) -> Option<&P> {
        self.points.front()
    }

    /// The most recent point.
    #[must_use]
    pub fn latest(&self) -> Option<&P> {
        self.points.back()
    }

    /// The point at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&P> {
        self.points.get(index)
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &P> + ExactSizeIterator {
        self.points.iter()
    }

    /// Drops every point, keeping the capacity.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl<P: Clone> HistoryBuffer<P> {
    /// Copies the points out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<P> {
        self.points.iter().cloned().collect()
    }
}

impl<P> Default for HistoryBuffer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, P> IntoIterator for &'a HistoryBuffer<P> {
    type Item = &'a P;
    type IntoIter = std::collections::vec_deque::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Serializes as a plain JSON array, oldest first.
impl<P: Serialize> Serialize for HistoryBuffer<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.points.iter())
    }
}
