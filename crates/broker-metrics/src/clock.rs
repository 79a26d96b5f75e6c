//! Arrival labels for recorded snapshots.
//!
//! The history stamps every snapshot with a wall-clock label when it arrives.
//! The label is a chart category, never parsed back, so only hour, minute and
//! second are kept.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local, TimeZone};

/// `strftime` pattern for arrival labels (24h).
pub const LABEL_FORMAT: &str = "%H:%M:%S";

/// Source of arrival labels.
pub trait Clock: Send + Sync {
    /// Returns the label for "now".
    fn now_label(&self) -> String;
}

/// Formats a point in time as an arrival label.
#[must_use]
pub fn format_label<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(LABEL_FORMAT).to_string()
}

/// Labels from the host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_label(&self) -> String {
        format_label(&Local::now())
    }
}

/// Always returns the same label.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    /// Creates a clock frozen at `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl Clock for FixedClock {
    fn now_label(&self) -> String {
        self.0.clone()
    }
}

/// Cycles through a fixed list of labels, one per call.
#[derive(Debug)]
pub struct SequenceClock {
    labels: Vec<String>,
    next: AtomicUsize,
}

impl SequenceClock {
    /// Creates a clock that yields `labels` in order and then starts over.
    ///
    /// An empty list yields empty labels.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Number of labels handed out so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}

impl Clock for SequenceClock {
    fn now_label(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        if self.labels.is_empty() {
            return String::new();
        }
        self.labels[index % self.labels.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn format_label_is_hours_minutes_seconds() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        assert_eq!(format_label(&time), "07:05:03");
    }

    #[test]
    fn format_label_uses_24_hour_clock() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(format_label(&time), "23:59:59");
    }

    #[test]
    fn system_clock_label_shape() {
        let label = SystemClock.now_label();
        let parts: Vec<&str> = label.split(':').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn fixed_clock_repeats() {
        let clock = FixedClock::new("12:00:00");
        assert_eq!(clock.now_label(), "12:00:00");
        assert_eq!(clock.now_label(), "12:00:00");
    }

    #[test]
    fn sequence_clock_cycles_and_counts() {
        let clock = SequenceClock::new(["a", "b"]);

        assert_eq!(clock.now_label(), "a");
        assert_eq!(clock.now_label(), "b");
        assert_eq!(clock.now_label(), "a");
        assert_eq!(clock.calls(), 3);
    }

    #[test]
    fn empty_sequence_clock_yields_empty_labels() {
        let clock = SequenceClock::new(Vec::<String>::new());
        assert_eq!(clock.now_label(), "");
    }
}
