//! Synthetic broker statistics for running the dashboard without a broker.
//!
//! [`SyntheticBroker`] keeps cumulative counters that only grow, lets client
//! counts drift, and derives the per-second rates from the counter deltas of
//! each tick.

use std::time::Duration;

use broker_metrics::Snapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::feed::SnapshotFeed;

/// Generates plausible, evolving broker snapshots.
#[derive(Debug)]
pub struct SyntheticBroker {
    rng: StdRng,
    tick_secs: f64,
    current: Snapshot,
}

impl SyntheticBroker {
    /// Create a generator for snapshots taken every `tick`.
    #[must_use]
    pub fn new(tick: Duration) -> Self {
        Self::with_rng(tick, StdRng::from_entropy())
    }

    /// Create a reproducible generator.
    #[must_use]
    pub fn seeded(tick: Duration, seed: u64) -> Self {
        Self::with_rng(tick, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tick: Duration, rng: StdRng) -> Self {
        Self {
            rng,
            tick_secs: tick.as_secs_f64().max(0.001),
            current: Snapshot {
                connected_clients: 10,
                disconnected_clients: 2,
                total_clients: 12,
                subscriptions: 25,
                ..Snapshot::default()
            },
        }
    }

    /// Advance one tick and return the new snapshot.
    pub fn next_snapshot(&mut self) -> Snapshot {
        let s = &mut self.current;

        s.connected_clients = drift(&mut self.rng, s.connected_clients, 3);
        s.disconnected_clients = drift(&mut self.rng, s.disconnected_clients, 1);
        s.total_clients = s.connected_clients + s.disconnected_clients;
        s.subscriptions = s.connected_clients * self.rng.gen_range(1..=4u64);
        s.retained_messages += u64::from(self.rng.gen_bool(0.2));

        let published: u64 = self.rng.gen_range(0..=40u64) * s.connected_clients / 10;
        let received = published + self.rng.gen_range(0..=5u64);
        let fan_out = published * self.rng.gen_range(1..=3u64);
        let dropped = u64::from(self.rng.gen_bool(0.05)) * self.rng.gen_range(1..=3u64);
        let avg_size: u64 = self.rng.gen_range(64..=2048u64);

        s.messages_published += published;
        s.messages_received += received;
        s.messages_sent += fan_out;
        s.messages_dropped += dropped;

        let bytes_in = received * avg_size;
        let bytes_out = fan_out * avg_size;
        s.bytes_received += bytes_in;
        s.bytes_sent += bytes_out;

        s.message_rate_published = published as f64 / self.tick_secs;
        s.message_rate_received = received as f64 / self.tick_secs;
        s.throughput_inbound = bytes_in as f64 / self.tick_secs;
        s.throughput_outbound = bytes_out as f64 / self.tick_secs;

        s.clone()
    }
}

fn drift(rng: &mut StdRng, value: u64, step: u64) -> u64 {
    let up = rng.gen_range(0..=step);
    let down = rng.gen_range(0..=step);
    (value + up).saturating_sub(down)
}

/// Push one synthetic snapshot per tick until the feed closes.
pub async fn run_synthetic(feed: SnapshotFeed, mut broker: SyntheticBroker, tick: Duration) {
    let mut timer = interval(tick.max(Duration::from_millis(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(tick_ms = tick.as_millis(), "synthetic snapshot provider started");

    loop {
        timer.tick().await;
        let snapshot = broker.next_snapshot();
        debug!(clients = snapshot.connected_clients, "synthetic snapshot");
        if feed.push(Some(snapshot)).await.is_err() {
            break;
        }
    }

    info!("synthetic snapshot provider stopped");
}
