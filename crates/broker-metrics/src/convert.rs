//! Unit conversion and rounding for chart values.

/// Bytes in one kilobyte as shown on throughput charts.
pub const BYTES_PER_KIB: f64 = 1024.0;

/// Rounds to the nearest integer, with halves rounding towards positive infinity.
///
/// `4.5` becomes `5` and `-4.5` becomes `-4`. Non-finite input is returned
/// unchanged.
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Converts a bytes-per-second rate to whole kilobytes per second.
#[must_use]
pub fn bytes_to_kib_per_sec(bytes_per_sec: f64) -> f64 {
    round_half_up(bytes_per_sec / BYTES_PER_KIB)
}
