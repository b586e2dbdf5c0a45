//! Elapsed-time arithmetic on absolute instants.
//!
//! Durations are always computed from epoch-millisecond deltas, so a span
//! crossing a daylight-saving transition still measures 24 hours per day.

use chrono::{DateTime, Utc};

/// Milliseconds in one day
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days elapsed from `from` to `to` (negative when `to` is earlier)
#[must_use]
pub fn elapsed_days(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    (to.timestamp_millis() - from.timestamp_millis()) as f64 / MILLIS_PER_DAY
}

/// Whole days elapsed from `from` to `to`, rounded toward negative infinity
#[must_use]
pub fn elapsed_whole_days(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    (to.timestamp_millis() - from.timestamp_millis()).div_euclid(86_400_000)
}
