//! Time-unit helpers for flow_core.

/// Source units per millisecond for nanosecond exports.
pub const NANOS_PER_MS: i64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: f64 = 1_000.0;

/// Floor a source timestamp to working milliseconds.
/// - Clamps `divisor` to at least 1.
/// - Rounds toward negative infinity for negative timestamps.
#[inline]
pub fn floor_ms(raw: i64, divisor: i64) -> i64 {
    raw.div_euclid(divisor.max(1))
}

/// Elapsed working milliseconds from `from` to `to` (negative when time goes backwards).
#[inline]
pub fn delta_ms(from: i64, to: i64, divisor: i64) -> f64 {
    to.saturating_sub(from) as f64 / divisor.max(1) as f64
}

/// Timestamp string understood by the recording tool, e.g. `"1500ms"`.
#[inline]
pub fn elapsed_stamp(time_ms: i64) -> String {
    format!("{time_ms}ms")
}
