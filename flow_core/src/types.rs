//! Data model shared by the pipeline stages.

/// One row of the raw digital export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// Source time unit (nanoseconds for the usual export).
    pub timestamp: i64,
    /// Digital column: `true` for 1, `false` for 0.
    pub high: bool,
}

impl RawSample {
    #[inline]
    pub fn new(timestamp: i64, high: bool) -> Self {
        Self { timestamp, high }
    }
}

/// A row retained by the edge detector.
///
/// `flag` is set only at a rising edge; rows kept for a dense debug timeline
/// carry `flag == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    pub timestamp: i64,
    pub flag: bool,
}

impl PulseEvent {
    #[inline]
    pub fn pulse(timestamp: i64) -> Self {
        Self {
            timestamp,
            flag: true,
        }
    }

    #[inline]
    pub fn flattened(timestamp: i64) -> Self {
        Self {
            timestamp,
            flag: false,
        }
    }

    #[inline]
    pub fn is_pulse(&self) -> bool {
        self.flag
    }
}

impl From<PulseEvent> for RawSample {
    fn from(e: PulseEvent) -> Self {
        Self {
            timestamp: e.timestamp,
            high: e.flag,
        }
    }
}

/// One point of the chart-ready series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedPoint {
    /// Floored working milliseconds.
    pub time_ms: i64,
    /// Calibrated units per second.
    pub rate: f64,
    /// Calibrated cumulative volume.
    pub total: f64,
}

impl ReducedPoint {
    pub const ORIGIN: Self = Self {
        time_ms: 0,
        rate: 0.0,
        total: 0.0,
    };

    #[inline]
    pub fn new(time_ms: i64, rate: f64, total: f64) -> Self {
        Self {
            time_ms,
            rate,
            total,
        }
    }

    #[inline]
    pub fn is_zero_rate(&self) -> bool {
        self.rate == 0.0
    }
}
