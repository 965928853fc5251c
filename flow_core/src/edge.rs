//! Rising-edge detection over the raw digital column.
//!
//! The first sample only primes the detector: it is never evaluated for a
//! transition and never emitted, whatever `keep_all_rows` says.

use crate::types::{PulseEvent, RawSample};

#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    keep_all_rows: bool,
    last_flag: Option<bool>,
    rising_edges: u64,
}

impl EdgeDetector {
    pub fn new(keep_all_rows: bool) -> Self {
        Self {
            keep_all_rows,
            ..Self::default()
        }
    }

    /// Feed one sample; returns the row to emit, if any.
    pub fn advance(&mut self, sample: RawSample) -> Option<PulseEvent> {
        let current = sample.high;
        let out = match self.last_flag {
            Some(last) if last != current && current => {
                self.rising_edges += 1;
                Some(PulseEvent::pulse(sample.timestamp))
            }
            Some(_) if self.keep_all_rows => Some(PulseEvent::flattened(sample.timestamp)),
            // warm-up row, or a non-edge with the dense timeline off
            _ => None,
        };
        self.last_flag = Some(current);
        out
    }

    #[inline]
    pub fn rising_edges(&self) -> u64 {
        self.rising_edges
    }
}

/// Output of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeScan {
    pub events: Vec<PulseEvent>,
    /// Number of true rising edges; independent of `keep_all_rows`.
    pub rising_edges: u64,
}

pub fn detect_edges<I>(samples: I, keep_all_rows: bool) -> EdgeScan
where
    I: IntoIterator<Item = RawSample>,
{
    let mut detector = EdgeDetector::new(keep_all_rows);
    let events = samples
        .into_iter()
        .filter_map(|s| detector.advance(s))
        .collect();
    EdgeScan {
        events,
        rising_edges: detector.rising_edges(),
    }
}
