//! Pulse events to a chart-ready (time, rate, total) series.
//!
//! The reducer is a two-state machine:
//!
//! - `NoPriorSample`: nothing processed yet. The first pulse with a nonzero
//!   timestamp is preceded by the origin point `{0, 0, 0}`.
//! - `Tracking`: remembers the last pulse time and the last rate.
//!
//! Every pulse adds one count to the total. A gap longer than
//! `zero_threshold_ms` is drawn as a flat zero segment: two zero-rate points
//! one working millisecond inside each end of the gap. A single point there
//! would make the chart interpolate a slope across the gap.
//!
//! `finish` is the terminal action: when the last rate is nonzero it emits a
//! zero-rate point `closing_offset` source units after the last pulse so the
//! line always closes at zero. The total carries forward unchanged.

use crate::config::{OrderingPolicy, ReduceCfg};
use crate::error::{FlowError, Result};
use crate::types::{PulseEvent, ReducedPoint};
use crate::util::{MILLIS_PER_SEC, delta_ms, floor_ms};

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    NoPriorSample,
    Tracking { last_time: i64, rate: f64 },
}

/// Points emitted by one `advance` call: origin plus a bracket pair at most.
#[derive(Debug, Clone, Copy)]
pub struct Emitted {
    points: [ReducedPoint; 3],
    len: usize,
}

impl Emitted {
    fn empty() -> Self {
        Self {
            points: [ReducedPoint::ORIGIN; 3],
            len: 0,
        }
    }

    fn push(&mut self, p: ReducedPoint) {
        debug_assert!(self.len < self.points.len());
        self.points[self.len] = p;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[ReducedPoint] {
        &self.points[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'a> IntoIterator for &'a Emitted {
    type Item = &'a ReducedPoint;
    type IntoIter = std::slice::Iter<'a, ReducedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

#[derive(Debug, Clone)]
pub struct Reducer {
    cfg: ReduceCfg,
    state: State,
    pulses: u64,
}

impl Reducer {
    pub fn new(cfg: ReduceCfg) -> Self {
        Self {
            cfg,
            state: State::NoPriorSample,
            pulses: 0,
        }
    }

    /// Pulses counted so far (pre-calibration total).
    #[inline]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Calibrated running total.
    #[inline]
    pub fn total(&self) -> f64 {
        self.pulses as f64 * self.cfg.cal_factor
    }

    /// Process one event. Flattened debug rows (`flag == false`) are ignored.
    pub fn advance(&mut self, event: PulseEvent) -> Result<Emitted> {
        let mut out = Emitted::empty();
        if !event.is_pulse() {
            return Ok(out);
        }

        let (first, last_time, prev_rate) = match self.state {
            State::NoPriorSample => (true, 0, 0.0),
            State::Tracking { last_time, rate } => (false, last_time, rate),
        };
        let div = self.cfg.time_divisor;
        let cal = self.cfg.cal_factor;
        let t = event.timestamp;
        let delta = delta_ms(last_time, t, div);

        if delta < 0.0 && self.cfg.ordering == OrderingPolicy::Reject {
            return Err(FlowError::DataOrdering {
                previous: last_time,
                current: t,
            }
            .into());
        }

        if first && t != 0 {
            out.push(ReducedPoint::ORIGIN);
        }
        self.pulses += 1;
        let total = self.total();

        if delta > self.cfg.zero_threshold_ms {
            out.push(ReducedPoint::new(floor_ms(last_time, div) + 1, 0.0, total));
            out.push(ReducedPoint::new(floor_ms(t, div) - 1, 0.0, total));
            self.state = State::Tracking {
                last_time: t,
                rate: 0.0,
            };
        } else if delta > 0.0 {
            let rate = MILLIS_PER_SEC / delta;
            out.push(ReducedPoint::new(floor_ms(t, div), rate * cal, total));
            self.state = State::Tracking { last_time: t, rate };
        } else {
            // Coincident or (clamped) backwards pulse: the clock does not move.
            tracing::debug!(previous = last_time, current = t, "non-increasing pulse timestamp");
            out.push(ReducedPoint::new(
                floor_ms(last_time, div),
                prev_rate * cal,
                total,
            ));
            self.state = State::Tracking {
                last_time,
                rate: prev_rate,
            };
        }
        Ok(out)
    }

    /// Closing zero-rate point, if the series does not already end at zero.
    pub fn finish(self) -> Option<ReducedPoint> {
        match self.state {
            State::Tracking { last_time, rate } if rate != 0.0 => Some(ReducedPoint::new(
                floor_ms(
                    last_time.saturating_add(self.cfg.closing_offset),
                    self.cfg.time_divisor,
                ),
                0.0,
                self.total(),
            )),
            _ => None,
        }
    }
}

/// Reduce a whole event sequence. Empty input yields an empty series.
pub fn reduce<I>(events: I, cfg: &ReduceCfg) -> Result<Vec<ReducedPoint>>
where
    I: IntoIterator<Item = PulseEvent>,
{
    let mut reducer = Reducer::new(cfg.clone());
    let mut out = Vec::new();
    for event in events {
        out.extend_from_slice(reducer.advance(event)?.as_slice());
    }
    out.extend(reducer.finish());
    Ok(out)
}
