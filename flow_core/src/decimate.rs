//! Deterministic sparsification of the reduced series before upload.

use crate::types::ReducedPoint;

/// Row-counting filter. Rows are numbered from 1.
///
/// Keeps row 1, every zero-rate row (gap edges must survive for the line shape),
/// and every row whose number is a multiple of `keep_every_nth`.
#[derive(Debug, Clone)]
pub struct Decimator {
    every_nth: u64,
    row: u64,
}

impl Decimator {
    /// `keep_every_nth` of 0 is treated as 1 (keep everything).
    pub fn new(keep_every_nth: u32) -> Self {
        Self {
            every_nth: u64::from(keep_every_nth.max(1)),
            row: 0,
        }
    }

    pub fn keep(&mut self, point: &ReducedPoint) -> bool {
        self.row += 1;
        self.row == 1 || point.is_zero_rate() || self.row % self.every_nth == 0
    }
}

pub fn decimate<I>(points: I, keep_every_nth: u32) -> Vec<ReducedPoint>
where
    I: IntoIterator<Item = ReducedPoint>,
{
    let mut d = Decimator::new(keep_every_nth);
    points.into_iter().filter(|p| d.keep(p)).collect()
}
