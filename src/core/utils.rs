//! Utility functions and types.
use std::cmp::Ordering;

/// A closed time interval, possibly empty.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum TimeInterval {
    Closed { start: f64, end: f64 },
    Empty,
}

impl TimeInterval {
    /// Returns [start, end], or an empty interval if start > end or a bound is NaN.
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end {
            TimeInterval::Closed { start, end }
        } else {
            TimeInterval::Empty
        }
    }
}

/// Total order on finite times. NaN must be rejected before sorting.
pub(crate) fn cmp_times(t1: &f64, t2: &f64) -> Ordering {
    t1.partial_cmp(t2).unwrap_or(Ordering::Equal)
}

/// Returns true if the times are sorted in non-decreasing order.
pub(crate) fn is_non_decreasing(times: &[f64]) -> bool {
    times.windows(2).all(|ts| ts[0] <= ts[1])
}
