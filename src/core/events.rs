//! Event time series, i.e., the ordered timestamps of one signal source (typically the spikes of one unit).
use serde::{Deserialize, Serialize};

use crate::core::utils::{cmp_times, is_non_decreasing, TimeInterval};
use crate::error::PsthError;

/// An ordered sequence of event times (in seconds) for a single source.
/// The times are finite and sorted in non-decreasing order.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct EventTimeSeries {
    times: Vec<f64>,
}

impl EventTimeSeries {
    /// Create an event time series from the provided times.
    /// If necessary, the times are sorted.
    /// The function returns an error for non-finite times.
    pub fn build(times: Vec<f64>) -> Result<Self, PsthError> {
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(PsthError::InvalidTimes(format!(
                "event time {} is not finite",
                t
            )));
        }

        let mut times = times;
        if !is_non_decreasing(&times) {
            log::debug!("Sorting {} unordered event times", times.len());
            times.sort_by(cmp_times);
        }

        Ok(EventTimeSeries { times })
    }

    /// Create an empty event time series.
    pub fn new_empty() -> Self {
        EventTimeSeries { times: vec![] }
    }

    /// Returns the event times.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Returns the mean event rate (in Hz) between the first and the last event.
    /// Returns `None` if there are fewer than two events or if they all share the same time.
    pub fn mean_rate(&self) -> Option<f64> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if last > first => Some(self.len() as f64 / (last - first)),
            _ => None,
        }
    }

    /// Returns the events falling in the provided (closed) interval, found by binary search.
    pub fn restrict(&self, interval: &TimeInterval) -> &[f64] {
        match interval {
            TimeInterval::Closed { start, end } => {
                let lo = self.times.partition_point(|t| t < start);
                let hi = self.times.partition_point(|t| t <= end);
                &self.times[lo..hi.max(lo)]
            }
            TimeInterval::Empty => &[],
        }
    }
}

impl TryFrom<Vec<f64>> for EventTimeSeries {
    type Error = PsthError;

    fn try_from(times: Vec<f64>) -> Result<Self, Self::Error> {
        EventTimeSeries::build(times)
    }
}

impl From<EventTimeSeries> for Vec<f64> {
    fn from(events: EventTimeSeries) -> Self {
        events.times
    }
}
