//! Trial windows, i.e., the repeats of a stimulus or analysis epochs events are aligned to.
use serde::{Deserialize, Serialize};

use crate::error::PsthError;

/// A trial window [start, stop], e.g., one presentation of a stimulus.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct TrialWindow {
    start: f64,
    stop: f64,
}

impl TrialWindow {
    /// Create a trial window with the specified bounds.
    /// The function returns an error if a bound is not finite or if stop precedes start.
    pub fn build(start: f64, stop: f64) -> Result<Self, PsthError> {
        if !start.is_finite() || !stop.is_finite() || stop < start {
            return Err(PsthError::InvalidWindow { start, stop });
        }
        Ok(TrialWindow { start, stop })
    }

    /// Returns the onset of the window.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the offset of the window.
    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

impl TryFrom<(f64, f64)> for TrialWindow {
    type Error = PsthError;

    fn try_from((start, stop): (f64, f64)) -> Result<Self, Self::Error> {
        TrialWindow::build(start, stop)
    }
}

impl From<TrialWindow> for (f64, f64) {
    fn from(window: TrialWindow) -> Self {
        (window.start, window.stop)
    }
}

/// An ordered collection of trial windows.
/// The order is the presentation order; windows do not need to be sorted relative to each other.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialSet {
    windows: Vec<TrialWindow>,
}

impl TrialSet {
    pub fn new(windows: Vec<TrialWindow>) -> Self {
        TrialSet { windows }
    }

    pub fn new_empty() -> Self {
        TrialSet { windows: vec![] }
    }

    /// Create a trial set from (start, stop) pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, PsthError> {
        let windows = pairs
            .iter()
            .map(|&(start, stop)| TrialWindow::build(start, stop))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrialSet { windows })
    }

    /// Create a trial set from parallel start and stop columns, as found in interval tables.
    pub fn from_columns(starts: &[f64], stops: &[f64]) -> Result<Self, PsthError> {
        if starts.len() != stops.len() {
            return Err(PsthError::InvalidArgument(format!(
                "{} start times but {} stop times",
                starts.len(),
                stops.len()
            )));
        }
        let windows = starts
            .iter()
            .zip(stops)
            .map(|(&start, &stop)| TrialWindow::build(start, stop))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrialSet { windows })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[TrialWindow] {
        &self.windows[..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrialWindow> {
        self.windows.iter()
    }

    /// Returns the onsets of the windows, in presentation order.
    pub fn starts(&self) -> Vec<f64> {
        self.windows.iter().map(|window| window.start).collect()
    }

    /// Returns the mean duration of the windows, or `None` for an empty set.
    pub fn mean_duration(&self) -> Option<f64> {
        if self.windows.is_empty() {
            return None;
        }
        let total: f64 = self.windows.iter().map(|window| window.duration()).sum();
        Some(total / self.windows.len() as f64)
    }

    /// Returns a new trial set with (at most) the first `num_trials` windows.
    pub fn truncated(&self, num_trials: usize) -> Self {
        TrialSet {
            windows: self.windows.iter().take(num_trials).copied().collect(),
        }
    }
}

impl FromIterator<TrialWindow> for TrialSet {
    fn from_iter<I: IntoIterator<Item = TrialWindow>>(iter: I) -> Self {
        TrialSet {
            windows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_window_build() {
        let window = TrialWindow::build(1.0, 1.1).unwrap();
        assert_eq!(window.start(), 1.0);
        assert_eq!(window.stop(), 1.1);
        assert_relative_eq!(window.duration(), 0.1, epsilon = 1e-12);

        // Zero-length windows are valid
        assert!(TrialWindow::build(2.0, 2.0).is_ok());

        assert_eq!(
            TrialWindow::build(2.0, 1.0),
            Err(PsthError::InvalidWindow {
                start: 2.0,
                stop: 1.0
            })
        );
        assert!(TrialWindow::build(f64::NAN, 1.0).is_err());
        assert!(TrialWindow::build(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_trial_set() {
        // Windows are kept in presentation order, even when unsorted
        let trials = TrialSet::from_pairs(&[(2.0, 2.1), (1.0, 1.1)]).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials.starts(), vec![2.0, 1.0]);
        assert_relative_eq!(trials.mean_duration().unwrap(), 0.1, epsilon = 1e-12);

        assert_eq!(TrialSet::new_empty().mean_duration(), None);
        assert!(TrialSet::from_pairs(&[(0.0, 1.0), (3.0, 2.0)]).is_err());

        let truncated = trials.truncated(1);
        assert_eq!(truncated.starts(), vec![2.0]);
        assert_eq!(trials.truncated(10), trials);
    }

    #[test]
    fn test_from_columns() {
        let trials = TrialSet::from_columns(&[0.0, 1.0, 2.0], &[0.5, 1.5, 2.5]).unwrap();
        assert_eq!(trials.len(), 3);
        assert_relative_eq!(trials.mean_duration().unwrap(), 0.5);

        assert!(matches!(
            TrialSet::from_columns(&[0.0, 1.0], &[0.5]),
            Err(PsthError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serde() {
        let trials: TrialSet = serde_json::from_str("[[1.0, 1.5], [0.0, 0.5]]").unwrap();
        assert_eq!(trials.starts(), vec![1.0, 0.0]);
        assert!(serde_json::from_str::<TrialSet>("[[1.0, 0.5]]").is_err());
    }
}
