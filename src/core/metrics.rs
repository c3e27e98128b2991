//! Response metrics computed on aligned trials and histograms.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::align::AlignedTrial;
use crate::core::histogram::Histogram;
use crate::error::PsthError;

/// Stimulus responsiveness of a unit, comparing the activity before and after the trial onsets.
///
/// # Examples
///
/// ```rust
/// use rusty_psth::core::align::AlignedTrial;
/// use rusty_psth::core::metrics::Responsiveness;
///
/// let trials = vec![
///     AlignedTrial::build(vec![-0.05, 0.01, 0.02, 0.03]).unwrap(),
///     AlignedTrial::build(vec![0.015, 0.025]).unwrap(),
/// ];
///
/// // Compare the 100 ms before onset with the 50 ms after onset
/// let responsiveness = Responsiveness::measure(&trials, 0.1, 0.05).unwrap();
/// assert_eq!(responsiveness.baseline_count, 1);
/// assert_eq!(responsiveness.evoked_count, 5);
/// assert!((responsiveness.ratio().unwrap() - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Responsiveness {
    /// The number of events in [-baseline, 0) over all trials.
    pub baseline_count: usize,
    /// The number of events in [0, duration) over all trials.
    pub evoked_count: usize,
    /// The mean rate (in Hz) before onset.
    pub baseline_rate: f64,
    /// The mean rate (in Hz) after onset.
    pub evoked_rate: f64,
}

impl Responsiveness {
    /// Measure the responsiveness over the aligned trials.
    /// The function returns an error if the windows are not positive or if there are no trials.
    pub fn measure(
        trials: &[AlignedTrial],
        baseline: f64,
        duration: f64,
    ) -> Result<Self, PsthError> {
        if !baseline.is_finite() || baseline <= 0.0 {
            return Err(PsthError::InvalidArgument(format!(
                "baseline window must be a positive number, got {}",
                baseline
            )));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(PsthError::InvalidArgument(format!(
                "response window must be a positive number, got {}",
                duration
            )));
        }
        if trials.is_empty() {
            return Err(PsthError::InvalidArgument(
                "responsiveness is undefined without any trial".to_string(),
            ));
        }

        let (baseline_count, evoked_count) = trials
            .iter()
            .flat_map(|trial| trial.iter())
            .fold((0, 0), |(pre, post), &dt| {
                if dt >= -baseline && dt < 0.0 {
                    (pre + 1, post)
                } else if dt >= 0.0 && dt < duration {
                    (pre, post + 1)
                } else {
                    (pre, post)
                }
            });

        let num_trials = trials.len() as f64;
        Ok(Responsiveness {
            baseline_count,
            evoked_count,
            baseline_rate: baseline_count as f64 / (num_trials * baseline),
            evoked_rate: evoked_count as f64 / (num_trials * duration),
        })
    }

    /// Returns the ratio of the evoked rate to the baseline rate, or `None` if the baseline is silent.
    pub fn ratio(&self) -> Option<f64> {
        (self.baseline_rate > 0.0).then(|| self.evoked_rate / self.baseline_rate)
    }

    /// Returns true if the unit fires at least `min_count` events after onset and
    /// its rate increases by at least `min_ratio` (a silent baseline counts as an increase).
    pub fn is_responsive(&self, min_ratio: f64, min_count: usize) -> bool {
        if self.evoked_count < min_count {
            return false;
        }
        match self.ratio() {
            Some(ratio) => ratio >= min_ratio,
            None => self.evoked_count > 0,
        }
    }

    /// Returns a score to rank responsive units, i.e., the rate ratio weighted by the evoked count.
    /// A silent baseline contributes a unit ratio.
    pub fn score(&self) -> f64 {
        self.ratio().unwrap_or(1.0) * self.evoked_count as f64
    }
}

/// Returns the Pearson correlation of two equally long sequences, NaN if one of them is constant.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (cov, x_var, y_var) = xs.iter().zip(ys).fold((0.0, 0.0, 0.0), |(c, vx, vy), (x, y)| {
        let (dx, dy) = (x - x_mean, y - y_mean);
        (c + dx * dy, vx + dx * dx, vy + dy * dy)
    });

    if x_var > 0.0 && y_var > 0.0 {
        (cov / (x_var * y_var).sqrt()).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

/// Compute the Pearson correlation matrix between the rates of several histograms.
///
/// All histograms must have the same number of bins. An entry involving a histogram with constant rates is NaN.
pub fn correlation_matrix(histograms: &[Histogram]) -> Result<Vec<Vec<f64>>, PsthError> {
    if let Some((first, other)) = histograms
        .iter()
        .tuple_windows()
        .find(|(h1, h2)| h1.num_bins() != h2.num_bins())
    {
        return Err(PsthError::IncompatibleHistograms(format!(
            "{} bins and {} bins",
            first.num_bins(),
            other.num_bins()
        )));
    }

    let num = histograms.len();
    let mut matrix = vec![vec![f64::NAN; num]; num];
    for (i, j) in (0..num).tuple_combinations() {
        let corr = pearson(histograms[i].rates(), histograms[j].rates());
        matrix[i][j] = corr;
        matrix[j][i] = corr;
    }
    for (i, histogram) in histograms.iter().enumerate() {
        matrix[i][i] = pearson(histogram.rates(), histogram.rates());
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::core::histogram::histogram;

    fn trial(times: &[f64]) -> AlignedTrial {
        AlignedTrial::build(times.to_vec()).unwrap()
    }

    #[test]
    fn test_responsiveness() {
        let trials = vec![
            trial(&[-0.2, -0.05, 0.0, 0.01, 0.02]),
            trial(&[]),
            trial(&[-0.01, 0.049, 0.05, 0.3]),
        ];

        let responsiveness = Responsiveness::measure(&trials, 0.1, 0.05).unwrap();
        assert_eq!(responsiveness.baseline_count, 2);
        assert_eq!(responsiveness.evoked_count, 4);
        assert_relative_eq!(responsiveness.baseline_rate, 2.0 / 0.3, epsilon = 1e-9);
        assert_relative_eq!(responsiveness.evoked_rate, 4.0 / 0.15, epsilon = 1e-9);
        assert_relative_eq!(responsiveness.ratio().unwrap(), 4.0, epsilon = 1e-9);

        assert!(responsiveness.is_responsive(2.0, 4));
        assert!(!responsiveness.is_responsive(2.0, 5));
        assert!(!responsiveness.is_responsive(5.0, 1));
        assert_relative_eq!(responsiveness.score(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_responsiveness_silent_baseline() {
        let trials = vec![trial(&[0.01, 0.02])];
        let responsiveness = Responsiveness::measure(&trials, 0.1, 0.05).unwrap();
        assert_eq!(responsiveness.ratio(), None);
        assert!(responsiveness.is_responsive(2.0, 1));
        assert_relative_eq!(responsiveness.score(), 2.0);

        let silent = Responsiveness::measure(&[trial(&[])], 0.1, 0.05).unwrap();
        assert!(!silent.is_responsive(2.0, 0));
    }

    #[test]
    fn test_responsiveness_invalid_arguments() {
        let trials = vec![trial(&[0.01])];
        assert!(Responsiveness::measure(&trials, 0.0, 0.05).is_err());
        assert!(Responsiveness::measure(&trials, 0.1, -0.05).is_err());
        assert!(Responsiveness::measure(&[], 0.1, 0.05).is_err());
    }

    #[test]
    fn test_correlation_matrix() {
        let trials_1 = vec![trial(&[0.05, 0.15, 0.15, 0.25, 0.25, 0.25])];
        let trials_2 = vec![trial(&[0.05, 0.05, 0.15, 0.15, 0.15, 0.15, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25])];
        let trials_3 = vec![trial(&[0.05, 0.05, 0.05, 0.15, 0.15, 0.25])];
        let trials_4 = vec![trial(&[0.05, 0.15, 0.25])];

        let histograms: Vec<Histogram> = [trials_1, trials_2, trials_3, trials_4]
            .iter()
            .map(|trials| histogram(trials, 0.1, 0.0, 0.3).unwrap())
            .collect();

        let matrix = correlation_matrix(&histograms).unwrap();
        assert_eq!(matrix.len(), 4);
        assert_relative_eq!(matrix[0][0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix[0][1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix[0][2], -1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix[2][0], -1.0, epsilon = 1e-9);

        // Flat histogram
        assert!(matrix[0][3].is_nan());
        assert!(matrix[3][3].is_nan());
    }

    #[test]
    fn test_correlation_matrix_incompatible() {
        let trials = vec![trial(&[0.05])];
        let histograms = vec![
            histogram(&trials, 0.1, 0.0, 0.3).unwrap(),
            histogram(&trials, 0.1, 0.0, 0.5).unwrap(),
        ];
        assert!(matches!(
            correlation_matrix(&histograms),
            Err(PsthError::IncompatibleHistograms(_))
        ));
        assert_eq!(correlation_matrix(&[]).unwrap(), Vec::<Vec<f64>>::new());
    }
}
