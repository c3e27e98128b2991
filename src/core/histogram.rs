//! Peri-stimulus time histograms (PSTH), i.e., trial-averaged firing rates of aligned trials.
use serde::{Deserialize, Serialize};

use crate::core::align::AlignedTrial;
use crate::core::{EDGE_TOLERANCE, MAX_BINS};
use crate::error::PsthError;

/// A fixed-width histogram of aligned event times, with the rate (in Hz) of every bin.
/// The bins cover [range_start, range_start + num_bins * bin_width).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Histogram {
    range_start: f64,
    bin_width: f64,
    num_trials: usize,
    counts: Vec<usize>,
    rates: Vec<f64>,
}

impl Histogram {
    /// Returns the left edge of the first bin.
    pub fn range_start(&self) -> f64 {
        self.range_start
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Returns the number of trials the counts are averaged over, empty trials included.
    pub fn num_trials(&self) -> usize {
        self.num_trials
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Returns the raw event count of every bin.
    pub fn counts(&self) -> &[usize] {
        &self.counts[..]
    }

    /// Returns the rate (in Hz) of every bin.
    pub fn rates(&self) -> &[f64] {
        &self.rates[..]
    }

    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Returns the bin edges, one more than the number of bins.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.num_bins())
            .map(|k| self.range_start + k as f64 * self.bin_width)
            .collect()
    }

    /// Returns the bin centers.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.num_bins())
            .map(|k| self.range_start + (k as f64 + 0.5) * self.bin_width)
            .collect()
    }
}

/// Returns the number of whole bins of the given width fitting in the range.
/// The function returns an error if there are more than `MAX_BINS` of them.
fn num_bins(bin_width: f64, range_start: f64, range_end: f64) -> Result<usize, PsthError> {
    let num_bins = ((range_end - range_start) / bin_width + EDGE_TOLERANCE).floor();
    if !num_bins.is_finite() || num_bins > MAX_BINS as f64 {
        return Err(PsthError::InvalidArgument(format!(
            "[{}, {}) holds {} bins of width {}, at most {} are supported",
            range_start, range_end, num_bins, bin_width, MAX_BINS
        )));
    }
    Ok(num_bins as usize)
}

/// Returns the bin of a relative time, if it falls in [range_start, range_end).
/// Times a tolerance below an inner edge are assigned to the bin starting at that edge.
fn bin_index(
    time: f64,
    bin_width: f64,
    range_start: f64,
    range_end: f64,
    num_bins: usize,
) -> Option<usize> {
    if num_bins == 0 || time < range_start || time >= range_end {
        return None;
    }
    let position = (time - range_start) / bin_width + EDGE_TOLERANCE;
    Some((position.floor() as usize).min(num_bins - 1))
}

/// Compute the trial-averaged histogram of the aligned trials over [range_start, range_end).
///
/// A final partial bin is dropped. Times outside the range are ignored.
/// The rate of a bin is its count divided by the number of trials (empty ones included) and the bin width.
/// The function returns an error for a non-positive bin width, an invalid range, too many bins or if there are no trials.
///
/// # Examples
///
/// ```rust
/// use rusty_psth::core::align::align;
/// use rusty_psth::core::events::EventTimeSeries;
/// use rusty_psth::core::histogram::histogram;
/// use rusty_psth::core::trial::TrialSet;
///
/// let events = EventTimeSeries::build(vec![0.5, 1.2, 1.25, 3.0]).unwrap();
/// let trials = TrialSet::from_pairs(&[(1.0, 1.1), (2.0, 2.1)]).unwrap();
/// let aligned = align(&events, &trials, 0.1, 0.3).unwrap();
///
/// let psth = histogram(&aligned, 0.1, 0.0, 0.3).unwrap();
/// assert_eq!(psth.counts(), &[0, 0, 2]);
/// assert!((psth.rates()[2] - 10.0).abs() < 1e-9);
/// ```
pub fn histogram(
    trials: &[AlignedTrial],
    bin_width: f64,
    range_start: f64,
    range_end: f64,
) -> Result<Histogram, PsthError> {
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(PsthError::InvalidArgument(format!(
            "bin_width must be a positive number, got {}",
            bin_width
        )));
    }
    if !range_start.is_finite() || !range_end.is_finite() || range_end <= range_start {
        return Err(PsthError::InvalidArgument(format!(
            "invalid histogram range [{}, {})",
            range_start, range_end
        )));
    }
    if trials.is_empty() {
        return Err(PsthError::InvalidArgument(
            "rates are undefined without any trial".to_string(),
        ));
    }

    let num_bins = num_bins(bin_width, range_start, range_end)?;
    // The last whole bin may end short of range_end when a partial bin is dropped
    let binned_end = range_end.min(range_start + num_bins as f64 * bin_width);
    let mut counts = vec![0_usize; num_bins];
    trials
        .iter()
        .flat_map(|trial| trial.iter())
        .filter_map(|&time| bin_index(time, bin_width, range_start, binned_end, num_bins))
        .for_each(|index| counts[index] += 1);

    let norm = trials.len() as f64 * bin_width;
    let rates = counts.iter().map(|&count| count as f64 / norm).collect();

    log::trace!(
        "Histogram of {} trials: {} bins of width {}, {} events binned",
        trials.len(),
        num_bins,
        bin_width,
        counts.iter().sum::<usize>()
    );

    Ok(Histogram {
        range_start,
        bin_width,
        num_trials: trials.len(),
        counts,
        rates,
    })
}
