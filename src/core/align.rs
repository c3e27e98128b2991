//! Alignment of an event time series to trial windows.
//!
//! Every event retained for a trial is re-expressed relative to the onset of the trial window.
//! A trial retains the events within `pre_margin` before and `post_margin` after its onset,
//! both bounds included. The bounds are absolute times, so a relative time may exceed a margin
//! by one rounding step. The post-onset margin is measured from the window start, not its stop;
//! callers who want to keep the whole stimulus pass `post_margin = duration + slack`.
//!
//! # Examples
//!
//! ```rust
//! use rusty_psth::core::align::align;
//! use rusty_psth::core::events::EventTimeSeries;
//! use rusty_psth::core::trial::TrialSet;
//!
//! let events = EventTimeSeries::build(vec![0.5, 1.2, 1.25, 3.0]).unwrap();
//! let trials = TrialSet::from_pairs(&[(1.0, 1.1), (2.0, 2.1)]).unwrap();
//!
//! let aligned = align(&events, &trials, 0.1, 0.3).unwrap();
//! assert_eq!(aligned.len(), 2);
//! assert_eq!(aligned[0].len(), 2);
//! assert!(aligned[1].is_empty());
//! ```
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::events::EventTimeSeries;
use crate::core::trial::{TrialSet, TrialWindow};
use crate::core::utils::TimeInterval;
use crate::core::MIN_PARALLEL_TRIALS;
use crate::error::PsthError;

/// The event times of one trial, relative to the onset of its window.
/// The times are sorted in non-decreasing order. An empty trial is valid.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignedTrial {
    times: Vec<f64>,
}

impl AlignedTrial {
    /// Create an aligned trial from relative times computed elsewhere.
    /// If necessary, the times are sorted.
    /// The function returns an error for non-finite times.
    pub fn build(times: Vec<f64>) -> Result<Self, PsthError> {
        let events = EventTimeSeries::build(times)?;
        Ok(AlignedTrial {
            times: events.into(),
        })
    }

    pub fn new_empty() -> Self {
        AlignedTrial { times: vec![] }
    }

    /// Returns the relative event times.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.times.iter()
    }
}

/// A single mark of a raster, i.e., one retained event of one trial.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct RasterPoint {
    /// The position of the trial in presentation order.
    pub trial: usize,
    /// The event time relative to the trial onset.
    pub time: f64,
}

fn check_margin(name: &str, margin: f64) -> Result<(), PsthError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(PsthError::InvalidArgument(format!(
            "{} must be a non-negative number, got {}",
            name, margin
        )));
    }
    Ok(())
}

/// Extract the events retained by a single window, i.e., those in [onset - pre_margin, onset + post_margin].
fn align_window(
    events: &EventTimeSeries,
    window: &TrialWindow,
    pre_margin: f64,
    post_margin: f64,
) -> AlignedTrial {
    let onset = window.start();
    let retention = TimeInterval::new(onset - pre_margin, onset + post_margin);
    let times = events.restrict(&retention).iter().map(|t| t - onset).collect();
    AlignedTrial { times }
}

/// Align the events to every trial window, in presentation order.
///
/// Returns one aligned trial per window. The same event may be retained by several trials if their
/// retention intervals overlap.
/// The function returns an error if a margin is negative or not finite.
pub fn align(
    events: &EventTimeSeries,
    trials: &TrialSet,
    pre_margin: f64,
    post_margin: f64,
) -> Result<Vec<AlignedTrial>, PsthError> {
    check_margin("pre_margin", pre_margin)?;
    check_margin("post_margin", post_margin)?;

    log::trace!(
        "Aligning {} events to {} trials (pre: {}, post: {})",
        events.len(),
        trials.len(),
        pre_margin,
        post_margin
    );

    let aligned = if trials.len() >= MIN_PARALLEL_TRIALS {
        trials
            .windows()
            .par_iter()
            .map(|window| align_window(events, window, pre_margin, post_margin))
            .collect()
    } else {
        trials
            .iter()
            .map(|window| align_window(events, window, pre_margin, post_margin))
            .collect()
    };

    Ok(aligned)
}

/// Flatten aligned trials into raster points, sorted by trial and then by time.
pub fn raster_points(trials: &[AlignedTrial]) -> Vec<RasterPoint> {
    trials
        .iter()
        .enumerate()
        .flat_map(|(trial, aligned)| {
            aligned
                .iter()
                .map(move |&time| RasterPoint { trial, time })
        })
        .collect()
}
