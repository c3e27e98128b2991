//! Core module defining the main components of the Rusty PSTH library.
//!
//! This module provides the building blocks for stimulus-aligned spike analysis:
//!
//! - [`events`]: Ordered event (spike) times of a single source
//! - [`trial`]: Trial windows, e.g., the presentations of a stimulus
//! - [`align`]: Alignment of events to trial onsets and raster extraction
//! - [`histogram`]: Trial-averaged peri-stimulus time histograms
//! - [`metrics`]: Responsiveness and histogram correlations
//! - [`utils`]: Time intervals and other helpers
//!
//! # Examples
//!
//! ```
//! use rusty_psth::core::{align::align, events::EventTimeSeries, histogram::histogram, trial::TrialSet};
//!
//! // The spikes of a unit and two stimulus presentations
//! let events = EventTimeSeries::build(vec![0.5, 1.2, 1.25, 3.0]).unwrap();
//! let trials = TrialSet::from_pairs(&[(1.0, 1.1), (2.0, 2.1)]).unwrap();
//!
//! // Keep the spikes from 100 ms before to 300 ms after every onset
//! let aligned = align(&events, &trials, 0.1, 0.3).unwrap();
//!
//! // Average over trials with 100 ms bins
//! let psth = histogram(&aligned, 0.1, 0.0, 0.3).unwrap();
//! assert_eq!(psth.counts(), &[0, 0, 2]);
//! ```
pub mod align;
pub mod events;
pub mod histogram;
pub mod metrics;
pub mod trial;
pub mod utils;

/// Tolerance (relative to the bin width) for a time to be considered on a bin edge.
pub const EDGE_TOLERANCE: f64 = 1e-9;
/// Maximum number of histogram bins.
pub const MAX_BINS: usize = 1_000_000;
/// Minimum number of trials to consider parallel alignment.
pub const MIN_PARALLEL_TRIALS: usize = 256;
/// Minimum number of units to consider parallel analysis.
pub const MIN_PARALLEL_UNITS: usize = 8;
