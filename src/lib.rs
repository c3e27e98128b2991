//! This crate provides tools for stimulus-aligned spike analysis in Rust: rasters and
//! peri-stimulus time histograms (PSTH) of sorted units.
//!
//! # Aligning Spikes to Trials
//!
//! ```rust
//! use rusty_psth::core::align::align;
//! use rusty_psth::core::events::EventTimeSeries;
//! use rusty_psth::core::trial::TrialSet;
//!
//! // The spikes of a unit and the presentations of a stimulus
//! let events = EventTimeSeries::build(vec![5.05]).unwrap();
//! let trials = TrialSet::from_pairs(&[(5.0, 5.1), (5.05, 5.15)]).unwrap();
//!
//! // Overlapping retention intervals share their spikes
//! let aligned = align(&events, &trials, 0.0, 0.1).unwrap();
//! assert_eq!(aligned[0].len(), 1);
//! assert_eq!(aligned[1].times(), &[0.0]);
//! ```
//!
//! # Computing Histograms
//!
//! ```rust
//! use rusty_psth::core::align::align;
//! use rusty_psth::core::events::EventTimeSeries;
//! use rusty_psth::core::histogram::histogram;
//! use rusty_psth::core::trial::TrialSet;
//!
//! let trials = TrialSet::from_pairs(&[(0.0, 1.0)]).unwrap();
//! let aligned = align(&EventTimeSeries::new_empty(), &trials, 0.0, 1.0).unwrap();
//!
//! // An empty trial still counts as a trial
//! let psth = histogram(&aligned, 0.1, 0.0, 1.0).unwrap();
//! assert!(psth.rates().iter().all(|rate| *rate == 0.0));
//! ```
//!
//! # Analyzing a Session
//!
//! ```rust
//! use rusty_psth::analysis::Analysis;
//! use rusty_psth::config::AnalysisConfig;
//! use rusty_psth::session::{Epoch, Session};
//!
//! let session = Session::from_ragged(
//!     "session",
//!     &[1.01, 1.02, 2.015, 0.5, 3.0],
//!     &[3, 5],
//!     vec![Epoch {
//!         name: "flash".to_string(),
//!         start_time: vec![1.0, 2.0],
//!         stop_time: vec![1.05, 2.05],
//!     }],
//! )
//! .unwrap();
//!
//! let analysis = Analysis::new(AnalysisConfig::default()).unwrap();
//! let report = analysis.run(&session, &[0, 1], "flash").unwrap();
//! assert_eq!(report.units.len(), 2);
//! assert_eq!(report.units[0].raster().len(), 3);
//! ```

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
