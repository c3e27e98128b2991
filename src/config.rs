//! Analysis parameters, loaded from JSON.
//!
//! Every field has a default, so a configuration file only needs the fields it changes.
//!
//! ```rust
//! use rusty_psth::config::AnalysisConfig;
//!
//! let config: AnalysisConfig = serde_json::from_str(r#"{ "bin_width": 0.01 }"#).unwrap();
//! assert_eq!(config.bin_width, 0.01);
//! assert_eq!(config.pre_margin, 0.1);
//! assert!(config.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::PsthError;

/// Parameters of the alignment, the histogram and the responsiveness test.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Retention before every trial onset (in seconds).
    pub pre_margin: f64,
    /// Retention after every trial onset (in seconds).
    pub post_margin: f64,
    /// If set, the mean trial duration is added to the post-onset retention.
    pub extend_by_duration: bool,
    /// Histogram bin width (in seconds).
    pub bin_width: f64,
    /// Histogram range, relative to the trial onsets (in seconds).
    pub range_start: f64,
    pub range_end: f64,
    /// Only the first `max_trials` trials are analyzed, if set.
    pub max_trials: Option<usize>,
    /// Minimum evoked-to-baseline rate ratio for a unit to be responsive.
    pub min_ratio: f64,
    /// Minimum number of evoked events (over all trials) for a unit to be responsive.
    pub min_evoked_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            pre_margin: 0.1,
            post_margin: 0.5,
            extend_by_duration: false,
            bin_width: 0.005,
            range_start: -0.05,
            range_end: 0.5,
            max_trials: None,
            min_ratio: 2.0,
            min_evoked_count: 10,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, PsthError> {
        let file = File::open(path).map_err(|e| PsthError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        let config: AnalysisConfig =
            serde_json::from_reader(reader).map_err(|e| PsthError::IOError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the parameters. The function returns an error for the first invalid one.
    pub fn validate(&self) -> Result<(), PsthError> {
        for (name, margin) in [("pre_margin", self.pre_margin), ("post_margin", self.post_margin)] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(PsthError::InvalidArgument(format!(
                    "{} must be a non-negative number, got {}",
                    name, margin
                )));
            }
        }
        if !self.bin_width.is_finite() || self.bin_width <= 0.0 {
            return Err(PsthError::InvalidArgument(format!(
                "bin_width must be a positive number, got {}",
                self.bin_width
            )));
        }
        if !self.range_start.is_finite()
            || !self.range_end.is_finite()
            || self.range_end <= self.range_start
        {
            return Err(PsthError::InvalidArgument(format!(
                "invalid histogram range [{}, {})",
                self.range_start, self.range_end
            )));
        }
        if self.max_trials == Some(0) {
            return Err(PsthError::InvalidArgument(
                "max_trials must be positive".to_string(),
            ));
        }
        if !self.min_ratio.is_finite() || self.min_ratio < 0.0 {
            return Err(PsthError::InvalidArgument(format!(
                "min_ratio must be a non-negative number, got {}",
                self.min_ratio
            )));
        }
        Ok(())
    }

    /// Returns the post-onset retention for trials of the given mean duration.
    pub fn effective_post_margin(&self, mean_duration: Option<f64>) -> f64 {
        match (self.extend_by_duration, mean_duration) {
            (true, Some(duration)) => self.post_margin + duration,
            _ => self.post_margin,
        }
    }
}
