//! Analysis pipeline, from a session to per-unit rasters, histograms and responsiveness.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::core::align::{align, raster_points, AlignedTrial, RasterPoint};
use crate::core::events::EventTimeSeries;
use crate::core::histogram::{histogram, Histogram};
use crate::core::metrics::{correlation_matrix, Responsiveness};
use crate::core::trial::TrialSet;
use crate::core::MIN_PARALLEL_UNITS;
use crate::error::PsthError;
use crate::session::{EventSource, TrialSource};

/// The analysis of a single unit against one trial set.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit_id: usize,
    /// The total number of spikes of the unit.
    pub num_spikes: usize,
    pub trials: Vec<AlignedTrial>,
    pub histogram: Histogram,
    /// Present only if the trials cover both a baseline and a response window.
    pub responsiveness: Option<Responsiveness>,
    pub responsive: bool,
}

impl UnitReport {
    /// Returns the raster of the unit, i.e., every retained spike with its trial.
    pub fn raster(&self) -> Vec<RasterPoint> {
        raster_points(&self.trials)
    }
}

/// The analysis of several units against the trials of one epoch.
/// Undefined correlations are saved as `null`, so a saved report is not read back.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Report {
    pub epoch: String,
    pub num_trials: usize,
    pub mean_duration: Option<f64>,
    pub config: AnalysisConfig,
    pub units: Vec<UnitReport>,
    /// Pearson correlations between the unit histograms, if there are at least two units.
    pub correlations: Option<Vec<Vec<f64>>>,
}

impl Report {
    /// Returns the IDs of the responsive units, ranked by decreasing responsiveness score.
    pub fn responsive_units(&self) -> Vec<usize> {
        let mut responsive: Vec<(usize, f64)> = self
            .units
            .iter()
            .filter(|unit| unit.responsive)
            .map(|unit| {
                let score = unit.responsiveness.as_ref().map_or(0.0, |r| r.score());
                (unit.unit_id, score)
            })
            .collect();
        responsive.sort_by(|(_, s1), (_, s2)| s2.total_cmp(s1));
        responsive.into_iter().map(|(unit_id, _)| unit_id).collect()
    }

    /// Save the report to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PsthError> {
        let file = File::create(path).map_err(|e| PsthError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| PsthError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| PsthError::IOError(e.to_string()))
    }
}

/// An analysis with fixed parameters.
///
/// # Examples
///
/// ```rust
/// use rusty_psth::analysis::Analysis;
/// use rusty_psth::config::AnalysisConfig;
/// use rusty_psth::core::events::EventTimeSeries;
/// use rusty_psth::core::trial::TrialSet;
///
/// let config = AnalysisConfig {
///     pre_margin: 0.1,
///     post_margin: 0.3,
///     bin_width: 0.1,
///     range_start: 0.0,
///     range_end: 0.3,
///     ..AnalysisConfig::default()
/// };
/// let analysis = Analysis::new(config).unwrap();
///
/// let events = EventTimeSeries::build(vec![0.5, 1.2, 1.25, 3.0]).unwrap();
/// let trials = TrialSet::from_pairs(&[(1.0, 1.1), (2.0, 2.1)]).unwrap();
/// let report = analysis.analyze_unit(0, &events, &trials).unwrap();
///
/// assert_eq!(report.histogram.counts(), &[0, 0, 2]);
/// assert_eq!(report.raster().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Create an analysis with the provided parameters.
    /// The function returns an error if the parameters are invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self, PsthError> {
        config.validate()?;
        Ok(Analysis { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns the trials analyzed, i.e., at most the first `max_trials` of the set.
    fn select_trials(&self, trials: &TrialSet) -> TrialSet {
        match self.config.max_trials {
            Some(max_trials) => trials.truncated(max_trials),
            None => trials.clone(),
        }
    }

    /// Analyze the events of one unit against the provided trials.
    /// The function returns an error if there are no trials.
    pub fn analyze_unit(
        &self,
        unit_id: usize,
        events: &EventTimeSeries,
        trials: &TrialSet,
    ) -> Result<UnitReport, PsthError> {
        let trials = self.select_trials(trials);
        let mean_duration = trials.mean_duration();
        let post_margin = self.config.effective_post_margin(mean_duration);

        let aligned = align(events, &trials, self.config.pre_margin, post_margin)?;
        let histogram = histogram(
            &aligned,
            self.config.bin_width,
            self.config.range_start,
            self.config.range_end,
        )?;

        let responsiveness = match mean_duration {
            Some(duration) if duration > 0.0 && self.config.pre_margin > 0.0 => Some(
                Responsiveness::measure(&aligned, self.config.pre_margin, duration)?,
            ),
            _ => {
                log::warn!(
                    "Unit {}: responsiveness skipped (baseline {} s, mean duration {:?})",
                    unit_id,
                    self.config.pre_margin,
                    mean_duration
                );
                None
            }
        };
        let responsive = responsiveness.as_ref().map_or(false, |r| {
            r.is_responsive(self.config.min_ratio, self.config.min_evoked_count)
        });

        log::debug!(
            "Unit {}: {} spikes, {} trials, {} spikes in histogram range",
            unit_id,
            events.len(),
            aligned.len(),
            histogram.total_count()
        );

        Ok(UnitReport {
            unit_id,
            num_spikes: events.len(),
            trials: aligned,
            histogram,
            responsiveness,
            responsive,
        })
    }

    /// Analyze several units of a source against the trials of an epoch.
    /// The function returns an error if a unit or the epoch is missing, or if the epoch has no trials.
    pub fn run<S: EventSource + TrialSource + Sync>(
        &self,
        source: &S,
        unit_ids: &[usize],
        epoch: &str,
    ) -> Result<Report, PsthError> {
        let trials = self.select_trials(&source.trials(epoch)?);
        if trials.is_empty() {
            log::warn!("Epoch {} has no trials", epoch);
        }
        log::info!(
            "Analyzing {} units over {} trials of {}",
            unit_ids.len(),
            trials.len(),
            epoch
        );

        let analyze = |unit_id: &usize| -> Result<UnitReport, PsthError> {
            let events = source.events(*unit_id)?;
            self.analyze_unit(*unit_id, &events, &trials)
        };
        let units = if unit_ids.len() >= MIN_PARALLEL_UNITS {
            unit_ids
                .par_iter()
                .map(analyze)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            unit_ids
                .iter()
                .map(analyze)
                .collect::<Result<Vec<_>, _>>()?
        };

        let correlations = if units.len() > 1 {
            let histograms: Vec<Histogram> =
                units.iter().map(|unit| unit.histogram.clone()).collect();
            Some(correlation_matrix(&histograms)?)
        } else {
            None
        };

        log::info!(
            "Analysis of {} completed: {} responsive units out of {}",
            epoch,
            units.iter().filter(|unit| unit.responsive).count(),
            units.len()
        );

        Ok(Report {
            epoch: epoch.to_string(),
            num_trials: trials.len(),
            mean_duration: trials.mean_duration(),
            config: self.config.clone(),
            units,
            correlations,
        })
    }
}
