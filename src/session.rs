//! Recording sessions, i.e., the units and stimulus epochs provided to the analysis.
//!
//! A session is stored as JSON. Units carry their spike times, epochs carry the start and stop times
//! of every presentation as two parallel columns.
//!
//! ```json
//! {
//!   "identifier": "session-0",
//!   "units": [{ "id": 0, "spike_times": [0.5, 1.2], "quality": "good" }],
//!   "epochs": [{ "name": "RepeatFFF", "start_time": [1.0, 2.0], "stop_time": [1.1, 2.1] }]
//! }
//! ```
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::events::EventTimeSeries;
use crate::core::trial::TrialSet;
use crate::error::PsthError;

/// A provider of event time series, one per unit.
pub trait EventSource {
    /// Returns the (sorted) event times of the unit, in seconds.
    fn events(&self, unit_id: usize) -> Result<EventTimeSeries, PsthError>;
}

/// A provider of trial windows, one set per epoch (stimulus category).
pub trait TrialSource {
    /// Returns the trial windows of the epoch, in presentation order.
    fn trials(&self, epoch: &str) -> Result<TrialSet, PsthError>;
}

/// A sorted unit.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: usize,
    pub spike_times: EventTimeSeries,
    /// The firing rate (in Hz) reported by the spike sorter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_rate: Option<f64>,
    /// The curation label, e.g., "good" or "mua".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl Unit {
    /// Returns the stored firing rate, or the mean rate of the spike times if none is stored.
    pub fn firing_rate(&self) -> Option<f64> {
        self.firing_rate.or_else(|| self.spike_times.mean_rate())
    }
}

/// A named stimulus epoch with the start and stop times of every presentation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Epoch {
    pub name: String,
    pub start_time: Vec<f64>,
    pub stop_time: Vec<f64>,
}

/// Criteria to select units from a session.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitFilter {
    /// The minimum firing rate (in Hz).
    pub min_firing_rate: f64,
    /// The maximum firing rate (in Hz), if any.
    pub max_firing_rate: Option<f64>,
    /// The required quality label, if any.
    pub quality: Option<String>,
    /// The maximum number of units to select, if any.
    pub max_units: Option<usize>,
}

impl Default for UnitFilter {
    fn default() -> Self {
        UnitFilter {
            min_firing_rate: 5.0,
            max_firing_rate: None,
            quality: None,
            max_units: Some(10),
        }
    }
}

impl UnitFilter {
    /// Returns true if the unit satisfies every criterion.
    pub fn accepts(&self, unit: &Unit) -> bool {
        let rate_ok = match unit.firing_rate() {
            Some(rate) => {
                rate >= self.min_firing_rate
                    && self.max_firing_rate.map_or(true, |max_rate| rate <= max_rate)
            }
            None => false,
        };
        let quality_ok = match &self.quality {
            Some(quality) => unit.quality.as_deref() == Some(quality.as_str()),
            None => true,
        };
        rate_ok && quality_ok
    }
}

/// A recording session.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub identifier: String,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub epochs: Vec<Epoch>,
}

impl Session {
    /// Create a session from a ragged unit table, i.e., the concatenated spike times of all units and
    /// the end offset of every unit in the concatenation, as stored by unit tables.
    /// Unit IDs are assigned in table order.
    pub fn from_ragged(
        identifier: &str,
        spike_times: &[f64],
        spike_times_index: &[usize],
        epochs: Vec<Epoch>,
    ) -> Result<Self, PsthError> {
        let units = split_ragged(spike_times, spike_times_index)?
            .into_iter()
            .enumerate()
            .map(|(id, times)| {
                Ok(Unit {
                    id,
                    spike_times: EventTimeSeries::build(times)?,
                    firing_rate: None,
                    quality: None,
                })
            })
            .collect::<Result<Vec<_>, PsthError>>()?;

        Ok(Session {
            identifier: identifier.to_string(),
            units,
            epochs,
        })
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn unit(&self, unit_id: usize) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == unit_id)
    }

    pub fn epoch(&self, name: &str) -> Option<&Epoch> {
        self.epochs.iter().find(|epoch| epoch.name == name)
    }

    /// Returns the names of the epochs, in session order.
    pub fn epoch_names(&self) -> Vec<&str> {
        self.epochs.iter().map(|epoch| epoch.name.as_str()).collect()
    }

    /// Returns the IDs of the units accepted by the filter, in session order.
    pub fn select_units(&self, filter: &UnitFilter) -> Vec<usize> {
        let selected: Vec<usize> = self
            .units
            .iter()
            .filter(|unit| filter.accepts(unit))
            .map(|unit| unit.id)
            .take(filter.max_units.unwrap_or(usize::MAX))
            .collect();
        log::debug!(
            "{} out of {} units selected in session {}",
            selected.len(),
            self.units.len(),
            self.identifier
        );
        selected
    }

    /// Save the session to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PsthError> {
        let file = File::create(path).map_err(|e| PsthError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| PsthError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| PsthError::IOError(e.to_string()))
    }

    /// Load a session from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, PsthError> {
        let file = File::open(path).map_err(|e| PsthError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| PsthError::IOError(e.to_string()))
    }
}

impl EventSource for Session {
    fn events(&self, unit_id: usize) -> Result<EventTimeSeries, PsthError> {
        self.unit(unit_id)
            .map(|unit| unit.spike_times.clone())
            .ok_or(PsthError::UnitNotFound(unit_id))
    }
}

impl TrialSource for Session {
    fn trials(&self, epoch: &str) -> Result<TrialSet, PsthError> {
        let epoch = self
            .epoch(epoch)
            .ok_or_else(|| PsthError::EpochNotFound(epoch.to_string()))?;
        TrialSet::from_columns(&epoch.start_time, &epoch.stop_time)
    }
}

/// Split a ragged array into its rows, given the end offset of every row.
/// The offsets must be non-decreasing and within the data.
pub fn split_ragged(data: &[f64], index: &[usize]) -> Result<Vec<Vec<f64>>, PsthError> {
    let mut rows = Vec::with_capacity(index.len());
    let mut start = 0;
    for (row, &end) in index.iter().enumerate() {
        if end < start || end > data.len() {
            return Err(PsthError::InvalidArgument(format!(
                "invalid end offset {} for row {} (previous offset {}, data length {})",
                end,
                row,
                start,
                data.len()
            )));
        }
        rows.push(data[start..end].to_vec());
        start = end;
    }
    Ok(rows)
}
