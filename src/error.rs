//! Error module for the Rusty PSTH library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum PsthError {
    /// Error for invalid arguments, e.g., a negative margin, a non-positive bin width or no trials.
    InvalidArgument(String),
    /// Error for invalid event times, e.g., NaN or infinite values.
    InvalidTimes(String),
    /// Error for a trial window whose bounds are not finite or whose stop precedes its start.
    InvalidWindow { start: f64, stop: f64 },
    /// Error for histograms that cannot be compared, e.g., different number of bins.
    IncompatibleHistograms(String),
    /// Error for a unit missing from the session.
    UnitNotFound(usize),
    /// Error for an epoch (stimulus category) missing from the session.
    EpochNotFound(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for PsthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PsthError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            PsthError::InvalidTimes(e) => write!(f, "Invalid event times: {}", e),
            PsthError::InvalidWindow { start, stop } => write!(
                f,
                "Invalid trial window: start {} and stop {} must be finite with stop >= start",
                start, stop
            ),
            PsthError::IncompatibleHistograms(e) => write!(f, "Incompatible histograms: {}", e),
            PsthError::UnitNotFound(id) => write!(f, "Unit {} not found in the session", id),
            PsthError::EpochNotFound(name) => {
                write!(f, "Epoch '{}' not found in the session", name)
            }
            PsthError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for PsthError {}
