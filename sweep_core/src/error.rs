//! Error types for sweep definitions and job resolution.

use thiserror::Error;

/// Errors raised while validating or resolving a sweep definition.
///
/// Everything here is detected before the first scenario is written;
/// soft failures during synthesis are reported through
/// [`SynthesisOutcome`](crate::SynthesisOutcome) instead.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Axis with fewer than one step
    #[error("Sweep axis '{0}' must have a count of at least 1")]
    EmptyAxis(String),
    
    /// Axis with non-finite or repeated values
    #[error("Sweep axis '{0}' produces non-finite or repeated values")]
    DegenerateAxis(String),
    
    /// General axis key names no known simulation setting
    #[error("Unknown simulation setting: {0}")]
    UnknownSetting(String),
    
    /// Population axis key names no known population field
    #[error("Unknown population field: {0}")]
    UnknownField(String),
    
    /// Two series share a name
    #[error("Duplicate series name: {0}")]
    DuplicateSeries(String),
    
    /// Two populations in one series share a name
    #[error("Duplicate population '{population}' in series '{series}'")]
    DuplicatePopulation {
        /// Owning series
        series: String,
        /// Clashing population name
        population: String,
    },
    
    /// Series lookup failed
    #[error("Series not found: {0}")]
    SeriesNotFound(String),
    
    /// Population lookup failed
    #[error("Population '{population}' not found in series '{series}'")]
    PopulationNotFound {
        /// Series searched
        series: String,
        /// Missing population
        population: String,
    },
    
    /// Job descriptor does not fit the series it is resolved against
    #[error("Job descriptor does not match series '{0}'")]
    JobMismatch(String),
    
    /// Catalog (de)serialization failed
    #[error("Catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
