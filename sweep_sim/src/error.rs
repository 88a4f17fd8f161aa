//! Error types for generation runs.

use std::path::PathBuf;
use sweep_core::SweepError;
use sweep_env::EnvError;
use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Invalid series or job
    #[error(transparent)]
    Sweep(#[from] SweepError),
    
    /// Scenario could not be persisted
    #[error(transparent)]
    Env(#[from] EnvError),
    
    /// Directory or script I/O failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    
    /// Experiment plan could not be parsed
    #[error("Invalid experiment plan {path}: {source}")]
    Plan {
        /// Plan file
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },
    
    /// A run is already using the map
    #[error("A generation run is already active")]
    AlreadyRunning,
    
    /// Cancelled between jobs
    #[error("Generation cancelled after {completed} of {total} jobs")]
    Cancelled {
        /// Jobs fully materialized
        completed: usize,
        /// Jobs planned
        total: usize,
    },
    
    /// Background worker failed
    #[error("Worker error: {0}")]
    Worker(String),
}

impl GenerateError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
