//! Error types for the sweep environment abstraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Writing or reading an artifact failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation targeted
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    
    /// Target artifact exists and overwriting was not requested
    #[error("Artifact already exists: {0}")]
    ArtifactExists(PathBuf),
    
    /// Scenario serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EnvError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
    
    /// Creates a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
