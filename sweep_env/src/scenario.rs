//! Scenario artifact and its storage abstraction.

use crate::error::EnvError;
use crate::types::Vehicle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One persisted scenario: a map reference, the settings in effect and the
/// vehicles synthesized for a single replica.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioDocument<'a> {
    /// Base name of the map the scenario runs on
    pub map_name: &'a str,
    
    /// Effective simulation settings, keyed by setting name
    pub settings: &'a BTreeMap<String, f64>,
    
    /// Synthesized vehicles
    pub vehicles: &'a [Vehicle],
}

/// Persists scenario documents.
///
/// # Contract
///
/// `save` with `overwrite == false` must fail with
/// [`EnvError::ArtifactExists`] instead of replacing an existing file.
pub trait ScenarioWriter: Send + Sync + 'static {
    /// Saves a scenario to `path`.
    fn save(
        &self,
        path: &Path,
        scenario: &ScenarioDocument<'_>,
        overwrite: bool,
    ) -> Result<(), EnvError>;
}

/// A saved scenario captured by [`MemoryScenarioWriter`].
#[derive(Debug, Clone)]
pub struct StoredScenario {
    /// Target path
    pub path: PathBuf,
    
    /// Map name
    pub map_name: String,
    
    /// Settings snapshot
    pub settings: BTreeMap<String, f64>,
    
    /// Vehicles at save time
    pub vehicles: Vec<Vehicle>,
}

/// In-memory writer that records every save, for tests and embedders that
/// inspect generated scenarios without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryScenarioWriter {
    saved: Mutex<Vec<StoredScenario>>,
    
    /// Fail every save after this many successful ones
    fail_after: Option<usize>,
}

impl MemoryScenarioWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Creates a writer whose saves start failing after `count` successes.
    pub fn failing_after(count: usize) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_after: Some(count),
        }
    }
    
    /// Returns a copy of everything saved so far.
    pub fn saved(&self) -> Vec<StoredScenario> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ScenarioWriter for MemoryScenarioWriter {
    fn save(
        &self,
        path: &Path,
        scenario: &ScenarioDocument<'_>,
        overwrite: bool,
    ) -> Result<(), EnvError> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| EnvError::serialization("scenario store poisoned"))?;
        
        if self.fail_after.is_some_and(|n| saved.len() >= n) {
            return Err(EnvError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "injected write failure"),
            ));
        }
        
        if let Some(pos) = saved.iter().position(|s| s.path == path) {
            if !overwrite {
                return Err(EnvError::ArtifactExists(path.to_path_buf()));
            }
            saved.remove(pos);
        }
        
        saved.push(StoredScenario {
            path: path.to_path_buf(),
            map_name: scenario.map_name.to_string(),
            settings: scenario.settings.clone(),
            vehicles: scenario.vehicles.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_memory_writer_refuses_overwrite() {
        let writer = MemoryScenarioWriter::new();
        let settings = BTreeMap::new();
        let doc = ScenarioDocument {
            map_name: "town",
            settings: &settings,
            vehicles: &[],
        };
        
        writer.save(Path::new("a.xml"), &doc, false).unwrap();
        let err = writer.save(Path::new("a.xml"), &doc, false).unwrap_err();
        assert!(matches!(err, EnvError::ArtifactExists(_)));
        
        writer.save(Path::new("a.xml"), &doc, true).unwrap();
        assert_eq!(writer.saved().len(), 1);
    }
    
    #[test]
    fn test_memory_writer_injected_failure() {
        let writer = MemoryScenarioWriter::failing_after(1);
        let settings = BTreeMap::new();
        let doc = ScenarioDocument {
            map_name: "town",
            settings: &settings,
            vehicles: &[],
        };
        
        assert!(writer.save(Path::new("a.xml"), &doc, false).is_ok());
        assert!(matches!(
            writer.save(Path::new("b.xml"), &doc, false),
            Err(EnvError::Io { .. })
        ));
    }
}
