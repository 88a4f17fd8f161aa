//! Experiment plan files.
//!
//! A plan bundles everything a generation run needs: the map, the baseline
//! settings, the authored series and the batch script parameters.
//!
//! ```json
//! {
//!   "map": { "name": "town", "width": 5000, "height": 5000, "block_size": 250 },
//!   "replicas": 2,
//!   "series": [
//!     {
//!       "name": "Baseline",
//!       "general_axes": [{ "key": "fake message interval", "start": 1000, "step": 500, "count": 2 }],
//!       "populations": [{ "name": "Cars", "amount": 50 }]
//!     }
//!   ]
//! }
//! ```

use crate::error::GenerateError;
use crate::exporter::ExportRequest;
use crate::grid_map::GridMapConfig;
use crate::job_script::JobScriptConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sweep_core::{ExperimentCatalog, ExperimentSeries, PopulationValueRule, SimulationSettings, SweepError};

/// A complete experiment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Built-in grid map description
    pub map: GridMapConfig,
    
    /// Baseline simulation settings
    pub settings: SimulationSettings,
    
    /// Authored series
    pub series: ExperimentCatalog,
    
    /// Replicas per job
    pub replicas: usize,
    
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    
    /// Own-axis value rule
    pub population_value_rule: PopulationValueRule,
    
    /// Batch script parameters
    pub job_script: JobScriptConfig,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            map: GridMapConfig::default(),
            settings: SimulationSettings::default(),
            series: ExperimentCatalog::new(),
            replicas: 1,
            seed: None,
            population_value_rule: PopulationValueRule::default(),
            job_script: JobScriptConfig::default(),
        }
    }
}

impl ExperimentPlan {
    /// Loads a plan from a JSON file.
    ///
    /// Series are validated while parsing; an invalid series surfaces as
    /// [`GenerateError::Plan`].
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let raw = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| GenerateError::Plan {
            path: path.to_path_buf(),
            source,
        })
    }
    
    /// Picks the series to run: the named one, or the only one.
    pub fn select_series(&self, name: Option<&str>) -> Result<&ExperimentSeries, GenerateError> {
        match name {
            Some(name) => Ok(self.series.series(name)?),
            None => match self.series.all() {
                [only] => Ok(only),
                [] => Err(SweepError::SeriesNotFound("<none defined>".to_string()).into()),
                _ => Err(SweepError::SeriesNotFound(
                    "<several defined, choose one with --series>".to_string(),
                )
                .into()),
            },
        }
    }
    
    /// Builds the export request for `series`.
    pub fn request(&self, series: &ExperimentSeries, output_root: PathBuf) -> ExportRequest {
        ExportRequest {
            series: series.clone(),
            settings: self.settings.clone(),
            replicas: self.replicas,
            seed: self.seed,
            value_rule: self.population_value_rule,
            job_script: self.job_script.clone(),
            output_root,
        }
    }
}
