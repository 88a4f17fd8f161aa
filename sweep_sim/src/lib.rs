//! Sweep Scenario Generator
//!
//! Materializes parameter-sweep experiments into persisted simulation
//! scenarios plus a batch script that runs them all.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌─────────────┐   ┌────────────┐
//! │  Enumerator  │──►│  JobPlan   │──►│ Synthesizer │──►│   Writer   │
//! │ (jobs)       │   │ (overrides)│   │ (vehicles)  │   │ (<run>/…)  │
//! └──────────────┘   └────────────┘   └─────────────┘   └─────┬──────┘
//!                                                             │
//!                                                      ┌──────▼──────┐
//!                                                      │  jobs.sh    │
//!                                                      └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sweep_sim::{ExportRequest, GenerationService, GridMap, GridMapConfig};
//! use sweep_env::XmlScenarioWriter;
//!
//! let service = GenerationService::new(GridMap::new(GridMapConfig::default()), XmlScenarioWriter::new());
//! let handle = service.start(ExportRequest::new(series, "out").with_replicas(2))?;
//! let report = handle.join().await?;
//! ```

mod config;
mod error;
mod exporter;
mod grid_map;
mod job_script;
mod worker;

pub use config::ExperimentPlan;
pub use error::GenerateError;
pub use exporter::{
    preview_scenarios, ExportRequest, GenerationReport, ScenarioExporter, ShortfallRecord,
};
pub use grid_map::{GridMap, GridMapConfig};
pub use job_script::{JobScriptConfig, JOB_SCRIPT_NAME};
pub use worker::{CancelFlag, GenerationHandle, GenerationService};
