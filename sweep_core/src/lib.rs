//! Sweep Core - parameter-sweep model and generation logic
//!
//! Turns a declarative experiment space into concrete jobs:
//! 1. **Model**: sweep axes, population specs, experiment series, catalog
//! 2. **Settings**: typed simulation settings with scoped overrides
//! 3. **Enumeration**: N-ary product of every swept axis of a series
//! 4. **Synthesis**: constrained random vehicle populations on a road map
//! 5. **Planning**: per-job overrides and deterministic scenario names

pub mod axis;
pub mod catalog;
pub mod enumerator;
pub mod error;
pub mod plan;
pub mod population;
pub mod series;
pub mod settings;
pub mod synthesizer;

// Re-export key types for convenience
pub use axis::SweepAxis;
pub use catalog::ExperimentCatalog;
pub use enumerator::{enumerate_jobs, AxisCoordinate, JobDescriptor, JobEnumerator};
pub use error::SweepError;
pub use plan::{JobPlan, PopulationValueRule, ResolvedPopulation};
pub use population::{PopulationField, PopulationSpec, ValueRange};
pub use series::ExperimentSeries;
pub use settings::{GlobalSetting, SimulationSettings, UNKNOWN_SETTING};
pub use synthesizer::{PopulationSynthesizer, SynthesisOutcome};
