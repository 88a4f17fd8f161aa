//! Sweep Environment Abstraction Layer
//!
//! This crate provides the narrow interfaces the sweep generator consumes
//! from the outside world:
//! - **Map**: random-coordinate to waypoint resolution, vehicle insert/clear
//! - **Vehicles**: the sampled attribute bundle and the constructed vehicle
//! - **Scenario storage**: `save(path, overwrite)` of a synthesized population
//!
//! Map import, street geometry and the movement engine stay outside; any
//! implementation of [`RoadMap`] and [`ScenarioWriter`] can be plugged in.
//!
//! # Example
//!
//! ```ignore
//! use sweep_env::{RoadMap, ScenarioDocument, ScenarioWriter, XmlScenarioWriter};
//!
//! fn persist<M: RoadMap>(map: &M, settings: &BTreeMap<String, f64>, path: &Path) {
//!     let doc = ScenarioDocument {
//!         map_name: map.name(),
//!         settings,
//!         vehicles: map.vehicles(),
//!     };
//!     XmlScenarioWriter::new().save(path, &doc, false)?;
//! }
//! ```

mod error;
mod map;
mod scenario;
mod types;
mod xml_impl;

pub use error::EnvError;
pub use map::RoadMap;
pub use scenario::{MemoryScenarioWriter, ScenarioDocument, ScenarioWriter, StoredScenario};
pub use types::{MapDimensions, Vehicle, VehicleProfile, Waypoint};
pub use xml_impl::XmlScenarioWriter;
