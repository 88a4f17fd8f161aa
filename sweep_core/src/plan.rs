//! Job resolution: turning a [`JobDescriptor`] into concrete overrides and
//! a deterministic scenario name.

use crate::enumerator::{AxisCoordinate, JobDescriptor};
use crate::error::SweepError;
use crate::population::{PopulationField, PopulationSpec};
use crate::series::{strip_whitespace, ExperimentSeries};
use crate::settings::GlobalSetting;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Extension of persisted scenario files.
pub const SCENARIO_EXTENSION: &str = "xml";

/// How a population's own-axis coordinate becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationValueRule {
    /// `start + step * step_index`
    #[default]
    Independent,
    
    /// `start + step * (step_index * (position + 1))`, where `position` is
    /// the population's zero-based index in the series
    PositionScaled,
}

impl PopulationValueRule {
    /// Computes the override value for a population at `position`.
    pub fn value(&self, start: f64, step: f64, step_index: usize, position: usize) -> f64 {
        let steps = match self {
            PopulationValueRule::Independent => step_index,
            PopulationValueRule::PositionScaled => step_index * (position + 1),
        };
        start + step * steps as f64
    }
}

/// A global setting applied for the duration of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingOverride {
    /// Setting to change
    pub setting: GlobalSetting,
    
    /// Key as written on the axis (used in names)
    pub key: String,
    
    /// Value in effect during the job
    pub value: f64,
}

/// A population field overridden for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverride {
    pub field: PopulationField,
    pub key: String,
    pub value: f64,
}

/// A population with its job-specific override applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPopulation {
    /// Effective spec handed to the synthesizer
    pub spec: PopulationSpec,
    
    /// Override that produced it, if any
    pub override_field: Option<FieldOverride>,
}

/// Everything the exporter needs to materialize one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPlan {
    /// Owning series
    pub series_name: String,
    
    /// Swept global setting, if any
    pub setting: Option<SettingOverride>,
    
    /// Effective populations in series order
    pub populations: Vec<ResolvedPopulation>,
}

impl JobPlan {
    /// Resolves `job` against `series`.
    pub fn resolve(
        series: &ExperimentSeries,
        job: &JobDescriptor,
        rule: PopulationValueRule,
    ) -> Result<Self, SweepError> {
        if job.populations.len() != series.populations.len() {
            return Err(SweepError::JobMismatch(series.name.clone()));
        }
        
        let setting = match (job.general, series.general_axis()) {
            (None, _) => None,
            (Some(coord), Some(axis)) if coord.step_index < axis.count => Some(SettingOverride {
                setting: axis.key.parse()?,
                key: axis.key.clone(),
                value: axis.value(coord.step_index),
            }),
            (Some(_), _) => return Err(SweepError::JobMismatch(series.name.clone())),
        };
        
        let populations = series
            .populations
            .iter()
            .zip(&job.populations)
            .enumerate()
            .map(|(position, (base, coord))| {
                resolve_population(series, base, *coord, position, rule)
            })
            .collect::<Result<Vec<_>, _>>()?;
        
        Ok(Self {
            series_name: series.name.clone(),
            setting,
            populations,
        })
    }
    
    /// Builds the scenario file name for `replica`.
    ///
    /// `<map>_<series>[_<key>_<value>]` then `_<population>_<key>_<value>` or
    /// `_<population>_standard` per population, then `_v<replica>.xml`, with
    /// all whitespace removed.
    pub fn scenario_name(&self, map_name: &str, replica: usize) -> String {
        let mut name = format!("{}_{}", map_name, self.series_name);
        
        // Writing to a String cannot fail.
        if let Some(o) = &self.setting {
            let _ = write!(name, "_{}_{}", o.key, o.value);
        }
        for population in &self.populations {
            match &population.override_field {
                Some(o) => {
                    let _ = write!(name, "_{}_{}_{}", population.spec.name, o.key, o.value);
                }
                None => {
                    let _ = write!(name, "_{}_standard", population.spec.name);
                }
            }
        }
        let _ = write!(name, "_v{}.{}", replica, SCENARIO_EXTENSION);
        
        strip_whitespace(&name)
    }
}

fn resolve_population(
    series: &ExperimentSeries,
    base: &PopulationSpec,
    coord: Option<AxisCoordinate>,
    position: usize,
    rule: PopulationValueRule,
) -> Result<ResolvedPopulation, SweepError> {
    let Some(coord) = coord else {
        return Ok(ResolvedPopulation {
            spec: base.clone(),
            override_field: None,
        });
    };
    
    let axis = base
        .own_axes
        .get(coord.axis_index)
        .filter(|axis| coord.step_index < axis.count)
        .ok_or_else(|| SweepError::JobMismatch(series.name.clone()))?;
    
    let field: PopulationField = axis.key.parse()?;
    let value = rule.value(axis.start, axis.step, coord.step_index, position);
    
    Ok(ResolvedPopulation {
        spec: base.with_override(field, value),
        override_field: Some(FieldOverride {
            field,
            key: axis.key.clone(),
            value,
        }),
    })
}
