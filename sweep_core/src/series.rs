//! Experiment series: a general sweep axis plus an ordered list of populations.

use crate::axis::SweepAxis;
use crate::error::SweepError;
use crate::population::PopulationSpec;
use crate::settings::GlobalSetting;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named bundle of one optional global-setting axis and its populations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSeries {
    /// Unique series name
    pub name: String,
    
    /// General sweep axes; sweeping only happens when exactly one is set
    #[serde(default)]
    pub general_axes: Vec<SweepAxis>,
    
    /// Populations in synthesis order
    #[serde(default)]
    pub populations: Vec<PopulationSpec>,
}

impl ExperimentSeries {
    /// Creates an empty series.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            general_axes: Vec::new(),
            populations: Vec::new(),
        }
    }
    
    /// Sets the general axis, replacing any existing ones (builder style).
    pub fn with_general_axis(mut self, axis: SweepAxis) -> Self {
        self.general_axes = vec![axis];
        self
    }
    
    /// Appends a population (builder style).
    pub fn with_population(mut self, population: PopulationSpec) -> Self {
        self.populations.push(population);
        self
    }
    
    /// Returns the general axis that will actually be swept.
    ///
    /// Only a single general axis is honored; zero or several mean
    /// "no general sweep".
    pub fn general_axis(&self) -> Option<&SweepAxis> {
        match self.general_axes.as_slice() {
            [axis] => Some(axis),
            _ => None,
        }
    }
    
    /// Returns the setting the general axis varies.
    pub fn general_setting(&self) -> Result<Option<GlobalSetting>, SweepError> {
        self.general_axis()
            .map(|axis| axis.key.parse::<GlobalSetting>())
            .transpose()
    }
    
    /// Returns the population with `name`.
    pub fn population(&self, name: &str) -> Option<&PopulationSpec> {
        self.populations.iter().find(|p| p.name == name)
    }
    
    /// Validates every axis, every key and population-name uniqueness.
    ///
    /// Names are compared with whitespace removed since scenario file
    /// names strip it.
    pub fn validate(&self) -> Result<(), SweepError> {
        for axis in &self.general_axes {
            axis.validate()?;
            axis.key.parse::<GlobalSetting>()?;
        }
        
        let mut seen = HashSet::new();
        for population in &self.populations {
            if !seen.insert(strip_whitespace(&population.name)) {
                return Err(SweepError::DuplicatePopulation {
                    series: self.name.clone(),
                    population: population.name.clone(),
                });
            }
            population.validate()?;
        }
        Ok(())
    }
}

/// Removes every whitespace character.
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_general_axis_only_when_single() {
        let axis = SweepAxis::new("fake message interval", 1000.0, 500.0, 2).unwrap();
        let mut series = ExperimentSeries::new("Baseline");
        assert!(series.general_axis().is_none());
        
        series.general_axes.push(axis.clone());
        assert_eq!(series.general_axis(), Some(&axis));
        
        series.general_axes.push(axis);
        assert!(series.general_axis().is_none());
    }
    
    #[test]
    fn test_validate_duplicate_population() {
        let series = ExperimentSeries::new("S")
            .with_population(PopulationSpec::new("Fast Cars", 1))
            .with_population(PopulationSpec::new("FastCars", 1));
        
        assert!(matches!(
            series.validate(),
            Err(SweepError::DuplicatePopulation { .. })
        ));
    }
    
    #[test]
    fn test_validate_unknown_general_key() {
        let series = ExperimentSeries::new("S")
            .with_general_axis(SweepAxis::new("warp factor", 1.0, 1.0, 2).unwrap());
        assert!(matches!(series.validate(), Err(SweepError::UnknownSetting(_))));
    }
    
    #[test]
    fn test_validate_catches_unvalidated_axis() {
        let mut series = ExperimentSeries::new("S");
        series.general_axes.push(SweepAxis {
            key: "eebl threshold".to_string(),
            start: 1.0,
            step: 1.0,
            count: 0,
        });
        assert!(matches!(series.validate(), Err(SweepError::EmptyAxis(_))));
    }
}
