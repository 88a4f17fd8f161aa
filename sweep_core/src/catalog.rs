//! Experiment catalog: the authored set of series, addressed by name.

use crate::axis::SweepAxis;
use crate::error::SweepError;
use crate::population::PopulationSpec;
use crate::series::{strip_whitespace, ExperimentSeries};
use serde::{Deserialize, Serialize};

/// Ordered collection of experiment series with unique names.
///
/// Every operation takes explicit series/population names instead of
/// relying on a "currently selected" entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ExperimentSeries>", into = "Vec<ExperimentSeries>")]
pub struct ExperimentCatalog {
    series: Vec<ExperimentSeries>,
}

impl ExperimentCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Builds a catalog, rejecting duplicate or invalid series.
    pub fn from_series(series: Vec<ExperimentSeries>) -> Result<Self, SweepError> {
        let mut catalog = Self::new();
        for s in series {
            catalog.add_series(s)?;
        }
        Ok(catalog)
    }
    
    /// Parses a catalog from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, SweepError> {
        Ok(serde_json::from_str(json)?)
    }
    
    /// Serializes the catalog to pretty JSON.
    pub fn to_json(&self) -> Result<String, SweepError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    
    /// Adds a series after validating it.
    pub fn add_series(&mut self, series: ExperimentSeries) -> Result<(), SweepError> {
        let key = strip_whitespace(&series.name);
        if self.series.iter().any(|s| strip_whitespace(&s.name) == key) {
            return Err(SweepError::DuplicateSeries(series.name));
        }
        series.validate()?;
        self.series.push(series);
        Ok(())
    }
    
    /// Removes and returns a series.
    pub fn remove_series(&mut self, name: &str) -> Result<ExperimentSeries, SweepError> {
        let idx = self.index_of(name)?;
        Ok(self.series.remove(idx))
    }
    
    /// Looks up a series.
    pub fn series(&self, name: &str) -> Result<&ExperimentSeries, SweepError> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SweepError::SeriesNotFound(name.to_string()))
    }
    
    /// Returns all series in insertion order.
    pub fn all(&self) -> &[ExperimentSeries] {
        &self.series
    }
    
    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }
    
    /// True when no series are defined.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
    
    /// Appends a population to a series.
    pub fn add_population(
        &mut self,
        series: &str,
        population: PopulationSpec,
    ) -> Result<(), SweepError> {
        self.edit(series, |s| s.populations.push(population))
    }
    
    /// Removes a population from a series.
    pub fn remove_population(
        &mut self,
        series: &str,
        population: &str,
    ) -> Result<PopulationSpec, SweepError> {
        let idx = self.index_of(series)?;
        let owner = &mut self.series[idx];
        let pos = owner
            .populations
            .iter()
            .position(|p| p.name == population)
            .ok_or_else(|| SweepError::PopulationNotFound {
                series: series.to_string(),
                population: population.to_string(),
            })?;
        Ok(owner.populations.remove(pos))
    }
    
    /// Replaces the general axis of a series (`None` clears it).
    pub fn set_general_axis(
        &mut self,
        series: &str,
        axis: Option<SweepAxis>,
    ) -> Result<(), SweepError> {
        self.edit(series, |s| s.general_axes = axis.into_iter().collect())
    }
    
    /// Appends an own axis to a population.
    pub fn add_population_axis(
        &mut self,
        series: &str,
        population: &str,
        axis: SweepAxis,
    ) -> Result<(), SweepError> {
        let idx = self.index_of(series)?;
        if self.series[idx].population(population).is_none() {
            return Err(SweepError::PopulationNotFound {
                series: series.to_string(),
                population: population.to_string(),
            });
        }
        self.edit(series, |s| {
            if let Some(p) = s.populations.iter_mut().find(|p| p.name == population) {
                p.own_axes.push(axis);
            }
        })
    }
    
    /// Validates every series.
    pub fn validate(&self) -> Result<(), SweepError> {
        self.series.iter().try_for_each(ExperimentSeries::validate)
    }
    
    fn index_of(&self, name: &str) -> Result<usize, SweepError> {
        self.series
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SweepError::SeriesNotFound(name.to_string()))
    }
    
    /// Applies `change` to a copy of the series and commits it only if the
    /// result still validates.
    fn edit(
        &mut self,
        name: &str,
        change: impl FnOnce(&mut ExperimentSeries),
    ) -> Result<(), SweepError> {
        let idx = self.index_of(name)?;
        let mut candidate = self.series[idx].clone();
        change(&mut candidate);
        candidate.validate()?;
        self.series[idx] = candidate;
        Ok(())
    }
}

impl TryFrom<Vec<ExperimentSeries>> for ExperimentCatalog {
    type Error = SweepError;
    
    fn try_from(series: Vec<ExperimentSeries>) -> Result<Self, Self::Error> {
        Self::from_series(series)
    }
}

impl From<ExperimentCatalog> for Vec<ExperimentSeries> {
    fn from(catalog: ExperimentCatalog) -> Self {
        catalog.series
    }
}
