//! Cartesian product enumeration of a series' sweep coordinates.
//!
//! Every swept dimension (the general axis, then each population's own
//! axis in list order) is an independent range; jobs are produced as the
//! N-ary product of those ranges, general axis outermost and the last
//! population varying fastest.

use crate::series::ExperimentSeries;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Position on one sweep axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisCoordinate {
    /// Which of the owner's axes (always 0 for honored axes)
    pub axis_index: usize,
    
    /// Step along that axis
    pub step_index: usize,
}

impl AxisCoordinate {
    /// Coordinate on the first axis.
    pub fn step(step_index: usize) -> Self {
        Self {
            axis_index: 0,
            step_index,
        }
    }
}

/// One combination of sweep coordinates, before replica expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// General-axis coordinate, `None` when the series has no general sweep
    pub general: Option<AxisCoordinate>,
    
    /// Per-population coordinate in series order, `None` for unswept ones
    pub populations: Vec<Option<AxisCoordinate>>,
}

/// Iterator over every [`JobDescriptor`] of a series.
#[derive(Debug, Clone)]
pub struct JobEnumerator {
    /// General axis length, if swept
    general: Option<usize>,
    
    /// Own axis length per population, if swept
    populations: Vec<Option<usize>>,
    
    /// Radix of each swept dimension, outermost first
    radices: Vec<usize>,
    
    /// Odometer state, one digit per radix
    digits: Vec<usize>,
    
    /// Jobs not yet yielded
    remaining: usize,
}

impl JobEnumerator {
    /// Creates an enumerator for `series`.
    ///
    /// A series with several general axes is enumerated without a general
    /// sweep; a population with several own axes contributes only its first.
    pub fn new(series: &ExperimentSeries) -> Self {
        if series.general_axes.len() > 1 {
            warn!(
                "Series '{}' defines {} general axes; only a single general axis is swept, ignoring all",
                series.name,
                series.general_axes.len()
            );
        }
        for population in &series.populations {
            if population.own_axes.len() > 1 {
                warn!(
                    "Population '{}' in series '{}' defines {} axes; only '{}' is swept",
                    population.name,
                    series.name,
                    population.own_axes.len(),
                    population.own_axes[0].key
                );
            }
        }
        
        let general = series.general_axis().map(|a| a.count);
        let populations: Vec<Option<usize>> = series
            .populations
            .iter()
            .map(|p| p.sweep_axis().map(|a| a.count))
            .collect();
        
        let radices: Vec<usize> = general
            .iter()
            .chain(populations.iter().flatten())
            .copied()
            .collect();
        let remaining = radices.iter().product();
        
        Self {
            general,
            populations,
            digits: vec![0; radices.len()],
            radices,
            remaining,
        }
    }
    
    /// Total number of jobs the series expands to.
    pub fn total(series: &ExperimentSeries) -> usize {
        Self::new(series).len()
    }
    
    fn current(&self) -> JobDescriptor {
        let mut digits = self.digits.iter().copied();
        let general = self
            .general
            .map(|_| AxisCoordinate::step(digits.next().unwrap_or(0)));
        let populations = self
            .populations
            .iter()
            .map(|p| p.map(|_| AxisCoordinate::step(digits.next().unwrap_or(0))))
            .collect();
        
        JobDescriptor {
            general,
            populations,
        }
    }
    
    fn advance(&mut self) {
        for (digit, radix) in self.digits.iter_mut().zip(&self.radices).rev() {
            *digit += 1;
            if *digit < *radix {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for JobEnumerator {
    type Item = JobDescriptor;
    
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let job = self.current();
        self.remaining -= 1;
        self.advance();
        Some(job)
    }
    
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for JobEnumerator {}

/// Collects every job of `series`.
pub fn enumerate_jobs(series: &ExperimentSeries) -> Vec<JobDescriptor> {
    JobEnumerator::new(series).collect()
}
