//! Sweep axes: named arithmetic sequences of parameter values.

use crate::error::SweepError;
use serde::{Deserialize, Serialize};

/// One axis of variation: `value(i) = start + step * i` for `i in 0..count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxis {
    /// Setting or field key the axis varies
    pub key: String,
    
    /// First value
    pub start: f64,
    
    /// Increment between consecutive values
    pub step: f64,
    
    /// Number of values (at least 1)
    pub count: usize,
}

impl SweepAxis {
    /// Creates a validated axis.
    pub fn new(key: &str, start: f64, step: f64, count: usize) -> Result<Self, SweepError> {
        let axis = Self {
            key: key.to_string(),
            start,
            step,
            count,
        };
        axis.validate()?;
        Ok(axis)
    }
    
    /// Checks the axis invariants.
    ///
    /// Rejects `count == 0`, non-finite values, and any two consecutive
    /// values that compare equal. The last case covers `step == 0` as well
    /// as steps lost to rounding at large magnitudes; either would produce
    /// identically named scenarios.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.count < 1 {
            return Err(SweepError::EmptyAxis(self.key.clone()));
        }
        if !self.start.is_finite() || !self.step.is_finite() {
            return Err(SweepError::DegenerateAxis(self.key.clone()));
        }
        
        let mut previous = self.start;
        for i in 1..self.count {
            let value = self.value(i);
            if !value.is_finite() || value == previous {
                return Err(SweepError::DegenerateAxis(self.key.clone()));
            }
            previous = value;
        }
        Ok(())
    }
    
    /// Returns the value at `index`.
    pub fn value(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }
    
    /// Returns `(index, value)` for every step of the axis.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.count).map(move |i| (i, self.value(i)))
    }
    
    /// Returns all values.
    pub fn values(&self) -> Vec<f64> {
        self.enumerate().map(|(_, v)| v).collect()
    }
}
