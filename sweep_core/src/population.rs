//! Population specs: declarative distributions for synthesizing vehicles.

use crate::axis::SweepAxis;
use crate::error::SweepError;
use crate::settings::normalize_key;
use serde::{Deserialize, Serialize};

/// Closed `[min, max]` interval a vehicle attribute is sampled from.
///
/// `min > max` is allowed; sampling swaps the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Creates a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    
    /// Creates a degenerate range holding one value.
    pub fn constant(value: f64) -> Self {
        Self::new(value, value)
    }
    
    /// Returns `(low, high)` with the bounds ordered.
    pub fn ordered(&self) -> (f64, f64) {
        if self.min > self.max {
            (self.max, self.min)
        } else {
            (self.min, self.max)
        }
    }
}

/// A named vehicle population within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationSpec {
    /// Name, unique within its series
    pub name: String,
    pub vehicle_length: f64,
    pub speed: ValueRange,
    pub comm_distance: ValueRange,
    pub wait: ValueRange,
    pub braking: ValueRange,
    pub acceleration: ValueRange,
    pub time_distance: ValueRange,
    pub politeness: ValueRange,
    
    /// Percent (0..=100) of vehicles with a WiFi unit
    pub wifi_percent: u8,
    
    /// Percent of emergency vehicles
    pub emergency_percent: u8,
    
    /// Percent of vehicles sending fake messages
    pub faking_percent: u8,
    
    /// Percent of vehicles deviating from the street speed limit
    pub speed_deviating_percent: u8,
    
    /// Largest absolute speed deviation
    pub deviation_magnitude: f64,
    
    /// Waypoints are only accepted on streets at or below this speed limit
    pub speed_street_restriction: f64,
    
    /// Target number of vehicles
    pub amount: usize,
    pub color: String,
    pub fake_message_type: String,
    
    /// Own sweep axes; only the first one is honored
    pub own_axes: Vec<SweepAxis>,
}

impl Default for PopulationSpec {
    fn default() -> Self {
        Self {
            name: "Vehicles".to_string(),
            vehicle_length: 2.5,
            speed: ValueRange::new(30.0, 80.0),
            comm_distance: ValueRange::constant(100.0),
            wait: ValueRange::constant(10.0),
            braking: ValueRange::constant(300.0),
            acceleration: ValueRange::constant(800.0),
            time_distance: ValueRange::constant(100.0),
            politeness: ValueRange::constant(0.0),
            wifi_percent: 100,
            emergency_percent: 0,
            faking_percent: 0,
            speed_deviating_percent: 0,
            deviation_magnitude: 0.0,
            speed_street_restriction: f64::MAX,
            amount: 100,
            color: "#0000ff".to_string(),
            fake_message_type: String::new(),
            own_axes: Vec::new(),
        }
    }
}

impl PopulationSpec {
    /// Creates a spec with default distributions.
    pub fn new(name: &str, amount: usize) -> Self {
        Self {
            name: name.to_string(),
            amount,
            ..Default::default()
        }
    }
    
    /// Adds an own sweep axis (builder style).
    pub fn with_axis(mut self, axis: SweepAxis) -> Self {
        self.own_axes.push(axis);
        self
    }
    
    /// Returns the honored own axis, if any.
    pub fn sweep_axis(&self) -> Option<&SweepAxis> {
        self.own_axes.first()
    }
    
    /// Validates own axes and their field keys.
    pub fn validate(&self) -> Result<(), SweepError> {
        for axis in &self.own_axes {
            axis.validate()?;
            axis.key.parse::<PopulationField>()?;
        }
        Ok(())
    }
    
    /// Returns a copy with `field` overridden by `value`.
    pub fn with_override(&self, field: PopulationField, value: f64) -> Self {
        let mut spec = self.clone();
        field.set(&mut spec, value);
        spec
    }
}

/// A population field a sweep axis may vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopulationField {
    VehicleLength,
    MinSpeed,
    MaxSpeed,
    MinCommDistance,
    MaxCommDistance,
    MinWait,
    MaxWait,
    MinBraking,
    MaxBraking,
    MinAcceleration,
    MaxAcceleration,
    MinTimeDistance,
    MaxTimeDistance,
    MinPoliteness,
    MaxPoliteness,
    WifiPercent,
    EmergencyPercent,
    FakingPercent,
    SpeedDeviatingPercent,
    DeviationMagnitude,
    SpeedStreetRestriction,
    Amount,
}

impl PopulationField {
    /// Every field, in display order.
    pub const ALL: [PopulationField; 22] = [
        PopulationField::VehicleLength,
        PopulationField::MinSpeed,
        PopulationField::MaxSpeed,
        PopulationField::MinCommDistance,
        PopulationField::MaxCommDistance,
        PopulationField::MinWait,
        PopulationField::MaxWait,
        PopulationField::MinBraking,
        PopulationField::MaxBraking,
        PopulationField::MinAcceleration,
        PopulationField::MaxAcceleration,
        PopulationField::MinTimeDistance,
        PopulationField::MaxTimeDistance,
        PopulationField::MinPoliteness,
        PopulationField::MaxPoliteness,
        PopulationField::WifiPercent,
        PopulationField::EmergencyPercent,
        PopulationField::FakingPercent,
        PopulationField::SpeedDeviatingPercent,
        PopulationField::DeviationMagnitude,
        PopulationField::SpeedStreetRestriction,
        PopulationField::Amount,
    ];
    
    /// Returns the human-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            PopulationField::VehicleLength => "vehicle length",
            PopulationField::MinSpeed => "min speed",
            PopulationField::MaxSpeed => "max speed",
            PopulationField::MinCommDistance => "min comm distance",
            PopulationField::MaxCommDistance => "max comm distance",
            PopulationField::MinWait => "min wait",
            PopulationField::MaxWait => "max wait",
            PopulationField::MinBraking => "min braking",
            PopulationField::MaxBraking => "max braking",
            PopulationField::MinAcceleration => "min acceleration",
            PopulationField::MaxAcceleration => "max acceleration",
            PopulationField::MinTimeDistance => "min time distance",
            PopulationField::MaxTimeDistance => "max time distance",
            PopulationField::MinPoliteness => "min politeness",
            PopulationField::MaxPoliteness => "max politeness",
            PopulationField::WifiPercent => "wifi percent",
            PopulationField::EmergencyPercent => "emergency percent",
            PopulationField::FakingPercent => "faking percent",
            PopulationField::SpeedDeviatingPercent => "speed deviating percent",
            PopulationField::DeviationMagnitude => "deviation magnitude",
            PopulationField::SpeedStreetRestriction => "speed street restriction",
            PopulationField::Amount => "amount",
        }
    }
    
    /// Reads the field from a spec.
    pub fn get(&self, spec: &PopulationSpec) -> f64 {
        match self {
            PopulationField::VehicleLength => spec.vehicle_length,
            PopulationField::MinSpeed => spec.speed.min,
            PopulationField::MaxSpeed => spec.speed.max,
            PopulationField::MinCommDistance => spec.comm_distance.min,
            PopulationField::MaxCommDistance => spec.comm_distance.max,
            PopulationField::MinWait => spec.wait.min,
            PopulationField::MaxWait => spec.wait.max,
            PopulationField::MinBraking => spec.braking.min,
            PopulationField::MaxBraking => spec.braking.max,
            PopulationField::MinAcceleration => spec.acceleration.min,
            PopulationField::MaxAcceleration => spec.acceleration.max,
            PopulationField::MinTimeDistance => spec.time_distance.min,
            PopulationField::MaxTimeDistance => spec.time_distance.max,
            PopulationField::MinPoliteness => spec.politeness.min,
            PopulationField::MaxPoliteness => spec.politeness.max,
            PopulationField::WifiPercent => f64::from(spec.wifi_percent),
            PopulationField::EmergencyPercent => f64::from(spec.emergency_percent),
            PopulationField::FakingPercent => f64::from(spec.faking_percent),
            PopulationField::SpeedDeviatingPercent => f64::from(spec.speed_deviating_percent),
            PopulationField::DeviationMagnitude => spec.deviation_magnitude,
            PopulationField::SpeedStreetRestriction => spec.speed_street_restriction,
            PopulationField::Amount => spec.amount as f64,
        }
    }
    
    /// Writes the field into a spec.
    ///
    /// Percents are rounded and clamped to 0..=100, amounts rounded and
    /// clamped at 0.
    pub fn set(&self, spec: &mut PopulationSpec, value: f64) {
        match self {
            PopulationField::VehicleLength => spec.vehicle_length = value,
            PopulationField::MinSpeed => spec.speed.min = value,
            PopulationField::MaxSpeed => spec.speed.max = value,
            PopulationField::MinCommDistance => spec.comm_distance.min = value,
            PopulationField::MaxCommDistance => spec.comm_distance.max = value,
            PopulationField::MinWait => spec.wait.min = value,
            PopulationField::MaxWait => spec.wait.max = value,
            PopulationField::MinBraking => spec.braking.min = value,
            PopulationField::MaxBraking => spec.braking.max = value,
            PopulationField::MinAcceleration => spec.acceleration.min = value,
            PopulationField::MaxAcceleration => spec.acceleration.max = value,
            PopulationField::MinTimeDistance => spec.time_distance.min = value,
            PopulationField::MaxTimeDistance => spec.time_distance.max = value,
            PopulationField::MinPoliteness => spec.politeness.min = value,
            PopulationField::MaxPoliteness => spec.politeness.max = value,
            PopulationField::WifiPercent => spec.wifi_percent = to_percent(value),
            PopulationField::EmergencyPercent => spec.emergency_percent = to_percent(value),
            PopulationField::FakingPercent => spec.faking_percent = to_percent(value),
            PopulationField::SpeedDeviatingPercent => {
                spec.speed_deviating_percent = to_percent(value)
            }
            PopulationField::DeviationMagnitude => spec.deviation_magnitude = value,
            PopulationField::SpeedStreetRestriction => spec.speed_street_restriction = value,
            PopulationField::Amount => spec.amount = value.round().max(0.0) as usize,
        }
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

impl std::fmt::Display for PopulationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for PopulationField {
    type Err = SweepError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        PopulationField::ALL
            .iter()
            .copied()
            .find(|field| normalize_key(field.key()) == wanted)
            .ok_or_else(|| SweepError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_range_ordered_swaps() {
        assert_eq!(ValueRange::new(5.0, 1.0).ordered(), (1.0, 5.0));
        assert_eq!(ValueRange::new(1.0, 5.0).ordered(), (1.0, 5.0));
    }
    
    #[test]
    fn test_field_keys_round_trip() {
        for field in PopulationField::ALL {
            assert_eq!(field.key().parse::<PopulationField>().unwrap(), field);
        }
        assert!(matches!(
            "wingspan".parse::<PopulationField>(),
            Err(SweepError::UnknownField(_))
        ));
    }
    
    #[test]
    fn test_override_leaves_base_untouched() {
        let base = PopulationSpec::new("Cars", 50);
        let changed = base.with_override(PopulationField::MaxSpeed, 120.0);
        
        assert_eq!(changed.speed.max, 120.0);
        assert_eq!(base.speed.max, 80.0);
        assert_eq!(changed.name, "Cars");
    }
    
    #[test]
    fn test_percent_and_amount_clamped() {
        let mut spec = PopulationSpec::new("Cars", 50);
        PopulationField::FakingPercent.set(&mut spec, 140.0);
        PopulationField::WifiPercent.set(&mut spec, -3.0);
        PopulationField::Amount.set(&mut spec, 12.6);
        
        assert_eq!(spec.faking_percent, 100);
        assert_eq!(spec.wifi_percent, 0);
        assert_eq!(spec.amount, 13);
        
        PopulationField::Amount.set(&mut spec, -4.0);
        assert_eq!(spec.amount, 0);
    }
    
    #[test]
    fn test_validate_rejects_unknown_axis_key() {
        let spec = PopulationSpec::new("Cars", 10)
            .with_axis(SweepAxis::new("wingspan", 1.0, 1.0, 2).unwrap());
        assert!(spec.validate().is_err());
    }
}
