//! Common types shared between the map and scenario abstractions.

use serde::{Deserialize, Serialize};

/// Extent of a road map in map units (origin at 0,0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapDimensions {
    /// Width along x
    pub width: f64,
    
    /// Height along y
    pub height: f64,
}

impl MapDimensions {
    /// Creates new map dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
    
    /// Returns true if the point lies inside the map.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

/// A route endpoint resolved onto a street of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Snapped x coordinate
    pub x: f64,
    
    /// Snapped y coordinate
    pub y: f64,
    
    /// Speed limit of the street the waypoint lies on
    pub street_speed: f64,
}

impl Waypoint {
    /// Creates a new waypoint.
    pub fn new(x: f64, y: f64, street_speed: f64) -> Self {
        Self { x, y, street_speed }
    }
}

/// Sampled per-vehicle attribute bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Maximum speed
    pub max_speed: f64,
    
    /// Communication distance
    pub comm_distance: f64,
    
    /// Wait time at a destination
    pub wait_time: f64,
    
    /// Braking rate
    pub braking_rate: f64,
    
    /// Acceleration rate
    pub acceleration_rate: f64,
    
    /// Time distance kept to the vehicle ahead
    pub time_distance: f64,
    
    /// Politeness factor for lane changes
    pub politeness: f64,
    
    /// Signed deviation from the street speed limit (0 when not participating)
    pub speed_deviation: f64,
    
    /// Vehicle carries a WiFi unit
    pub wifi_enabled: bool,
    
    /// Vehicle is an emergency vehicle
    pub emergency: bool,
    
    /// Vehicle sends fake messages
    pub faking: bool,
}

/// A fully constructed vehicle ready for insertion into a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Route waypoints (start, destination)
    pub route: Vec<Waypoint>,
    
    /// Sampled attributes
    pub profile: VehicleProfile,
    
    /// Vehicle length
    pub length: f64,
    
    /// Display color, e.g. `#ffcc00`
    pub color: String,
    
    /// Fake message type sent when `profile.faking` is set
    pub fake_message_type: String,
}

impl Vehicle {
    /// Builds a vehicle from a route and a sampled profile.
    pub fn new(
        route: Vec<Waypoint>,
        profile: VehicleProfile,
        length: f64,
        color: &str,
        fake_message_type: &str,
    ) -> Self {
        Self {
            route,
            profile,
            length,
            color: color.to_string(),
            fake_message_type: fake_message_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_dimensions_contains() {
        let dims = MapDimensions::new(100.0, 50.0);
        assert!(dims.contains(0.0, 0.0));
        assert!(dims.contains(100.0, 50.0));
        assert!(!dims.contains(100.1, 10.0));
        assert!(!dims.contains(10.0, -1.0));
    }
}
