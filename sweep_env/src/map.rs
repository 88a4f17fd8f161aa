//! Road map abstraction consumed by the population synthesizer.

use crate::types::{MapDimensions, Vehicle, Waypoint};

/// The map collaborator.
///
/// Street geometry, map import and the movement engine live outside this
/// workspace; generation only needs to resolve random coordinates to
/// waypoints and to hold the vehicles synthesized for the current replica.
///
/// # Implementations
///
/// - **Grid**: `sweep_sim::GridMap`, a synthetic street grid
/// - **External**: any real map loader can implement this trait
///
/// # Ownership
///
/// A map is a single-writer store. Generation clears it and repopulates it
/// for every replica, so only one generation run may hold it at a time.
pub trait RoadMap: Send + 'static {
    /// Returns the map's base name (used in scenario names and job lines).
    fn name(&self) -> &str;
    
    /// Returns the map extent.
    fn dimensions(&self) -> MapDimensions;
    
    /// Resolves a coordinate to the nearest street waypoint.
    ///
    /// # Returns
    /// * `Some(waypoint)` - carrying the street's speed limit
    /// * `None` - no street reachable from this coordinate
    fn resolve_waypoint(&self, x: f64, y: f64) -> Option<Waypoint>;
    
    /// Inserts a constructed vehicle.
    fn add_vehicle(&mut self, vehicle: Vehicle);
    
    /// Removes all vehicles.
    fn clear_vehicles(&mut self);
    
    /// Returns the vehicles currently held.
    fn vehicles(&self) -> &[Vehicle];
}
