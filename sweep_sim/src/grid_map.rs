//! Synthetic street-grid map for generation runs without an imported map.
//!
//! Streets run every `block_size` units horizontally and vertically.
//! A coordinate snaps to the nearest street; each street takes its speed
//! limit from `speed_limits`, cycling through the list.

use serde::{Deserialize, Serialize};
use sweep_env::{MapDimensions, RoadMap, Vehicle, Waypoint};

/// Configuration for a [`GridMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMapConfig {
    /// Base name used in scenario names and job lines
    pub name: String,
    
    /// Extent along x
    pub width: f64,
    
    /// Extent along y
    pub height: f64,
    
    /// Distance between parallel streets
    pub block_size: f64,
    
    /// Speed limits assigned to streets in turn
    pub speed_limits: Vec<f64>,
}

impl Default for GridMapConfig {
    fn default() -> Self {
        Self {
            name: "grid".to_string(),
            width: 10_000.0,
            height: 10_000.0,
            block_size: 500.0,
            speed_limits: vec![50.0, 50.0, 70.0, 100.0],
        }
    }
}

/// Rectangular street grid implementing [`RoadMap`].
#[derive(Debug, Clone)]
pub struct GridMap {
    config: GridMapConfig,
    vehicles: Vec<Vehicle>,
}

impl GridMap {
    /// Creates a grid map.
    pub fn new(config: GridMapConfig) -> Self {
        Self {
            config,
            vehicles: Vec::new(),
        }
    }
    
    /// Number of horizontal streets (y = 0, block, 2*block, ...).
    pub fn horizontal_streets(&self) -> usize {
        Self::street_count(self.config.height, self.config.block_size)
    }
    
    /// Number of vertical streets.
    pub fn vertical_streets(&self) -> usize {
        Self::street_count(self.config.width, self.config.block_size)
    }
    
    fn street_count(extent: f64, block: f64) -> usize {
        if block.is_nan() || extent.is_nan() || block <= 0.0 || extent < 0.0 {
            return 0;
        }
        // Float-to-int casts saturate, so only the increment can overflow.
        ((extent / block).floor() as usize).saturating_add(1)
    }
    
    /// Speed limit of the street with the given global index.
    fn speed_of(&self, street: usize) -> Option<f64> {
        let limits = &self.config.speed_limits;
        if limits.is_empty() {
            return None;
        }
        Some(limits[street % limits.len()])
    }
    
    /// Index of the street nearest to `coord` on an axis with `count` streets.
    fn nearest(&self, coord: f64, count: usize) -> usize {
        let idx = (coord / self.config.block_size).round().max(0.0) as usize;
        idx.min(count.saturating_sub(1))
    }
}

impl RoadMap for GridMap {
    fn name(&self) -> &str {
        &self.config.name
    }
    
    fn dimensions(&self) -> MapDimensions {
        MapDimensions::new(self.config.width, self.config.height)
    }
    
    fn resolve_waypoint(&self, x: f64, y: f64) -> Option<Waypoint> {
        let rows = self.horizontal_streets();
        let cols = self.vertical_streets();
        if rows == 0 || cols == 0 || !self.dimensions().contains(x, y) {
            return None;
        }
        
        let block = self.config.block_size;
        let row = self.nearest(y, rows);
        let col = self.nearest(x, cols);
        let row_y = row as f64 * block;
        let col_x = col as f64 * block;
        
        // Snap to whichever street is closer; rows are indexed first.
        if (y - row_y).abs() <= (x - col_x).abs() {
            Some(Waypoint::new(x, row_y, self.speed_of(row)?))
        } else {
            Some(Waypoint::new(col_x, y, self.speed_of(rows.saturating_add(col))?))
        }
    }
    
    fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }
    
    fn clear_vehicles(&mut self) {
        self.vehicles.clear();
    }
    
    fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }
}
