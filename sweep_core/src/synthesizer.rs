//! Population synthesizer - constrained random vehicle generation.
//!
//! For each target vehicle the synthesizer draws a two-waypoint route on
//! streets no faster than the population's street restriction, samples the
//! attribute bundle and inserts the vehicle into the map. Route failures
//! are retried a bounded number of times; a population that cannot be
//! filled within the attempt cap is a soft failure reported in the
//! returned [`SynthesisOutcome`].

use crate::population::{PopulationSpec, ValueRange};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sweep_env::{RoadMap, Vehicle, VehicleProfile, Waypoint};
use tracing::{debug, warn};

/// Coordinate draws allowed per route.
pub const WAYPOINT_TRIES: usize = 20;

/// Outer attempts allowed per requested vehicle.
pub const ATTEMPT_FACTOR: usize = 4;

/// Number of waypoints in a synthesized route.
const ROUTE_LENGTH: usize = 2;

/// Result of synthesizing one population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    /// Population name
    pub population: String,
    
    /// Vehicles requested
    pub requested: usize,
    
    /// Vehicles inserted
    pub produced: usize,
    
    /// Outer sampling attempts used
    pub attempts: usize,
}

impl SynthesisOutcome {
    /// True when fewer vehicles were produced than requested.
    pub fn is_shortfall(&self) -> bool {
        self.produced < self.requested
    }
}

/// Generates vehicle populations from [`PopulationSpec`]s.
#[derive(Debug, Clone, Copy)]
pub struct PopulationSynthesizer {
    /// Coordinate draws per route
    waypoint_tries: usize,
    
    /// Outer attempts per requested vehicle
    attempt_factor: usize,
}

impl Default for PopulationSynthesizer {
    fn default() -> Self {
        Self {
            waypoint_tries: WAYPOINT_TRIES,
            attempt_factor: ATTEMPT_FACTOR,
        }
    }
}

impl PopulationSynthesizer {
    /// Creates a synthesizer with the standard retry bounds.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Sets the coordinate draws allowed per route.
    pub fn with_waypoint_tries(mut self, tries: usize) -> Self {
        self.waypoint_tries = tries;
        self
    }
    
    /// Synthesizes `spec.amount` vehicles into `map`.
    ///
    /// Never inserts more than `amount` vehicles and never makes more than
    /// `ATTEMPT_FACTOR * amount` outer attempts.
    pub fn synthesize<M, R>(&self, spec: &PopulationSpec, map: &mut M, rng: &mut R) -> SynthesisOutcome
    where
        M: RoadMap + ?Sized,
        R: Rng + ?Sized,
    {
        let max_attempts = spec.amount.saturating_mul(self.attempt_factor);
        let mut produced = 0;
        let mut attempts = 0;
        
        while produced < spec.amount && attempts < max_attempts {
            attempts += 1;
            
            let Some(route) = self.draw_route(spec, &*map, rng) else {
                continue;
            };
            
            let profile = self.sample_profile(spec, rng);
            map.add_vehicle(Vehicle::new(
                route,
                profile,
                spec.vehicle_length,
                &spec.color,
                &spec.fake_message_type,
            ));
            produced += 1;
        }
        
        let outcome = SynthesisOutcome {
            population: spec.name.clone(),
            requested: spec.amount,
            produced,
            attempts,
        };
        
        if outcome.is_shortfall() {
            warn!(
                "Population '{}': produced {} of {} vehicles after {} attempts",
                spec.name, produced, spec.amount, attempts
            );
        } else {
            debug!(
                "Population '{}': {} vehicles in {} attempts",
                spec.name, produced, attempts
            );
        }
        outcome
    }
    
    /// Draws a route of accepted waypoints, or `None` if the tries run out.
    fn draw_route<M, R>(&self, spec: &PopulationSpec, map: &M, rng: &mut R) -> Option<Vec<Waypoint>>
    where
        M: RoadMap + ?Sized,
        R: Rng + ?Sized,
    {
        let dims = map.dimensions();
        let width = clamp_finite(dims.width).max(0.0);
        let height = clamp_finite(dims.height).max(0.0);
        let mut route = Vec::with_capacity(ROUTE_LENGTH);
        
        for _ in 0..self.waypoint_tries {
            let x = uniform(0.0, width, rng);
            let y = uniform(0.0, height, rng);
            
            if let Some(wp) = map.resolve_waypoint(x, y) {
                if wp.street_speed <= spec.speed_street_restriction {
                    route.push(wp);
                    if route.len() == ROUTE_LENGTH {
                        return Some(route);
                    }
                }
            }
        }
        None
    }
    
    /// Samples the per-vehicle attribute bundle.
    pub fn sample_profile<R: Rng + ?Sized>(&self, spec: &PopulationSpec, rng: &mut R) -> VehicleProfile {
        let deviating = roll_percent(spec.speed_deviating_percent, rng);
        let speed_deviation = if deviating {
            let magnitude = spec.deviation_magnitude.abs();
            sample_range(&ValueRange::new(-magnitude, magnitude), rng)
        } else {
            0.0
        };
        
        VehicleProfile {
            max_speed: sample_range(&spec.speed, rng),
            comm_distance: sample_range(&spec.comm_distance, rng),
            wait_time: sample_range(&spec.wait, rng),
            braking_rate: sample_range(&spec.braking, rng),
            acceleration_rate: sample_range(&spec.acceleration, rng),
            time_distance: sample_range(&spec.time_distance, rng),
            politeness: sample_range(&spec.politeness, rng),
            speed_deviation,
            wifi_enabled: roll_percent(spec.wifi_percent, rng),
            emergency: roll_percent(spec.emergency_percent, rng),
            faking: roll_percent(spec.faking_percent, rng),
        }
    }
}

/// Uniform sample from a range; constant when `min == max`, swapped when
/// `min > max`.
pub fn sample_range<R: Rng + ?Sized>(range: &ValueRange, rng: &mut R) -> f64 {
    if range.min == range.max {
        return range.min;
    }
    let (low, high) = range.ordered();
    uniform(clamp_finite(low), clamp_finite(high), rng)
}

/// Uniform draw over `low..=high` for finite, ordered bounds. Spans wider
/// than `f64::MAX` are sampled by interpolation.
fn uniform<R: Rng + ?Sized>(low: f64, high: f64, rng: &mut R) -> f64 {
    if low >= high {
        return low;
    }
    if (high - low).is_finite() {
        return rng.gen_range(low..=high);
    }
    let t: f64 = rng.gen();
    (low * (1.0 - t) + high * t).clamp(low, high)
}

/// Clamps infinities to the largest finite magnitude; NaN becomes zero.
fn clamp_finite(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-f64::MAX, f64::MAX)
    }
}

/// True iff a uniform draw over `0..=99` is below `percent`.
pub fn roll_percent<R: Rng + ?Sized>(percent: u8, rng: &mut R) -> bool {
    rng.gen_range(0..100u32) < u32::from(percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sweep_env::MapDimensions;
    
    /// Map whose streets all have one speed limit; optionally unresolvable.
    struct FlatMap {
        street_speed: f64,
        resolvable: bool,
        extent: f64,
        vehicles: Vec<Vehicle>,
    }
    
    impl FlatMap {
        fn new(street_speed: f64) -> Self {
            Self {
                street_speed,
                resolvable: true,
                extent: 1000.0,
                vehicles: Vec::new(),
            }
        }
    }
    
    impl RoadMap for FlatMap {
        fn name(&self) -> &str {
            "flat"
        }
        
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(self.extent, self.extent)
        }
        
        fn resolve_waypoint(&self, x: f64, y: f64) -> Option<Waypoint> {
            self.resolvable.then(|| Waypoint::new(x, y, self.street_speed))
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
    
    #[test]
    fn test_synthesize_full_population() {
        let mut map = FlatMap::new(50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let spec = PopulationSpec::new("Cars", 50);
        
        let outcome = PopulationSynthesizer::new().synthesize(&spec, &mut map, &mut rng);
        
        assert_eq!(outcome.produced, 50);
        assert_eq!(outcome.attempts, 50);
        assert!(!outcome.is_shortfall());
        assert_eq!(map.vehicles().len(), 50);
        assert!(map.vehicles().iter().all(|v| v.route.len() == 2));
    }
    
    #[test]
    fn test_street_restriction_causes_soft_shortfall() {
        let mut map = FlatMap::new(130.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut spec = PopulationSpec::new("Slow", 10);
        spec.speed_street_restriction = 50.0;
        
        let outcome = PopulationSynthesizer::new().synthesize(&spec, &mut map, &mut rng);
        
        assert_eq!(outcome.produced, 0);
        assert_eq!(outcome.attempts, 40);
        assert!(outcome.is_shortfall());
        assert!(map.vehicles().is_empty());
    }
    
    #[test]
    fn test_unresolvable_map_caps_attempts() {
        let mut map = FlatMap::new(50.0);
        map.resolvable = false;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        
        let outcome =
            PopulationSynthesizer::new().synthesize(&PopulationSpec::new("X", 3), &mut map, &mut rng);
        assert_eq!((outcome.produced, outcome.attempts), (0, 12));
    }
    
    #[test]
    fn test_zero_amount() {
        let mut map = FlatMap::new(50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        
        let outcome =
            PopulationSynthesizer::new().synthesize(&PopulationSpec::new("None", 0), &mut map, &mut rng);
        assert_eq!((outcome.produced, outcome.attempts), (0, 0));
        assert!(!outcome.is_shortfall());
    }
    
    #[test]
    fn test_fixed_fields_copied() {
        let mut map = FlatMap::new(50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut spec = PopulationSpec::new("Fakers", 5);
        spec.vehicle_length = 4.5;
        spec.color = "#ff0000".to_string();
        spec.fake_message_type = "HUANG_PCN".to_string();
        spec.faking_percent = 100;
        spec.wifi_percent = 0;
        
        PopulationSynthesizer::new().synthesize(&spec, &mut map, &mut rng);
        
        for v in map.vehicles() {
            assert_eq!(v.length, 4.5);
            assert_eq!(v.color, "#ff0000");
            assert_eq!(v.fake_message_type, "HUANG_PCN");
            assert!(v.profile.faking);
            assert!(!v.profile.wifi_enabled);
        }
    }
    
    #[test]
    fn test_deviation_only_for_participants() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let synth = PopulationSynthesizer::new();
        let mut spec = PopulationSpec::new("Dev", 1);
        spec.deviation_magnitude = 15.0;
        
        spec.speed_deviating_percent = 0;
        for _ in 0..100 {
            assert_eq!(synth.sample_profile(&spec, &mut rng).speed_deviation, 0.0);
        }
        
        spec.speed_deviating_percent = 100;
        for _ in 0..100 {
            let d = synth.sample_profile(&spec, &mut rng).speed_deviation;
            assert!((-15.0..=15.0).contains(&d));
        }
    }
    
    #[test]
    fn test_roll_percent_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            assert!(!roll_percent(0, &mut rng));
            assert!(roll_percent(100, &mut rng));
        }
    }
    
    #[test]
    fn test_full_span_range_samples_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for range in [
            ValueRange::new(-f64::MAX, f64::MAX),
            ValueRange::new(f64::MAX, -f64::MAX),
            ValueRange::new(f64::NEG_INFINITY, f64::INFINITY),
        ] {
            for _ in 0..100 {
                assert!(sample_range(&range, &mut rng).is_finite());
            }
        }
    }
    
    #[test]
    fn test_unbounded_map_still_synthesizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for extent in [f64::MAX, f64::INFINITY, f64::NAN] {
            let mut map = FlatMap {
                extent,
                ..FlatMap::new(50.0)
            };
            let outcome = PopulationSynthesizer::new()
                .synthesize(&PopulationSpec::new("Cars", 5), &mut map, &mut rng);
            
            assert_eq!(outcome.produced, 5);
            assert!(map
                .vehicles()
                .iter()
                .flat_map(|v| &v.route)
                .all(|wp| wp.x.is_finite() && wp.y.is_finite()));
        }
    }
    
    proptest! {
        #[test]
        fn prop_constant_range_is_exact(value in -1e6f64..1e6, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            prop_assert_eq!(sample_range(&ValueRange::constant(value), &mut rng), value);
        }
        
        #[test]
        fn prop_inverted_range_within_bounds(a in -1e3f64..1e3, b in -1e3f64..1e3, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
            let v = sample_range(&ValueRange::new(hi, lo), &mut rng);
            prop_assert!(v >= lo && v <= hi);
        }
        
        #[test]
        fn prop_never_exceeds_amount_or_attempt_cap(amount in 0usize..40, speed in 0.0f64..200.0, seed in any::<u64>()) {
            let mut map = FlatMap::new(speed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut spec = PopulationSpec::new("P", amount);
            spec.speed_street_restriction = 100.0;
            
            let outcome = PopulationSynthesizer::new().synthesize(&spec, &mut map, &mut rng);
            prop_assert!(outcome.produced <= amount);
            prop_assert!(outcome.attempts <= ATTEMPT_FACTOR * amount);
            prop_assert_eq!(map.vehicles().len(), outcome.produced);
        }
    }
}
