//! Scenario exporter - materializes every job of a series.
//!
//! For each job and replica the exporter clears the map, applies the
//! swept setting, synthesizes every population, persists the scenario
//! and restores the setting. All scenario paths are then collected into
//! the run's job script.

use crate::error::GenerateError;
use crate::job_script::JobScriptConfig;
use crate::worker::CancelFlag;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use sweep_core::{
    ExperimentSeries, JobEnumerator, JobPlan, PopulationSynthesizer, PopulationValueRule,
    SimulationSettings, SynthesisOutcome,
};
use sweep_env::{RoadMap, ScenarioDocument, ScenarioWriter};
use tracing::{debug, info, warn};

/// Everything needed for one generation run.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Series to materialize
    pub series: ExperimentSeries,
    
    /// Baseline simulation settings
    pub settings: SimulationSettings,
    
    /// Replicas per job
    pub replicas: usize,
    
    /// RNG seed (fresh random seed when `None`)
    pub seed: Option<u64>,
    
    /// Own-axis value rule
    pub value_rule: PopulationValueRule,
    
    /// Batch script parameters
    pub job_script: JobScriptConfig,
    
    /// Directory receiving the run directory
    pub output_root: PathBuf,
}

impl ExportRequest {
    /// Creates a request with default settings, one replica and a random seed.
    pub fn new(series: ExperimentSeries, output_root: impl Into<PathBuf>) -> Self {
        Self {
            series,
            settings: SimulationSettings::default(),
            replicas: 1,
            seed: None,
            value_rule: PopulationValueRule::default(),
            job_script: JobScriptConfig::default(),
            output_root: output_root.into(),
        }
    }
    
    /// Sets the replica count.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }
    
    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A population that fell short of its target in one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ShortfallRecord {
    /// Scenario path relative to the output root
    pub scenario: String,
    
    /// Synthesis outcome
    pub outcome: SynthesisOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Series materialized
    pub series: String,
    
    /// Seed used (replays the run)
    pub seed: u64,
    
    /// Run-scoped output directory
    pub run_dir: PathBuf,
    
    /// Jobs enumerated
    pub job_count: usize,
    
    /// Replicas per job
    pub replicas: usize,
    
    /// Scenario paths relative to the output root, in generation order
    pub scenarios: Vec<String>,
    
    /// Emitted job script
    pub job_script: PathBuf,
    
    /// Populations below target
    pub shortfalls: Vec<ShortfallRecord>,
}

/// Materializes series into scenario files on a borrowed map.
pub struct ScenarioExporter<'a, M: RoadMap + ?Sized, W: ScenarioWriter + ?Sized> {
    /// Map collaborator (cleared and repopulated per replica)
    map: &'a mut M,
    
    /// Scenario persistence
    writer: &'a W,
    
    /// Vehicle generation
    synthesizer: PopulationSynthesizer,
    
    /// Checked between jobs
    cancel: Option<CancelFlag>,
}

impl<'a, M: RoadMap + ?Sized, W: ScenarioWriter + ?Sized> ScenarioExporter<'a, M, W> {
    /// Creates an exporter over a map and a writer.
    pub fn new(map: &'a mut M, writer: &'a W) -> Self {
        Self {
            map,
            writer,
            synthesizer: PopulationSynthesizer::new(),
            cancel: None,
        }
    }
    
    /// Sets the synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: PopulationSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }
    
    /// Attaches a cancellation flag.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }
    
    /// Runs the whole pass: enumerate, synthesize, persist, emit script.
    ///
    /// Any write failure aborts the run; the swept setting is restored
    /// before the error is returned.
    pub fn run(&mut self, request: &ExportRequest) -> Result<GenerationReport, GenerateError> {
        let series = &request.series;
        series.validate()?;
        
        let seed = request.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        
        let (run_dir_name, run_dir) = create_run_dir(&request.output_root)?;
        let jobs = JobEnumerator::new(series);
        let total = jobs.len();
        
        info!(
            "Generating series '{}': {} jobs x {} replicas (seed={}) into {}",
            series.name,
            total,
            request.replicas,
            seed,
            run_dir.display()
        );
        
        let mut settings = request.settings.clone();
        let mut scenarios = Vec::with_capacity(total * request.replicas);
        let mut shortfalls = Vec::new();
        
        for (completed, job) in jobs.enumerate() {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                warn!("Generation of '{}' cancelled after {} jobs", series.name, completed);
                return Err(GenerateError::Cancelled { completed, total });
            }
            
            let plan = JobPlan::resolve(series, &job, request.value_rule)?;
            
            for replica in 0..request.replicas {
                let name = plan.scenario_name(self.map.name(), replica);
                let relative = format!("{}/{}", run_dir_name, name);
                
                let outcomes =
                    self.materialize(&plan, &mut settings, &mut rng, &run_dir.join(&name))?;
                
                shortfalls.extend(
                    outcomes
                        .into_iter()
                        .filter(SynthesisOutcome::is_shortfall)
                        .map(|outcome| ShortfallRecord {
                            scenario: relative.clone(),
                            outcome,
                        }),
                );
                debug!("Wrote scenario {}", relative);
                scenarios.push(relative);
            }
        }
        
        let job_script = request
            .job_script
            .write(&run_dir, self.map.name(), &scenarios)?;
        
        if shortfalls.is_empty() {
            info!("✓ Series '{}': {} scenarios written", series.name, scenarios.len());
        } else {
            warn!(
                "Series '{}': {} scenarios written, {} populations below target",
                series.name,
                scenarios.len(),
                shortfalls.len()
            );
        }
        
        Ok(GenerationReport {
            series: series.name.clone(),
            seed,
            run_dir,
            job_count: total,
            replicas: request.replicas,
            scenarios,
            job_script,
            shortfalls,
        })
    }
    
    /// Materializes one replica of a job.
    fn materialize(
        &mut self,
        plan: &JobPlan,
        settings: &mut SimulationSettings,
        rng: &mut ChaCha8Rng,
        path: &Path,
    ) -> Result<Vec<SynthesisOutcome>, GenerateError> {
        self.map.clear_vehicles();
        
        match &plan.setting {
            Some(o) => settings.with_override(o.setting, o.value, |effective| {
                self.populate_and_save(plan, effective, rng, path)
            }),
            None => self.populate_and_save(plan, settings, rng, path),
        }
    }
    
    fn populate_and_save(
        &mut self,
        plan: &JobPlan,
        settings: &SimulationSettings,
        rng: &mut ChaCha8Rng,
        path: &Path,
    ) -> Result<Vec<SynthesisOutcome>, GenerateError> {
        let outcomes: Vec<SynthesisOutcome> = plan
            .populations
            .iter()
            .map(|p| self.synthesizer.synthesize(&p.spec, &mut *self.map, rng))
            .collect();
        
        let snapshot = settings.to_map();
        let doc = ScenarioDocument {
            map_name: self.map.name(),
            settings: &snapshot,
            vehicles: self.map.vehicles(),
        };
        self.writer.save(path, &doc, false)?;
        
        Ok(outcomes)
    }
}

/// Lists the scenario paths a run would produce, without side effects.
pub fn preview_scenarios(
    series: &ExperimentSeries,
    map_name: &str,
    replicas: usize,
    rule: PopulationValueRule,
) -> Result<Vec<String>, GenerateError> {
    series.validate()?;
    
    let mut names = Vec::new();
    for job in JobEnumerator::new(series) {
        let plan = JobPlan::resolve(series, &job, rule)?;
        names.extend((0..replicas).map(|r| plan.scenario_name(map_name, r)));
    }
    Ok(names)
}

/// Creates `<root>/<millis>_scenarios/` and returns its name and path.
fn create_run_dir(root: &Path) -> Result<(String, PathBuf), GenerateError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let name = format!("{}_scenarios", millis);
    let dir = root.join(&name);
    
    std::fs::create_dir_all(root).map_err(|e| GenerateError::io(root, e))?;
    std::fs::create_dir(&dir).map_err(|e| GenerateError::io(&dir, e))?;
    Ok((name, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_map::{GridMap, GridMapConfig};
    use crate::job_script::JOB_SCRIPT_NAME;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use sweep_core::{GlobalSetting, PopulationSpec, SweepAxis, SweepError};
    use sweep_env::{MemoryScenarioWriter, XmlScenarioWriter};
    
    fn baseline() -> ExperimentSeries {
        ExperimentSeries::new("Baseline")
            .with_general_axis(SweepAxis::new("fake message interval", 1000.0, 500.0, 2).unwrap())
            .with_population(PopulationSpec::new("Cars", 50))
    }
    
    fn town() -> GridMap {
        GridMap::new(GridMapConfig {
            name: "town".to_string(),
            ..Default::default()
        })
    }
    
    #[test]
    fn test_baseline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = XmlScenarioWriter::new();
        let request = ExportRequest::new(baseline(), dir.path())
            .with_replicas(2)
            .with_seed(42);
        
        let report = ScenarioExporter::new(&mut map, &writer).run(&request).unwrap();
        
        assert_eq!(report.job_count, 2);
        assert_eq!(report.scenarios.len(), 4);
        assert!(report.shortfalls.is_empty());
        
        let xml_files = std::fs::read_dir(&report.run_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == "xml"))
            .count();
        assert_eq!(xml_files, 4);
        
        let script = std::fs::read_to_string(report.run_dir.join(JOB_SCRIPT_NAME)).unwrap();
        let lines: Vec<&str> = script.lines().skip(1).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.contains(" town ") && l.contains("_scenarios/")));
        
        let dir_name = report.run_dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(dir_name.ends_with("_scenarios"));
        assert_eq!(
            report.scenarios[3],
            format!("{}/town_Baseline_fakemessageinterval_1500_Cars_standard_v1.xml", dir_name)
        );
    }
    
    #[test]
    fn test_setting_override_captured_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let request = ExportRequest::new(baseline(), dir.path()).with_seed(1);
        let before = request.settings.clone();
        
        ScenarioExporter::new(&mut map, &writer).run(&request).unwrap();
        
        let saved = writer.saved();
        let intervals: Vec<f64> = saved
            .iter()
            .map(|s| s.settings[GlobalSetting::FakeMessageInterval.key()])
            .collect();
        assert_eq!(intervals, vec![1000.0, 1500.0]);
        assert!(saved.iter().all(|s| s.vehicles.len() == 50));
        assert_eq!(request.settings, before);
    }
    
    #[test]
    fn test_each_replica_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let series = ExperimentSeries::new("S")
            .with_population(PopulationSpec::new("A", 7))
            .with_population(PopulationSpec::new("B", 3));
        let request = ExportRequest::new(series, dir.path()).with_replicas(3).with_seed(5);
        
        ScenarioExporter::new(&mut map, &writer).run(&request).unwrap();
        
        let saved = writer.saved();
        assert_eq!(saved.len(), 3);
        assert!(saved.iter().all(|s| s.vehicles.len() == 10));
        assert_eq!(map.vehicles().len(), 10);
    }
    
    #[test]
    fn test_population_override_reaches_vehicles() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let mut cars = PopulationSpec::new("Cars", 5)
            .with_axis(SweepAxis::new("vehicle length", 3.0, 1.0, 3).unwrap());
        cars.vehicle_length = 99.0;
        let series = ExperimentSeries::new("Len").with_population(cars);
        
        ScenarioExporter::new(&mut map, &writer)
            .run(&ExportRequest::new(series, dir.path()).with_seed(2))
            .unwrap();
        
        let lengths: Vec<f64> = writer.saved().iter().map(|s| s.vehicles[0].length).collect();
        assert_eq!(lengths, vec![3.0, 4.0, 5.0]);
    }
    
    #[test]
    fn test_write_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::failing_after(1);
        let request = ExportRequest::new(baseline(), dir.path()).with_seed(3);
        
        let err = ScenarioExporter::new(&mut map, &writer).run(&request).unwrap_err();
        assert!(matches!(err, GenerateError::Env(_)));
        assert_eq!(writer.saved().len(), 1);
    }
    
    #[test]
    fn test_shortfall_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let mut slow = PopulationSpec::new("Slow", 4);
        slow.speed_street_restriction = 10.0;
        let series = ExperimentSeries::new("Short").with_population(slow);
        
        let report = ScenarioExporter::new(&mut map, &writer)
            .run(&ExportRequest::new(series, dir.path()).with_seed(4))
            .unwrap();
        
        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.shortfalls.len(), 1);
        assert_eq!(report.shortfalls[0].outcome.produced, 0);
        assert_eq!(report.shortfalls[0].outcome.attempts, 16);
    }
    
    #[test]
    fn test_invalid_series_rejected_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let mut series = baseline();
        series.general_axes[0].count = 0;
        
        let err = ScenarioExporter::new(&mut map, &writer)
            .run(&ExportRequest::new(series, dir.path()))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Sweep(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
    
    #[test]
    fn test_rounded_axis_rejected_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = town();
        let writer = MemoryScenarioWriter::new();
        let series = ExperimentSeries::new("Big")
            .with_general_axis(SweepAxis {
                key: "spam time threshold".to_string(),
                start: 1e17,
                step: 1.0,
                count: 2,
            })
            .with_population(PopulationSpec::new("Cars", 1));
        
        assert!(preview_scenarios(&series, "m", 1, PopulationValueRule::Independent).is_err());
        
        let err = ScenarioExporter::new(&mut map, &writer)
            .run(&ExportRequest::new(series, dir.path()))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Sweep(SweepError::DegenerateAxis(_))));
        assert!(writer.saved().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
    
    #[test]
    fn test_same_seed_same_vehicles() {
        let dir = tempfile::tempdir().unwrap();
        let series = ExperimentSeries::new("R").with_population(PopulationSpec::new("A", 20));
        
        let run = |sub: &str| {
            let mut map = town();
            let writer = MemoryScenarioWriter::new();
            let request = ExportRequest::new(series.clone(), dir.path().join(sub)).with_seed(77);
            ScenarioExporter::new(&mut map, &writer).run(&request).unwrap();
            writer.saved()[0].vehicles.clone()
        };
        
        assert_eq!(run("a"), run("b"));
    }
    
    #[test]
    fn test_preview_matches_names() {
        let names = preview_scenarios(&baseline(), "town", 2, PopulationValueRule::Independent).unwrap();
        assert_eq!(
            names,
            vec![
                "town_Baseline_fakemessageinterval_1000_Cars_standard_v0.xml",
                "town_Baseline_fakemessageinterval_1000_Cars_standard_v1.xml",
                "town_Baseline_fakemessageinterval_1500_Cars_standard_v0.xml",
                "town_Baseline_fakemessageinterval_1500_Cars_standard_v1.xml",
            ]
        );
    }
    
    proptest! {
        #[test]
        fn prop_preview_names_distinct(
            general in 1usize..4,
            own in proptest::collection::vec(proptest::option::of(1usize..4), 1..4),
            replicas in 1usize..4,
        ) {
            let mut series = ExperimentSeries::new("P")
                .with_general_axis(SweepAxis::new("eebl threshold", 1.0, 1.0, general).unwrap());
            for (i, count) in own.iter().enumerate() {
                let mut spec = PopulationSpec::new(&format!("pop {}", i), 1);
                if let Some(count) = count {
                    spec = spec.with_axis(SweepAxis::new("max speed", 10.0, 2.5, *count).unwrap());
                }
                series = series.with_population(spec);
            }
            
            let names = preview_scenarios(&series, "map", replicas, PopulationValueRule::Independent).unwrap();
            let unique: HashSet<_> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
        }
    }
}
