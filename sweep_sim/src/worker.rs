//! Background generation worker.
//!
//! The map is a single-writer store: each run clears and repopulates it,
//! so the service admits one run at a time and executes it on a blocking
//! worker thread, leaving the caller's runtime responsive.

use crate::error::GenerateError;
use crate::exporter::{ExportRequest, GenerationReport, ScenarioExporter};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use sweep_env::{RoadMap, ScenarioWriter};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Cooperative cancellation flag, checked between jobs.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    
    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the active-run flag when the run ends, however it ends.
struct ActiveRun(Arc<AtomicBool>);

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the shared map and runs generation passes one at a time.
pub struct GenerationService<M: RoadMap, W: ScenarioWriter> {
    /// Shared map
    map: Arc<Mutex<M>>,
    
    /// Scenario persistence
    writer: Arc<W>,
    
    /// Set while a run holds the map
    active: Arc<AtomicBool>,
}

impl<M: RoadMap, W: ScenarioWriter> GenerationService<M, W> {
    /// Creates a service over a map and a writer.
    pub fn new(map: M, writer: W) -> Self {
        Self {
            map: Arc::new(Mutex::new(map)),
            writer: Arc::new(writer),
            active: Arc::new(AtomicBool::new(false)),
        }
    }
    
    /// Returns a handle to the shared map.
    pub fn map(&self) -> Arc<Mutex<M>> {
        Arc::clone(&self.map)
    }
    
    /// Returns the writer.
    pub fn writer(&self) -> Arc<W> {
        Arc::clone(&self.writer)
    }
    
    /// True while a run is active.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
    
    /// Starts a run on a blocking worker thread.
    ///
    /// Must be called from within a Tokio runtime. Fails immediately with
    /// [`GenerateError::AlreadyRunning`] if another run is active.
    pub fn start(&self, request: ExportRequest) -> Result<GenerationHandle, GenerateError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GenerateError::AlreadyRunning);
        }
        let active = ActiveRun(Arc::clone(&self.active));
        
        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        let map = Arc::clone(&self.map);
        let writer = Arc::clone(&self.writer);
        
        info!("Starting generation worker for series '{}'", request.series.name);
        
        let handle = tokio::task::spawn_blocking(move || {
            let _active = active;
            let mut map = map
                .lock()
                .map_err(|_| GenerateError::Worker("map lock poisoned".to_string()))?;
            debug!("Generation worker acquired map '{}'", map.name());
            
            ScenarioExporter::new(&mut *map, &*writer)
                .with_cancel(worker_cancel)
                .run(&request)
        });
        
        Ok(GenerationHandle { cancel, handle })
    }
}

/// Handle to a running generation pass.
pub struct GenerationHandle {
    cancel: CancelFlag,
    handle: JoinHandle<Result<GenerationReport, GenerateError>>,
}

impl GenerationHandle {
    /// Requests cancellation; takes effect before the next job.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
    
    /// Waits for the run to finish.
    pub async fn join(self) -> Result<GenerationReport, GenerateError> {
        self.handle
            .await
            .map_err(|e| GenerateError::Worker(e.to_string()))?
    }
}
