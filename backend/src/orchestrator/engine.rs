//! Orchestrator Engine - Batch UDF Runs
//!
//! Runs the UDF optimization for every station in a batch:
//! - Station jobs on a fixed-size rayon pool (work stealing balances the
//!   uneven per-station cost, which grows with capacity)
//! - One [`UdfCalculator`] per rayon work split (`for_each_init` runs once per
//!   split, so a thread may build several); caches are never shared
//! - Checkpoint per finished station, skip-and-reload on resume
//! - Isolated failures: one bad station never aborts the batch
//!
//! # Architecture
//!
//! ```text
//! For each station (any worker, any order):
//! 0. Checkpoint name already claimed by an earlier station? → Failed
//! 1. Checkpoint exists?  → reload it into the slot as Resumed
//! 2. Compute UDF table for 0..=capacity, pick optimum
//! 3. Write checkpoint
//! 4. Log timing and progress
//! 5. Store Computed in the station's slot
//! Any error in 1-3 → log with station id, store Failed
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use station_udf_core_rs::orchestrator::{BatchConfig, BatchOrchestrator};
//! use station_udf_core_rs::StationProfile;
//!
//! let stations = vec![
//!     StationProfile::with_constant_rates("S1", "Main St", 10, 0.1, 0.08).unwrap(),
//!     StationProfile::with_constant_rates("S2", "Harbor", 15, 0.05, 0.12).unwrap(),
//! ];
//!
//! let orchestrator = BatchOrchestrator::new(BatchConfig::default()).unwrap();
//! let report = orchestrator.run(&stations).unwrap();
//! for (index, result) in report.resolved() {
//!     println!("{}: optimum {}", stations[index].id(), result.optimal_inventory());
//! }
//! ```

use crate::models::result::StationResult;
use crate::models::station::StationProfile;
use crate::orchestrator::checkpoint::{
    CheckpointError, CheckpointStore, ManifestStatus, DEFAULT_CHECKPOINT_DIR,
};
use crate::udf::{UdfCalculator, UdfConfig, UdfError};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete batch configuration
///
/// # Fields
///
/// * `udf` - Engine settings (discretization, penalties, step timing, method)
/// * `checkpoint_dir` - Where per-station checkpoints and the manifest live
/// * `workers` - Pool size; `None` uses one worker per logical CPU
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub udf: UdfConfig,

    pub checkpoint_dir: PathBuf,

    pub workers: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            udf: UdfConfig::default(),
            checkpoint_dir: PathBuf::from(DEFAULT_CHECKPOINT_DIR),
            workers: None,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// What happened to one station in this run
#[derive(Debug, Clone, PartialEq)]
pub enum StationOutcome {
    /// Computed in this run and checkpointed
    Computed(StationResult),

    /// Skipped because a checkpoint existed; values reloaded from it
    Resumed(StationResult),

    /// Left unresolved; no checkpoint written
    Failed { reason: String },
}

impl StationOutcome {
    pub fn result(&self) -> Option<&StationResult> {
        match self {
            StationOutcome::Computed(result) | StationOutcome::Resumed(result) => Some(result),
            StationOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StationOutcome::Failed { .. })
    }
}

/// Outcomes of a batch run, index-aligned with the input stations
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    outcomes: Vec<StationOutcome>,

    /// Final value of the `i/N` progress counter
    processed: usize,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[StationOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Slots the progress counter passed; equals [`len`](Self::len) after a run
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn computed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StationOutcome::Computed(_)))
            .count()
    }

    pub fn resumed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StationOutcome::Resumed(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// `(station index, result)` for every station with values
    pub fn resolved(&self) -> impl Iterator<Item = (usize, &StationResult)> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.result().map(|result| (index, result)))
    }

    /// Largest capacity among resolved stations
    pub fn max_capacity(&self) -> Option<usize> {
        self.resolved().map(|(_, result)| result.capacity()).max()
    }
}

/// Batch-level errors (per-station problems never surface here)
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No stations to process")]
    NoStations,

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] UdfError),

    #[error("Worker pool size must be at least 1")]
    InvalidWorkers,

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Batch runner over independent station jobs
///
/// # Concurrency
///
/// The results table is allocated before dispatch with one slot per
/// station. Workers receive disjoint `&mut` slots through
/// `par_iter_mut().zip(..)`, so every slot has exactly one writer and needs
/// no lock. The only shared mutable state is the progress counter, which
/// advances for every slot whatever its outcome.
///
/// Station ids that map to the same checkpoint file are detected before
/// dispatch; every station after the first one is marked failed without
/// touching the file.
pub struct BatchOrchestrator {
    config: BatchConfig,
    store: CheckpointStore,
}

impl BatchOrchestrator {
    /// Create an orchestrator, validating the engine config up front
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        UdfCalculator::new(config.udf)?;
        if config.workers == Some(0) {
            return Err(BatchError::InvalidWorkers);
        }

        let store = CheckpointStore::new(config.checkpoint_dir.clone());
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Process every station once, skipping those already checkpointed
    ///
    /// # Errors
    /// Only batch-level problems: an empty station list, an unusable
    /// checkpoint directory, a manifest for a different config, or a pool
    /// that cannot be built.
    pub fn run(&self, stations: &[StationProfile]) -> Result<BatchReport, BatchError> {
        if stations.is_empty() {
            return Err(BatchError::NoStations);
        }

        self.store.prepare()?;
        match self.store.ensure_manifest(&self.config.udf)? {
            ManifestStatus::Created => info!(
                dir = %self.store.dir().display(),
                "Starting new batch"
            ),
            ManifestStatus::Matched => info!(
                dir = %self.store.dir().display(),
                "Resuming batch from existing checkpoints"
            ),
        }

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = self.config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;

        let total = stations.len();
        let collisions = self.checkpoint_collisions(stations);
        let completed = AtomicUsize::new(0);
        let mut slots: Vec<Option<StationOutcome>> = (0..total).map(|_| None).collect();

        pool.install(|| {
            slots
                .par_iter_mut()
                .zip(stations.par_iter())
                .zip(collisions.par_iter())
                .for_each_init(
                    || UdfCalculator::new(self.config.udf),
                    |calculator, ((slot, station), collision)| {
                        let outcome = match (collision, calculator) {
                            (Some(first), _) => {
                                let reason = format!(
                                    "checkpoint name collides with station {}",
                                    stations[*first].id()
                                );
                                error!(station_id = station.id(), %reason, "Error processing station");
                                StationOutcome::Failed { reason }
                            }
                            (None, Ok(calculator)) => self.process_station(calculator, station),
                            (None, Err(e)) => StationOutcome::Failed {
                                reason: e.to_string(),
                            },
                        };

                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        info!("Processing station {}/{}: {}", done, total, station.name());
                        *slot = Some(outcome);
                    },
                );
        });

        let outcomes: Vec<StationOutcome> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| StationOutcome::Failed {
                    reason: "not processed".to_string(),
                })
            })
            .collect();
        let report = BatchReport {
            outcomes,
            processed: completed.into_inner(),
        };

        info!(
            processed = report.processed(),
            computed = report.computed_count(),
            resumed = report.resumed_count(),
            failed = report.failed_count(),
            "Batch complete"
        );
        Ok(report)
    }

    fn process_station(
        &self,
        calculator: &mut UdfCalculator,
        station: &StationProfile,
    ) -> StationOutcome {
        if self.store.exists(station.id()) {
            info!(station = station.name(), "Skipping already processed station");
            return match self.reload(station) {
                Ok(result) => StationOutcome::Resumed(result),
                Err(e) => {
                    warn!(station_id = station.id(), error = %e, "Could not reload checkpoint");
                    StationOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
        }

        let started = Instant::now();
        let computed = panic::catch_unwind(AssertUnwindSafe(|| self.compute(calculator, station)))
            .unwrap_or_else(|_| Err(StationFailure::Panicked));

        let result = match computed {
            Ok(result) => result,
            Err(failure) => {
                if matches!(failure, StationFailure::Udf(UdfError::EmptyUdf(_))) {
                    warn!(station = station.name(), "UDF values empty for station");
                }
                error!(station_id = station.id(), error = %failure, "Error processing station");
                return StationOutcome::Failed {
                    reason: failure.to_string(),
                };
            }
        };

        info!(
            station = station.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Station processed"
        );

        let stats = calculator.cache_stats();
        debug!(
            station_id = station.id(),
            hits = stats.hits,
            misses = stats.misses,
            "Transition cache"
        );

        StationOutcome::Computed(result)
    }

    /// For each station whose checkpoint file name was already claimed by an
    /// earlier station in the list, the index of that earlier station
    fn checkpoint_collisions(&self, stations: &[StationProfile]) -> Vec<Option<usize>> {
        let mut claimed: HashMap<PathBuf, usize> = HashMap::with_capacity(stations.len());

        stations
            .iter()
            .enumerate()
            .map(|(index, station)| {
                let path = self.store.path_for(station.id());
                match claimed.entry(path) {
                    Entry::Occupied(entry) => Some(*entry.get()),
                    Entry::Vacant(entry) => {
                        entry.insert(index);
                        None
                    }
                }
            })
            .collect()
    }

    /// Compute and checkpoint one station
    fn compute(
        &self,
        calculator: &mut UdfCalculator,
        station: &StationProfile,
    ) -> Result<StationResult, StationFailure> {
        let result = calculator.optimize(station)?;
        self.store.write(station.id(), result.udf())?;
        Ok(result)
    }

    fn reload(&self, station: &StationProfile) -> Result<StationResult, StationFailure> {
        let capacity = station.validated_capacity().map_err(UdfError::from)?;
        let udf = self.store.load(station.id())?;
        if udf.len() != capacity + 1 {
            return Err(StationFailure::StaleCheckpoint {
                expected: capacity + 1,
                found: udf.len(),
            });
        }
        StationResult::from_udf(udf).ok_or_else(|| UdfError::EmptyUdf(station.id().to_string()).into())
    }
}

/// Why a single station could not be resolved
#[derive(Debug, Error)]
enum StationFailure {
    #[error(transparent)]
    Udf(#[from] UdfError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("Checkpoint has {found} rows, station capacity needs {expected}")]
    StaleCheckpoint { expected: usize, found: usize },

    #[error("Computation panicked")]
    Panicked,
}
