//! Station UDF Core - Rust Engine
//!
//! Expected unmet demand (lost rentals plus lost returns) for bike-share
//! stations under a birth-death occupancy model, and the starting inventory
//! that minimizes it.
//!
//! # Architecture
//!
//! - **core**: Day discretization and half-hour slot mapping
//! - **models**: Domain types (StationProfile, StationResult)
//! - **ctmc**: Generator matrix, matrix exponential, transition cache
//! - **udf**: Loss integrator and optimal inventory search
//! - **orchestrator**: Parallel, resumable batch runs with checkpoints
//! - **io**: Station CSV loading and consolidated results writing
//!
//! # Critical Invariants
//!
//! 1. Within one station, time steps are applied strictly in order
//! 2. Stations are independent; each batch slot has exactly one writer
//! 3. A checkpoint file exists only for a fully computed station

// Module declarations
pub mod core;
pub mod ctmc;
pub mod io;
pub mod models;
pub mod orchestrator;
pub mod udf;

// Re-exports for convenience
pub use crate::core::time::{slot_from_clock, DayGrid, GridError, TIME_SLOTS};
pub use ctmc::{ExponentialMethod, ModelError, OccupancyModel};
pub use models::{
    result::StationResult,
    station::{StationError, StationProfile, MAX_CAPACITY},
};
pub use orchestrator::{
    BatchConfig, BatchError, BatchOrchestrator, BatchReport, CheckpointError, CheckpointStore,
    StationOutcome,
};
pub use udf::{
    find_optimal_inventory, marginal_udf, PenaltyRates, StepTiming, UdfCalculator, UdfConfig,
    UdfError,
};
