//! Orchestrator - batch runs across stations
//!
//! See `engine.rs` for the batch loop and `checkpoint.rs` for persistence.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{BatchConfig, BatchError, BatchOrchestrator, BatchReport, StationOutcome};

// Re-export checkpoint types
pub use checkpoint::{
    sanitize_station_id, CheckpointError, CheckpointRow, CheckpointStore, ManifestStatus, RunManifest,
    DEFAULT_CHECKPOINT_DIR, MANIFEST_FILE,
};
