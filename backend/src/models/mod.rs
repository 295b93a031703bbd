//! Domain models for the station UDF engine

pub mod result;
pub mod station;

// Re-exports
pub use result::StationResult;
pub use station::{StationError, StationProfile, MAX_CAPACITY};
