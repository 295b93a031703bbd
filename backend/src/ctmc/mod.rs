//! Occupancy model: birth-death CTMC over bike counts
//!
//! The bike count at a station moves down by one at the rental rate and up
//! by one at the return rate, clamped to `0..=capacity`. For a step of
//! length Δt the discrete transition matrix is `exp(R·Δt)`, memoized per
//! model instance.
//!
//! - **generator**: builds the rate matrix R
//! - **exponential**: matrix exponential methods (Padé, Euler limit)
//! - **cache**: quantized-key transition matrix cache
//! - **model**: [`OccupancyModel`], which ties the three together

pub mod cache;
pub mod exponential;
pub mod generator;
pub mod model;

pub use cache::{CacheStats, TransitionCache, TransitionKey};
pub use exponential::{ExponentialMethod, DEFAULT_EULER_ITERATIONS};
pub use generator::generator_matrix;
pub use model::{compute_transition_matrix, ModelError, OccupancyModel};
