//! Occupancy model engine

use crate::ctmc::cache::{CacheStats, TransitionCache, TransitionKey};
use crate::ctmc::exponential::ExponentialMethod;
use crate::ctmc::generator::generator_matrix;
use nalgebra::DMatrix;
use thiserror::Error;

/// Errors raised for invalid model inputs
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("Elapsed time must be finite and non-negative, got {0}")]
    InvalidElapsed(f64),

    #[error("{method:?} produced an invalid transition matrix (entry {entry}) for elapsed {elapsed}")]
    InvalidTransition {
        method: ExponentialMethod,
        elapsed: f64,
        entry: f64,
    },
}

/// Entries below this are rejected as non-probabilities
const NEGATIVE_TOLERANCE: f64 = -1e-9;

/// Compute `exp(R·elapsed)` without touching any cache
///
/// # Errors
/// [`ModelError::InvalidTransition`] when the method yields a non-finite
/// or clearly negative entry (an unstable Euler-limit step).
///
/// # Example
/// ```
/// use station_udf_core_rs::ctmc::{compute_transition_matrix, ExponentialMethod};
///
/// let p = compute_transition_matrix(ExponentialMethod::Pade, 0.3, 0.2, 3, 0.0).unwrap();
/// assert!((p[(1, 1)] - 1.0).abs() < 1e-12);
/// ```
pub fn compute_transition_matrix(
    method: ExponentialMethod,
    rental_rate: f64,
    return_rate: f64,
    capacity: usize,
    elapsed: f64,
) -> Result<DMatrix<f64>, ModelError> {
    validate_inputs(rental_rate, return_rate, elapsed)?;

    let size = capacity + 1;
    if elapsed == 0.0 || (rental_rate == 0.0 && return_rate == 0.0) {
        return Ok(DMatrix::identity(size, size));
    }

    let scaled = generator_matrix(rental_rate, return_rate, capacity) * elapsed;
    let transition = method.exponentiate(&scaled);

    if let Some(&entry) = transition
        .iter()
        .find(|v| !v.is_finite() || **v < NEGATIVE_TOLERANCE)
    {
        return Err(ModelError::InvalidTransition {
            method,
            elapsed,
            entry,
        });
    }
    Ok(transition)
}

fn validate_inputs(rental_rate: f64, return_rate: f64, elapsed: f64) -> Result<(), ModelError> {
    validate_rate("rental rate", rental_rate)?;
    validate_rate("return rate", return_rate)?;
    if !elapsed.is_finite() || elapsed < 0.0 {
        return Err(ModelError::InvalidElapsed(elapsed));
    }
    Ok(())
}

fn validate_rate(name: &'static str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidRate { name, value });
    }
    Ok(())
}

/// CTMC transition matrix source with a private memo
///
/// Not shared between threads. The cache lives and dies with the instance.
///
/// # Example
/// ```
/// use station_udf_core_rs::ctmc::OccupancyModel;
///
/// let mut model = OccupancyModel::default();
/// let first = model.transition_matrix(0.501, 0.1, 2, 30.0).unwrap().clone();
/// let second = model.transition_matrix(0.504, 0.1, 2, 30.0).unwrap().clone();
/// assert_eq!(first, second);
/// assert_eq!(model.cache_stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct OccupancyModel {
    method: ExponentialMethod,
    cache: TransitionCache,
}

impl OccupancyModel {
    pub fn new(method: ExponentialMethod) -> Self {
        Self {
            method,
            cache: TransitionCache::new(),
        }
    }

    pub fn method(&self) -> ExponentialMethod {
        self.method
    }

    /// Transition matrix for one step, served from the cache when possible
    ///
    /// On a hit the stored matrix is returned as-is, even if it was computed
    /// from rates that differ from these below the quantization threshold.
    pub fn transition_matrix(
        &mut self,
        rental_rate: f64,
        return_rate: f64,
        capacity: usize,
        elapsed: f64,
    ) -> Result<&DMatrix<f64>, ModelError> {
        // Quantization would map NaN onto a valid key, so validate before probing
        validate_inputs(rental_rate, return_rate, elapsed)?;

        let key = TransitionKey::new(rental_rate, return_rate, capacity, elapsed);
        let method = self.method;
        self.cache.get_or_try_insert_with(key, || {
            compute_transition_matrix(method, rental_rate, return_rate, capacity, elapsed)
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
