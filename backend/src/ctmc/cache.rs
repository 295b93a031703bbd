//! Transition matrix cache
//!
//! Keys quantize the real-valued components to hundredths so tiny
//! floating-point differences in rates or step lengths collapse onto one
//! entry. Capacity is part of the key as an exact integer.
//!
//! # Critical Invariants
//!
//! - Entries are never evicted for the life of the cache
//! - Two keys with different capacities are never equal

use nalgebra::DMatrix;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Round to two decimal places, expressed as an integer count of hundredths
pub fn quantize(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Quantized cache key for one transition matrix
///
/// # Example
/// ```
/// use station_udf_core_rs::ctmc::TransitionKey;
///
/// let a = TransitionKey::new(0.501, 0.2, 4, 30.0);
/// let b = TransitionKey::new(0.504, 0.2, 4, 30.0);
/// assert_eq!(a, b);
/// assert_ne!(a, TransitionKey::new(0.501, 0.2, 5, 30.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    rental_rate: i64,
    return_rate: i64,
    capacity: usize,
    elapsed: i64,
}

impl TransitionKey {
    pub fn new(rental_rate: f64, return_rate: f64, capacity: usize, elapsed: f64) -> Self {
        Self {
            rental_rate: quantize(rental_rate),
            return_rate: quantize(return_rate),
            capacity,
            elapsed: quantize(elapsed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Unbounded memo of transition matrices
#[derive(Debug, Default)]
pub struct TransitionCache {
    entries: HashMap<TransitionKey, DMatrix<f64>>,
    stats: CacheStats,
}

impl TransitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached matrix for `key`, computing and storing it on a miss
    ///
    /// If `compute` fails nothing is stored.
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        key: TransitionKey,
        compute: F,
    ) -> Result<&DMatrix<f64>, E>
    where
        F: FnOnce() -> Result<DMatrix<f64>, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let matrix = compute()?;
                self.stats.misses += 1;
                Ok(entry.insert(matrix))
            }
        }
    }

    pub fn contains(&self, key: &TransitionKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
