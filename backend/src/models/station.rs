//! Station profile model
//!
//! A bike-share station as seen by the engine: identity, capacity, and two
//! half-hourly rate tables (rentals and returns, bikes per minute).
//!
//! # Critical Invariants
//!
//! - Both rate tables have exactly [`TIME_SLOTS`] entries
//! - Stored rates are finite and non-negative
//! - Capacity is kept as loaded; [`StationProfile::validated_capacity`] is the
//!   only way the engine turns it into a matrix dimension

use crate::core::time::TIME_SLOTS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest capacity the engine accepts
///
/// The transition matrices are dense `(C+1)²`, so this keeps a station well
/// below sizes where allocation failure would abort the process.
pub const MAX_CAPACITY: usize = 1000;

/// Errors raised by station construction and validation
#[derive(Debug, Error, PartialEq)]
pub enum StationError {
    #[error("Station {station_id} has invalid capacity {capacity}")]
    InvalidCapacity { station_id: String, capacity: i64 },

    #[error("Station {station_id} capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge {
        station_id: String,
        capacity: i64,
        max: usize,
    },

    #[error("Rate at slot {slot} must be finite and non-negative, got {rate}")]
    InvalidRate { slot: usize, rate: f64 },
}

/// Immutable-once-loaded station record
///
/// # Example
/// ```
/// use station_udf_core_rs::StationProfile;
///
/// let mut station = StationProfile::new("S001", "Main St", 10);
/// station.set_rental_rate(16, 0.25).unwrap();
/// assert_eq!(station.rental_rate(16), 0.25);
/// assert_eq!(station.rental_rate(99), 0.0); // out of bounds reads as zero
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationProfile {
    id: String,
    name: String,

    /// Maximum bike count. Signed so malformed input can be represented and
    /// rejected later instead of at load time.
    capacity: i64,

    /// Rentals per minute, one entry per half-hour slot
    rental_rates: Vec<f64>,

    /// Returns per minute, one entry per half-hour slot
    return_rates: Vec<f64>,
}

impl StationProfile {
    /// Create a station with all rates zero
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            rental_rates: vec![0.0; TIME_SLOTS],
            return_rates: vec![0.0; TIME_SLOTS],
        }
    }

    /// Create a station whose rates are the same in every slot
    pub fn with_constant_rates(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity: i64,
        rental_rate: f64,
        return_rate: f64,
    ) -> Result<Self, StationError> {
        let mut station = Self::new(id, name, capacity);
        for slot in 0..TIME_SLOTS {
            station.set_rental_rate(slot, rental_rate)?;
            station.set_return_rate(slot, return_rate)?;
        }
        Ok(station)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity exactly as loaded (may be negative for malformed input)
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Capacity as a matrix dimension bound
    ///
    /// # Errors
    /// Returns [`StationError::InvalidCapacity`] for negative capacities and
    /// [`StationError::CapacityTooLarge`] above [`MAX_CAPACITY`].
    pub fn validated_capacity(&self) -> Result<usize, StationError> {
        let capacity =
            usize::try_from(self.capacity).map_err(|_| StationError::InvalidCapacity {
                station_id: self.id.clone(),
                capacity: self.capacity,
            })?;
        if capacity > MAX_CAPACITY {
            return Err(StationError::CapacityTooLarge {
                station_id: self.id.clone(),
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(capacity)
    }

    /// Set the rental rate for a slot
    ///
    /// Slots outside `0..TIME_SLOTS` are ignored.
    pub fn set_rental_rate(&mut self, slot: usize, rate: f64) -> Result<(), StationError> {
        Self::store(&mut self.rental_rates, slot, rate)
    }

    /// Set the return rate for a slot
    ///
    /// Slots outside `0..TIME_SLOTS` are ignored.
    pub fn set_return_rate(&mut self, slot: usize, rate: f64) -> Result<(), StationError> {
        Self::store(&mut self.return_rates, slot, rate)
    }

    /// Rental rate for a slot (0.0 outside bounds)
    pub fn rental_rate(&self, slot: usize) -> f64 {
        self.rental_rates.get(slot).copied().unwrap_or(0.0)
    }

    /// Return rate for a slot (0.0 outside bounds)
    pub fn return_rate(&self, slot: usize) -> f64 {
        self.return_rates.get(slot).copied().unwrap_or(0.0)
    }

    fn store(table: &mut [f64], slot: usize, rate: f64) -> Result<(), StationError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(StationError::InvalidRate { slot, rate });
        }
        if let Some(entry) = table.get_mut(slot) {
            *entry = rate;
        }
        Ok(())
    }
}
