//! Loss integrator
//!
//! Walks the day step by step, composing transition matrices into the
//! cumulative product Π and accumulating the expected abandonment cost read
//! from the starting inventory's row.
//!
//! # Critical Invariants
//!
//! - Steps are processed strictly in order (Π is order-dependent)
//! - Π does not depend on the starting inventory, so one walk serves every
//!   row; the all-inventories path and the single-inventory path produce
//!   identical numbers

use crate::core::time::{DayGrid, GridError};
use crate::ctmc::{CacheStats, ModelError, OccupancyModel};
use crate::models::result::StationResult;
use crate::models::station::{StationError, StationProfile};
use crate::udf::config::UdfConfig;
use nalgebra::DMatrix;
use thiserror::Error;

/// Errors raised while computing a UDF
#[derive(Debug, Error, PartialEq)]
pub enum UdfError {
    #[error("Inventory {inventory} outside 0..={capacity}")]
    InventoryOutOfRange { inventory: usize, capacity: usize },

    #[error("Invalid discretization: {0}")]
    InvalidDiscretization(#[from] GridError),

    #[error("{name} penalty must be finite and non-negative, got {value}")]
    InvalidPenalty { name: &'static str, value: f64 },

    #[error("UDF table empty for station {0}")]
    EmptyUdf(String),

    #[error("Station error: {0}")]
    Station(#[from] StationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Single-threaded UDF calculator
///
/// Owns its [`OccupancyModel`], and with it a private transition cache that
/// persists across every station this calculator processes.
///
/// # Example
/// ```
/// use station_udf_core_rs::{StationProfile, UdfCalculator, UdfConfig};
///
/// let station = StationProfile::with_constant_rates("S1", "Quiet", 3, 0.0, 0.0).unwrap();
/// let mut calculator = UdfCalculator::new(UdfConfig::default()).unwrap();
///
/// let result = calculator.optimize(&station).unwrap();
/// assert_eq!(result.udf(), &[0.0, 0.0, 0.0, 0.0]);
/// assert_eq!(result.optimal_inventory(), 0);
/// ```
#[derive(Debug)]
pub struct UdfCalculator {
    config: UdfConfig,
    grid: DayGrid,
    model: OccupancyModel,
}

impl UdfCalculator {
    /// Create a calculator
    ///
    /// # Errors
    /// Rejects a non-positive or non-finite discretization and negative or
    /// non-finite penalties.
    pub fn new(config: UdfConfig) -> Result<Self, UdfError> {
        let grid = DayGrid::new(config.discretization_minutes)?;
        validate_penalty("renter", config.penalties.renter)?;
        validate_penalty("returner", config.penalties.returner)?;

        Ok(Self {
            config,
            grid,
            model: OccupancyModel::new(config.exponential),
        })
    }

    pub fn config(&self) -> &UdfConfig {
        &self.config
    }

    pub fn grid(&self) -> &DayGrid {
        &self.grid
    }

    /// Expected daily loss when the day starts with `inventory` bikes
    ///
    /// # Errors
    /// [`UdfError::InventoryOutOfRange`] if `inventory > capacity`, and
    /// [`UdfError::Station`] if the station capacity is negative.
    pub fn udf(&mut self, station: &StationProfile, inventory: usize) -> Result<f64, UdfError> {
        let capacity = station.validated_capacity()?;
        if inventory > capacity {
            return Err(UdfError::InventoryOutOfRange {
                inventory,
                capacity,
            });
        }

        let losses = self.integrate(station, capacity, &[inventory])?;
        Ok(losses[0])
    }

    /// UDF for every starting inventory `0..=capacity`, in ascending order
    pub fn udf_for_all_inventories(&mut self, station: &StationProfile) -> Result<Vec<f64>, UdfError> {
        let capacity = station.validated_capacity()?;
        let inventories: Vec<usize> = (0..=capacity).collect();
        self.integrate(station, capacity, &inventories)
    }

    /// UDF table plus its minimizer
    ///
    /// # Errors
    /// [`UdfError::EmptyUdf`] when no inventory has a comparable loss.
    pub fn optimize(&mut self, station: &StationProfile) -> Result<StationResult, UdfError> {
        let udf = self.udf_for_all_inventories(station)?;
        StationResult::from_udf(udf).ok_or_else(|| UdfError::EmptyUdf(station.id().to_string()))
    }

    /// `UDF(i) - UDF(i-1)` for `i = 1..=capacity`
    pub fn marginal_udf(&mut self, station: &StationProfile) -> Result<Vec<f64>, UdfError> {
        let udf = self.udf_for_all_inventories(station)?;
        Ok(super::optimizer::marginal_udf(&udf))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.model.cache_stats()
    }

    fn integrate(
        &mut self,
        station: &StationProfile,
        capacity: usize,
        inventories: &[usize],
    ) -> Result<Vec<f64>, UdfError> {
        let size = capacity + 1;
        let step_minutes = self.grid.step_minutes();
        let penalties = self.config.penalties;
        let timing = self.config.step_timing;

        let mut cumulative = DMatrix::<f64>::identity(size, size);
        let mut losses = vec![0.0; inventories.len()];

        for step in 0..self.grid.steps_per_day() {
            let slot = self.grid.slot_of_step(step);
            let rental_rate = station.rental_rate(slot);
            let return_rate = station.return_rate(slot);
            let elapsed = timing.elapsed(slot, step_minutes);

            let transition = self
                .model
                .transition_matrix(rental_rate, return_rate, capacity, elapsed)?;
            cumulative = &cumulative * transition;

            for (loss, &inventory) in losses.iter_mut().zip(inventories) {
                let empty_prob = cumulative[(inventory, 0)];
                let full_prob = cumulative[(inventory, capacity)];
                *loss += (empty_prob * rental_rate * penalties.renter
                    + full_prob * return_rate * penalties.returner)
                    * step_minutes;
            }
        }

        Ok(losses)
    }
}

fn validate_penalty(name: &'static str, value: f64) -> Result<(), UdfError> {
    if !value.is_finite() || value < 0.0 {
        return Err(UdfError::InvalidPenalty { name, value });
    }
    Ok(())
}
