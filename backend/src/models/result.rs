//! Per-station optimization result

use crate::udf::optimizer::{find_optimal_inventory, marginal_udf};
use serde::Serialize;

/// UDF table for one station plus its minimizing inventory
///
/// `udf[i]` is the expected daily loss when the day starts with `i` bikes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResult {
    udf: Vec<f64>,
    optimal_inventory: usize,
}

impl StationResult {
    /// Build a result from a UDF table, choosing the optimum
    ///
    /// Returns `None` for an empty (or all-NaN) table.
    pub fn from_udf(udf: Vec<f64>) -> Option<Self> {
        let optimal_inventory = find_optimal_inventory(&udf)?;
        Some(Self {
            udf,
            optimal_inventory,
        })
    }

    pub fn udf(&self) -> &[f64] {
        &self.udf
    }

    pub fn optimal_inventory(&self) -> usize {
        self.optimal_inventory
    }

    /// Loss at the optimal inventory
    pub fn min_udf(&self) -> f64 {
        self.udf[self.optimal_inventory]
    }

    /// Capacity implied by the table length
    pub fn capacity(&self) -> usize {
        self.udf.len().saturating_sub(1)
    }

    /// First differences `udf[i] - udf[i-1]`, `i = 1..=capacity`
    pub fn marginal(&self) -> Vec<f64> {
        marginal_udf(&self.udf)
    }
}
