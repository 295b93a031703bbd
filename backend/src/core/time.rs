//! Time discretization for the simulated day
//!
//! The loss integrator walks one day in equal-length steps. Station rate
//! tables are always sampled on a fixed half-hour grid, independent of the
//! step length chosen for integration. This module maps between the two.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rate-table slots covering one day (one per half hour)
pub const TIME_SLOTS: usize = 48;

/// Width of one rate-table slot in minutes
pub const SLOT_MINUTES: f64 = 30.0;

/// Length of the simulated day in minutes
pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Errors raised while building a [`DayGrid`]
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Step length must be finite and positive, got {0} minutes")]
    InvalidStepLength(f64),
}

/// Discretized simulation day
///
/// # Example
/// ```
/// use station_udf_core_rs::DayGrid;
///
/// let grid = DayGrid::new(30.0).unwrap();
/// assert_eq!(grid.steps_per_day(), 48);
/// assert_eq!(grid.slot_of_step(3), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayGrid {
    /// Length of one integration step (minutes)
    step_minutes: f64,
    /// ⌈1440 / step_minutes⌉
    steps_per_day: usize,
}

impl DayGrid {
    /// Create a grid with the given step length in minutes
    ///
    /// # Errors
    /// Returns [`GridError::InvalidStepLength`] unless `step_minutes` is
    /// finite and strictly positive.
    pub fn new(step_minutes: f64) -> Result<Self, GridError> {
        if !step_minutes.is_finite() || step_minutes <= 0.0 {
            return Err(GridError::InvalidStepLength(step_minutes));
        }

        let steps_per_day = (MINUTES_PER_DAY / step_minutes).ceil() as usize;
        Ok(Self {
            step_minutes,
            steps_per_day,
        })
    }

    /// Step length in minutes
    pub fn step_minutes(&self) -> f64 {
        self.step_minutes
    }

    /// Number of integration steps in one day
    pub fn steps_per_day(&self) -> usize {
        self.steps_per_day
    }

    /// Rate-table slot that a given step reads from
    ///
    /// Always uses the half-hour table granularity, whatever the step length.
    ///
    /// # Example
    /// ```
    /// use station_udf_core_rs::DayGrid;
    ///
    /// let grid = DayGrid::new(15.0).unwrap();
    /// assert_eq!(grid.slot_of_step(0), 0);
    /// assert_eq!(grid.slot_of_step(1), 0);
    /// assert_eq!(grid.slot_of_step(2), 1);
    /// ```
    pub fn slot_of_step(&self, step: usize) -> usize {
        let minute = step as f64 * self.step_minutes;
        (minute / SLOT_MINUTES).floor() as usize % TIME_SLOTS
    }
}

/// Convert an `HH:MM` label to its half-hour slot index
///
/// Returns `None` when the label is not a valid time of day.
///
/// # Example
/// ```
/// use station_udf_core_rs::slot_from_clock;
///
/// assert_eq!(slot_from_clock("00:00"), Some(0));
/// assert_eq!(slot_from_clock("08:30"), Some(17));
/// assert_eq!(slot_from_clock("23:59"), Some(47));
/// assert_eq!(slot_from_clock("25:00"), None);
/// ```
pub fn slot_from_clock(label: &str) -> Option<usize> {
    let (hour, minute) = label.trim().split_once(':')?;
    let hour: usize = hour.parse().ok()?;
    let minute: usize = minute.parse().ok()?;

    if hour >= 24 || minute >= 60 {
        return None;
    }

    Some((hour * 60 + minute) / SLOT_MINUTES as usize)
}
