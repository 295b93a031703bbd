//! Engine configuration

use crate::ctmc::ExponentialMethod;
use serde::{Deserialize, Serialize};

/// Cost weights for abandoned trips
///
/// Values are per abandoned attempt in arbitrary cost units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRates {
    /// Cost of a renter who finds the station empty (p)
    pub renter: f64,

    /// Cost of a returner who finds the station full (h)
    pub returner: f64,
}

impl Default for PenaltyRates {
    fn default() -> Self {
        Self {
            renter: 1.0,
            returner: 1.0,
        }
    }
}

/// Elapsed time passed to the transition matrix at each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTiming {
    /// `(slot + 1) · step_minutes`
    ///
    /// Grows with the time of day. Reproduces the historical figures.
    #[default]
    SlotCumulative,

    /// `step_minutes`, i.e. a piecewise-constant rate CTMC advanced one step
    /// at a time
    PerStep,
}

impl StepTiming {
    /// Elapsed minutes for a step that reads `slot`
    ///
    /// # Example
    /// ```
    /// use station_udf_core_rs::StepTiming;
    ///
    /// assert_eq!(StepTiming::SlotCumulative.elapsed(3, 30.0), 120.0);
    /// assert_eq!(StepTiming::PerStep.elapsed(3, 30.0), 30.0);
    /// ```
    pub fn elapsed(&self, slot: usize, step_minutes: f64) -> f64 {
        match self {
            StepTiming::SlotCumulative => (slot + 1) as f64 * step_minutes,
            StepTiming::PerStep => step_minutes,
        }
    }
}

/// Complete configuration for a [`UdfCalculator`](crate::UdfCalculator)
///
/// Serialized into the batch run manifest, so every field that changes the
/// numbers belongs here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UdfConfig {
    /// Integration step length (minutes)
    pub discretization_minutes: f64,

    pub penalties: PenaltyRates,

    pub step_timing: StepTiming,

    pub exponential: ExponentialMethod,
}

impl Default for UdfConfig {
    fn default() -> Self {
        Self {
            discretization_minutes: 30.0,
            penalties: PenaltyRates::default(),
            step_timing: StepTiming::default(),
            exponential: ExponentialMethod::default(),
        }
    }
}

impl UdfConfig {
    /// Default configuration with a different step length
    pub fn with_discretization(discretization_minutes: f64) -> Self {
        Self {
            discretization_minutes,
            ..Self::default()
        }
    }
}
