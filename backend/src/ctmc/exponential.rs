//! Matrix exponential methods
//!
//! `Pade` delegates to nalgebra's scaling-and-squaring Padé approximant and
//! is the accurate default. `EulerLimit` evaluates `(I + A/n)^n`, which is
//! cheaper to reason about but only converges as `n` grows; for moderate `n`
//! it does not reproduce `Pade` numbers.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Iteration count used by the Euler-limit method when none is given
pub const DEFAULT_EULER_ITERATIONS: usize = 100;

/// How `exp(R·Δt)` is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ExponentialMethod {
    /// Padé approximant with scaling and squaring
    #[default]
    Pade,

    /// `(I + A/n)^n` with `n = iterations`
    ///
    /// Entries stay non-negative only while `(μ+λ)·Δt / n ≤ 1`. Past that the
    /// step matrix has a negative diagonal and the power oscillates; such
    /// results are rejected by
    /// [`compute_transition_matrix`](crate::ctmc::compute_transition_matrix).
    EulerLimit { iterations: usize },
}

impl ExponentialMethod {
    /// Euler-limit method with [`DEFAULT_EULER_ITERATIONS`]
    pub fn euler_limit() -> Self {
        ExponentialMethod::EulerLimit {
            iterations: DEFAULT_EULER_ITERATIONS,
        }
    }

    /// Compute `exp(scaled)` for a square matrix
    pub fn exponentiate(&self, scaled: &DMatrix<f64>) -> DMatrix<f64> {
        match *self {
            ExponentialMethod::Pade => scaled.exp(),
            ExponentialMethod::EulerLimit { iterations } => euler_limit(scaled, iterations),
        }
    }
}

fn euler_limit(scaled: &DMatrix<f64>, iterations: usize) -> DMatrix<f64> {
    let n = iterations.max(1);
    let size = scaled.nrows();
    let step = DMatrix::<f64>::identity(size, size) + scaled / n as f64;

    let mut result = DMatrix::<f64>::identity(size, size);
    for _ in 0..n {
        result = &result * &step;
    }
    result
}
