//! Unmet demand function (UDF) engine
//!
//! For one station and starting inventory I0, the UDF is the expected cost
//! over a day of renters who find the station empty plus returners who find
//! it full:
//!
//! ```text
//! UDF(I0) = Σ_steps ( Π[I0][0]·μ_t·p  +  Π[I0][C]·λ_t·h ) · Δ
//! ```
//!
//! where `Π` is the running product of per-step transition matrices, `μ_t`
//! and `λ_t` the rental and return rates of the step's slot, `p` and `h` the
//! renter and returner penalties, and `Δ` the step length.

pub mod calculator;
pub mod config;
pub mod optimizer;

pub use calculator::{UdfCalculator, UdfError};
pub use config::{PenaltyRates, StepTiming, UdfConfig};
pub use optimizer::{find_optimal_inventory, marginal_udf};
