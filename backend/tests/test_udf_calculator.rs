//! Tests for the loss integrator and inventory optimizer
//!
//! The two-state scenarios (capacity 1, rentals only) have a closed form:
//! state 0 is absorbing and Π[1][1] after step s is exp(-μ·T_s), where T_s
//! is the sum of the elapsed times passed to the first s+1 steps.

use station_udf_core_rs::{
    PenaltyRates, StationError, StationProfile, StepTiming, UdfCalculator, UdfConfig, UdfError,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn calculator(config: UdfConfig) -> UdfCalculator {
    UdfCalculator::new(config).expect("valid config")
}

fn rentals_only_station(rental_rate: f64) -> StationProfile {
    StationProfile::with_constant_rates("E2E", "Two state", 1, rental_rate, 0.0).unwrap()
}

/// Closed-form (UDF(0), UDF(1)) for a capacity-1 station with constant
/// rentals `mu`, no returns, 30-minute steps, unit penalties
fn rentals_only_closed_form(mu: f64, timing: StepTiming) -> (f64, f64) {
    let step = 30.0;
    let mut udf0 = 0.0;
    let mut udf1 = 0.0;
    let mut elapsed_total = 0.0;

    for slot in 0..48 {
        elapsed_total += timing.elapsed(slot, step);
        let still_full = (-mu * elapsed_total).exp();

        // Starting empty: always empty, never full
        udf0 += mu * step;
        // Starting full: empty with probability 1 - still_full; full-station
        // losses are zero because nobody returns
        udf1 += (1.0 - still_full) * mu * step;
    }

    (udf0, udf1)
}

fn varied_station(capacity: i64) -> StationProfile {
    let mut station = StationProfile::new("VAR", "Varied", capacity);
    for slot in 0..48 {
        // Morning rental peak, evening return peak
        let rental = if (14..20).contains(&slot) { 0.2 } else { 0.03 };
        let ret = if (34..40).contains(&slot) { 0.25 } else { 0.02 };
        station.set_rental_rate(slot, rental).unwrap();
        station.set_return_rate(slot, ret).unwrap();
    }
    station
}

// ============================================================================
// No Demand
// ============================================================================

#[test]
fn test_zero_rates_give_zero_udf() {
    let mut calc = calculator(UdfConfig::default());

    for capacity in [0, 1, 4, 12] {
        let station = StationProfile::new("Z", "Zero", capacity);
        let udf = calc.udf_for_all_inventories(&station).unwrap();

        assert_eq!(udf.len(), capacity as usize + 1);
        assert!(udf.iter().all(|&v| v == 0.0), "capacity {}: {:?}", capacity, udf);
    }
}

// ============================================================================
// End-to-End Closed Form
// ============================================================================

#[test]
fn test_two_state_heavy_rentals_closed_form() {
    let mu = 2.0;
    let station = rentals_only_station(mu);
    let (expected0, expected1) = rentals_only_closed_form(mu, StepTiming::SlotCumulative);

    let mut calc = calculator(UdfConfig::default());
    let udf = calc.udf_for_all_inventories(&station).unwrap();

    assert!((udf[0] - expected0).abs() < 1e-6, "UDF(0) = {}", udf[0]);
    assert!((udf[1] - expected1).abs() < 1e-6, "UDF(1) = {}", udf[1]);

    // With μ·Δt = 60 the full state empties within the first step, so both
    // starting points lose essentially every rental of the day
    assert!((udf[0] - 2880.0).abs() < 1e-6);
    assert!(udf[1] <= udf[0]);
}

#[test]
fn test_two_state_light_rentals_slot_cumulative() {
    let mu = 0.01;
    let station = rentals_only_station(mu);
    let (expected0, expected1) = rentals_only_closed_form(mu, StepTiming::SlotCumulative);

    let mut calc = calculator(UdfConfig::default());
    let udf = calc.udf_for_all_inventories(&station).unwrap();

    assert!((udf[0] - expected0).abs() < 1e-6);
    assert!((udf[1] - expected1).abs() < 1e-6);
    assert!(udf[1] < udf[0], "Starting full must lose fewer rentals");
}

#[test]
fn test_two_state_light_rentals_per_step() {
    let mu = 0.01;
    let station = rentals_only_station(mu);
    let (expected0, expected1) = rentals_only_closed_form(mu, StepTiming::PerStep);

    let config = UdfConfig {
        step_timing: StepTiming::PerStep,
        ..UdfConfig::default()
    };
    let mut calc = calculator(config);
    let udf = calc.udf_for_all_inventories(&station).unwrap();

    assert!((udf[0] - expected0).abs() < 1e-6);
    assert!((udf[1] - expected1).abs() < 1e-6);
}

#[test]
fn test_step_timing_changes_result() {
    let station = rentals_only_station(0.01);

    let cumulative = calculator(UdfConfig::default()).udf(&station, 1).unwrap();
    let per_step = calculator(UdfConfig {
        step_timing: StepTiming::PerStep,
        ..UdfConfig::default()
    })
    .udf(&station, 1)
    .unwrap();

    // Cumulative timing drains the station faster, so more rentals are lost
    assert!(cumulative > per_step);
}

// ============================================================================
// Penalties
// ============================================================================

#[test]
fn test_penalties_scale_their_own_term() {
    let station = rentals_only_station(0.01);
    let base = calculator(UdfConfig::default()).udf(&station, 1).unwrap();

    let doubled_renter = calculator(UdfConfig {
        penalties: PenaltyRates {
            renter: 2.0,
            returner: 1.0,
        },
        ..UdfConfig::default()
    })
    .udf(&station, 1)
    .unwrap();

    let doubled_returner = calculator(UdfConfig {
        penalties: PenaltyRates {
            renter: 1.0,
            returner: 2.0,
        },
        ..UdfConfig::default()
    })
    .udf(&station, 1)
    .unwrap();

    assert!((doubled_renter - 2.0 * base).abs() < 1e-9);
    // No returns, so the returner penalty never applies
    assert_eq!(doubled_returner, base);
}

#[test]
fn test_zero_capacity_station_loses_everything() {
    // A single state that is both empty and full
    let station = StationProfile::with_constant_rates("Z", "Dockless", 0, 0.1, 0.05).unwrap();
    let udf = calculator(UdfConfig::default()).udf(&station, 0).unwrap();

    let expected = (0.1 + 0.05) * 30.0 * 48.0;
    assert!((udf - expected).abs() < 1e-9);
}

// ============================================================================
// Invalid Input
// ============================================================================

#[test]
fn test_inventory_above_capacity_rejected() {
    let station = varied_station(5);
    let mut calc = calculator(UdfConfig::default());

    assert_eq!(
        calc.udf(&station, 6),
        Err(UdfError::InventoryOutOfRange {
            inventory: 6,
            capacity: 5
        })
    );
}

#[test]
fn test_negative_capacity_rejected() {
    let station = varied_station(-1);
    let mut calc = calculator(UdfConfig::default());

    assert!(matches!(
        calc.udf_for_all_inventories(&station),
        Err(UdfError::Station(StationError::InvalidCapacity { capacity: -1, .. }))
    ));
    assert!(calc.optimize(&station).is_err());
}

// ============================================================================
// Optimizer and Marginals
// ============================================================================

#[test]
fn test_optimize_selects_minimum() {
    let station = varied_station(10);
    let mut calc = calculator(UdfConfig::default());
    let result = calc.optimize(&station).unwrap();

    assert_eq!(result.udf().len(), 11);
    let best = result.optimal_inventory();
    for (inventory, &value) in result.udf().iter().enumerate() {
        assert!(result.min_udf() <= value);
        if inventory < best {
            assert!(value > result.min_udf(), "tie must go to lowest index");
        }
    }
    assert!(result.udf().iter().all(|&v| v >= 0.0 && v.is_finite()));
}

#[test]
fn test_marginal_udf_length_and_values() {
    let station = varied_station(6);
    let mut calc = calculator(UdfConfig::default());

    let udf = calc.udf_for_all_inventories(&station).unwrap();
    let marginal = calc.marginal_udf(&station).unwrap();

    assert_eq!(marginal.len(), 6);
    for i in 1..=6 {
        assert!((marginal[i - 1] - (udf[i] - udf[i - 1])).abs() < 1e-12);
    }
}

#[test]
fn test_cache_reused_across_stations() {
    let mut calc = calculator(UdfConfig::default());
    calc.udf_for_all_inventories(&varied_station(4)).unwrap();
    let after_first = calc.cache_stats();

    calc.udf_for_all_inventories(&varied_station(4)).unwrap();
    let after_second = calc.cache_stats();

    assert_eq!(after_second.misses, after_first.misses);
    assert_eq!(after_second.hits, after_first.hits + 48);
}

#[test]
fn test_fifteen_minute_steps() {
    let station = rentals_only_station(0.0);
    let config = UdfConfig::with_discretization(15.0);
    let mut calc = calculator(config);

    assert_eq!(calc.grid().steps_per_day(), 96);
    assert_eq!(calc.udf_for_all_inventories(&station).unwrap(), vec![0.0, 0.0]);
}
