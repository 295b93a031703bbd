//! Property tests for the optimizer and the UDF table shape

use proptest::prelude::*;
use station_udf_core_rs::ctmc::OccupancyModel;
use station_udf_core_rs::{
    find_optimal_inventory, marginal_udf, StationProfile, UdfCalculator, UdfConfig,
};

fn station_from_rates(capacity: i64, rental: &[f64], ret: &[f64]) -> StationProfile {
    let mut station = StationProfile::new("P", "Property", capacity);
    for (slot, (&r, &q)) in rental.iter().zip(ret).enumerate() {
        station.set_rental_rate(slot, r).unwrap();
        station.set_return_rate(slot, q).unwrap();
    }
    station
}

proptest! {
    #[test]
    fn prop_optimum_is_lowest_index_minimum(values in prop::collection::vec(0.0f64..1000.0, 1..40)) {
        let best = find_optimal_inventory(&values).unwrap();

        prop_assert!(values.iter().all(|&v| values[best] <= v));
        prop_assert!(values[..best].iter().all(|&v| v > values[best]));
    }

    #[test]
    fn prop_ties_resolve_to_first_occurrence(
        values in prop::collection::vec(0u8..5, 2..30),
    ) {
        // Small integer alphabet forces plenty of ties
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let first = values.iter().position(|&v| v == min).unwrap();

        prop_assert_eq!(find_optimal_inventory(&values), Some(first));
    }

    #[test]
    fn prop_marginal_is_one_shorter(values in prop::collection::vec(-50.0f64..50.0, 0..30)) {
        let marginal = marginal_udf(&values);
        prop_assert_eq!(marginal.len(), values.len().saturating_sub(1));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_zero_rate_station_has_zero_udf(capacity in 0i64..25) {
        let station = StationProfile::new("Z", "Zero", capacity);
        let mut calculator = UdfCalculator::new(UdfConfig::default()).unwrap();
        let result = calculator.optimize(&station).unwrap();

        prop_assert_eq!(result.udf().len(), capacity as usize + 1);
        prop_assert!(result.udf().iter().all(|&v| v == 0.0));
        prop_assert_eq!(result.optimal_inventory(), 0);
    }

    #[test]
    fn prop_udf_table_is_finite_and_non_negative(
        capacity in 0i64..8,
        rental in prop::collection::vec(0.0f64..0.5, 48),
        ret in prop::collection::vec(0.0f64..0.5, 48),
    ) {
        let station = station_from_rates(capacity, &rental, &ret);
        let mut calculator = UdfCalculator::new(UdfConfig::default()).unwrap();
        let result = calculator.optimize(&station).unwrap();

        prop_assert_eq!(result.udf().len(), capacity as usize + 1);
        prop_assert!(result.udf().iter().all(|v| v.is_finite() && *v >= -1e-9));
        prop_assert!(result.optimal_inventory() <= capacity as usize);
        prop_assert_eq!(result.marginal().len(), capacity as usize);
    }

    #[test]
    fn prop_transition_rows_sum_to_one(
        capacity in 0usize..12,
        rental in 0.0f64..2.0,
        ret in 0.0f64..2.0,
        elapsed in 0.0f64..600.0,
    ) {
        let mut model = OccupancyModel::default();
        let matrix = model.transition_matrix(rental, ret, capacity, elapsed).unwrap();

        for row in matrix.row_iter() {
            prop_assert!((row.sum() - 1.0).abs() < 1e-8, "row sum {}", row.sum());
        }
    }
}
