//! Optimal inventory search and marginal UDF

/// Index of the smallest UDF value
///
/// Ties go to the lowest index. NaN entries never win. Returns `None` when
/// there is nothing to choose from, so callers cannot mistake an empty table
/// for "optimum at 0".
///
/// # Example
/// ```
/// use station_udf_core_rs::find_optimal_inventory;
///
/// assert_eq!(find_optimal_inventory(&[5.0, 2.0, 2.0, 3.0]), Some(1));
/// assert_eq!(find_optimal_inventory(&[]), None);
/// ```
pub fn find_optimal_inventory(udf: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (inventory, &value) in udf.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, lowest)) if value >= lowest => {}
            _ => best = Some((inventory, value)),
        }
    }

    best.map(|(inventory, _)| inventory)
}

/// First differences `udf[i] - udf[i-1]` for `i = 1..len`
///
/// The result is one shorter than the input (empty for inputs of length 0 or 1).
///
/// # Example
/// ```
/// use station_udf_core_rs::marginal_udf;
///
/// assert_eq!(marginal_udf(&[4.0, 1.5, 2.0]), vec![-2.5, 0.5]);
/// ```
pub fn marginal_udf(udf: &[f64]) -> Vec<f64> {
    udf.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_never_selected() {
        assert_eq!(find_optimal_inventory(&[f64::NAN, 3.0, f64::NAN]), Some(1));
        assert_eq!(find_optimal_inventory(&[f64::NAN]), None);
    }

    #[test]
    fn test_infinite_values_still_comparable() {
        assert_eq!(find_optimal_inventory(&[f64::INFINITY, f64::INFINITY]), Some(0));
        assert_eq!(find_optimal_inventory(&[f64::INFINITY, 1.0]), Some(1));
    }

    #[test]
    fn test_marginal_of_single_value_is_empty() {
        assert!(marginal_udf(&[1.0]).is_empty());
        assert!(marginal_udf(&[]).is_empty());
    }
}
