//! Generator (rate) matrix for the station birth-death chain

use nalgebra::DMatrix;

/// Build the `(capacity+1)×(capacity+1)` generator matrix R
///
/// Row `i` is the current bike count:
/// - `R[i][i-1] = rental_rate` for `i > 0` (a rental removes a bike)
/// - `R[i][i+1] = return_rate` for `i < capacity` (a return adds a bike)
/// - `R[i][i]` makes the row sum to zero
///
/// # Example
/// ```
/// use station_udf_core_rs::ctmc::generator_matrix;
///
/// let r = generator_matrix(2.0, 3.0, 2);
/// assert_eq!(r[(0, 0)], -3.0);
/// assert_eq!(r[(1, 0)], 2.0);
/// assert_eq!(r[(1, 1)], -5.0);
/// assert_eq!(r[(2, 2)], -2.0);
/// ```
pub fn generator_matrix(rental_rate: f64, return_rate: f64, capacity: usize) -> DMatrix<f64> {
    let size = capacity + 1;
    let mut rates = DMatrix::<f64>::zeros(size, size);

    for state in 0..size {
        let mut outflow = 0.0;
        if state > 0 {
            rates[(state, state - 1)] = rental_rate;
            outflow += rental_rate;
        }
        if state < capacity {
            rates[(state, state + 1)] = return_rate;
            outflow += return_rate;
        }
        rates[(state, state)] = -outflow;
    }

    rates
}
