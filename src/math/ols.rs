//! Ordinary least squares solver.
//!
//! We solve the linear regression problem
//!
//! ```text
//! minimize Σ (y_i - β0 - x_i^T β)^2
//! ```
//!
//! by prepending a constant column to the design matrix and solving with SVD.
//! Calendar features are strongly correlated (month, day_of_year, week_of_year),
//! and a short corpus can leave a categorical column constant, so the design matrix
//! is often close to rank-deficient. SVD with a singular-value cutoff returns the
//! minimum-norm solution in that case instead of blowing up.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fitted linear model: `y = intercept + Σ coefficients_j * x_j`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// Fit OLS with an intercept over row-major feature rows.
///
/// Every row must have the same length. Returns `None` for empty input, ragged rows,
/// or an unsolvable system.
pub fn fit_linear<R: AsRef<[f64]>>(rows: &[R], y: &[f64]) -> Option<LinearFit> {
    let n = rows.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let p = rows[0].as_ref().len();
    if rows.iter().any(|r| r.as_ref().len() != p) {
        return None;
    }

    let x = DMatrix::from_fn(n, p + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            rows[i].as_ref()[j - 1]
        }
    });
    let y = DVector::from_column_slice(y);

    let beta = solve_least_squares(&x, &y)?;
    Some(LinearFit {
        intercept: beta[0],
        coefficients: beta.iter().skip(1).copied().collect(),
    })
}

/// `intercept + coefficients · row`.
pub fn predict_linear(intercept: f64, coefficients: &[f64], row: &[f64]) -> f64 {
    intercept
        + coefficients
            .iter()
            .zip(row)
            .map(|(b, x)| b * x)
            .sum::<f64>()
}
