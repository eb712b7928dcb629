//! Weighted least squares solver.
//!
//! Every model in this crate is linear in its parameters, so a fit reduces to
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! with `w_i = 1/σ_i²` when uncertainties are known and `w_i = 1` otherwise.
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the scaled system is solved by SVD,
//!   which is robust for tall design matrices.
//! - The parameter covariance is `(X_wᵀ X_w)⁻¹`. Callers fitting unweighted data
//!   rescale it by the residual variance (see `Solution::scaled_covariance`).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Weighted least squares output.
#[derive(Debug, Clone)]
pub struct Solution {
    pub beta: DVector<f64>,
    /// `(X_wᵀ X_w)⁻¹`
    pub covariance: DMatrix<f64>,
    /// `Σ w_i r_i²`
    pub chi2: f64,
}

impl Solution {
    /// Covariance scaled by `chi2 / (n - p)`; NaN entries when `n == p`.
    pub fn scaled_covariance(&self, n: usize) -> DMatrix<f64> {
        let p = self.beta.len();
        let factor = if n > p {
            self.chi2 / (n - p) as f64
        } else {
            f64::NAN
        };
        &self.covariance * factor
    }
}

/// Solve the weighted problem for a design matrix with one row per observation.
///
/// `weights` must be finite and positive. Returns `None` when the normal matrix is
/// singular (e.g. every `x` identical for a straight line).
pub fn solve_weighted(design: &DMatrix<f64>, y: &[f64], weights: &[f64]) -> Option<Solution> {
    let (n, p) = design.shape();
    if y.len() != n || weights.len() != n || n < p {
        return None;
    }

    let mut xw = design.clone();
    let mut yw = DVector::<f64>::zeros(n);
    for i in 0..n {
        let sw = weights[i].sqrt();
        for j in 0..p {
            xw[(i, j)] *= sw;
        }
        yw[i] = y[i] * sw;
    }

    let normal = xw.transpose() * &xw;
    let covariance = normal.try_inverse()?;
    if covariance.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let beta = solve_least_squares(&xw, &yw)?;

    let residuals = &yw - &xw * &beta;
    let chi2 = residuals.norm_squared();

    Some(Solution {
        beta,
        covariance,
        chi2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weighted_mean_via_column_of_ones() {
        // A single column of ones is the weighted mean problem.
        let design = DMatrix::from_element(2, 1, 1.0);
        let sol = solve_weighted(&design, &[10.0, 20.0], &[1.0, 1.0]).unwrap();
        assert!((sol.beta[0] - 15.0).abs() < 1e-12);
        assert!((sol.covariance[(0, 0)] - 0.5).abs() < 1e-12);
        assert!((sol.chi2 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn singular_design_is_rejected() {
        // Straight line through identical x values.
        let design = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);
        assert!(solve_weighted(&design, &[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn scaled_covariance_is_nan_without_degrees_of_freedom() {
        let design = DMatrix::from_element(1, 1, 1.0);
        let sol = solve_weighted(&design, &[4.0], &[1.0]).unwrap();
        assert!(sol.scaled_covariance(1)[(0, 0)].is_nan());
    }
}
