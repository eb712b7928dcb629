//! Model evaluation for the constant / linear / weighted-average family.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given `x` (for weighted least squares)
//! - predict `y(x)` given fitted parameters (for residuals and curves)

use crate::domain::{FitResult, ModelKind};

/// Fill a design row for the given model kind.
///
/// Column order matches `FitResult::params`: slope first, then intercept.
///
/// # Panics
/// Panics if `out` is shorter than `model.param_count()`.
pub fn fill_design_row(model: ModelKind, x: f64, out: &mut [f64]) {
    match model {
        ModelKind::Constant | ModelKind::WeightedAverage => {
            out[0] = 1.0;
        }
        ModelKind::LinearZero => {
            out[0] = x;
        }
        ModelKind::Linear => {
            out[0] = x;
            out[1] = 1.0;
        }
        ModelKind::None => {}
    }
}

/// Predict `y(x)` for a parameter vector of the given model kind.
///
/// `ModelKind::None` has no curve and yields NaN.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Constant | ModelKind::WeightedAverage => params[0],
        ModelKind::LinearZero => params[0] * x,
        ModelKind::Linear => params[0] * x + params[1],
        ModelKind::None => f64::NAN,
    }
}

/// `y_i - y(x_i)` for every observation.
pub fn residuals(fit: &FitResult, x: &[f64], y: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - predict(fit.model, xi, &fit.params))
        .collect()
}

/// Evenly spaced curve samples over `[x_min, x_max]`.
///
/// A falling straight line stops where it crosses `y = 0` if that happens
/// inside the range. Returns an empty vector for `ModelKind::None`.
pub fn sample_curve(fit: &FitResult, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    if fit.model == ModelKind::None || fit.params.len() != fit.model.param_count() {
        return Vec::new();
    }

    let mut end = x_max;
    if fit.model == ModelKind::Linear {
        let (a, b) = (fit.params[0], fit.params[1]);
        if a < 0.0 {
            let root = -b / a;
            if root.is_finite() && root > x_min {
                end = end.min(root);
            }
        }
    }

    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (end - x_min);
            (x, predict(fit.model, x, &fit.params))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(model: ModelKind, params: Vec<f64>) -> FitResult {
        let errors = vec![0.0; params.len()];
        FitResult {
            model,
            params,
            errors,
            n: 3,
            weighted: false,
        }
    }

    #[test]
    fn design_rows_match_predict() {
        let mut row = [0.0; 2];
        fill_design_row(ModelKind::Linear, 3.0, &mut row);
        assert_eq!(row, [3.0, 1.0]);
        assert_eq!(predict(ModelKind::Linear, 3.0, &[2.0, 1.0]), 7.0);

        fill_design_row(ModelKind::LinearZero, 4.0, &mut row);
        assert_eq!(row[0], 4.0);
        assert_eq!(predict(ModelKind::LinearZero, 4.0, &[0.5]), 2.0);
    }

    #[test]
    fn residuals_of_constant_model() {
        let f = fit(ModelKind::Constant, vec![2.0]);
        assert_eq!(residuals(&f, &[0.0, 1.0], &[1.5, 3.0]), vec![-0.5, 1.0]);
    }

    #[test]
    fn falling_line_stops_at_zero_crossing() {
        let f = fit(ModelKind::Linear, vec![-2.0, 10.0]);
        let curve = sample_curve(&f, 0.0, 20.0, 11);
        assert_eq!(curve.len(), 11);
        let (x_last, y_last) = curve[10];
        assert!((x_last - 5.0).abs() < 1e-12);
        assert!(y_last.abs() < 1e-12);
    }

    #[test]
    fn no_model_has_no_curve() {
        assert!(sample_curve(&FitResult::unfitted(3), 0.0, 1.0, 10).is_empty());
    }
}
