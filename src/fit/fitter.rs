//! Fitting routines for a single observation set.
//!
//! Given:
//! - values `x_i`, `y_i`
//! - optional uncertainties `dx_i`, `dy_i`
//! - a model kind
//!
//! we solve a weighted least squares problem and report parameters with
//! standard errors.
//!
//! x-uncertainties are folded into an effective y-uncertainty through the local
//! slope, `σ_i = sqrt(dy_i² + (a·dx_i)²)`. This is a single linearized pass: a
//! first fit (y-weights only) supplies `a`, the effective σ are computed once,
//! and the model is refit once.

use nalgebra::DMatrix;

use crate::domain::{FitResult, ModelKind, ObservationSet};
use crate::error::AppError;
use crate::math::{mean, sample_std, solve_weighted, weighted_mean, Solution};
use crate::models::fill_design_row;

/// Fit `model` to `obs`.
pub fn fit(model: ModelKind, obs: &ObservationSet) -> Result<FitResult, AppError> {
    let n = obs.len();
    if model == ModelKind::None {
        return Ok(FitResult::unfitted(n));
    }

    let p = model.param_count();
    if n < p || n == 0 {
        return Err(AppError::insufficient_data(format!(
            "Model '{}' needs at least {p} observation(s), got {n}",
            model.token()
        )));
    }

    validate_values(model, obs)?;

    if model == ModelKind::WeightedAverage {
        return fit_weighted_average(obs);
    }

    let x = obs.x();
    let y = obs.y();

    // A zero dy only becomes usable once dx is folded in; until then the
    // first pass stays unweighted.
    let y_weights = obs
        .dy()
        .filter(|dy| dy.iter().all(|&s| s > 0.0))
        .map(inverse_variance);
    let first = solve(model, x, y, y_weights.as_deref())?;
    let mut weighted = y_weights.is_some();
    let mut solution = first;

    if model.has_slope() {
        if let Some(dx) = obs.dx() {
            let slope = solution.beta[0];
            let sigmas = effective_sigmas(slope, dx, obs.dy());

            if sigmas.iter().all(|&s| s == 0.0) {
                // Flat line and no y-uncertainties: nothing to weight by.
            } else if sigmas.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
                return Err(AppError::invalid_input(
                    "Every point needs a non-zero uncertainty once x-uncertainties are given \
                     (add a y-uncertainty column or avoid zero x-uncertainties)",
                ));
            } else {
                let w = inverse_variance(&sigmas);
                solution = solve(model, x, y, Some(&w))?;
                weighted = true;
            }
        }
    }

    let covariance = if weighted {
        solution.covariance.clone()
    } else {
        solution.scaled_covariance(n)
    };

    Ok(FitResult {
        model,
        params: solution.beta.iter().copied().collect(),
        errors: (0..p).map(|j| covariance[(j, j)].sqrt()).collect(),
        n,
        weighted,
    })
}

fn fit_weighted_average(obs: &ObservationSet) -> Result<FitResult, AppError> {
    let y = obs.y();
    let (value, error, weighted) = match obs.dy() {
        Some(dy) => {
            let (a, da) = weighted_mean(y, dy).ok_or_else(|| {
                AppError::invalid_input("y-uncertainties must be finite and > 0 for a weighted average")
            })?;
            (a, da, true)
        }
        None => {
            let a = mean(y).ok_or_else(|| AppError::insufficient_data("No values to average"))?;
            let s = sample_std(y).ok_or_else(|| AppError::insufficient_data("No values to average"))?;
            (a, s, false)
        }
    };

    Ok(FitResult {
        model: ModelKind::WeightedAverage,
        params: vec![value],
        errors: vec![error],
        n: y.len(),
        weighted,
    })
}

fn validate_values(model: ModelKind, obs: &ObservationSet) -> Result<(), AppError> {
    if obs.x().iter().chain(obs.y()).any(|v| !v.is_finite()) {
        return Err(AppError::invalid_input("Observations must be finite numbers"));
    }
    if let Some(dy) = obs.dy() {
        let zero_allowed = model.has_slope() && obs.dx().is_some();
        if dy.iter().any(|&s| !(s.is_finite() && (s > 0.0 || (zero_allowed && s == 0.0)))) {
            return Err(AppError::invalid_input(if zero_allowed {
                "y-uncertainties must be finite and >= 0"
            } else {
                "y-uncertainties must be finite and > 0"
            }));
        }
    }
    if let Some(dx) = obs.dx() {
        if dx.iter().any(|s| !(s.is_finite() && *s >= 0.0)) {
            return Err(AppError::invalid_input("x-uncertainties must be finite and >= 0"));
        }
    }
    Ok(())
}

fn effective_sigmas(slope: f64, dx: &[f64], dy: Option<&[f64]>) -> Vec<f64> {
    dx.iter()
        .enumerate()
        .map(|(i, &sx)| {
            let sy = dy.map_or(0.0, |d| d[i]);
            (sy * sy + (slope * sx).powi(2)).sqrt()
        })
        .collect()
}

fn inverse_variance(sigmas: &[f64]) -> Vec<f64> {
    sigmas.iter().map(|s| 1.0 / (s * s)).collect()
}

fn solve(model: ModelKind, x: &[f64], y: &[f64], weights: Option<&[f64]>) -> Result<Solution, AppError> {
    let n = x.len();
    let p = model.param_count();

    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        fill_design_row(model, xi, &mut row);
        for j in 0..p {
            design[(i, j)] = row[j];
        }
    }

    let uniform;
    let weights = match weights {
        Some(w) => w,
        None => {
            uniform = vec![1.0; n];
            &uniform
        }
    };

    solve_weighted(&design, y, weights).ok_or_else(|| {
        AppError::invalid_input(format!(
            "Cannot fit '{}': the x values do not determine the parameters (are they all identical?)",
            model.token()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn weighted_average_with_uncertainties() {
        let obs = ObservationSet::new(vec![0.0, 0.0], vec![10.0, 20.0], None, Some(vec![1.0, 1.0])).unwrap();
        let fit = fit(ModelKind::WeightedAverage, &obs).unwrap();
        assert!(close(fit.params[0], 15.0, 1e-12));
        assert!(close(fit.errors[0], 1.0 / 2f64.sqrt(), 1e-12));
        assert!(fit.weighted);
    }

    #[test]
    fn weighted_average_falls_back_to_mean_and_std() {
        let obs = ObservationSet::plain(vec![0.0, 0.0], vec![10.0, 20.0]).unwrap();
        let fit = fit(ModelKind::WeightedAverage, &obs).unwrap();
        assert!(close(fit.params[0], 15.0, 1e-12));
        assert!(close(fit.errors[0], 50f64.sqrt(), 1e-12));
        assert!(!fit.weighted);
    }

    #[test]
    fn linear_zero_recovers_exact_slope() {
        let obs = ObservationSet::plain(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0]).unwrap();
        let fit = fit(ModelKind::LinearZero, &obs).unwrap();
        assert_eq!(fit.params.len(), 1);
        assert!(close(fit.params[0], 2.0, 1e-12));
        assert!(close(fit.errors[0], 0.0, 1e-9));
    }

    #[test]
    fn linear_fit_on_exact_line() {
        let obs = ObservationSet::plain(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let fit = fit(ModelKind::Linear, &obs).unwrap();
        assert!(close(fit.params[0], 2.0, 1e-10));
        assert!(close(fit.params[1], 1.0, 1e-10));
        assert_eq!(fit.errors.len(), 2);
        assert!(fit.errors.iter().all(|e| e.abs() < 1e-6));
    }

    #[test]
    fn constant_fit_is_mean_with_standard_error() {
        let obs = ObservationSet::plain(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        let fit = fit(ModelKind::Constant, &obs).unwrap();
        assert!(close(fit.params[0], 2.0, 1e-12));
        assert!(close(fit.errors[0], 1.0 / 3f64.sqrt(), 1e-12));
    }

    #[test]
    fn constant_fit_with_y_uncertainties_is_weighted_mean() {
        let obs =
            ObservationSet::new(vec![1.0, 2.0], vec![10.0, 20.0], None, Some(vec![1.0, 2.0])).unwrap();
        let fit = fit(ModelKind::Constant, &obs).unwrap();
        let (a, da) = weighted_mean(&[10.0, 20.0], &[1.0, 2.0]).unwrap();
        assert!(close(fit.params[0], a, 1e-12));
        assert!(close(fit.errors[0], da, 1e-12));
    }

    #[test]
    fn x_uncertainty_propagates_through_slope() {
        // Uniform dx and no dy give uniform effective σ = |a|·dx, so the point
        // estimates match the unweighted fit and the errors become absolute.
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.1, 3.9, 6.2, 7.8];
        let plain = fit(ModelKind::Linear, &ObservationSet::plain(x.clone(), y.clone()).unwrap()).unwrap();
        let with_dx = fit(
            ModelKind::Linear,
            &ObservationSet::new(x, y, Some(vec![0.1; 4]), None).unwrap(),
        )
        .unwrap();

        assert!(close(plain.params[0], 1.94, 1e-10));
        assert!(close(with_dx.params[0], plain.params[0], 1e-10));
        assert!(close(with_dx.params[1], plain.params[1], 1e-10));
        assert!(with_dx.weighted);
        let sigma = 1.94 * 0.1;
        assert!(close(with_dx.errors[0], sigma / 5f64.sqrt(), 1e-9));
    }

    #[test]
    fn zero_x_uncertainty_without_y_uncertainty_is_rejected() {
        let obs = ObservationSet::new(
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.1, 5.9],
            Some(vec![0.1, 0.0, 0.1]),
            None,
        )
        .unwrap();
        let err = fit(ModelKind::LinearZero, &obs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn zero_y_uncertainty_is_covered_by_x_uncertainty() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.1, 3.9, 6.2, 7.8];
        let obs = ObservationSet::new(
            x.clone(),
            y.clone(),
            Some(vec![0.1; 4]),
            Some(vec![0.0, 0.05, 0.0, 0.05]),
        )
        .unwrap();
        let fit = fit(ModelKind::Linear, &obs).unwrap();
        assert!(fit.weighted);
        assert!(close(fit.params[0], 1.94, 0.05));
        assert!(fit.errors.iter().all(|e| e.is_finite() && *e > 0.0));

        let without_dx = ObservationSet::new(x, y, None, Some(vec![0.0, 0.05, 0.0, 0.05])).unwrap();
        let err = super::fit(ModelKind::Linear, &without_dx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let obs = ObservationSet::plain(vec![1.0], vec![2.0]).unwrap();
        let err = fit(ModelKind::Linear, &obs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let empty = ObservationSet::plain(vec![], vec![]).unwrap();
        let err = fit(ModelKind::WeightedAverage, &empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn identical_x_values_cannot_fit_a_line() {
        let obs = ObservationSet::plain(vec![2.0, 2.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = fit(ModelKind::Linear, &obs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn none_model_returns_no_parameters() {
        let obs = ObservationSet::plain(vec![1.0], vec![2.0]).unwrap();
        let fit = fit(ModelKind::None, &obs).unwrap();
        assert!(fit.params.is_empty() && fit.errors.is_empty());
    }
}
