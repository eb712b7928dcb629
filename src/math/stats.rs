//! Summary statistics for repeated measurements.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation `sqrt(Σ(x_i - mean)² / (N-1))`.
///
/// Zero for a single value, `None` for no values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Standard error of the mean, `std / sqrt(N)`.
pub fn standard_error(values: &[f64]) -> Option<f64> {
    let s = sample_std(values)?;
    Some(s / (values.len() as f64).sqrt())
}

/// Inverse-variance weighted mean and its uncertainty.
///
/// `a = Σ(y_i/σ_i²) / Σ(1/σ_i²)`, `σ_a = 1/sqrt(Σ(1/σ_i²))`.
/// Returns `None` when the inputs are empty, differ in length, or any `σ_i` is
/// not finite and positive.
pub fn weighted_mean(values: &[f64], sigmas: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() || values.len() != sigmas.len() {
        return None;
    }
    if sigmas.iter().any(|s| !s.is_finite() || *s <= 0.0) {
        return None;
    }
    let mut sum_w = 0.0;
    let mut sum_wy = 0.0;
    for (y, s) in values.iter().zip(sigmas) {
        let w = 1.0 / (s * s);
        sum_w += w;
        sum_wy += w * y;
    }
    Some((sum_wy / sum_w, 1.0 / sum_w.sqrt()))
}

/// Count, mean, standard deviation and standard error of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub sem: Option<f64>,
}

/// Metrics over the non-null entries of a column.
pub fn metrics(column: &[Option<f64>]) -> Metrics {
    let values: Vec<f64> = column.iter().flatten().copied().collect();
    Metrics {
        count: values.len(),
        mean: mean(&values),
        std: sample_std(&values),
        sem: standard_error(&values),
    }
}
