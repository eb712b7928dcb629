//! Pendulum period countings from stopwatch lap times.
//!
//! Input is the list of cumulative lap times (seconds since the stopwatch
//! started). Three countings are derived, each padded with `None` to the
//! input length so they can share one table:
//!
//! - `periods`: every lap is one period
//! - `half periods`: every second lap closes a period, the others are ignored
//! - `half periods v2`: overlapping pairs of laps (1+2, 2+3, 3+4, ...)

use crate::math::{Metrics, metrics};

pub const PERIODS: &str = "periods";
pub const HALF_PERIODS: &str = "half periods";
pub const HALF_PERIODS_V2: &str = "half periods v2";

/// Successive differences; the first lap counts from zero.
pub fn calc_periods(times: &[f64]) -> Vec<Option<f64>> {
    differences(times).into_iter().map(Some).collect()
}

/// Periods over every second lap, padded to `times.len()`.
pub fn calc_half_periods(times: &[f64]) -> Vec<Option<f64>> {
    let closing: Vec<f64> = times.iter().skip(1).step_by(2).copied().collect();
    pad(differences(&closing), times.len())
}

/// Periods over overlapping lap pairs, padded to `times.len()`.
pub fn calc_half_periods_v2(times: &[f64]) -> Vec<Option<f64>> {
    let periods = (1..times.len())
        .map(|i| if i == 1 { times[1] } else { times[i] - times[i - 2] })
        .collect();
    pad(periods, times.len())
}

/// All three countings as named columns, in output order.
pub fn countings(times: &[f64]) -> Vec<(String, Vec<Option<f64>>)> {
    vec![
        (PERIODS.to_string(), calc_periods(times)),
        (HALF_PERIODS.to_string(), calc_half_periods(times)),
        (HALF_PERIODS_V2.to_string(), calc_half_periods_v2(times)),
    ]
}

/// Metrics for each named column.
pub fn evaluate(columns: &[(String, Vec<Option<f64>>)]) -> Vec<(String, Metrics)> {
    columns
        .iter()
        .map(|(name, values)| (name.clone(), metrics(values)))
        .collect()
}

fn differences(times: &[f64]) -> Vec<f64> {
    let mut prev = 0.0;
    times
        .iter()
        .map(|&t| {
            let d = t - prev;
            prev = t;
            d
        })
        .collect()
}

fn pad(values: Vec<f64>, len: usize) -> Vec<Option<f64>> {
    let mut out: Vec<Option<f64>> = values.into_iter().map(Some).collect();
    out.resize(len.max(out.len()), None);
    out
}
