//! Mode pipelines shared by the CLI handlers and the integration tests.
//!
//! Each pipeline is one linear pass: load table -> compute -> write
//! artifacts. Nothing here logs; warnings come back in the outputs and the
//! caller decides how to present them.

use statrs::distribution::{Continuous, Normal};

use crate::axis::{ResolvedAxis, resolve_axis};
use crate::config::MAX_DISTINCT_SERIES;
use crate::domain::{
    AxisRange, ErrorbarConfig, EvalConfig, FitResult, GradesConfig, HistConfig, ModelKind, ObservationSet, PeriodsConfig,
    ResidualConfig, SeriesSpec,
};
use crate::error::AppError;
use crate::fit::fit;
use crate::grades::{self, GradeSummary};
use crate::io::{self, FitRecord, Table, assemble_series, series_name};
use crate::math::{Metrics, metrics};
use crate::models::{residuals, sample_curve};
use crate::periods;
use crate::plot::{Bar, CURVE_SAMPLES, Chart, PlotSeries, render_ascii, render_chart};
use crate::report::curve_label;

/// Terminal preview size.
pub const PREVIEW_SIZE: (usize, usize) = (100, 25);

/// One fitted series.
#[derive(Debug, Clone)]
pub struct SeriesFit {
    pub spec: SeriesSpec,
    pub observations: ObservationSet,
    pub fit: FitResult,
}

impl SeriesFit {
    pub fn name(&self) -> &str {
        series_name(&self.spec)
    }
}

/// Output of the chart-producing modes.
#[derive(Debug, Clone)]
pub struct ChartRun {
    pub series: Vec<SeriesFit>,
    pub chart: Chart,
    pub preview: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HistRun {
    pub metrics: Metrics,
    pub chart: Chart,
    pub preview: Option<String>,
    pub warnings: Vec<String>,
}

/// Period countings and their evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub columns: Vec<(String, Vec<Option<f64>>)>,
    pub evaluation: Vec<(String, Metrics)>,
    pub warnings: Vec<String>,
}

/// Errorbar plot: fit every series and draw points, error bars and model curves.
pub fn run_errorbar(config: &ErrorbarConfig) -> Result<ChartRun, AppError> {
    let table = Table::from_path(&config.data_path)?;
    let mut warnings = Vec::new();

    if config.series.len() > MAX_DISTINCT_SERIES {
        warnings.push(format!(
            "Found more than {MAX_DISTINCT_SERIES} y-value sets ({} > {MAX_DISTINCT_SERIES}): the plot colors will not be unique",
            config.series.len()
        ));
    }

    let fits = fit_all(&table, &config.series, &mut warnings)?;

    let x_extent: Vec<Vec<f64>> = fits.iter().map(|s| with_errors(s.observations.x(), s.observations.dx())).collect();
    let xs: Vec<&[f64]> = x_extent.iter().map(Vec::as_slice).collect();
    let y_extent: Vec<Vec<f64>> = fits.iter().map(|s| with_errors(s.observations.y(), s.observations.dy())).collect();
    let ys: Vec<&[f64]> = y_extent.iter().map(Vec::as_slice).collect();
    let x_axis = take_warnings(resolve_axis(&config.x_axis, &xs, "x")?, &mut warnings);
    let y_axis = take_warnings(resolve_axis(&config.y_axis, &ys, "y")?, &mut warnings);

    let series = fits
        .iter()
        .enumerate()
        .map(|(i, s)| PlotSeries {
            label: s.spec.label.clone().unwrap_or_default(),
            points: Some(s.observations.clone()),
            curve: sample_curve(&s.fit, x_axis.min, x_axis.max, CURVE_SAMPLES),
            curve_label: (s.fit.model != ModelKind::None).then(|| curve_label(&s.fit)),
            palette: i,
        })
        .collect();

    let chart = Chart {
        text: config.text.clone(),
        x: x_axis,
        y: y_axis,
        series,
        bars: Vec::new(),
        zero_line: false,
    };
    render_chart(&chart, &config.graphic_path)?;

    if let Some(path) = &config.results_path {
        write_fit_results(path, &fits)?;
    }

    let preview = config.preview.then(|| render_ascii(&chart, PREVIEW_SIZE.0, PREVIEW_SIZE.1));
    Ok(ChartRun { series: fits, chart, preview, warnings })
}

/// Residual plot: fit one series and draw `y - model(x)` around a zero line.
pub fn run_residual(config: &ResidualConfig) -> Result<ChartRun, AppError> {
    let table = Table::from_path(&config.data_path)?;
    let mut warnings = Vec::new();

    let fits = fit_all(&table, std::slice::from_ref(&config.series), &mut warnings)?;
    let s = &fits[0];
    let obs = &s.observations;
    let r = residuals(&s.fit, obs.x(), obs.y());
    let points = ObservationSet::new(obs.x().to_vec(), r, obs.dx().map(<[f64]>::to_vec), obs.dy().map(<[f64]>::to_vec))?;

    let x_extent = with_errors(points.x(), points.dx());
    let r_extent = with_errors(points.y(), points.dy());
    let x_axis = take_warnings(resolve_axis(&config.x_axis, &[x_extent.as_slice()], "x")?, &mut warnings);
    let y_axis = take_warnings(resolve_axis(&config.y_axis, &[r_extent.as_slice(), &[0.0]], "y")?, &mut warnings);

    let chart = Chart {
        text: config.text.clone(),
        x: x_axis,
        y: y_axis,
        series: vec![PlotSeries {
            label: s.spec.label.clone().unwrap_or_default(),
            points: Some(points),
            curve: Vec::new(),
            curve_label: None,
            palette: 0,
        }],
        bars: Vec::new(),
        zero_line: true,
    };
    render_chart(&chart, &config.graphic_path)?;

    if let Some(path) = &config.results_path {
        write_fit_results(path, &fits)?;
    }

    let preview = config.preview.then(|| render_ascii(&chart, PREVIEW_SIZE.0, PREVIEW_SIZE.1));
    Ok(ChartRun { series: fits, chart, preview, warnings })
}

/// Histogram of one column with a Gaussian overlay scaled to counts.
pub fn run_hist(config: &HistConfig) -> Result<HistRun, AppError> {
    let table = Table::from_path(&config.data_path)?;
    let column = table.column(&config.column)?;
    let stats = metrics(&column);
    let values: Vec<f64> = column.into_iter().flatten().collect();
    let mut warnings = Vec::new();

    if values.is_empty() {
        return Err(AppError::insufficient_data(format!(
            "Column `{}` has no values to histogram",
            config.column
        )));
    }

    let bins = config.bins.unwrap_or_else(|| (values.len() as f64).sqrt().ceil() as usize).max(1);
    let bars = histogram(&values, bins);
    let bin_width = bars[0].right - bars[0].left;

    let edges = [bars[0].left, bars[bars.len() - 1].right];
    let x_axis = take_warnings(resolve_axis(&config.x_axis, &[edges.as_slice()], "x")?, &mut warnings);

    let mut curve = Vec::new();
    match (stats.mean, stats.std) {
        (Some(mean), Some(std)) if std > 0.0 => {
            let normal = Normal::new(mean, std)
                .map_err(|e| AppError::invalid_input(format!("Cannot build Gaussian overlay: {e}")))?;
            let scale = values.len() as f64 * bin_width;
            curve = (0..CURVE_SAMPLES)
                .map(|i| {
                    let x = x_axis.min + (x_axis.max - x_axis.min) * i as f64 / (CURVE_SAMPLES - 1) as f64;
                    (x, scale * normal.pdf(x))
                })
                .collect();
        }
        _ => warnings.push(format!(
            "Column `{}` has no spread; skipping the Gaussian overlay",
            config.column
        )),
    }

    let mut heights: Vec<f64> = bars.iter().map(|b| b.height).collect();
    heights.extend(curve.iter().map(|&(_, y)| y));
    let y_axis = take_warnings(resolve_axis(&config.y_axis, &[heights.as_slice()], "y")?, &mut warnings);

    let chart = Chart {
        text: config.text.clone(),
        x: x_axis,
        y: y_axis,
        series: vec![PlotSeries {
            label: String::new(),
            points: None,
            curve_label: (!curve.is_empty()).then(|| "Gaussian".to_string()),
            curve,
            palette: 2,
        }],
        bars,
        zero_line: false,
    };
    render_chart(&chart, &config.graphic_path)?;

    let preview = config.preview.then(|| render_ascii(&chart, PREVIEW_SIZE.0, PREVIEW_SIZE.1));
    Ok(HistRun { metrics: stats, chart, preview, warnings })
}

/// Period countings from lap times, written as raw and evaluation CSVs.
pub fn run_periods(config: &PeriodsConfig) -> Result<EvaluationRun, AppError> {
    let table = Table::from_path(&config.times_path)?;
    let column = table.column(&config.time_column)?;
    let mut warnings = Vec::new();

    let missing = column.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        warnings.push(format!(
            "Skipped {missing} empty cell(s) in `{}`",
            config.time_column
        ));
    }
    let times: Vec<f64> = column.into_iter().flatten().collect();

    let columns = periods::countings(&times);
    io::write_columns_csv(&config.raw_data_path, &columns)?;

    let evaluation = periods::evaluate(&columns);
    io::write_evaluation_csv(&config.evaluation_data_path, &evaluation)?;

    Ok(EvaluationRun { columns, evaluation, warnings })
}

/// Evaluate every column of an existing raw CSV.
pub fn run_eval(config: &EvalConfig) -> Result<EvaluationRun, AppError> {
    let table = Table::from_path(&config.raw_data_path)?;
    let columns = table
        .headers()
        .iter()
        .map(|name| table.column(name).map(|values| (name.clone(), values)))
        .collect::<Result<Vec<_>, AppError>>()?;

    let evaluation = periods::evaluate(&columns);
    io::write_evaluation_csv(&config.evaluation_data_path, &evaluation)?;

    Ok(EvaluationRun { columns, evaluation, warnings: Vec::new() })
}

pub fn run_grades(config: &GradesConfig) -> Result<GradeSummary, AppError> {
    let table = Table::from_path(&config.modules_path)?;
    let modules = grades::read_modules(&table)?;
    grades::calculate(&modules, config.better_of_pairs)
}

fn fit_all(table: &Table, specs: &[SeriesSpec], warnings: &mut Vec<String>) -> Result<Vec<SeriesFit>, AppError> {
    specs
        .iter()
        .map(|spec| -> Result<SeriesFit, AppError> {
            let assembled = assemble_series(table, spec)?;
            warnings.extend(assembled.warnings);
            let fit = fit(spec.model, &assembled.observations)?;
            Ok(SeriesFit {
                spec: spec.clone(),
                observations: assembled.observations,
                fit,
            })
        })
        .collect()
}

fn take_warnings(resolved: ResolvedAxis, warnings: &mut Vec<String>) -> AxisRange {
    warnings.extend(resolved.warnings);
    resolved.range
}

/// Values together with `value ± error`, so axes include whole error bars.
fn with_errors(values: &[f64], errors: Option<&[f64]>) -> Vec<f64> {
    let mut out = values.to_vec();
    if let Some(errors) = errors {
        for (&v, &e) in values.iter().zip(errors) {
            out.push(v - e);
            out.push(v + e);
        }
    }
    out
}

/// Equal-width bins from the smallest to the largest value; the last bin is closed.
fn histogram(values: &[f64], bins: usize) -> Vec<Bar> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| Bar {
            left: lo + width * i as f64,
            right: lo + width * (i + 1) as f64,
            height: c as f64,
        })
        .collect()
}

fn write_fit_results(path: &std::path::Path, fits: &[SeriesFit]) -> Result<(), AppError> {
    let records: Vec<FitRecord<'_>> = fits
        .iter()
        .map(|s| FitRecord {
            label: s.name(),
            x_column: &s.spec.x_column,
            y_column: &s.spec.y_column,
            fit: &s.fit,
        })
        .collect();
    io::write_fit_results_json(path, &records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value_once() {
        let bars = histogram(&[1.0, 2.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].left, 1.0);
        assert_eq!(bars[2].right, 4.0);
        let heights: Vec<f64> = bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn single_value_histogram_gets_a_unit_bin() {
        let bars = histogram(&[5.0, 5.0], 2);
        assert_eq!(bars[0].left, 4.5);
        assert_eq!(bars[1].right, 5.5);
        assert_eq!(bars.iter().map(|b| b.height).sum::<f64>(), 2.0);
    }

    #[test]
    fn error_extent_includes_both_ends() {
        assert_eq!(with_errors(&[1.0], Some(&[0.5])), vec![1.0, 0.5, 1.5]);
        assert_eq!(with_errors(&[1.0], None), vec![1.0]);
    }
}
