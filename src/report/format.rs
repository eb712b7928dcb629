//! Terminal formatting: fit summaries, evaluation tables and grade summaries.

use crate::domain::{FitResult, ModelKind};
use crate::grades::GradeSummary;
use crate::math::Metrics;

/// Parameter symbols in `FitResult::params` order.
pub fn param_names(model: ModelKind) -> &'static [&'static str] {
    match model {
        ModelKind::Linear => &["a", "b"],
        ModelKind::LinearZero | ModelKind::Constant | ModelKind::WeightedAverage => &["a"],
        ModelKind::None => &[],
    }
}

/// Model equation as shown in summaries.
pub fn equation(model: ModelKind) -> &'static str {
    match model {
        ModelKind::Constant | ModelKind::WeightedAverage => "y = a",
        ModelKind::Linear => "y = a·x + b",
        ModelKind::LinearZero => "y = a·x",
        ModelKind::None => "-",
    }
}

/// `a = 1.94 ± 0.05, b = ...`, with four significant digits.
pub fn format_params(fit: &FitResult) -> String {
    param_names(fit.model)
        .iter()
        .zip(fit.params.iter().zip(&fit.errors))
        .map(|(name, (value, err))| format!("{name} = {} ± {}", sig4(*value), sig4(*err)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Legend entry for a fitted curve.
pub fn curve_label(fit: &FitResult) -> String {
    format!("{} fit: {}", fit.model.token(), format_params(fit))
}

/// Multi-line block for one fitted series.
pub fn format_fit(label: &str, fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{label}: {} ({}), n={}{}\n",
        fit.model.display_name(),
        equation(fit.model),
        fit.n,
        if fit.weighted { ", weighted" } else { "" }
    ));
    for (name, (value, err)) in param_names(fit.model)
        .iter()
        .zip(fit.params.iter().zip(&fit.errors))
    {
        out.push_str(&format!("  {name} = {value} ± {err}\n"));
    }
    out
}

/// Evaluation table, one row per counting.
pub fn format_metrics_table(rows: &[(String, Metrics)]) -> String {
    let width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once("counting".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$} {:>5} {:>12} {:>12} {:>12}\n",
        "counting", "count", "mean", "std", "sem"
    ));
    for (name, m) in rows {
        out.push_str(&format!(
            "{name:<width$} {:>5} {:>12} {:>12} {:>12}\n",
            m.count,
            fmt_opt(m.mean),
            fmt_opt(m.std),
            fmt_opt(m.sem)
        ));
    }
    out
}

/// Used and dropped modules plus the final grade.
pub fn format_grade_summary(summary: &GradeSummary) -> String {
    let width = summary
        .used
        .iter()
        .chain(&summary.dropped)
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("module".len());

    let mut out = String::new();
    out.push_str("Modules used for the average:\n");
    out.push_str(&format!("  {:<width$} {:>6} {:>7}\n", "module", "grade", "credit"));
    for m in &summary.used {
        out.push_str(&format!("  {:<width$} {:>6.1} {:>7}\n", m.name, m.grade, m.credit));
    }
    if !summary.dropped.is_empty() {
        out.push_str("\nModules left out (better-of rule):\n");
        for m in &summary.dropped {
            out.push_str(&format!("  {:<width$} {:>6.1} {:>7}\n", m.name, m.grade, m.credit));
        }
    }
    out.push_str(&format!(
        "\nFinal grade: {:.3} ({} credits)\n",
        summary.final_grade, summary.total_credits
    ));
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_else(|| "-".to_string())
}

fn sig4(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let magnitude = v.abs().log10().floor() as i32;
    if !(-3..5).contains(&magnitude) {
        return format!("{v:.3e}");
    }
    let decimals = (3 - magnitude).max(0) as usize;
    format!("{v:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::Module;

    fn linear() -> FitResult {
        FitResult {
            model: ModelKind::Linear,
            params: vec![1.94, -0.0123456],
            errors: vec![0.0512, 0.002],
            n: 5,
            weighted: true,
        }
    }

    #[test]
    fn params_use_four_significant_digits() {
        assert_eq!(format_params(&linear()), "a = 1.940 ± 0.05120, b = -0.01235 ± 0.002000");
        assert_eq!(curve_label(&linear()), "linear fit: a = 1.940 ± 0.05120, b = -0.01235 ± 0.002000");
    }

    #[test]
    fn unfitted_series_has_no_params() {
        assert_eq!(format_params(&FitResult::unfitted(3)), "");
    }

    #[test]
    fn fit_block_lists_every_parameter() {
        let txt = format_fit("T", &linear());
        assert!(txt.starts_with("T: "));
        assert!(txt.contains("n=5, weighted"));
        assert_eq!(txt.lines().count(), 3);
    }

    #[test]
    fn metrics_table_marks_missing_values() {
        let rows = vec![(
            "half periods".to_string(),
            Metrics { count: 0, mean: None, std: None, sem: None },
        )];
        let txt = format_metrics_table(&rows);
        let line = txt.lines().nth(1).unwrap();
        assert!(line.starts_with("half periods     0"));
        assert!(line.trim_end().ends_with('-'));
    }

    #[test]
    fn grade_summary_lists_dropped_modules() {
        let summary = GradeSummary {
            final_grade: 1.5,
            total_credits: 20.0,
            used: vec![Module { name: "Analysis II".into(), grade: 1.3, credit: 10.0 }],
            dropped: vec![Module { name: "Analysis I".into(), grade: 2.3, credit: 10.0 }],
        };
        let txt = format_grade_summary(&summary);
        assert!(txt.contains("better-of rule"));
        assert!(txt.contains("Final grade: 1.500 (20 credits)"));
    }
}
