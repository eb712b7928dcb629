//! Typed per-mode configuration built from `Params`.
//!
//! Option names follow the lab scripts' config files (`data_path`,
//! `y_column`, `x_ticks_number`, ...).

use crate::config::Params;
use crate::domain::{
    Bound, ChartText, ErrorbarConfig, EvalConfig, GradesConfig, HistConfig, ModelKind, PeriodsConfig,
    ResidualConfig, SeriesSpec,
};
use crate::error::AppError;

/// Number of series with distinct colours.
pub const MAX_DISTINCT_SERIES: usize = 5;

fn chart_text(p: &Params) -> Result<ChartText, AppError> {
    Ok(ChartText {
        title: p.str_or("title", "")?,
        x_label: p.str_or("x_label", "")?,
        y_label: p.str_or("y_label", "")?,
    })
}

fn label(raw: String) -> Option<String> {
    (!raw.is_empty()).then_some(raw)
}

/// Single-element lists are repeated `n` times; otherwise the length must be `n`.
fn broadcast<T: Clone>(values: Vec<T>, n: usize, key: &str) -> Result<Vec<T>, AppError> {
    match values.len() {
        len if len == n => Ok(values),
        1 => Ok(vec![values[0].clone(); n]),
        len => Err(AppError::invalid_input(format!(
            "Number of y_column ({n}) and number of {key} ({len}) do not match"
        ))),
    }
}

impl ErrorbarConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        let y_columns = p.str_list("y_column")?;
        let n = y_columns.len();
        if n == 0 {
            return Err(AppError::invalid_input("y_column must name at least one column"));
        }

        let y_errors = p.str_list_or("y_error_column", vec![String::new(); n])?;
        let labels = p.str_list_or("y_plot_label", vec![String::new(); n])?;
        if y_errors.len() != n || labels.len() != n {
            return Err(AppError::invalid_input(format!(
                "Number of y_column ({n}), number of y_error_column ({}), or number of y_plot_label ({}) do not match",
                y_errors.len(),
                labels.len()
            )));
        }

        let x_columns = p.str_list("x_column")?;
        let x_errors = p.str_list_or("x_error_column", vec![String::new(); x_columns.len()])?;
        if x_columns.len() != x_errors.len() {
            return Err(AppError::invalid_input(format!(
                "Number of x_column ({}) and number of x_error_column ({}) do not match",
                x_columns.len(),
                x_errors.len()
            )));
        }
        let x_columns = broadcast(x_columns, n, "x_column")?;
        let x_errors = broadcast(x_errors, n, "x_error_column")?;
        let models = broadcast(p.models("model_type", ModelKind::Linear)?, n, "model_type")?;

        let series = y_columns
            .into_iter()
            .zip(y_errors)
            .zip(labels)
            .zip(x_columns.into_iter().zip(x_errors))
            .zip(models)
            .map(|((((y_column, y_error_column), raw_label), (x_column, x_error_column)), model)| SeriesSpec {
                x_column,
                x_error_column,
                y_column,
                y_error_column,
                label: label(raw_label),
                model,
            })
            .collect();

        Ok(Self {
            data_path: p.path("data_path")?,
            graphic_path: p.path("graphic_path")?,
            series,
            text: chart_text(p)?,
            x_axis: p.axis("x", Bound::Value(0.0), p.bool_or("x_allow_negative", false)?)?,
            y_axis: p.axis("y", Bound::Auto, p.bool_or("y_allow_negative", true)?)?,
            results_path: p.opt_path("results_path")?,
            preview: p.bool_or("preview", false)?,
        })
    }
}

impl ResidualConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        let model: ModelKind = p.str_or("model_type", ModelKind::Linear.token())?.parse()?;
        if model == ModelKind::None {
            return Err(AppError::invalid_model(
                "A residual plot needs a model: choose 'linear_zero', 'linear', 'constant' or 'weighted_average'",
            ));
        }

        let series = SeriesSpec {
            x_column: p.str("x_column")?,
            x_error_column: p.str_or("x_error_column", "")?,
            y_column: p.str("y_column")?,
            y_error_column: p.str_or("y_error_column", "")?,
            label: label(p.str_or("y_plot_label", "")?),
            model,
        };

        Ok(Self {
            data_path: p.path("data_path")?,
            graphic_path: p.path("graphic_path")?,
            series,
            text: chart_text(p)?,
            x_axis: p.axis("x", Bound::Value(0.0), p.bool_or("x_allow_negative", false)?)?,
            y_axis: p.axis("y", Bound::Auto, true)?,
            results_path: p.opt_path("results_path")?,
            preview: p.bool_or("preview", false)?,
        })
    }
}

impl HistConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        Ok(Self {
            data_path: p.path("data_path")?,
            graphic_path: p.path("graphic_path")?,
            column: p.str("column")?,
            bins: p.count_or_auto("bins")?,
            text: chart_text(p)?,
            x_axis: p.axis("x", Bound::Auto, p.bool_or("x_allow_negative", true)?)?,
            y_axis: p.axis("y", Bound::Value(0.0), false)?,
            preview: p.bool_or("preview", false)?,
        })
    }
}

impl PeriodsConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        Ok(Self {
            times_path: p.path("times_path")?,
            time_column: p.str_or("time_column", "time")?,
            raw_data_path: p.path("raw_data_path")?,
            evaluation_data_path: p.path("evaluation_data_path")?,
        })
    }
}

impl EvalConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        Ok(Self {
            raw_data_path: p.path("raw_data_path")?,
            evaluation_data_path: p.path("evaluation_data_path")?,
        })
    }
}

impl GradesConfig {
    pub fn from_params(p: &Params) -> Result<Self, AppError> {
        Ok(Self {
            modules_path: p.path("modules_path")?,
            better_of_pairs: p.bool_or("better_of_pairs", true)?,
        })
    }
}
