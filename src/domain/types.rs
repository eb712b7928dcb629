//! Shared domain types.
//!
//! Fit outputs are serializable so a run can export them to JSON next to the
//! rendered chart.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Functional form fitted to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// `y = a`
    Constant,
    /// `y = a·x + b`
    Linear,
    /// `y = a·x`
    LinearZero,
    /// Inverse-variance weighted mean of `y`, independent of `x`.
    WeightedAverage,
    /// No model; raw points only.
    None,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Constant,
        ModelKind::Linear,
        ModelKind::LinearZero,
        ModelKind::WeightedAverage,
        ModelKind::None,
    ];

    /// Configuration token for this kind.
    pub fn token(self) -> &'static str {
        match self {
            ModelKind::Constant => "constant",
            ModelKind::Linear => "linear",
            ModelKind::LinearZero => "linear_zero",
            ModelKind::WeightedAverage => "weighted_average",
            ModelKind::None => "none",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Constant => "y = a",
            ModelKind::Linear => "y = a*x + b",
            ModelKind::LinearZero => "y = a*x",
            ModelKind::WeightedAverage => "weighted average",
            ModelKind::None => "no model",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Constant | ModelKind::LinearZero | ModelKind::WeightedAverage => 1,
            ModelKind::Linear => 2,
            ModelKind::None => 0,
        }
    }

    /// Whether the model depends on `x` (and so can use x-uncertainties).
    pub fn has_slope(self) -> bool {
        matches!(self, ModelKind::Linear | ModelKind::LinearZero)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ModelKind {
    type Err = AppError;

    /// Accepts the snake_case tokens plus their kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase().replace('-', "_");
        match token.as_str() {
            "constant" => Ok(ModelKind::Constant),
            "linear" => Ok(ModelKind::Linear),
            "linear_zero" | "linear_through_origin" => Ok(ModelKind::LinearZero),
            "weighted_average" => Ok(ModelKind::WeightedAverage),
            "none" => Ok(ModelKind::None),
            _ => Err(AppError::invalid_model(format!(
                "Model '{s}' is not supported -> choose one of: {}",
                ModelKind::ALL.map(ModelKind::token).join(", ")
            ))),
        }
    }
}

/// Ordered `(x, y)` pairs with optional independent uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    x: Vec<f64>,
    y: Vec<f64>,
    dx: Option<Vec<f64>>,
    dy: Option<Vec<f64>>,
}

impl ObservationSet {
    /// Build a set, checking that every supplied sequence has the same length.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        dx: Option<Vec<f64>>,
        dy: Option<Vec<f64>>,
    ) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::invalid_input(format!(
                "x and y have different lengths ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if let Some(dx) = &dx {
            if dx.len() != x.len() {
                return Err(AppError::invalid_input(format!(
                    "x uncertainties have length {} but x has {}",
                    dx.len(),
                    x.len()
                )));
            }
        }
        if let Some(dy) = &dy {
            if dy.len() != y.len() {
                return Err(AppError::invalid_input(format!(
                    "y uncertainties have length {} but y has {}",
                    dy.len(),
                    y.len()
                )));
            }
        }
        Ok(Self { x, y, dx, dy })
    }

    /// Values only, no uncertainties.
    pub fn plain(x: Vec<f64>, y: Vec<f64>) -> Result<Self, AppError> {
        Self::new(x, y, None, None)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn dx(&self) -> Option<&[f64]> {
        self.dx.as_deref()
    }

    pub fn dy(&self) -> Option<&[f64]> {
        self.dy.as_deref()
    }

    /// Reorder all sequences by ascending `x`.
    pub fn sorted_by_x(&self) -> Self {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.x[a].total_cmp(&self.x[b]));
        let pick = |v: &[f64]| order.iter().map(|&i| v[i]).collect::<Vec<f64>>();
        Self {
            x: pick(&self.x),
            y: pick(&self.y),
            dx: self.dx.as_deref().map(pick),
            dy: self.dy.as_deref().map(pick),
        }
    }
}

/// Parameter estimates and standard errors for one fitted model.
///
/// `params` and `errors` both have `model.param_count()` entries. For the
/// slope models the slope comes first (`[a]` or `[a, b]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub errors: Vec<f64>,
    /// Number of observations used.
    pub n: usize,
    /// Whether inverse-variance weights entered the fit.
    pub weighted: bool,
}

impl FitResult {
    /// Result for `ModelKind::None`.
    pub fn unfitted(n: usize) -> Self {
        Self {
            model: ModelKind::None,
            params: Vec::new(),
            errors: Vec::new(),
            n,
            weighted: false,
        }
    }
}

/// Axis limit policy: computed from data or given explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Auto,
    Value(f64),
}

/// Number of tick marks: chosen by the divider heuristic or given explicitly.
///
/// `Count(0)` means "no ticks".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPolicy {
    Auto,
    Count(usize),
}

/// Resolved axis limits and tick count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub ticks: usize,
}

impl AxisRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Tick positions, evenly spaced from `min` to `max` inclusive.
    pub fn tick_positions(&self) -> Vec<f64> {
        match self.ticks {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = self.span() / (n as f64 - 1.0);
                (0..n).map(|i| self.min + step * i as f64).collect()
            }
        }
    }
}

/// Axis configuration shared by every chart-producing mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    pub min: Bound,
    pub max: Bound,
    pub ticks: TickPolicy,
    /// When false, auto minimums are floored at zero and explicit negative
    /// minimums are rejected.
    pub allow_negative: bool,
}

/// Common chart text and output location.
#[derive(Debug, Clone, Default)]
pub struct ChartText {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// One y-series in an errorbar run.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub x_column: String,
    /// Empty means "no x uncertainties".
    pub x_error_column: String,
    pub y_column: String,
    /// Empty means "no y uncertainties".
    pub y_error_column: String,
    /// Legend label; `None` hides the entry.
    pub label: Option<String>,
    pub model: ModelKind,
}

/// Configuration for `labfit errorbar`.
#[derive(Debug, Clone)]
pub struct ErrorbarConfig {
    pub data_path: PathBuf,
    pub graphic_path: PathBuf,
    pub series: Vec<SeriesSpec>,
    pub text: ChartText,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub results_path: Option<PathBuf>,
    pub preview: bool,
}

/// Configuration for `labfit residual`.
#[derive(Debug, Clone)]
pub struct ResidualConfig {
    pub data_path: PathBuf,
    pub graphic_path: PathBuf,
    pub series: SeriesSpec,
    pub text: ChartText,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub results_path: Option<PathBuf>,
    pub preview: bool,
}

/// Configuration for `labfit hist`.
#[derive(Debug, Clone)]
pub struct HistConfig {
    pub data_path: PathBuf,
    pub graphic_path: PathBuf,
    pub column: String,
    /// `None` means ⌈√n⌉ bins.
    pub bins: Option<usize>,
    pub text: ChartText,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub preview: bool,
}

/// Configuration for `labfit periods`.
#[derive(Debug, Clone)]
pub struct PeriodsConfig {
    pub times_path: PathBuf,
    pub time_column: String,
    pub raw_data_path: PathBuf,
    pub evaluation_data_path: PathBuf,
}

/// Configuration for `labfit eval`.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub raw_data_path: PathBuf,
    pub evaluation_data_path: PathBuf,
}

/// Configuration for `labfit grades`.
#[derive(Debug, Clone)]
pub struct GradesConfig {
    pub modules_path: PathBuf,
    /// Keep only the better result of the LinA I/II and Analysis I/II pairs.
    pub better_of_pairs: bool,
}
