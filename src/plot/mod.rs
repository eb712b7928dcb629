//! Chart description and renderers.
//!
//! A `Chart` is plain data: resolved axes plus what to draw. The SVG renderer
//! (`svg`) writes the chart file; the ASCII renderer (`ascii`) prints a quick
//! terminal preview of the same chart.

use crate::domain::{AxisRange, ChartText, ObservationSet};

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

/// Number of distinct series colours.
pub const PALETTE_SIZE: usize = 5;

/// Samples per model curve.
pub const CURVE_SAMPLES: usize = 1000;

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct Chart {
    pub text: ChartText,
    pub x: AxisRange,
    pub y: AxisRange,
    pub series: Vec<PlotSeries>,
    /// Histogram bars, drawn beneath the series.
    pub bars: Vec<Bar>,
    /// Horizontal reference line at `y = 0`.
    pub zero_line: bool,
}

/// Points (with optional error bars) and/or a model curve.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub label: String,
    pub points: Option<ObservationSet>,
    pub curve: Vec<(f64, f64)>,
    pub curve_label: Option<String>,
    /// Colour slot; wraps at `PALETTE_SIZE`.
    pub palette: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub left: f64,
    pub right: f64,
    pub height: f64,
}
