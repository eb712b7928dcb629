//! SVG chart rendering with Plotters.
//!
//! Tick marks sit exactly at the resolved axis key points, so a chart with
//! `x_ticks_number = 4` on `[0, 4.5]` is labelled `0, 1.5, 3, 4.5`.

use std::ops::Range;
use std::path::Path;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::axis::tidy;
use crate::domain::AxisRange;
use crate::error::AppError;
use crate::plot::{Chart, PALETTE_SIZE, PlotSeries};

const SIZE: (u32, u32) = (1200, 800);

/// Model curves.
const CURVE_COLORS: [RGBColor; PALETTE_SIZE] = [
    RGBColor(70, 130, 180),  // steelblue
    RGBColor(144, 238, 144), // lightgreen
    RGBColor(240, 128, 128), // lightcoral
    RGBColor(221, 160, 221), // plum
    RGBColor(175, 238, 238), // paleturquoise
];

/// Data points and their error bars.
const POINT_COLORS: [RGBColor; PALETTE_SIZE] = [BLUE, GREEN, RED, MAGENTA, CYAN];

/// Linear `f64` axis whose bold key points are exactly the resolved ticks.
#[derive(Clone)]
struct TickedAxis {
    coord: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: &AxisRange) -> Self {
        Self {
            coord: (range.min..range.max).into(),
            ticks: range.tick_positions(),
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.coord.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // No light grid lines between ticks.
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.coord.range()
    }
}

type Context<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<TickedAxis, TickedAxis>>;
type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Render `chart` to an SVG file at `path`.
pub fn render_chart(chart: &Chart, path: &Path) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", dir.display())))?;
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    draw(chart, &root).map_err(|e| AppError::io(format!("Failed to draw chart '{}': {e}", path.display())))
}

fn draw(chart: &Chart, root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>) -> DrawResult {
    root.fill(&WHITE)?;

    let x_axis = TickedAxis::new(&chart.x);
    let y_axis = TickedAxis::new(&chart.y);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.text.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_axis, y_axis)?;

    ctx.configure_mesh()
        .x_desc(&chart.text.x_label)
        .y_desc(&chart.text.y_label)
        .x_label_formatter(&|v| format!("{}", tidy(*v)))
        .y_label_formatter(&|v| format!("{}", tidy(*v)))
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    if !chart.bars.is_empty() {
        let fill = CURVE_COLORS[0].mix(0.6).filled();
        ctx.draw_series(
            chart
                .bars
                .iter()
                .map(|b| Rectangle::new([(b.left, 0.0), (b.right, b.height)], fill)),
        )?;
        ctx.draw_series(
            chart
                .bars
                .iter()
                .map(|b| Rectangle::new([(b.left, 0.0), (b.right, b.height)], BLACK.stroke_width(1))),
        )?;
    }

    if chart.zero_line {
        ctx.draw_series(LineSeries::new([(chart.x.min, 0.0), (chart.x.max, 0.0)], BLACK.stroke_width(1)))?;
    }

    for series in &chart.series {
        draw_series(&mut ctx, chart, series)?;
    }

    let has_labels = chart
        .series
        .iter()
        .any(|s| !s.label.is_empty() || s.curve_label.is_some());
    if has_labels {
        ctx.configure_series_labels()
            .label_font(("sans-serif", 16))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()
}

fn draw_series(ctx: &mut Context<'_, '_>, chart: &Chart, series: &PlotSeries) -> DrawResult {
    let slot = series.palette % PALETTE_SIZE;
    let point_color = POINT_COLORS[slot];
    let curve_style = CURVE_COLORS[slot].stroke_width(2);

    if series.curve.len() >= 2 {
        let (y_min, y_max) = (chart.y.min, chart.y.max);
        let visible: Vec<(f64, f64)> = series
            .curve
            .iter()
            .copied()
            .filter(|&(_, y)| (y_min..=y_max).contains(&y))
            .collect();
        let drawn = ctx.draw_series(DashedLineSeries::new(visible, 10, 6, curve_style))?;
        if let Some(label) = &series.curve_label {
            drawn
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], curve_style));
        }
    }

    let Some(points) = &series.points else {
        return Ok(());
    };
    let error_style = point_color.stroke_width(1);

    if let Some(dy) = points.dy() {
        ctx.draw_series(
            points
                .x()
                .iter()
                .zip(points.y())
                .zip(dy)
                .map(|((&x, &y), &d)| ErrorBar::new_vertical(x, y - d, y, y + d, error_style, 8)),
        )?;
    }
    if let Some(dx) = points.dx() {
        ctx.draw_series(
            points
                .x()
                .iter()
                .zip(points.y())
                .zip(dx)
                .map(|((&x, &y), &d)| ErrorBar::new_horizontal(y, x - d, x, x + d, error_style, 8)),
        )?;
    }

    let drawn = ctx.draw_series(
        points
            .x()
            .iter()
            .zip(points.y())
            .map(|(&x, &y)| Circle::new((x, y), 3, point_color.filled())),
    )?;
    if !series.label.is_empty() {
        drawn
            .label(&series.label)
            .legend(move |(x, y)| Circle::new((x + 10, y), 3, point_color.filled()));
    }

    Ok(())
}
