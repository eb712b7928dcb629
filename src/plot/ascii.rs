//! ASCII plotting for terminal output.
//!
//! Fixed-size grid over the chart's resolved axes, so the preview shows the
//! same window as the SVG. Deterministic, which keeps golden tests simple.
//!
//! Plot elements:
//! - histogram bars: `#`
//! - zero line: `.`
//! - model curves: `-`
//! - observed points: `o`, `+`, `x`, `*`, `@` by series

use crate::plot::{Chart, PALETTE_SIZE};

const POINT_MARKS: [char; PALETTE_SIZE] = ['o', '+', 'x', '*', '@'];

/// Render `chart` on a `width` × `height` character grid.
pub fn render_ascii(chart: &Chart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let frame = Frame {
        x_min: chart.x.min,
        x_max: chart.x.max,
        y_min: chart.y.min,
        y_max: chart.y.max,
        width,
        height,
    };

    let mut grid = vec![vec![' '; width]; height];

    for bar in &chart.bars {
        let x0 = frame.col(bar.left);
        let x1 = frame.col(bar.right).max(x0);
        let top = frame.row(bar.height);
        let base = frame.row(0.0);
        for row in grid.iter_mut().take(base + 1).skip(top) {
            for cell in row.iter_mut().take(x1 + 1).skip(x0) {
                *cell = '#';
            }
        }
    }

    if chart.zero_line && (chart.y.min..=chart.y.max).contains(&0.0) {
        let row = frame.row(0.0);
        for cell in grid[row].iter_mut() {
            if *cell == ' ' {
                *cell = '.';
            }
        }
    }

    // Curves before points so points stay visible.
    for series in &chart.series {
        let visible: Vec<(f64, f64)> = series
            .curve
            .iter()
            .copied()
            .filter(|&(_, y)| (chart.y.min..=chart.y.max).contains(&y))
            .collect();
        draw_curve(&mut grid, &visible, &frame);
    }

    for series in &chart.series {
        let Some(points) = &series.points else { continue };
        let mark = POINT_MARKS[series.palette % PALETTE_SIZE];
        for (&x, &y) in points.x().iter().zip(points.y()) {
            if frame.contains(x, y) {
                grid[frame.row(y)][frame.col(x)] = mark;
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        chart.x.min, chart.x.max, chart.y.min, chart.y.max
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    fn col(&self, x: f64) -> usize {
        let u = ((x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }

    fn row(&self, y: f64) -> usize {
        let u = ((y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        // y_max is the top row
        (self.height as f64 - 1.0 - (u * (self.height as f64 - 1.0))).round() as usize
    }
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], frame: &Frame) {
    if curve.len() < 2 {
        return;
    }

    let mut prev = None;
    for &(x, y) in curve {
        let col = frame.col(x);
        let row = frame.row(y);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else if grid[row][col] == ' ' || grid[row][col] == '.' {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AxisRange, ChartText, ObservationSet};
    use crate::plot::{Bar, PlotSeries};

    fn chart(series: Vec<PlotSeries>, bars: Vec<Bar>, zero_line: bool) -> Chart {
        Chart {
            text: ChartText::default(),
            x: AxisRange { min: 0.0, max: 9.0, ticks: 10 },
            y: AxisRange { min: 0.0, max: 4.0, ticks: 5 },
            series,
            bars,
            zero_line,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let points = ObservationSet::plain(vec![0.0, 9.0], vec![0.0, 4.0]).unwrap();
        let series = PlotSeries {
            label: "y".into(),
            points: Some(points),
            curve: vec![(0.0, 2.0), (9.0, 2.0)],
            curve_label: None,
            palette: 0,
        };

        let txt = render_ascii(&chart(vec![series], Vec::new(), false), 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 9.000] | y=[0.000, 4.000]\n",
            "         o\n",
            "          \n",
            "----------\n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bars_fill_down_to_zero() {
        let bars = vec![Bar { left: 0.0, right: 1.0, height: 2.0 }];
        let txt = render_ascii(&chart(Vec::new(), bars, false), 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[2], "##        ");
        assert_eq!(rows[4], "##        ");
        assert_eq!(rows[1], "          ");
    }

    #[test]
    fn points_outside_the_window_are_dropped() {
        let points = ObservationSet::plain(vec![20.0], vec![1.0]).unwrap();
        let series = PlotSeries {
            label: String::new(),
            points: Some(points),
            curve: Vec::new(),
            curve_label: None,
            palette: 1,
        };
        let txt = render_ascii(&chart(vec![series], Vec::new(), true), 10, 5);
        assert!(!txt.contains('+'));
        assert!(txt.lines().last().unwrap().chars().all(|c| c == '.'));
    }
}
