//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output
//!
//! The x axis is the position in the λ grid (not λ itself: the grid usually
//! starts at λ = 0 and is log-spaced afterwards).
//!
//! Plot elements:
//! - bias²: `b`
//! - variance: `v`
//! - coefficient MSE: `m`

use crate::domain::LambdaSummary;

/// A named series of y values, one per λ.
struct Series {
    mark: char,
    values: Vec<f64>,
}

/// Render bias², variance and MSE across the λ grid.
pub fn render_bias_variance_plot(summaries: &[LambdaSummary], width: usize, height: usize) -> String {
    let series = vec![
        Series {
            mark: 'm',
            values: summaries.iter().map(|s| s.coef_mse).collect(),
        },
        Series {
            mark: 'v',
            values: summaries.iter().map(|s| s.variance).collect(),
        },
        Series {
            mark: 'b',
            values: summaries.iter().map(|s| s.bias_sq).collect(),
        },
    ];

    let lambda_min = summaries.first().map_or(0.0, |s| s.lambda);
    let lambda_max = summaries.last().map_or(0.0, |s| s.lambda);
    let header = format!(
        "Plot: b=bias^2 v=variance m=mse | lambda grid [{lambda_min}, {lambda_max}] ({} points)",
        summaries.len()
    );

    render_plot(&header, &series, width, height)
}

fn render_plot(header: &str, series: &[Series], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n_points = series.iter().map(|s| s.values.len()).max().unwrap_or(0);

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Later series are drawn underneath earlier ones.
    for s in series.iter().rev() {
        draw_series(&mut grid, s, n_points, y_min, y_max);
    }

    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    out.push_str(&format!("y=[{y_min:.4}, {y_max:.4}]\n"));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn y_range(series: &[Series]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in series.iter().flat_map(|s| s.values.iter()) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n_points: usize, width: usize) -> usize {
    if n_points < 2 {
        return 0;
    }
    let u = i as f64 / (n_points as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Connect consecutive finite points; points themselves override line pixels.
fn draw_series(grid: &mut [Vec<char>], series: &Series, n_points: usize, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    let mut points = Vec::new();
    for (i, &y) in series.values.iter().enumerate() {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(i, n_points, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '.');
        }
        points.push((x, yy));
        prev = Some((x, yy));
    }
    for (x, y) in points {
        grid[y][x] = series.mark;
    }
}

/// Integer line drawing (Bresenham-ish).
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
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
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
