//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The consumption series is drawn as a `*` polyline over time.

use crate::aggregate::SeriesPoint;

/// Render the consumption time series.
pub fn render_consumption_plot(series: &[SeriesPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some(first) = series.first() else {
        return "Consumption: no data\n".to_string();
    };
    let last = series.last().unwrap_or(first);

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| (hours_since(first, p), p.consumption))
        .collect();

    let (t_min, t_max) = x_range(&points);
    let (y_min, y_max) = y_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_polyline(&mut grid, &points, t_min, t_max, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Consumption: {} → {} | y=[{y_min:.2}, {y_max:.2}] MW\n",
        first.timestamp.format("%d/%m %Hh"),
        last.timestamp.format("%d/%m %Hh"),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn hours_since(origin: &SeriesPoint, p: &SeriesPoint) -> f64 {
    (p.timestamp - origin.timestamp).num_seconds() as f64 / 3600.0
}

fn x_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for &(t, _) in points {
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        (min_t, max_t)
    } else {
        (0.0, 1.0)
    }
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: center it.
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '*');
        } else {
            grid[yy][x] = '*';
        }
        prev = Some((x, yy));
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn point(ts: &str, consumption: f64) -> SeriesPoint {
        SeriesPoint {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            consumption,
            production: [0.0; 6],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![
            point("2024-01-01T00:00:00+01:00", 100.0),
            point("2024-01-01T09:00:00+01:00", 110.0),
        ];

        let txt = render_consumption_plot(&series, 10, 5);
        let expected = concat!(
            "Consumption: 01/01 00h → 01/01 09h | y=[99.50, 110.50] MW\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_says_so() {
        assert_eq!(render_consumption_plot(&[], 20, 5), "Consumption: no data\n");
    }

    #[test]
    fn flat_single_point_does_not_panic() {
        let txt = render_consumption_plot(&[point("2024-01-01T00:00:00+01:00", 42.0)], 10, 5);
        assert_eq!(txt.lines().count(), 6);
        assert_eq!(txt.matches('*').count(), 1);
    }
}
