//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden tests).
//!
//! Plot elements:
//! - one line per run, drawn with `-`, `*`, `+`, `~`, `=` in run order
//! - optional simulated points: `o`

use crate::domain::{CurveFile, RunCurve};

const RUN_MARKS: [char; 5] = ['-', '*', '+', '~', '='];

/// Render evaluated run curves.
pub fn render_ascii_plot(curves: &[RunCurve], width: usize, height: usize) -> String {
    render_plot(curves, &[], width, height)
}

/// Render evaluated run curves with overlay points `(t, value)`.
pub fn render_ascii_plot_with_points(
    curves: &[RunCurve],
    points: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    render_plot(curves, points, width, height)
}

/// Render a plot from a saved curve JSON file.
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let mut out = String::new();
    if !curve.title.is_empty() {
        out.push_str(&curve.title);
        out.push('\n');
    }
    out.push_str(&render_plot(&curve.curves, &[], width, height));
    out
}

fn render_plot(curves: &[RunCurve], points: &[(f64, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = t_range(curves, points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(curves, points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so points overlay.
    for (i, curve) in curves.iter().enumerate() {
        let samples: Vec<(f64, f64)> = curve
            .t
            .iter()
            .zip(&curve.value)
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(&t, &v)| (t, v))
            .collect();
        let mark = RUN_MARKS[i % RUN_MARKS.len()];
        draw_curve(&mut grid, &samples, (t_min, t_max), (y_min, y_max), mark);
    }

    for &(t, v) in points {
        if !(t.is_finite() && v.is_finite()) {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.3}, {t_max:.3}] us | P=[{y_min:.4}, {y_max:.4}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    if curves.len() > 1 {
        for (i, curve) in curves.iter().enumerate() {
            out.push_str(&format!("  {} {}\n", RUN_MARKS[i % RUN_MARKS.len()], curve.run));
        }
    }
    out
}

fn t_range(curves: &[RunCurve], points: &[(f64, f64)]) -> Option<(f64, f64)> {
    finite_range(curves.iter().flat_map(|c| c.t.iter().copied()).chain(points.iter().map(|p| p.0)))
}

fn y_range(curves: &[RunCurve], points: &[(f64, f64)]) -> Option<(f64, f64)> {
    finite_range(curves.iter().flat_map(|c| c.value.iter().copied()).chain(points.iter().map(|p| p.1)))
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        // flat curve: open a unit window around it
        Some((min - 0.5, max + 0.5))
    } else {
        None
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
    // max value on row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t: (f64, f64), y: (f64, f64), mark: char) {
    let Some(&(t0, v0)) = curve.first() else {
        return;
    };
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = (map_x(t0, t.0, t.1, width), map_y(v0, y.0, y.1, height));
    grid[prev.1][prev.0] = mark;
    for &(tt, v) in &curve[1..] {
        let next = (map_x(tt, t.0, t.1, width), map_y(v, y.0, y.1, height));
        draw_line(grid, prev, next, mark);
        prev = next;
    }
}

/// Integer line drawing (Bresenham). Only blank cells are painted, so earlier
/// runs stay visible where curves cross.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let curves = vec![RunCurve {
            run: "run".to_string(),
            t: vec![0.0, 1.0],
            value: vec![1.0, 0.0],
        }];
        let txt = render_ascii_plot_with_points(&curves, &[(1.0, 1.0)], 10, 5);
        let expected = concat!(
            "Plot: t=[0.000, 1.000] us | P=[-0.0500, 1.0500]\n",
            "--       o\n",
            "  --      \n",
            "    --    \n",
            "      --  \n",
            "        --\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn several_runs_get_a_legend() {
        let curves = vec![
            RunCurve {
                run: "forward".to_string(),
                t: vec![0.0, 1.0],
                value: vec![0.0, 1.0],
            },
            RunCurve {
                run: "backward".to_string(),
                t: vec![0.0, 1.0],
                value: vec![1.0, 0.0],
            },
        ];
        let txt = render_ascii_plot(&curves, 20, 6);
        assert!(txt.contains("  - forward\n"));
        assert!(txt.contains("  * backward\n"));
        assert!(txt.contains('*'));
    }
}
