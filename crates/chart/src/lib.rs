//! SVG line-chart rendering for beta time series.
//!
//! Consumes a [`BetaTimeSeries`] and draws each ticker's rounded beta
//! against window end date on a shared time axis: one polyline per
//! ticker, month tick labels, a legend of ticker names. The chart is
//! written as a standalone SVG file named with a capture timestamp.
//!
//! The renderer never recomputes betas; it plots the rows exactly as
//! the engine produced them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use beta_engine::BetaTimeSeries;
use chrono::{Datelike, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

const WIDTH: i32 = 576;
const HEIGHT: i32 = 288;
const PADDING: f64 = 36.0;

/// Line colors cycled per ticker.
const PALETTE: [&str; 6] = [
    "#348dc1", "#ff9933", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Result type for chart operations.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors from chart rendering.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The series holds no rows to plot
    #[error("beta series is empty, nothing to plot")]
    EmptySeries,

    /// Writing the chart file failed
    #[error("failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the series and write it to `out_dir` as
/// `beta_YYYY-MM-DD_HH-MM-SS.svg`.
///
/// The directory is created if absent. Returns the path of the
/// written file.
pub fn save_chart(series: &BetaTimeSeries, out_dir: &Path) -> Result<PathBuf> {
    let svg = render_svg(series)?;
    std::fs::create_dir_all(out_dir)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = out_dir.join(format!("beta_{stamp}.svg"));
    std::fs::write(&path, svg)?;
    Ok(path)
}

/// Render the series as an SVG document string.
pub fn render_svg(series: &BetaTimeSeries) -> Result<String> {
    if series.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let width = f64::from(WIDTH);
    let height = f64::from(HEIGHT);
    let xs = x_positions(series.len(), width);
    let (min_v, max_v) = value_extent(series);

    let mut svg = svg_header(WIDTH, HEIGHT);
    let _ = write!(
        svg,
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12" fill="#333">Beta over time</text>"##,
        x = width / 2.0,
        y = PADDING / 2.0,
    );

    add_time_axis(&mut svg, series, &xs, width, height);

    for index in 0..series.tickers().len() {
        let color = PALETTE[index % PALETTE.len()];
        let points = series
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.betas[index].is_finite())
            .map(|(i, row)| {
                let y = scale_value(row.betas[index], min_v, max_v, height);
                format!("{x:.2},{y:.2}", x = xs[i])
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            svg,
            r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}" />"#,
        );
    }

    draw_legend(&mut svg, series);
    svg.push_str("</svg>");
    Ok(svg)
}

fn svg_header(width: i32, height: i32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
    )
}

/// Evenly spaced x coordinates across the plot area.
fn x_positions(count: usize, width: f64) -> Vec<f64> {
    let inner = width - 2.0 * PADDING;
    if count <= 1 {
        return vec![PADDING + inner / 2.0];
    }
    (0..count)
        .map(|i| PADDING + inner * i as f64 / (count - 1) as f64)
        .collect()
}

/// Min/max over every plotted beta, widened when flat so a constant
/// series still draws mid-chart.
fn value_extent(series: &BetaTimeSeries) -> (f64, f64) {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for row in series.rows() {
        for beta in &row.betas {
            if beta.is_finite() {
                min_v = min_v.min(*beta);
                max_v = max_v.max(*beta);
            }
        }
    }
    if !min_v.is_finite() || !max_v.is_finite() {
        return (-1.0, 1.0);
    }
    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        min_v -= adjust;
        max_v += adjust;
    }
    (min_v, max_v)
}

fn scale_value(value: f64, min_v: f64, max_v: f64, height: f64) -> f64 {
    let inner = height - 2.0 * PADDING;
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * inner
}

fn add_time_axis(svg: &mut String, series: &BetaTimeSeries, xs: &[f64], width: f64, height: f64) {
    let axis_y = height - PADDING + 5.0;
    let _ = write!(
        svg,
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000" stroke-width="1" />"##,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y,
    );

    let mut last_month: Option<(i32, u32)> = None;
    for (idx, row) in series.rows().iter().enumerate() {
        let key = (row.end.year(), row.end.month());
        if last_month == Some(key) {
            continue;
        }
        last_month = Some(key);
        let x = xs[idx];
        let _ = write!(
            svg,
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#dddddd" stroke-width="0.5" />"##,
            y1 = PADDING,
            y2 = height - PADDING,
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = axis_y + 12.0,
            label = row.end.format("%Y-%m"),
        );
    }
}

fn draw_legend(svg: &mut String, series: &BetaTimeSeries) {
    if series.tickers().is_empty() {
        return;
    }
    let x = PADDING + 10.0;
    // Lower-left placement, matching the source chart it replaces.
    let mut y = f64::from(HEIGHT) - PADDING - 10.0 - 16.0 * (series.tickers().len() - 1) as f64;
    for (index, ticker) in series.tickers().iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y1:.2}" stroke="{color}" stroke-width="1.5" />"#,
            x1 = x,
            x2 = x + 20.0,
            y1 = y - 4.0,
        );
        let _ = write!(
            svg,
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start" fill="#333">{ticker}</text>"##,
            x = x + 26.0,
        );
        y += 16.0;
    }
}
