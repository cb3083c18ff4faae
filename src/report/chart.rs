//! SVG charts drawn with plotters.
//!
//! Time is placed on a decimal-year axis so every chart shares one
//! numeric x range regardless of the sampling frequency.

use super::Comparison;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::regimes::{RegimeTable, RollingStats};
use crate::seasonality::STLDecomposition;
use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

const SECONDS_PER_YEAR: f64 = 365.2425 * 86_400.0;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const TRAIN_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Size and title of a rendered chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Baselines forecast comparison".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

impl ChartOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ForecastError {
    ForecastError::Render(e.to_string())
}

fn decimal_year(ts: DateTime<Utc>) -> f64 {
    1970.0 + ts.timestamp() as f64 / SECONDS_PER_YEAR
}

/// Finite `(x, y)` points of a series.
fn points(series: &TimeSeries) -> Vec<(f64, f64)> {
    series
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(ts, v)| (decimal_year(ts), v))
        .collect()
}

/// Bounding box of several point sets, padded by 5%.
fn bounds<'a, I>(sets: I) -> Option<((f64, f64), (f64, f64))>
where
    I: IntoIterator<Item = &'a [(f64, f64)]>,
{
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for &(px, py) in sets.into_iter().flatten() {
        x = (x.0.min(px), x.1.max(px));
        y = (y.0.min(py), y.1.max(py));
    }
    if !x.0.is_finite() || !y.0.is_finite() {
        return None;
    }
    let pad = |(lo, hi): (f64, f64)| {
        let span = if hi > lo { hi - lo } else { 1.0 };
        (lo - span * 0.05, hi + span * 0.05)
    };
    Some((pad(x), pad(y)))
}

/// Split each segment into short pieces and keep every other one.
fn dashes(points: &[(f64, f64)], pieces: usize) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    for w in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        for k in (0..pieces).step_by(2) {
            let a = k as f64 / pieces as f64;
            let b = (k + 1) as f64 / pieces as f64;
            out.push(vec![
                (x0 + (x1 - x0) * a, y0 + (y1 - y0) * a),
                (x0 + (x1 - x0) * b, y0 + (y1 - y0) * b),
            ]);
        }
    }
    out
}

type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// One line of a panel.
struct Line {
    label: String,
    points: Vec<(f64, f64)>,
    color: RGBColor,
    dashed: bool,
}

impl Line {
    fn solid(label: impl Into<String>, series: &TimeSeries, color: RGBColor) -> Self {
        Self {
            label: label.into(),
            points: points(series),
            color,
            dashed: false,
        }
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

fn draw_panel(area: &Panel<'_>, caption: &str, lines: &[Line]) -> Result<()> {
    let Some(((x0, x1), (y0, y1))) = bounds(lines.iter().map(|l| l.points.as_slice())) else {
        debug!(caption, "nothing to draw");
        return Ok(());
    };

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|x| format!("{:.0}", x.floor()))
        .y_label_formatter(&|y| format!("{:.2}", y))
        .draw()
        .map_err(render_err)?;

    for line in lines {
        let style = line.color.stroke_width(2);
        let color = line.color;
        let series = if line.dashed {
            chart
                .draw_series(
                    dashes(&line.points, 4)
                        .into_iter()
                        .map(|seg| PathElement::new(seg, style)),
                )
                .map_err(render_err)?
        } else {
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), style))
                .map_err(render_err)?
        };
        series
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

fn finish(root: &Panel<'_>, path: &Path) -> Result<()> {
    root.present().map_err(render_err)?;
    debug!(path = %path.display(), "chart written");
    Ok(())
}

/// Train, held-out actuals and every forecast of `comparison` on one chart.
///
/// Train is gray, actuals black and forecasts dashed in palette colours.
pub fn render_svg<P: AsRef<Path>>(
    comparison: &Comparison,
    path: P,
    options: &ChartOptions,
) -> Result<()> {
    let path = path.as_ref();
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut lines = vec![
        Line::solid("Train", comparison.train(), TRAIN_COLOR),
        Line::solid("Test (Actual)", comparison.test(), BLACK),
    ];
    for (i, entry) in comparison.entries().iter().enumerate() {
        lines.push(
            Line::solid(&entry.label, &entry.forecast, PALETTE[i % PALETTE.len()]).dashed(),
        );
    }

    draw_panel(&root, &options.title, &lines)?;
    finish(&root, path)
}

/// Price, rolling means, and rolling std with realized volatility in three
/// stacked panels.
pub fn render_regime_svg<P: AsRef<Path>>(
    stats: &RollingStats,
    realized_vol: &TimeSeries,
    path: P,
    options: &ChartOptions,
) -> Result<()> {
    let path = path.as_ref();
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = root
        .titled(&options.title, ("sans-serif", 24))
        .map_err(render_err)?;
    let panels = root.split_evenly((3, 1));

    draw_panel(
        &panels[0],
        "Price (level)",
        &[Line::solid("Close", &stats.value, BLACK)],
    )?;

    let means: Vec<Line> = stats
        .windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            Line::solid(
                format!("Rolling mean {}", w.window),
                &w.mean,
                PALETTE[i % PALETTE.len()],
            )
        })
        .collect();
    draw_panel(&panels[1], "Rolling means (regime proxy)", &means)?;

    let mut spread: Vec<Line> = stats
        .windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            Line::solid(
                format!("Rolling std {}", w.window),
                &w.std,
                PALETTE[i % PALETTE.len()],
            )
        })
        .collect();
    spread.push(Line::solid("Realized vol", realized_vol, RED));
    draw_panel(&panels[2], "Rolling std and realized volatility", &spread)?;

    finish(&root, path)
}

/// Z-score of a regime table with the ±threshold lines.
pub fn render_zscore_svg<P: AsRef<Path>>(
    table: &RegimeTable,
    path: P,
    options: &ChartOptions,
) -> Result<()> {
    let path = path.as_ref();
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let bound = |sign: f64| -> Result<TimeSeries> {
        table
            .zscore
            .with_values(vec![sign * table.threshold; table.len()])
    };
    let lines = [
        Line::solid("Rolling z-score", &table.zscore, PALETTE[0]),
        Line::solid("+threshold", &bound(1.0)?, RED).dashed(),
        Line::solid("-threshold", &bound(-1.0)?, RED).dashed(),
    ];
    draw_panel(&root, &options.title, &lines)?;
    finish(&root, path)
}

/// Observed, trend, seasonal and remainder of an STL decomposition.
pub fn render_decomposition_svg<P: AsRef<Path>>(
    decomposition: &STLDecomposition,
    path: P,
    options: &ChartOptions,
) -> Result<()> {
    let path = path.as_ref();
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = root
        .titled(&options.title, ("sans-serif", 24))
        .map_err(render_err)?;
    let panels = root.split_evenly((4, 1));

    let parts = [
        ("Observed", &decomposition.observed),
        ("Trend", &decomposition.trend),
        ("Seasonal", &decomposition.seasonal),
        ("Remainder", &decomposition.remainder),
    ];
    for (panel, (name, series)) in panels.iter().zip(parts) {
        draw_panel(panel, name, &[Line::solid(name, series, BLACK)])?;
    }

    finish(&root, path)
}
