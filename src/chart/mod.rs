//! Chart rendering with plotters. Every chart is written as an SVG plus a
//! PNG at 3x pixel density; the SVG is authoritative and a raster backend
//! failure (fontless headless hosts) only logs a warning.

use crate::error::{MisrankError, Result};
use crate::types::schema::Predictor;
use crate::types::variant::ScoredVariant;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

const RASTER_SCALE: u32 = 3;

#[derive(Debug, Clone)]
pub struct ChartFiles {
    pub vector: PathBuf,
    pub raster: PathBuf,
}

impl ChartFiles {
    fn new(stem: &Path) -> Self {
        ChartFiles {
            vector: with_suffix(stem, ".svg"),
            raster: with_suffix(stem, ".png"),
        }
    }
}

/// Horizontal bar chart: one bar per variant, ranked order, labeled with the
/// variant identifier.
pub fn render_bar(stem: &Path, ranked: &[ScoredVariant]) -> Result<ChartFiles> {
    let files = ChartFiles::new(stem);
    let size = (900, panel_height(ranked.len()));
    {
        let root = SVGBackend::new(&files.vector, size).into_drawing_area();
        draw_bar(&root, ranked, 1)?;
    }
    {
        let root =
            BitMapBackend::new(&files.raster, raster_size(size)).into_drawing_area();
        if let Err(e) = draw_bar(&root, ranked, RASTER_SCALE as i32) {
            warn!("raster chart {} skipped: {}", files.raster.display(), e);
        }
    }
    Ok(files)
}

/// Heatmap of normalized scores, predictors across, variants down, diverging
/// color scale centered at 0.5.
pub fn render_heatmap(stem: &Path, ranked: &[ScoredVariant]) -> Result<ChartFiles> {
    let files = ChartFiles::new(stem);
    let size = (820, panel_height(ranked.len()));
    {
        let root = SVGBackend::new(&files.vector, size).into_drawing_area();
        draw_heatmap(&root, ranked, 1)?;
    }
    {
        let root =
            BitMapBackend::new(&files.raster, raster_size(size)).into_drawing_area();
        if let Err(e) = draw_heatmap(&root, ranked, RASTER_SCALE as i32) {
            warn!("raster chart {} skipped: {}", files.raster.display(), e);
        }
    }
    Ok(files)
}

/// Scatter of composite score against one chosen predictor, with a
/// least-squares trend line.
pub fn render_scatter(
    stem: &Path,
    ranked: &[ScoredVariant],
    predictor: Predictor,
) -> Result<ChartFiles> {
    let files = ChartFiles::new(stem);
    let size = (700, 500);
    {
        let root = SVGBackend::new(&files.vector, size).into_drawing_area();
        draw_scatter(&root, ranked, predictor, 1)?;
    }
    {
        let root =
            BitMapBackend::new(&files.raster, raster_size(size)).into_drawing_area();
        if let Err(e) = draw_scatter(&root, ranked, predictor, RASTER_SCALE as i32) {
            warn!("raster chart {} skipped: {}", files.raster.display(), e);
        }
    }
    Ok(files)
}

/// Histogram of composite scores with a vertical marker at the median.
pub fn render_histogram(stem: &Path, ranked: &[ScoredVariant]) -> Result<ChartFiles> {
    let files = ChartFiles::new(stem);
    let size = (600, 400);
    {
        let root = SVGBackend::new(&files.vector, size).into_drawing_area();
        draw_histogram(&root, ranked, 1)?;
    }
    {
        let root =
            BitMapBackend::new(&files.raster, raster_size(size)).into_drawing_area();
        if let Err(e) = draw_histogram(&root, ranked, RASTER_SCALE as i32) {
            warn!("raster chart {} skipped: {}", files.raster.display(), e);
        }
    }
    Ok(files)
}

/// Hand the vector files to the desktop opener, detached. A no-op without a
/// display; never blocks and never fails the pipeline.
pub fn display(files: &[ChartFiles]) {
    if cfg!(target_os = "linux") && std::env::var_os("DISPLAY").is_none() {
        debug!("no display available, skipping chart viewer");
        return;
    }
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    for chart in files {
        if let Err(e) = Command::new(opener).arg(&chart.vector).spawn() {
            debug!("could not launch {opener}: {e}");
        }
    }
}

fn raster_size(size: (u32, u32)) -> (u32, u32) {
    (size.0 * RASTER_SCALE, size.1 * RASTER_SCALE)
}

fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ranked: &[ScoredVariant],
    scale: i32,
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_err)?;
    if ranked.is_empty() {
        return draw_placeholder(root, "No variants to display", scale);
    }

    let count = ranked.len();
    let (low, high) = composite_span(ranked);

    let mut chart = ChartBuilder::on(root)
        .caption("Composite variant ranking", ("sans-serif", 18 * scale))
        .margin(12 * scale)
        .x_label_area_size(40 * scale)
        .y_label_area_size(150 * scale)
        .build_cartesian_2d(low..high, (0..count).into_segmented())
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count)
        .y_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) if *index < count => {
                // Rank 1 at the top of the chart.
                ranked[count - 1 - *index].variant.clone()
            }
            _ => String::new(),
        })
        .x_desc("composite score")
        .label_style(("sans-serif", 12 * scale))
        .axis_desc_style(("sans-serif", 14 * scale))
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(ranked.iter().enumerate().filter_map(|(rank, row)| {
            let value = row.composite?;
            let segment = count - 1 - rank;
            Some(Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(segment)),
                    (value, SegmentValue::Exact(segment + 1)),
                ],
                BLUE.filled(),
            ))
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ranked: &[ScoredVariant],
    scale: i32,
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_err)?;
    if ranked.is_empty() {
        return draw_placeholder(root, "No variants to display", scale);
    }

    let count = ranked.len();
    let mut chart = ChartBuilder::on(root)
        .caption("Normalized predictor scores", ("sans-serif", 18 * scale))
        .margin(12 * scale)
        .x_label_area_size(90 * scale)
        .y_label_area_size(150 * scale)
        .build_cartesian_2d(0..Predictor::ALL.len(), 0..count)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(Predictor::ALL.len())
        .x_label_formatter(&|index| {
            Predictor::ALL
                .get(*index)
                .map(|predictor| predictor.alias().to_string())
                .unwrap_or_default()
        })
        .y_labels(count)
        .y_label_formatter(&|index| {
            if *index < count {
                ranked[count - 1 - *index].variant.clone()
            } else {
                String::new()
            }
        })
        .label_style(("sans-serif", 11 * scale))
        .draw()
        .map_err(chart_err)?;

    for (rank, row) in ranked.iter().enumerate() {
        let y = count - 1 - rank;
        for predictor in Predictor::ALL {
            let x = predictor.index();
            let color = match row.normalized_score(predictor) {
                Some(value) => diverging_color(value),
                None => RGBColor(230, 230, 230),
            };
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x, y), (x + 1, y + 1)],
                    color.filled(),
                )))
                .map_err(chart_err)?;
        }
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ranked: &[ScoredVariant],
    predictor: Predictor,
    scale: i32,
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_err)?;

    let points: Vec<(f64, f64)> = ranked
        .iter()
        .filter_map(|row| Some((row.normalized_score(predictor)?, row.composite?)))
        .collect();
    if points.is_empty() {
        return draw_placeholder(root, "No data to display", scale);
    }

    let x_max = points.iter().map(|(x, _)| *x).fold(0.0f64, f64::max).max(1.0);
    let x_min = points.iter().map(|(x, _)| *x).fold(0.0f64, f64::min);
    let y_max = points.iter().map(|(_, y)| *y).fold(0.0f64, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Composite score vs {}", predictor.alias()),
            ("sans-serif", 18 * scale),
        )
        .margin(12 * scale)
        .x_label_area_size(40 * scale)
        .y_label_area_size(50 * scale)
        .build_cartesian_2d(x_min..x_max * 1.05, 0.0..y_max * 1.05)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(predictor.alias())
        .y_desc("composite score")
        .label_style(("sans-serif", 12 * scale))
        .axis_desc_style(("sans-serif", 14 * scale))
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4 * scale, BLUE.filled())),
        )
        .map_err(chart_err)?;

    if let Some((slope, intercept)) = least_squares(&points) {
        chart
            .draw_series(LineSeries::new(
                [
                    (x_min, slope * x_min + intercept),
                    (x_max, slope * x_max + intercept),
                ],
                RED.stroke_width((2 * scale) as u32),
            ))
            .map_err(chart_err)?;
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ranked: &[ScoredVariant],
    scale: i32,
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_err)?;

    let values: Vec<f64> = ranked.iter().filter_map(|row| row.composite).collect();
    if values.is_empty() {
        return draw_placeholder(root, "No data to display", scale);
    }

    let max = values.iter().copied().fold(0.0f64, f64::max).max(1.0);
    let bins = 10usize;
    let bin_width = max / bins as f64;
    let mut counts = vec![0u32; bins];
    for value in &values {
        let bin = ((value / bin_width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    let max_count = *counts.iter().max().unwrap_or(&1);

    let mut chart = ChartBuilder::on(root)
        .caption("Composite score distribution", ("sans-serif", 18 * scale))
        .margin(12 * scale)
        .x_label_area_size(40 * scale)
        .y_label_area_size(50 * scale)
        .build_cartesian_2d(0.0..max, 0u32..max_count + 1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("composite score")
        .y_desc("variants")
        .label_style(("sans-serif", 12 * scale))
        .axis_desc_style(("sans-serif", 14 * scale))
        .draw()
        .map_err(chart_err)?;

    for (bin, count) in counts.iter().enumerate() {
        let x0 = bin as f64 * bin_width;
        let x1 = (bin + 1) as f64 * bin_width;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x0, 0), (x1, *count)],
                BLUE.filled(),
            )))
            .map_err(chart_err)?;
    }

    let median = median(&values);
    chart
        .draw_series(LineSeries::new(
            [(median, 0), (median, max_count)],
            RED.stroke_width((2 * scale) as u32),
        ))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn draw_placeholder<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    message: &str,
    scale: i32,
) -> Result<()> {
    let (width, height) = root.dim_in_pixel();
    root.draw(&Text::new(
        message.to_string(),
        ((width / 3) as i32, (height / 2) as i32),
        ("sans-serif", 20 * scale).into_font().color(&BLACK),
    ))
    .map_err(chart_err)?;
    root.present().map_err(chart_err)?;
    Ok(())
}

fn composite_span(ranked: &[ScoredVariant]) -> (f64, f64) {
    let present: Vec<f64> = ranked.iter().filter_map(|row| row.composite).collect();
    let high = present.iter().copied().fold(0.0f64, f64::max).max(1.0) * 1.05;
    let low = present.iter().copied().fold(0.0f64, f64::min).min(0.0);
    (low, high)
}

/// Blue (0.0) through white (0.5) to red (1.0); out-of-range values clamp.
fn diverging_color(value: f64) -> RGBColor {
    let v = value.clamp(0.0, 1.0);
    if v < 0.5 {
        let t = v * 2.0;
        RGBColor((255.0 * t) as u8, (255.0 * t) as u8, 255)
    } else {
        let t = (v - 0.5) * 2.0;
        RGBColor(255, (255.0 * (1.0 - t)) as u8, (255.0 * (1.0 - t)) as u8)
    }
}

fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((slope, intercept))
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn panel_height(rows: usize) -> u32 {
    (120 + 26 * rows as u32).clamp(300, 2200)
}

fn chart_err<E: std::fmt::Display>(error: E) -> MisrankError {
    MisrankError::Chart(error.to_string())
}
