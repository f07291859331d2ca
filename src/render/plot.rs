//! Grid-of-grids comparison plots, drawn with plotters into SVG strings.

use super::request::{Artifact, AxisDisplay, ComparisonRenderer, RenderError, RenderRequest};
use crate::config::RenderOptions;
use crate::payload::Hist1D;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

/// Height of the title and legend strip above the panel grid, in pixels.
const HEADER_HEIGHT: u32 = 60;
const LEGEND_STRIDE: i32 = 160;

fn plot_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Plot(e.to_string())
}

/// Short numeric label: scientific notation outside [0.01, 1000).
fn fmt_edge(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(0.01..1000.0).contains(&a) {
        format!("{:.1e}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Renders one panel per grid cell; within a panel every source that has the
/// statistic is overlaid as a step line in its legend colour.
#[derive(Debug, Clone, Default)]
pub struct SvgGridRenderer {
    options: RenderOptions,
}

impl SvgGridRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl ComparisonRenderer for SvgGridRenderer {
    fn render(&mut self, request: &RenderRequest<'_, '_>) -> Result<Artifact, RenderError> {
        if request.x_bins.is_empty() || request.y_bins.is_empty() {
            return Err(RenderError::EmptyGrid(request.name.to_string()));
        }

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.options.width, self.options.height)).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;
            let (header, body) = root.split_vertically(HEADER_HEIGHT);
            draw_header(&header, request)?;
            draw_panels(&body, request, self.options.normalize)?;
            root.present().map_err(plot_err)?;
        }

        Ok(Artifact {
            name: request.name.to_string(),
            statistic: request.statistic.to_string(),
            subgroup: request.subgroup.label(),
            svg,
        })
    }
}

fn draw_header(area: &DrawingArea<SVGBackend<'_>, Shift>, request: &RenderRequest<'_, '_>) -> Result<(), RenderError> {
    let title = format!(
        "{}  [{}]  columns: {}, rows: {}",
        request.statistic,
        request.subgroup,
        request.x_axis.heading(),
        request.y_axis.heading()
    );
    area.draw(&Text::new(title, (10, 5), ("sans-serif", 20).into_font()))
        .map_err(plot_err)?;

    for (i, label) in request.labels.iter().enumerate() {
        let colour = Palette99::pick(i);
        let x = 10 + LEGEND_STRIDE * i as i32;
        area.draw(&Rectangle::new([(x, 40), (x + 20, 44)], colour.filled()))
            .map_err(plot_err)?;
        let style = ("sans-serif", 14).into_font().color(&colour);
        area.draw(&Text::new(label.clone(), (x + 26, 34), style)).map_err(plot_err)?;
    }
    Ok(())
}

fn bin_range(axis: &AxisDisplay, i: usize) -> String {
    match axis.edges(i) {
        Some((lo, hi)) => format!("[{}, {})", fmt_edge(lo), fmt_edge(hi)),
        None => "[?]".to_string(),
    }
}

fn cell_caption(x_axis: &AxisDisplay, x: usize, y_axis: &AxisDisplay, y: usize) -> String {
    format!("{} {}  {} {}", x_axis.title, bin_range(x_axis, x), y_axis.title, bin_range(y_axis, y))
}

fn draw_panels(area: &DrawingArea<SVGBackend<'_>, Shift>, request: &RenderRequest<'_, '_>, normalize: bool) -> Result<(), RenderError> {
    let rows = request.y_bins.len();
    let cols = request.x_bins.len();
    let panels = area.split_evenly((rows, cols));

    for (k, panel) in panels.iter().enumerate() {
        let (row, col) = (k / cols, k % cols);
        let x = request.x_bins.start + col;
        // Highest y bin on top.
        let y = request.y_bins.end - 1 - row;

        let slice = request.store.slice(x, y).map_err(|err| RenderError::Store { x, y, err })?;
        let mut overlays: Vec<(usize, Hist1D)> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();
        for (i, handle) in slice.iter().enumerate() {
            let label = request.labels.get(i).map(String::as_str).unwrap_or("?");
            match handle.as_deref().and_then(|h| h.get(request.statistic)) {
                Some(hist) if normalize => overlays.push((i, hist.normalized())),
                Some(hist) => overlays.push((i, hist.clone())),
                None => missing.push(label),
            }
        }

        let caption = cell_caption(request.x_axis, x, request.y_axis, y);
        draw_panel(panel, &caption, &overlays)?;
        if !missing.is_empty() {
            let note = format!("missing: {}", missing.join(", "));
            panel
                .draw(&Text::new(note, (40, 24), ("sans-serif", 10).into_font().color(&RED)))
                .map_err(plot_err)?;
        }
    }
    Ok(())
}

fn draw_panel(panel: &DrawingArea<SVGBackend<'_>, Shift>, caption: &str, overlays: &[(usize, Hist1D)]) -> Result<(), RenderError> {
    if overlays.is_empty() {
        panel
            .draw(&Text::new(caption.to_string(), (5, 5), ("sans-serif", 11).into_font()))
            .map_err(plot_err)?;
        panel
            .draw(&Text::new("no data", (40, 40), ("sans-serif", 12).into_font()))
            .map_err(plot_err)?;
        return Ok(());
    }

    let x_min = overlays.iter().map(|(_, h)| h.min).fold(f64::INFINITY, f64::min);
    let mut x_max = overlays.iter().map(|(_, h)| h.max).fold(f64::NEG_INFINITY, f64::max);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let mut y_max = overlays.iter().map(|(_, h)| h.max_count()).fold(0.0, f64::max);
    if y_max <= 0.0 {
        y_max = 1.0;
    }

    let mut chart = ChartBuilder::on(panel)
        .caption(caption, ("sans-serif", 11))
        .margin(4)
        .x_label_area_size(18)
        .y_label_area_size(32)
        .build_cartesian_2d(x_min..x_max, 0.0..(y_max * 1.1))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_labels(4)
        .y_labels(4)
        .label_style(("sans-serif", 9))
        .draw()
        .map_err(plot_err)?;

    for (i, hist) in overlays {
        chart
            .draw_series(LineSeries::new(hist.step_points(), Palette99::pick(*i).stroke_width(2)))
            .map_err(plot_err)?;
    }
    Ok(())
}
