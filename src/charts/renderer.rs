//! Static Chart Renderer
//! Writes the current small-multiple charts to a PNG image with plotters.
//!
//! Layout: one panel per indicator, two panels per row. Each panel has the
//! indicator as caption, fiscal years on x, change in percent on y, a zero
//! line, one line per selected hospital and its final change as a label.

use crate::charts::{format_change, format_percent, palette_rgb, ComparisonChart};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const PANEL_WIDTH: u32 = 560;
const PANEL_HEIGHT: u32 = 240;
const COLUMNS: usize = 2;
const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No charts to render")]
    Empty,
    #[error("Chart rendering failed: {0}")]
    Backend(String),
}

fn backend_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all charts into a single PNG at `path`.
    pub fn render_png(charts: &[ComparisonChart<'_>], path: &Path) -> Result<(), RenderError> {
        if charts.is_empty() {
            return Err(RenderError::Empty);
        }

        let (rows, cols) = Self::grid(charts.len());
        let size = (PANEL_WIDTH * cols as u32, PANEL_HEIGHT * rows as u32);

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        let panels = root.split_evenly((rows, cols));
        for (chart, panel) in charts.iter().zip(panels.iter()) {
            Self::draw_panel(panel, chart)?;
        }

        root.present().map_err(backend_err)?;
        info!(path = %path.display(), charts = charts.len(), "charts exported");
        Ok(())
    }

    /// Rows and columns needed for `count` panels.
    fn grid(count: usize) -> (usize, usize) {
        let cols = COLUMNS.min(count).max(1);
        (count.div_ceil(cols), cols)
    }

    /// Y range with some headroom; never empty.
    fn padded_range(range: Option<(f64, f64)>) -> (f64, f64) {
        match range {
            None => (-0.1, 0.1),
            Some((lo, hi)) if hi - lo < f64::EPSILON => (lo - 0.1, hi + 0.1),
            Some((lo, hi)) => {
                let pad = (hi - lo) * 0.1;
                (lo - pad, hi + pad)
            }
        }
    }

    fn year_label(years: &[String], x: f64) -> String {
        if x < 0.0 || x.fract() != 0.0 {
            return String::new();
        }
        years.get(x as usize).cloned().unwrap_or_default()
    }

    fn draw_panel<DB: DrawingBackend>(
        panel: &DrawingArea<DB, Shift>,
        chart: &ComparisonChart<'_>,
    ) -> Result<(), RenderError> {
        let years = chart.all_years();
        let last_x = years.len().saturating_sub(1).max(1) as f64;
        let (y_min, y_max) = Self::padded_range(chart.y_range());

        let mut ctx = ChartBuilder::on(panel)
            .caption(chart.indicator, (FONT, 16))
            .margin(8)
            .x_label_area_size(22)
            .y_label_area_size(52)
            .build_cartesian_2d(0f64..last_x + 0.4, y_min..y_max)
            .map_err(backend_err)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(years.len().max(2))
            .x_label_formatter(&|x| Self::year_label(years, *x))
            .y_labels(5)
            .y_label_formatter(&|y| format_percent(*y))
            .draw()
            .map_err(backend_err)?;

        ctx.draw_series(LineSeries::new(
            [(0.0, 0.0), (last_x, 0.0)],
            &BLACK.mix(0.3),
        ))
        .map_err(backend_err)?;

        for line in &chart.lines {
            let (r, g, b) = palette_rgb(line.color_index);
            let color = RGBColor(r, g, b);
            let points: Vec<(f64, f64)> = chart
                .points(line)
                .into_iter()
                .map(|[x, y]| (x, y))
                .collect();

            ctx.draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(backend_err)?
                .label(line.hospital)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });

            if let Some(label) = chart.end_label(line) {
                ctx.draw_series(std::iter::once(Text::new(
                    format_change(label.change),
                    (label.x + 0.05, label.y),
                    (FONT, 12).into_font().color(&color),
                )))
                .map_err(backend_err)?;
            }
        }

        if !chart.lines.is_empty() {
            ctx.configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK.mix(0.3))
                .draw()
                .map_err(backend_err)?;
        }

        Ok(())
    }
}
