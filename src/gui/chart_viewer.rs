//! Chart Viewer Widget
//! Scrollable grid of per-indicator comparison charts.
//! Supports responsive multi-column layout based on available width.

use crate::charts::{line_color, ChartPlotter, ComparisonChart};
use crate::data::IndicatorSnapshot;
use crate::gui::HospitalSelection;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 200.0;
const CHART_WIDTH: f32 = 440.0;
const PLOT_HEIGHT: f32 = 120.0;

const WARNING_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Small-multiple display for the financial performance tab.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw one card per indicator of the target hospital.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        snapshot: &IndicatorSnapshot,
        target: &str,
        selection: &HospitalSelection,
    ) {
        if selection.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Add a hospital to compare").size(20.0));
            });
            return;
        }

        let charts = ComparisonChart::for_target(snapshot, target, selection.as_slice());
        if charts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No indicators for this hospital").size(20.0));
            });
            return;
        }

        ChartPlotter::draw_legend(ui, selection.as_slice());
        ui.add_space(8.0);

        // Calculate how many columns fit in available width
        let avail_width = ui.available_width();
        let card_total_width = CHART_WIDTH + CHART_SPACING;
        let num_columns = ((avail_width / card_total_width).floor() as usize).max(1);

        let total_rows = charts.len().div_ceil(num_columns);
        let row_height = CARD_HEIGHT + CHART_SPACING;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, total_rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        for col in 0..num_columns {
                            if let Some(chart) = charts.get(row * num_columns + col) {
                                Self::draw_chart_card(ui, chart);
                                ui.add_space(CHART_SPACING);
                            }
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, chart: &ComparisonChart<'_>) {
        let card_width = CHART_WIDTH - 20.0;

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(
                1.0,
                ui.visuals().widgets.noninteractive.bg_stroke.color,
            ))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(card_width);
                ui.vertical(|ui| {
                    ui.label(RichText::new(chart.indicator).size(15.0).strong());

                    if !chart.missing_baseline.is_empty() {
                        ui.label(
                            RichText::new(format!(
                                "⚠ No baseline: {}",
                                chart.missing_baseline.join(", ")
                            ))
                            .size(11.0)
                            .color(WARNING_COLOR),
                        );
                    }

                    ChartPlotter::draw_indicator_chart(ui, chart, PLOT_HEIGHT);

                    if chart.is_empty() {
                        ui.label(
                            RichText::new("No comparable series selected")
                                .size(11.0)
                                .color(Color32::GRAY),
                        );
                    } else {
                        Self::draw_line_summary(ui, chart);
                    }
                });
            });
    }

    /// Compact list of hospitals drawn on this card, first selected first.
    fn draw_line_summary(ui: &mut egui::Ui, chart: &ComparisonChart<'_>) {
        ui.horizontal_wrapped(|ui| {
            for line in chart.lines.iter().rev() {
                ui.label(
                    RichText::new(format!("● {}", line.hospital))
                        .size(10.0)
                        .color(line_color(line.color_index)),
                );
            }
        });
    }
}
