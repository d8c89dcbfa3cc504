//! Chart Plotter Module
//! Draws interactive indicator comparison charts using egui_plot.

use crate::charts::{format_change, format_percent, format_value, palette_rgb, ComparisonChart};
use egui::{Align2, Color32, RichText};
use egui_plot::{GridMark, HLine, Line, Plot, PlotPoint, PlotPoints, Points, Text};

/// Horizontal room to the right of the last year for end labels
const LABEL_MARGIN_X: f64 = 0.45;
const LABEL_OFFSET_X: f64 = 0.08;

/// egui colour for a selection position.
pub fn line_color(color_index: usize) -> Color32 {
    let (r, g, b) = palette_rgb(color_index);
    Color32::from_rgb(r, g, b)
}

/// Draws small-multiple line charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one indicator chart with hover focus points and a tooltip.
    pub fn draw_indicator_chart(ui: &mut egui::Ui, chart: &ComparisonChart<'_>, height: f32) {
        let years: Vec<String> = chart.all_years().to_vec();
        let year_count = years.len();
        let last_x = year_count.saturating_sub(1) as f64;
        let (y_min, y_max) = chart.y_range().unwrap_or((0.0, 0.0));

        let plot_response = Plot::new(format!("indicator_{}", chart.indicator))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_x(false)
            .show_y(false)
            .include_x(0.0)
            .include_x(last_x + LABEL_MARGIN_X)
            .include_y(y_min)
            .include_y(y_max)
            .include_y(0.0)
            .x_grid_spacer(move |_input| {
                (0..year_count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                if mark.value < 0.0 || mark.value.fract() != 0.0 {
                    return String::new();
                }
                years
                    .get(mark.value as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_axis_formatter(|mark, _range| format_percent(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.hline(HLine::new(0.0).color(Color32::GRAY).width(1.0));

                for line in &chart.lines {
                    let color = line_color(line.color_index);
                    let points = PlotPoints::from(chart.points(line));
                    plot_ui.line(
                        Line::new(points)
                            .color(color)
                            .width(2.0)
                            .name(line.hospital),
                    );

                    if let Some(label) = chart.end_label(line) {
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(label.x + LABEL_OFFSET_X, label.y),
                                RichText::new(format_change(label.change))
                                    .size(11.0)
                                    .color(color),
                            )
                            .anchor(Align2::LEFT_CENTER),
                        );
                    }
                }

                let hovered_year = if plot_ui.response().hovered() {
                    plot_ui
                        .pointer_coordinate()
                        .and_then(|p| chart.nearest_year(p.x))
                } else {
                    None
                };

                if let Some(year) = hovered_year {
                    for (color_index, point) in chart.focus_points(year) {
                        plot_ui.points(
                            Points::new(vec![point])
                                .radius(4.0)
                                .filled(false)
                                .color(line_color(color_index)),
                        );
                    }
                }

                hovered_year
            });

        if let Some(year) = plot_response.inner {
            plot_response
                .response
                .on_hover_ui_at_pointer(|ui| Self::draw_tooltip(ui, chart, year));
        }
    }

    /// Tooltip table: per hospital, its value at the year and change since
    /// the baseline year.
    pub fn draw_tooltip(ui: &mut egui::Ui, chart: &ComparisonChart<'_>, year: &str) {
        let rows = chart.tooltip_at(year);
        if rows.is_empty() {
            ui.label(RichText::new(format!("No data for {}", year)).size(11.0));
            return;
        }

        let baseline = chart.snapshot.baseline_year().unwrap_or_default();

        egui::Grid::new(ui.make_persistent_id(format!("tooltip_{}", chart.indicator)))
            .min_col_width(60.0)
            .spacing([12.0, 2.0])
            .show(ui, |ui| {
                for row in rows {
                    let color = line_color(row.color_index);

                    ui.label(RichText::new(row.hospital).size(12.0).strong().color(color));
                    ui.end_row();

                    ui.label(RichText::new(year).size(11.0).color(color));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format_value(chart.indicator, row.value))
                                .size(11.0)
                                .color(color),
                        );
                    });
                    ui.end_row();

                    ui.label(
                        RichText::new(format!("Since {}", baseline))
                            .size(11.0)
                            .color(color),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format_change(row.change))
                                .size(11.0)
                                .color(color),
                        );
                    });
                    ui.end_row();
                }
            });
    }

    /// Legend chips for the selected hospitals.
    pub fn draw_legend(ui: &mut egui::Ui, hospitals: &[String]) {
        ui.horizontal_wrapped(|ui| {
            for (i, hospital) in hospitals.iter().enumerate() {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, line_color(i));
                ui.label(RichText::new(hospital).size(12.0));
                ui.add_space(10.0);
            }
        });
    }
}
