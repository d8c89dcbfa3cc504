//! Control Panel Widget
//! Left side panel with data source, hospital selection and export controls.

use crate::charts::line_color;
use crate::data::IndicatorSnapshot;
use crate::gui::{HospitalSelection, MAX_COMPARED};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side control panel holding the dashboard's UI selection state.
pub struct ControlPanel {
    pub data_dir: Option<PathBuf>,
    pub target: Option<String>,
    pub selection: HospitalSelection,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            data_dir: None,
            target: None,
            selection: HospitalSelection::new(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the target and comparison after a new dataset is loaded.
    pub fn reset_selection(&mut self) {
        self.target = None;
        self.selection = HospitalSelection::new();
        self.export_enabled = false;
    }

    /// Make `hospital` the target; the comparison restarts from it alone.
    pub fn set_target(&mut self, hospital: &str) {
        self.target = Some(hospital.to_string());
        self.selection = HospitalSelection::with_target(hospital);
        self.export_enabled = true;
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        snapshot: Option<&IndicatorSnapshot>,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 Hospital Compare")
                    .size(22.0)
                    .color(Color32::from_rgb(17, 158, 185)),
            );
            ui.label(
                RichText::new("Financial Indicators")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let dir_text = self
                        .data_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "No folder".to_string());
                    ui.label(RichText::new(&dir_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseDataDir;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let Some(snapshot) = snapshot else {
            self.show_status(ui);
            return action;
        };

        // ===== Target Hospital Section =====
        ui.label(RichText::new("🎯 Hospital").size(14.0).strong());
        ui.add_space(5.0);

        let combo_width = 260.0;
        let mut new_target: Option<String> = None;
        ComboBox::from_id_salt("target_hospital")
            .width(combo_width)
            .selected_text(self.target.as_deref().unwrap_or("Select one"))
            .show_ui(ui, |ui| {
                for hospital in &snapshot.all_hospitals {
                    let selected = self.target.as_deref() == Some(hospital.as_str());
                    if ui.selectable_label(selected, hospital).clicked() && !selected {
                        new_target = Some(hospital.clone());
                    }
                }
            });
        if let Some(hospital) = new_target {
            self.set_target(&hospital);
            action = ControlPanelAction::TargetChanged;
        }

        if self.target.is_some() {
            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            if self.show_comparison(ui, snapshot) {
                action = ControlPanelAction::SelectionChanged;
            }

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            // ===== Action Buttons =====
            ui.vertical_centered(|ui| {
                ui.add_enabled_ui(self.export_enabled, |ui| {
                    let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                        .min_size(egui::vec2(150.0, 30.0));
                    if ui.add(button).clicked() {
                        action = ControlPanelAction::ExportPng;
                    }
                });
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);
        self.show_status(ui);

        action
    }

    /// Comparison chips plus an add dropdown. Returns `true` on change.
    fn show_comparison(&mut self, ui: &mut egui::Ui, snapshot: &IndicatorSnapshot) -> bool {
        let mut changed = false;

        ui.label(
            RichText::new(format!(
                "⚖ Compare hospitals ({}/{})",
                self.selection.len(),
                MAX_COMPARED
            ))
            .size(14.0)
            .strong(),
        );
        ui.add_space(5.0);

        let mut removed: Option<String> = None;
        for (i, hospital) in self.selection.as_slice().iter().enumerate() {
            ui.horizontal(|ui| {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, line_color(i));
                ui.label(RichText::new(hospital).size(12.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✖").clicked() {
                        removed = Some(hospital.clone());
                    }
                });
            });
        }
        if let Some(hospital) = removed {
            changed |= self.selection.remove(&hospital);
        }

        ui.add_space(5.0);

        let mut added: Option<String> = None;
        ui.add_enabled_ui(!self.selection.is_full(), |ui| {
            ComboBox::from_id_salt("compare_hospital")
                .width(260.0)
                .selected_text("Add hospital…")
                .show_ui(ui, |ui| {
                    for hospital in &snapshot.all_hospitals {
                        if self.selection.contains(hospital) {
                            continue;
                        }
                        if ui.selectable_label(false, hospital).clicked() {
                            added = Some(hospital.clone());
                        }
                    }
                });
        });
        if let Some(hospital) = added {
            changed |= self.selection.add(&hospital);
        }

        changed
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    TargetChanged,
    SelectionChanged,
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_target_resets_selection() {
        let mut panel = ControlPanel::new();
        panel.set_target("Alpha");
        panel.selection.add("Beta");
        assert_eq!(panel.selection.len(), 2);

        panel.set_target("Gamma");
        assert_eq!(panel.target.as_deref(), Some("Gamma"));
        assert_eq!(panel.selection.as_slice(), ["Gamma".to_string()]);
        assert!(panel.export_enabled);
    }

    #[test]
    fn test_reset_selection() {
        let mut panel = ControlPanel::new();
        panel.set_target("Alpha");
        panel.reset_selection();
        assert_eq!(panel.target, None);
        assert!(panel.selection.is_empty());
        assert!(!panel.export_enabled);
    }
}
