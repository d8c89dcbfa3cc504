//! Hospital Dashboard Main Application
//! Main window with control panel, indicator charts and raw data tabs.

use crate::charts::{ComparisonChart, StaticChartRenderer};
use crate::data::{
    DataLoader, DataSources, IndicatorNormalizer, IndicatorSnapshot, LoadedData, RawTable,
};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, TableView};
use anyhow::{Context, Result};
use egui::{RichText, SidePanel};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

/// Dataset loading result from background thread
enum LoadResult {
    Complete(Box<LoadedData>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    FinancialPerformance,
    TopDischarges,
    DischargesByLocation,
}

/// Main application window.
pub struct DashboardApp {
    sources: DataSources,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    active_tab: Tab,

    // Built once per load, read-only afterwards
    snapshot: Option<IndicatorSnapshot>,
    top_discharges: RawTable,
    discharges_by_location: RawTable,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, sources: DataSources) -> Self {
        let mut app = Self {
            sources,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            active_tab: Tab::FinancialPerformance,
            snapshot: None,
            top_discharges: RawTable::default(),
            discharges_by_location: RawTable::default(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load all datasets in a background thread
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        self.snapshot = None;
        self.top_discharges = RawTable::default();
        self.discharges_by_location = RawTable::default();
        self.control_panel.reset_selection();
        self.control_panel.data_dir = self.sources.data_dir().map(Path::to_path_buf);
        self.control_panel.set_status("Loading datasets...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let loader = DataLoader::new(self.sources.clone());
        thread::spawn(move || {
            let result = match loader.load_all() {
                Ok(data) => LoadResult::Complete(Box::new(data)),
                Err(e) => {
                    error!(error = %e, "dataset load failed");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            match rx.try_recv() {
                Ok(LoadResult::Complete(data)) => {
                    self.apply_loaded(*data);
                    self.is_loading = false;
                }
                Ok(LoadResult::Error(e)) => {
                    self.control_panel.set_status(&format!("Error: {}", e));
                    self.is_loading = false;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {
                    self.load_rx = Some(rx);
                }
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    self.control_panel
                        .set_status("Error: loader stopped without a result");
                    self.is_loading = false;
                }
            }
        }
    }

    /// Normalize the financial records and keep the result as the snapshot.
    fn apply_loaded(&mut self, data: LoadedData) {
        let snapshot = IndicatorNormalizer::normalize(&data.financial);
        let report = snapshot.report();

        if !report.is_clean() {
            warn!(
                groups = report.missing_baselines.len(),
                "indicator groups without a baseline value"
            );
        }
        info!(
            hospitals = snapshot.all_hospitals.len(),
            years = snapshot.all_years.len(),
            normalized_groups = report.normalized_groups,
            "dashboard ready"
        );

        let mut status = format!(
            "Loaded {} hospitals, {} fiscal years",
            snapshot.all_hospitals.len(),
            snapshot.all_years.len()
        );
        if !report.is_clean() {
            status.push_str(&format!(
                " ({} groups without baseline)",
                report.missing_baselines.len()
            ));
        }
        self.control_panel.set_status(&status);

        self.snapshot = Some(snapshot);
        self.top_discharges = data.top_discharges;
        self.discharges_by_location = data.discharges_by_location;
    }

    /// Pick another data folder and reload
    fn handle_browse_data_dir(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            info!(dir = %dir.display(), "data folder selected");
            self.sources = DataSources::in_dir(dir);
            self.start_loading();
        }
    }

    /// Handle PNG export - render current charts and open the image
    fn handle_export_png(&mut self) {
        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("hospital_comparison.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match self.export_png(&output_path) {
            Ok(count) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts", count));
                if let Err(e) = open::that(&output_path) {
                    warn!(error = %e, path = %output_path.display(), "could not open export");
                }
            }
            Err(e) => {
                error!("export failed: {:#}", e);
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }

    fn export_png(&self, path: &Path) -> Result<usize> {
        let snapshot = self.snapshot.as_ref().context("no data loaded")?;
        let target = self
            .control_panel
            .target
            .as_deref()
            .context("no hospital selected")?;

        let charts = ComparisonChart::for_target(
            snapshot,
            target,
            self.control_panel.selection.as_slice(),
        );
        StaticChartRenderer::render_png(&charts, path)
            .with_context(|| format!("rendering {}", path.display()))?;
        Ok(charts.len())
    }

    fn show_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(
                &mut self.active_tab,
                Tab::FinancialPerformance,
                RichText::new("Financial Performance").size(14.0),
            );
            ui.selectable_value(
                &mut self.active_tab,
                Tab::TopDischarges,
                RichText::new("Top Discharges").size(14.0),
            );
            ui.selectable_value(
                &mut self.active_tab,
                Tab::DischargesByLocation,
                RichText::new("Discharges by Location").size(14.0),
            );
        });
        ui.separator();
    }

    fn show_central(&mut self, ui: &mut egui::Ui) {
        let Some(snapshot) = &self.snapshot else {
            let message = if self.is_loading {
                "Loading..."
            } else {
                "No Data"
            };
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(message).size(20.0));
            });
            return;
        };

        match self.active_tab {
            Tab::FinancialPerformance => match self.control_panel.target.as_deref() {
                Some(target) => {
                    self.chart_viewer
                        .show(ui, snapshot, target, &self.control_panel.selection)
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Select a hospital").size(20.0));
                    });
                }
            },
            Tab::TopDischarges => TableView::show(ui, "top_discharges", &self.top_discharges),
            Tab::DischargesByLocation => {
                TableView::show(ui, "discharges_by_location", &self.discharges_by_location)
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.snapshot.as_ref());

                    match action {
                        ControlPanelAction::BrowseDataDir => self.handle_browse_data_dir(),
                        ControlPanelAction::TargetChanged => {
                            self.active_tab = Tab::FinancialPerformance;
                        }
                        ControlPanelAction::SelectionChanged => {}
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - tabs
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_tabs(ui);
            self.show_central(ui);
        });
    }
}
