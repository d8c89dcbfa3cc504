//! Hospital Dashboard - Financial Indicator Comparison Viewer
//!
//! Loads hospital financial indicators from CSV, normalizes every indicator
//! against the earliest fiscal year, and compares hospitals on small-multiple
//! line charts.

mod charts;
mod data;
mod gui;

use data::DataSources;
use eframe::egui;
use gui::DashboardApp;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Hospital Compare"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Hospital Compare",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, DataSources::default())))),
    )
}
