//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod selection;
mod table_view;

pub use app::DashboardApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use selection::{HospitalSelection, MAX_COMPARED};
pub use table_view::TableView;
