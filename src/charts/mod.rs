//! Charts module - Comparison chart model and rendering

mod comparison;
mod format;
mod plotter;
mod renderer;

pub use comparison::{palette_rgb, ComparisonChart};
pub use format::{format_change, format_percent, format_value};
pub use plotter::{line_color, ChartPlotter};
pub use renderer::StaticChartRenderer;
