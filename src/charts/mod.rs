/// Horizontal bar chart rendering
pub mod bar;

/// Opening rendered charts in an external viewer
pub mod viewer;

pub use bar::BarChart;
pub use viewer::ChartViewer;
