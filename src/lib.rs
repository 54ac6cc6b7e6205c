/// Error types for every stage of a run
pub mod error;

/// Subprocess execution seam
pub mod runner;

/// Configuration management
pub mod config;

/// External tool installation
pub mod deps;

/// Collector script invocation
pub mod collectors;

/// Parsers for the collected log files
pub mod tables;

/// Bar chart rendering and display
pub mod charts;

/// Log analysis and run reports
pub mod analysis;

/// Run orchestration
pub mod app;

// Re-export commonly used types
pub use app::{Diagnostics, RunSummary};
pub use config::Config;
pub use error::{AnalysisError, ChartError, CollectorError, ConfigError, InstallError, TableError};
