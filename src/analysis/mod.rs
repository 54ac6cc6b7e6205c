/// Loading and charting of the collected logs
pub mod analyzer;

/// Result of one analysis pass
pub mod report;

pub use analyzer::LogAnalyzer;
pub use report::AnalysisReport;
