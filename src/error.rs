use thiserror::Error;

/// Errors that can occur while running the collector script
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Collector script not found: {0}")]
    ScriptNotFound(String),

    #[error("Failed to spawn subprocess: {0}")]
    SubprocessSpawn(String),

    #[error("Collector script exited with status {code:?}: {stderr}")]
    ScriptFailed { code: Option<i32>, stderr: String },
}

/// Errors that can occur while parsing a log file into a table
#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Line {line}: expected {expected} fields, found {found}")]
    MissingFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid value '{value}' in column {column}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Expected {expected} column names, got {found}")]
    Schema { expected: usize, found: usize },
}

/// Errors that can occur when rendering or displaying a chart
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart '{0}' has no bars to draw")]
    Empty(String),

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("Chart viewer failed: {0}")]
    Viewer(String),
}

/// Errors that can occur while ensuring an external tool is installed
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Homebrew failed to install {formula}: {reason}")]
    PackageManager { formula: String, reason: String },

    #[error("Fallback installer for {program} failed: {reason}")]
    Fallback { program: String, reason: String },

    #[error("{0} is missing and no installer is available")]
    NoInstaller(String),

    #[error("{0} is still missing after installation")]
    StillMissing(String),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors that can occur while analyzing one log artifact
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to parse table: {0}")]
    Table(#[from] TableError),

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
