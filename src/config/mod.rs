/// Configuration loading and validation
#[allow(clippy::module_inception)]
pub mod config;

pub use config::{
    AnalysisConfig, CollectorConfig, Config, DisplayConfig, InstallConfig, PathsConfig,
    Requirement, TablesConfig,
};
