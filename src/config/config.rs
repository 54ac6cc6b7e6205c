use crate::error::ConfigError;
use crate::tables::disk::DEFAULT_DISK_COLUMNS;
use crate::tables::process::DEFAULT_PROCESS_COLUMNS;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
///
/// Every section has defaults, so an empty file (or no file at all) is a
/// valid configuration. Command-line flags are applied on top of this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub collector: CollectorConfig,
    pub tables: TablesConfig,
    pub analysis: AnalysisConfig,
    pub display: DisplayConfig,
    pub install: InstallConfig,
}

/// Filesystem locations used by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory the collector script writes its logs into
    pub log_dir: PathBuf,
    /// Collector script to execute before analysis
    pub script: PathBuf,
    /// Base directory for rendered charts and run summaries
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("/tmp/sysdiag_logs"),
            script: PathBuf::from("./collect_logs.sh"),
            output_dir: PathBuf::from("/tmp/sysdiag_reports"),
        }
    }
}

/// How the collector script is run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Interpreter the script is handed to
    pub shell: String,
    /// Where to save the script's captured stdout, if anywhere
    pub output_file: Option<PathBuf>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            output_file: None,
        }
    }
}

/// Names of the log artifacts and their column schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub process_file: String,
    pub vm_file: String,
    pub disk_file: String,
    pub process_columns: Vec<String>,
    pub disk_columns: Vec<String>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            process_file: "ps_aux.txt".to_string(),
            vm_file: "vm_stats.txt".to_string(),
            disk_file: "disk_usage.txt".to_string(),
            process_columns: DEFAULT_PROCESS_COLUMNS.iter().map(|s| s.to_string()).collect(),
            disk_columns: DEFAULT_DISK_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Analysis knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of processes shown in the memory chart
    pub top_n: usize,
    /// Rows printed per table preview
    pub preview_rows: usize,
    /// Lines of vm_stat output printed
    pub vm_preview_lines: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            preview_rows: 5,
            vm_preview_lines: 10,
        }
    }
}

/// Chart display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Open each rendered chart with the viewer
    pub enabled: bool,
    /// Program that opens an SVG file
    pub viewer: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            viewer: default_viewer().to_string(),
        }
    }
}

fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// External tools that must be present before a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Treat any failed installation as fatal
    pub strict: bool,
    pub requirements: Vec<Requirement>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            strict: true,
            requirements: vec![Requirement::new(default_viewer())],
        }
    }
}

/// A single external program and how to install it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Executable name probed on the PATH
    pub program: String,
    /// Homebrew formula, defaults to `program`
    #[serde(default)]
    pub brew_formula: Option<String>,
    /// Installer argv used when Homebrew is not available
    #[serde(default)]
    pub fallback: Vec<String>,
}

impl Requirement {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            brew_formula: None,
            fallback: Vec::new(),
        }
    }

    /// Formula passed to `brew install`
    pub fn formula(&self) -> &str {
        self.brew_formula.as_deref().unwrap_or(&self.program)
    }
}

impl Config {
    /// Read, parse and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        debug!("Parsed configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from file or use defaults
    ///
    /// A missing or unreadable file falls back to defaults with a warning.
    /// An invalid file is reported and defaults are used as well, so a bad
    /// config never prevents a run.
    pub fn load(path: Option<&Path>) -> Config {
        match path {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                match Config::from_file(path) {
                    Ok(config) => config,
                    Err(ConfigError::ReadError(e)) => {
                        warn!("Configuration file not found or unreadable ({}), using defaults", e);
                        Config::default()
                    }
                    Err(e) => {
                        error!("Configuration error in '{}': {}", path.display(), e);
                        warn!("Using default configuration due to invalid config file");
                        Config::default()
                    }
                }
            }
            None => {
                info!("Using default configuration");
                Config::default()
            }
        }
    }

    /// Check value ranges and column schemas
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables.process_columns.len() != DEFAULT_PROCESS_COLUMNS.len() {
            return Err(ConfigError::ValidationError(format!(
                "tables.process_columns must name exactly {} columns, got {}",
                DEFAULT_PROCESS_COLUMNS.len(),
                self.tables.process_columns.len()
            )));
        }
        if self.tables.disk_columns.len() != DEFAULT_DISK_COLUMNS.len() {
            return Err(ConfigError::ValidationError(format!(
                "tables.disk_columns must name exactly {} columns, got {}",
                DEFAULT_DISK_COLUMNS.len(),
                self.tables.disk_columns.len()
            )));
        }

        for (key, name) in [
            ("tables.process_file", &self.tables.process_file),
            ("tables.vm_file", &self.tables.vm_file),
            ("tables.disk_file", &self.tables.disk_file),
            ("collector.shell", &self.collector.shell),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
            }
        }

        if self.analysis.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.top_n must be at least 1".to_string(),
            ));
        }

        if self.display.enabled && self.display.viewer.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "display.viewer must be set when display is enabled".to_string(),
            ));
        }

        if let Some(req) = self
            .install
            .requirements
            .iter()
            .find(|r| r.program.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "install requirement has an empty program name: {:?}",
                req
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.tables.process_file, "ps_aux.txt");
        assert_eq!(config.tables.process_columns.len(), 11);
        assert_eq!(config.tables.disk_columns.len(), 6);
        assert!(config.install.strict);
        assert_eq!(config.install.requirements.len(), 1);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = Config::from_toml_str(
            r#"
            [paths]
            log_dir = "/var/tmp/logs"

            [analysis]
            top_n = 3

            [display]
            enabled = false

            [[install.requirements]]
            program = "rsvg-convert"
            brew_formula = "librsvg"
            fallback = ["apt-get", "install", "-y", "librsvg2-bin"]
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.log_dir, PathBuf::from("/var/tmp/logs"));
        assert_eq!(config.paths.script, PathsConfig::default().script);
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.analysis.preview_rows, 5);
        assert!(!config.display.enabled);
        assert_eq!(config.install.requirements.len(), 1);
        assert_eq!(config.install.requirements[0].formula(), "librsvg");
        assert_eq!(config.install.requirements[0].fallback.len(), 4);
    }

    #[test]
    fn test_requirement_formula_defaults_to_program() {
        let req = Requirement::new("xdg-open");
        assert_eq!(req.formula(), "xdg-open");
    }

    #[test]
    fn test_wrong_column_count_rejected() {
        let result = Config::from_toml_str(
            r#"
            [tables]
            disk_columns = ["Filesystem", "Size"]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let result = Config::from_toml_str("[analysis]\ntop_n = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_empty_viewer_rejected_only_when_display_enabled() {
        let result = Config::from_toml_str("[display]\nviewer = \"\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let result = Config::from_toml_str("[display]\nenabled = false\nviewer = \"\"\n");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[paths\nlog_dir = 3");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(Path::new("/nonexistent/sysdiag.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[collector]\nshell = \"sh\"\noutput_file = \"/tmp/out.txt\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.collector.shell, "sh");
        assert_eq!(
            config.collector.output_file,
            Some(PathBuf::from("/tmp/out.txt"))
        );
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        assert_eq!(Config::load(None), Config::default());
        assert_eq!(
            Config::load(Some(Path::new("/nonexistent/sysdiag.toml"))),
            Config::default()
        );

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ntop_n = 0").unwrap();
        assert_eq!(Config::load(Some(file.path())), Config::default());
    }
}
