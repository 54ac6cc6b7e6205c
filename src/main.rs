use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use sysdiag::runner::SystemRunner;
use sysdiag::{Config, Diagnostics};

/// Command-line arguments for sysdiag
#[derive(Parser)]
#[command(
    name = "sysdiag",
    about = "Collect system diagnostic logs and chart memory and disk usage",
    long_about = "Runs a collector script that dumps `ps aux`, `vm_stat` and `df -h` output into a \
                  log directory, then parses those logs and renders bar charts of the top \
                  processes by memory usage and of filesystem usage."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    /// Directory the collector writes its logs into
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Collector script to run
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Base directory for charts and summaries
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Render charts without opening them
    #[arg(long)]
    no_display: bool,

    /// Do not check for or install external tools
    #[arg(long)]
    skip_install: bool,
}

impl Cli {
    /// Check that path arguments point at the right kind of filesystem entry
    ///
    /// Paths that do not exist yet are accepted: a missing config falls back
    /// to defaults, missing directories are created and a missing script is
    /// reported by the collector.
    ///
    /// # Returns
    ///
    /// `Ok(())` if every given path is usable, `Err(String)` naming the first
    /// offending argument otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(config_path) = self.config.as_deref().filter(|p| p.exists()) {
            if !config_path.is_file() {
                return Err(format!("--config is not a file: {}", config_path.display()));
            }
            if config_path.extension().map_or(true, |ext| ext != "toml") {
                warn!("{} is parsed as TOML despite its extension", config_path.display());
            }
        }

        let directories = [("--log-dir", &self.log_dir), ("--output-dir", &self.output_dir)];
        for (flag, dir) in directories {
            if let Some(dir) = dir.as_deref().filter(|d| d.exists() && !d.is_dir()) {
                return Err(format!("{} is not a directory: {}", flag, dir.display()));
            }
        }

        match self.script.as_deref() {
            Some(script) if script.is_dir() => {
                Err(format!("--script is a directory: {}", script.display()))
            }
            _ => Ok(()),
        }
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(ref log_dir) = self.log_dir {
            config.paths.log_dir = log_dir.clone();
        }
        if let Some(ref script) = self.script {
            config.paths.script = script.clone();
        }
        if let Some(ref output_dir) = self.output_dir {
            config.paths.output_dir = output_dir.clone();
        }
        if self.no_display {
            config.display.enabled = false;
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref());
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let runner = SystemRunner;
    let summary = Diagnostics::new(&config, &runner)
        .skip_install(cli.skip_install)
        .run()
        .context("Failed to install required tools")?;

    for chart in summary.report.charts() {
        println!("Chart: {}", chart.display());
    }
    for problem in &summary.report.errors {
        warn!("{}", problem);
    }
    info!("Results in {}", summary.run_dir.display());
    Ok(())
}

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting sysdiag");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("sysdiag finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli {
            config: None,
            verbose: false,
            log_dir: None,
            script: None,
            output_dir: None,
            no_display: false,
            skip_install: false,
        }
    }

    #[test]
    fn test_cli_validation_with_existing_file() {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "[analysis]\ntop_n = 5").unwrap();

        let cli = Cli {
            config: Some(temp_file.path().to_path_buf()),
            ..cli()
        };

        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            ..cli()
        };

        // Missing files are handled gracefully
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            config: Some(dir.path().to_path_buf()),
            ..cli()
        };

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_log_dir_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cli = Cli {
            log_dir: Some(file.path().to_path_buf()),
            ..cli()
        };

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_script_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            script: Some(dir.path().to_path_buf()),
            ..cli()
        };

        let err = cli.validate().unwrap_err();
        assert!(err.starts_with("--script"));
    }

    #[test]
    fn test_cli_validation_output_dir_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cli = Cli {
            output_dir: Some(file.path().to_path_buf()),
            ..cli()
        };

        let err = cli.validate().unwrap_err();
        assert!(err.starts_with("--output-dir"));
    }

    #[test]
    fn test_cli_validation_no_args() {
        assert!(cli().validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli {
            log_dir: Some(PathBuf::from("/var/logs")),
            script: Some(PathBuf::from("/opt/collect.sh")),
            output_dir: Some(PathBuf::from("/var/reports")),
            no_display: true,
            ..cli()
        };

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.paths.log_dir, PathBuf::from("/var/logs"));
        assert_eq!(config.paths.script, PathBuf::from("/opt/collect.sh"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/var/reports"));
        assert!(!config.display.enabled);
    }

    #[test]
    fn test_apply_without_overrides_keeps_config() {
        let mut config = Config::default();
        cli().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "sysdiag",
            "--log-dir",
            "/tmp/logs",
            "--no-display",
            "--skip-install",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert!(cli.no_display);
        assert!(cli.skip_install);
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }
}
