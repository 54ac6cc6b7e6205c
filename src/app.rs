//! Run orchestration: install check, collector script, log analysis

use crate::analysis::{AnalysisReport, LogAnalyzer};
use crate::charts::ChartViewer;
use crate::collectors::ScriptCollector;
use crate::config::{Config, Requirement};
use crate::deps::DependencyEnsurer;
use crate::error::{AnalysisError, InstallError};
use crate::runner::CommandRunner;
use chrono::Local;
use log::{debug, error, info, warn};
use std::path::PathBuf;

pub const SUMMARY_FILE: &str = "summary.json";

/// Outcome of a complete run
#[derive(Debug)]
pub struct RunSummary {
    /// Stdout of the collector script, `None` if it failed
    pub collector_output: Option<String>,
    /// Directory holding this run's charts and summary
    pub run_dir: PathBuf,
    pub report: AnalysisReport,
}

/// Sequences one diagnostics run
///
/// Nothing here is shared or long-lived: each step finishes before the next
/// one starts.
pub struct Diagnostics<'a, R: CommandRunner> {
    config: &'a Config,
    runner: &'a R,
    skip_install: bool,
}

impl<'a, R: CommandRunner> Diagnostics<'a, R> {
    pub fn new(config: &'a Config, runner: &'a R) -> Self {
        Self {
            config,
            runner,
            skip_install: false,
        }
    }

    /// Do not check or install external tools
    pub fn skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    /// Run every step in order
    ///
    /// # Errors
    ///
    /// Only an installation failure under `install.strict` is returned. A
    /// failed collector script is logged and analysis runs on whatever
    /// files are already in the log directory.
    pub fn run(&self) -> Result<RunSummary, InstallError> {
        let display = self.ensure_dependencies()?;

        let collector = ScriptCollector::new(self.runner, self.config.collector.shell.clone())
            .with_output_file(self.config.collector.output_file.clone());
        let collector_output = collector.run(&self.config.paths.script);
        if collector_output.is_none() {
            warn!(
                "Collector script failed, analyzing existing logs in {}",
                self.config.paths.log_dir.display()
            );
        }

        let run_dir = self
            .config
            .paths
            .output_dir
            .join(Local::now().format("%Y%m%d_%H%M%S").to_string());
        debug!("Run directory: {}", run_dir.display());

        let mut analyzer =
            LogAnalyzer::new(&self.config.tables, &self.config.analysis, run_dir.clone());
        if display {
            analyzer = analyzer.with_viewer(ChartViewer::new(
                self.runner,
                self.config.display.viewer.clone(),
            ));
        }
        let report = analyzer.load_and_analyze(&self.config.paths.log_dir);

        if let Err(e) = std::fs::create_dir_all(&run_dir)
            .map_err(AnalysisError::from)
            .and_then(|_| report.write_json(&run_dir.join(SUMMARY_FILE)))
        {
            warn!("Failed to write run summary: {}", e);
        }

        Ok(RunSummary {
            collector_output,
            run_dir,
            report,
        })
    }

    /// Returns whether charts should be displayed
    ///
    /// With display turned off the viewer is not needed, so its requirement
    /// is left out of the check.
    fn ensure_dependencies(&self) -> Result<bool, InstallError> {
        let display = self.config.display.enabled;
        if self.skip_install {
            info!("Skipping dependency check");
            return Ok(display);
        }

        let requirements: Vec<Requirement> = self
            .config
            .install
            .requirements
            .iter()
            .filter(|req| display || req.program != self.config.display.viewer)
            .cloned()
            .collect();
        if requirements.len() < self.config.install.requirements.len() {
            debug!(
                "Display disabled, not checking for {}",
                self.config.display.viewer
            );
        }

        let ensurer = DependencyEnsurer::new(self.runner);
        match ensurer.ensure_all(&requirements) {
            Ok(outcomes) => {
                debug!("Dependency check: {:?}", outcomes);
                Ok(display)
            }
            Err(e) if self.config.install.strict => {
                error!("Error installing dependencies: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!("Error installing dependencies: {}", e);
                warn!("Continuing without chart display");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, MockCommandRunner};
    use mockall::predicate::eq;
    use tempfile::{tempdir, NamedTempFile, TempDir};

    const DF: &str = "/dev/sda1 98G 41G 52G 45% /\n";

    struct Fixture {
        logs: TempDir,
        out: TempDir,
        script: NamedTempFile,
        config: Config,
    }

    fn fixture() -> Fixture {
        let logs = tempdir().unwrap();
        let out = tempdir().unwrap();
        let script = NamedTempFile::new().unwrap();

        let mut config = Config::default();
        config.paths.log_dir = logs.path().to_path_buf();
        config.paths.output_dir = out.path().to_path_buf();
        config.paths.script = script.path().to_path_buf();
        config.display.viewer = "viewer".to_string();
        config.install.requirements = vec![Requirement::new("viewer")];

        Fixture {
            logs,
            out,
            script,
            config,
        }
    }

    #[test]
    fn test_run_sequences_all_steps() {
        let f = fixture();
        std::fs::write(f.logs.path().join("disk_usage.txt"), DF).unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_probe()
            .with(eq("viewer"))
            .times(1)
            .return_const(true);
        runner
            .expect_run()
            .withf(|program, _| program == "bash")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("collected")));
        runner
            .expect_run()
            .withf(|program, _| program == "viewer")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("")));

        let summary = Diagnostics::new(&f.config, &runner).run().unwrap();

        assert_eq!(summary.collector_output.as_deref(), Some("collected"));
        assert!(summary.run_dir.starts_with(f.out.path()));
        assert!(summary.report.disk_chart.is_some());
        assert!(summary.run_dir.join(SUMMARY_FILE).exists());
        assert!(f.script.path().exists());
    }

    #[test]
    fn test_failed_collector_still_analyzes() {
        let f = fixture();
        std::fs::write(f.logs.path().join("disk_usage.txt"), DF).unwrap();

        let mut config = f.config.clone();
        config.display.enabled = false;
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failed(1, "collector crashed")));

        let summary = Diagnostics::new(&config, &runner)
            .skip_install(true)
            .run()
            .unwrap();

        assert!(summary.collector_output.is_none());
        assert_eq!(summary.report.disks.len(), 1);
        assert!(summary.report.disk_chart.is_some());
    }

    #[test]
    fn test_strict_install_failure_aborts_before_collector() {
        let f = fixture();

        let mut runner = MockCommandRunner::new();
        runner.expect_probe().return_const(false);
        runner.expect_run().never();

        let result = Diagnostics::new(&f.config, &runner).run();
        assert!(matches!(result, Err(InstallError::NoInstaller(_))));
    }

    #[test]
    fn test_strict_applies_to_homebrew_branch_too() {
        let f = fixture();

        let mut runner = MockCommandRunner::new();
        runner.expect_probe().with(eq("viewer")).return_const(false);
        runner.expect_probe().with(eq("brew")).return_const(true);
        runner
            .expect_run()
            .withf(|program, _| program == "brew")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failed(1, "formula not found")));

        let result = Diagnostics::new(&f.config, &runner).run();
        assert!(matches!(result, Err(InstallError::PackageManager { .. })));
    }

    #[test]
    fn test_lenient_install_failure_disables_display() {
        let mut f = fixture();
        f.config.install.strict = false;
        std::fs::write(f.logs.path().join("disk_usage.txt"), DF).unwrap();

        let mut runner = MockCommandRunner::new();
        runner.expect_probe().return_const(false);
        runner
            .expect_run()
            .withf(|program, _| program == "bash")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("")));
        runner
            .expect_run()
            .withf(|program, _| program == "viewer")
            .never();

        let summary = Diagnostics::new(&f.config, &runner).run().unwrap();
        assert!(summary.report.disk_chart.is_some());
    }

    #[test]
    fn test_disabled_display_does_not_require_viewer() {
        let mut f = fixture();
        f.config.display.enabled = false;
        std::fs::write(f.logs.path().join("disk_usage.txt"), DF).unwrap();

        let mut runner = MockCommandRunner::new();
        runner.expect_probe().never();
        runner
            .expect_run()
            .withf(|program, _| program == "bash")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("")));

        let summary = Diagnostics::new(&f.config, &runner).run().unwrap();
        assert!(summary.report.disk_chart.is_some());
    }

    #[test]
    fn test_disabled_display_still_checks_other_tools() {
        let mut f = fixture();
        f.config.display.enabled = false;
        f.config.install.requirements.push(Requirement::new("jq"));

        let mut runner = MockCommandRunner::new();
        runner.expect_probe().with(eq("viewer")).never();
        runner.expect_probe().with(eq("jq")).return_const(false);
        runner.expect_probe().with(eq("brew")).return_const(false);
        runner.expect_run().never();

        let result = Diagnostics::new(&f.config, &runner).run();
        assert!(matches!(result, Err(InstallError::NoInstaller(ref p)) if p == "jq"));
    }
}
