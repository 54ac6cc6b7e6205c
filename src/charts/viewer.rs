use crate::error::ChartError;
use crate::runner::CommandRunner;
use log::{debug, info};
use std::path::Path;

/// Opens rendered charts with an external program
///
/// The call blocks until the viewer process returns. Whether that means
/// "until the window is closed" depends on the viewer.
pub struct ChartViewer<'a, R: CommandRunner> {
    runner: &'a R,
    program: String,
}

impl<'a, R: CommandRunner> ChartViewer<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Open `chart` and wait for the viewer to exit
    ///
    /// # Errors
    ///
    /// `ChartError::Viewer` if the viewer cannot be started or exits with
    /// a non-zero status.
    pub fn show(&self, chart: &Path) -> Result<(), ChartError> {
        info!("Opening {} with {}", chart.display(), self.program);

        let args = vec![chart.display().to_string()];
        let output = self
            .runner
            .run(&self.program, &args)
            .map_err(|e| ChartError::Viewer(format!("{}: {}", self.program, e)))?;

        if !output.success {
            return Err(ChartError::Viewer(format!(
                "{} exited with status {:?}: {}",
                self.program,
                output.code,
                output.stderr.trim()
            )));
        }

        debug!("Viewer returned for {}", chart.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, MockCommandRunner};
    use mockall::predicate::eq;

    #[test]
    fn test_show_runs_viewer_with_chart_path() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .with(eq("open"), eq(vec!["/tmp/chart.svg".to_string()]))
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("")));

        let viewer = ChartViewer::new(&runner, "open");
        assert!(viewer.show(Path::new("/tmp/chart.svg")).is_ok());
    }

    #[test]
    fn test_show_reports_viewer_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(CommandOutput::failed(4, "no display")));

        let viewer = ChartViewer::new(&runner, "xdg-open");
        let result = viewer.show(Path::new("/tmp/chart.svg"));
        match result {
            Err(ChartError::Viewer(msg)) => assert!(msg.contains("no display")),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_show_reports_spawn_failure() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not found",
            ))
        });

        let viewer = ChartViewer::new(&runner, "missing-viewer");
        assert!(matches!(
            viewer.show(Path::new("/tmp/chart.svg")),
            Err(ChartError::Viewer(_))
        ));
    }
}
