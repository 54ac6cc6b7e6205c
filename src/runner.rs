//! Thin wrapper over subprocess execution
//!
//! Everything that shells out (installers, the collector script, the chart
//! viewer) goes through [`CommandRunner`] so it can be mocked in tests.

use log::debug;
use std::process::Command;

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8)
    pub stdout: String,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout and stderr joined, skipping empty streams
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.trim_end().to_string(),
            (true, false) => self.stderr.trim_end().to_string(),
            (true, true) => String::new(),
        }
    }
}

/// Executes external programs and waits for them to finish
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits
    fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;

    /// Whether `program` can be found by the shell
    ///
    /// The name is passed as a positional parameter, never spliced into the
    /// script, so shell metacharacters in it are not interpreted.
    fn probe(&self, program: &str) -> bool {
        let args = vec![
            "-c".to_string(),
            r#"command -v "$1""#.to_string(),
            "sh".to_string(),
            program.to_string(),
        ];
        match self.run("sh", &args) {
            Ok(output) => output.success,
            Err(e) => {
                debug!("Probe for {} failed to run: {}", program, e);
                false
            }
        }
    }
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
