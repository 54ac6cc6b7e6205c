use crate::error::CollectorError;
use crate::runner::CommandRunner;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// Runs the external collector script that writes the diagnostic logs
///
/// The script is an opaque collaborator: it is executed once, with no
/// arguments, and is expected to have flushed every log file by the time it
/// exits. There are no retries and no timeout.
pub struct ScriptCollector<'a, R: CommandRunner> {
    runner: &'a R,
    /// Interpreter the script is handed to
    shell: String,
    /// Where the captured stdout is saved, if anywhere
    output_file: Option<PathBuf>,
}

impl<'a, R: CommandRunner> ScriptCollector<'a, R> {
    pub fn new(runner: &'a R, shell: impl Into<String>) -> Self {
        Self {
            runner,
            shell: shell.into(),
            output_file: None,
        }
    }

    /// Save the script's stdout to `path` after a successful run
    pub fn with_output_file(mut self, path: Option<PathBuf>) -> Self {
        self.output_file = path;
        self
    }

    /// Run the script and return its stdout
    ///
    /// Failures are reported through the log and turn into `None`, so the
    /// caller can carry on with whatever logs already exist.
    pub fn run(&self, script: &Path) -> Option<String> {
        match self.try_run(script) {
            Ok(stdout) => Some(stdout),
            Err(CollectorError::ScriptFailed { code, stderr }) => {
                error!("Error executing script {}: exit status {:?}", script.display(), code);
                if !stderr.is_empty() {
                    error!("{}", stderr);
                }
                None
            }
            Err(e) => {
                error!("Error executing script {}: {}", script.display(), e);
                None
            }
        }
    }

    /// Run the script, returning a typed error on failure
    ///
    /// # Errors
    ///
    /// - `CollectorError::ScriptNotFound` if `script` is not a file
    /// - `CollectorError::SubprocessSpawn` if the shell cannot be started
    /// - `CollectorError::ScriptFailed` on a non-zero exit, carrying the
    ///   captured output
    pub fn try_run(&self, script: &Path) -> Result<String, CollectorError> {
        if !script.is_file() {
            return Err(CollectorError::ScriptNotFound(script.display().to_string()));
        }

        info!("Running collector script: {} {}", self.shell, script.display());

        let args = vec![script.display().to_string()];
        let output = self
            .runner
            .run(&self.shell, &args)
            .map_err(|e| CollectorError::SubprocessSpawn(format!("{}: {}", self.shell, e)))?;

        if !output.success {
            return Err(CollectorError::ScriptFailed {
                code: output.code,
                stderr: output.combined(),
            });
        }

        if !output.stderr.trim().is_empty() {
            debug!("Collector stderr: {}", output.stderr.trim());
        }

        match &self.output_file {
            Some(path) => {
                // The logs are what matters; a failed copy of stdout is only a warning
                if let Err(e) = std::fs::write(path, &output.stdout) {
                    warn!("Failed to save collector output to {}: {}", path.display(), e);
                } else {
                    info!("Script executed successfully. Output saved to: {}", path.display());
                }
            }
            None => info!("Script executed successfully."),
        }

        Ok(output.stdout)
    }
}
