use crate::config::Requirement;
use crate::error::InstallError;
use crate::runner::CommandRunner;
use log::{debug, info, warn};

const HOMEBREW: &str = "brew";

/// Which installation path was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installer {
    Homebrew,
    Fallback,
}

/// Result of ensuring a single requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The program was already on the PATH
    AlreadyPresent,
    /// The program was installed during this run
    Installed(Installer),
}

/// Makes sure required external programs are installed
///
/// Uses Homebrew when it is available and the requirement's fallback
/// installer otherwise. Both paths report failures the same way; the caller
/// decides whether a failure is fatal.
pub struct DependencyEnsurer<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> DependencyEnsurer<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Ensure every requirement, stopping at the first failure
    pub fn ensure_all(&self, requirements: &[Requirement]) -> Result<Vec<InstallOutcome>, InstallError> {
        requirements.iter().map(|req| self.ensure(req)).collect()
    }

    /// Ensure a single requirement is installed
    ///
    /// # Errors
    ///
    /// - `InstallError::PackageManager` if `brew install` fails
    /// - `InstallError::Fallback` if the fallback installer fails
    /// - `InstallError::NoInstaller` if there is no brew and no fallback
    /// - `InstallError::StillMissing` if the install reported success but
    ///   the program still cannot be found
    pub fn ensure(&self, requirement: &Requirement) -> Result<InstallOutcome, InstallError> {
        let program = &requirement.program;

        if self.runner.probe(program) {
            info!("{} is already installed.", program);
            return Ok(InstallOutcome::AlreadyPresent);
        }

        warn!("{} not found, installing...", program);

        let installer = if self.runner.probe(HOMEBREW) {
            info!("Homebrew found. Installing {} via Homebrew...", requirement.formula());
            self.install_with_homebrew(requirement)?;
            Installer::Homebrew
        } else {
            info!("Homebrew not found. Using fallback installer for {}...", program);
            self.install_with_fallback(requirement)?;
            Installer::Fallback
        };

        if !self.runner.probe(program) {
            return Err(InstallError::StillMissing(program.clone()));
        }

        info!("{} installed successfully via {:?}.", program, installer);
        Ok(InstallOutcome::Installed(installer))
    }

    fn install_with_homebrew(&self, requirement: &Requirement) -> Result<(), InstallError> {
        let formula = requirement.formula();
        let args = vec!["install".to_string(), formula.to_string()];

        let output = self
            .runner
            .run(HOMEBREW, &args)
            .map_err(|e| InstallError::PackageManager {
                formula: formula.to_string(),
                reason: e.to_string(),
            })?;

        if !output.success {
            return Err(InstallError::PackageManager {
                formula: formula.to_string(),
                reason: failure_reason(output.code, &output.combined()),
            });
        }

        debug!("brew install {} output: {}", formula, output.stdout.trim());
        Ok(())
    }

    fn install_with_fallback(&self, requirement: &Requirement) -> Result<(), InstallError> {
        let (program, args) = requirement
            .fallback
            .split_first()
            .ok_or_else(|| InstallError::NoInstaller(requirement.program.clone()))?;

        let output = self
            .runner
            .run(program, args)
            .map_err(|e| InstallError::Fallback {
                program: requirement.program.clone(),
                reason: format!("{}: {}", program, e),
            })?;

        if !output.success {
            return Err(InstallError::Fallback {
                program: requirement.program.clone(),
                reason: failure_reason(output.code, &output.combined()),
            });
        }

        debug!("Fallback installer output: {}", output.stdout.trim());
        Ok(())
    }
}

fn failure_reason(code: Option<i32>, output: &str) -> String {
    match code {
        Some(code) => format!("exit status {}: {}", code, output),
        None => format!("terminated by signal: {}", output),
    }
}
