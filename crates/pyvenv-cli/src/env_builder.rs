//! Virtual environment creation
//!
//! Creation is delegated to the interpreter's own `venv` module. The builder
//! is handed the symlink-resolved base interpreter, so the environment links
//! to the concrete installation instead of a wrapper script.

use crate::errors::BuildError;
use crate::process::{CommandRunner, Invocation};
use pyvenv_config::Environment;
use pyvenv_logger as logger;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentBuilder {
    real_base_interpreter: PathBuf,
    clear: bool,
    symlinks: bool,
    with_pip: bool,
}

impl EnvironmentBuilder {
    /// Builder that clears the destination, symlinks the interpreter and bundles pip
    pub fn new(real_base_interpreter: PathBuf) -> Self {
        EnvironmentBuilder {
            real_base_interpreter,
            clear: true,
            symlinks: true,
            with_pip: true,
        }
    }

    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn symlinks(mut self, symlinks: bool) -> Self {
        self.symlinks = symlinks;
        self
    }

    pub fn with_pip(mut self, with_pip: bool) -> Self {
        self.with_pip = with_pip;
        self
    }

    /// The `python -m venv` command for `destination`
    pub fn invocation(&self, destination: &Path) -> Invocation {
        let mut flags = vec!["-m", "venv"];
        if self.clear {
            flags.push("--clear");
        }
        flags.push(if self.symlinks {
            "--symlinks"
        } else {
            "--copies"
        });
        if !self.with_pip {
            flags.push("--without-pip");
        }

        let display = format!(
            "{} {} {}",
            self.real_base_interpreter.display(),
            flags.join(" "),
            destination.display()
        );

        Invocation::new(&self.real_base_interpreter, display)
            .args(flags)
            .arg(destination)
            .env_remove("PYTHONHOME")
            .captured()
    }

    /// Create the environment at `destination`, replacing anything already there
    pub fn create(
        &self,
        destination: &Path,
        runner: &dyn CommandRunner,
    ) -> Result<Environment, BuildError> {
        let invocation = self.invocation(destination);
        logger::debug(&format!("Using base interpreter: {}", self.real_base_interpreter.display()));
        logger::spinner_start(&format!(
            "Creating virtual environment at {}",
            destination.display()
        ));

        let status = match runner.run(&invocation) {
            Ok(status) => status,
            Err(source) => {
                logger::spinner_error("Failed to create virtual environment");
                return Err(BuildError::Spawn {
                    command: invocation.display,
                    source,
                });
            }
        };

        if !status.success() {
            logger::spinner_error("Failed to create virtual environment");
            return Err(BuildError::EnvCreation {
                path: destination.to_path_buf(),
                status: status.code,
                stderr: status.stderr,
            });
        }

        let environment = Environment::resolve(destination)?;
        logger::spinner_success(&format!(
            "Virtual environment created at {}",
            destination.display()
        ));
        Ok(environment)
    }
}
