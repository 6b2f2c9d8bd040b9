//! Run configuration read from environment variables
//!
//! All values are read once, before anything touches the file system, so a
//! missing `DEPS_FILE` aborts the run without side effects.

use crate::errors::ConfigError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the JSON dependency manifest (required)
pub const DEPS_FILE_VAR: &str = "DEPS_FILE";
/// Base directory for resolving the destination argument
pub const WORKING_DIRECTORY_VAR: &str = "BUILD_WORKING_DIRECTORY";
/// Newline-separated pip subcommands run after the environment is built
pub const EXTRA_PIP_COMMANDS_VAR: &str = "EXTRA_PIP_COMMANDS";
/// Overrides the base interpreter used to create the environment
pub const PYTHON_VAR: &str = "PYVENV_PYTHON";
/// Log file written in addition to console output
pub const LOG_FILE_VAR: &str = "PYVENV_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub deps_file: PathBuf,
    pub working_directory: PathBuf,
    pub extra_pip_commands: Vec<String>,
    pub python: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl BuildConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let deps_file = lookup(DEPS_FILE_VAR).ok_or(ConfigError::MissingVar(DEPS_FILE_VAR))?;
        if deps_file.is_empty() {
            return Err(ConfigError::InvalidVar {
                name: DEPS_FILE_VAR,
                reason: "value is empty".to_string(),
            });
        }

        let working_directory = match lookup(WORKING_DIRECTORY_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().map_err(ConfigError::WorkingDirectory)?,
        };

        let extra_pip_commands = match lookup(EXTRA_PIP_COMMANDS_VAR) {
            Some(value) => {
                let value = value.into_string().map_err(|_| ConfigError::InvalidVar {
                    name: EXTRA_PIP_COMMANDS_VAR,
                    reason: "value is not valid UTF-8".to_string(),
                })?;
                split_commands(&value)
            }
            None => Vec::new(),
        };

        let python = lookup(PYTHON_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let log_file = lookup(LOG_FILE_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let config = BuildConfig {
            deps_file: PathBuf::from(deps_file),
            working_directory,
            extra_pip_commands,
            python,
            log_file,
        };
        debug!("Loaded build configuration: {:?}", config);
        Ok(config)
    }

    /// Resolve the destination argument against the working directory
    pub fn destination(&self, venv_arg: &Path) -> PathBuf {
        self.working_directory.join(venv_arg)
    }
}

/// Split a newline-separated command list, dropping blank lines
fn split_commands(value: &str) -> Vec<String> {
    value
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
