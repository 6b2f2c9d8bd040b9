//! Centralized error types for the pyvenv CLI
//!
//! Every failure is fatal; the variants only decide the message and the
//! process exit code.

use pyvenv_config::{ConfigError, VenvPathError};
use pyvenv_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Structure(#[from] VenvPathError),

    #[error(
        "Failed to create virtual environment at {} (exit {status:?}){}",
        path.display(),
        stderr_detail(stderr)
    )]
    EnvCreation {
        path: PathBuf,
        status: Option<i32>,
        /// What the interpreter printed to stderr
        stderr: String,
    },

    #[error("Failed to link {} -> {}: {source}", target.display(), source_path.display())]
    Link {
        target: PathBuf,
        source_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write script {}: {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Command failed: {command} (exit {code:?})")]
    Subprocess { command: String, code: Option<i32> },

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

fn stderr_detail(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}

impl BuildError {
    /// Process exit code for this error.
    ///
    /// Failed subprocesses propagate their own code; a child killed by a
    /// signal, and every other error, exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Subprocess {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
