use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {0} env var")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("Could not determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("No Python interpreter found on PATH (tried {0})")]
    InterpreterNotFound(String),

    #[error("Failed to resolve interpreter {path}: {source}")]
    InterpreterResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
