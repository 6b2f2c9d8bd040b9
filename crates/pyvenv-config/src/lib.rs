//! Configuration for building a virtual environment from a dependency manifest
//!
//! - [`build_config`] reads the run configuration from environment variables
//! - [`interpreter`] locates the base Python interpreter and resolves its real path
//! - [`venv_paths`] resolves directories inside a created environment

pub mod build_config;
pub mod errors;
pub mod interpreter;
pub mod venv_paths;

pub use build_config::BuildConfig;
pub use errors::ConfigError;
pub use interpreter::resolve_base_interpreter;
pub use venv_paths::{resolve_python_exe, resolve_site_packages, Environment, VenvPathError};
