//! Base interpreter discovery
//!
//! The environment must link against the concrete interpreter installation,
//! not a relocatable wrapper, so the interpreter path is fully resolved here
//! and handed to the environment builder as a plain value.

use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Interpreter names searched on PATH when no override is configured
#[cfg(not(windows))]
pub const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
pub const PYTHON_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Locate the base interpreter and resolve it to its real path.
///
/// `explicit` wins when given; otherwise the first candidate found on PATH.
pub fn resolve_base_interpreter(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let found = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_on_path(PYTHON_CANDIDATES)?,
    };

    let real = fs::canonicalize(&found).map_err(|source| ConfigError::InterpreterResolution {
        path: found.clone(),
        source,
    })?;

    debug!(
        "Resolved base interpreter {} -> {}",
        found.display(),
        real.display()
    );
    Ok(real)
}

fn find_on_path(candidates: &[&str]) -> Result<PathBuf, ConfigError> {
    candidates
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| ConfigError::InterpreterNotFound(candidates.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_explicit_interpreter_symlink_is_resolved() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let real_dir = temp.path().join("install").join("bin");
        assert!(fs::create_dir_all(&real_dir).is_ok());
        let real_python = real_dir.join("python3.12");
        assert!(fs::write(&real_python, "").is_ok());

        let wrapper = temp.path().join("python3");
        assert!(std::os::unix::fs::symlink(&real_python, &wrapper).is_ok());

        let resolved = resolve_base_interpreter(Some(wrapper.as_path()));
        let expected = fs::canonicalize(&real_python).ok();
        assert_eq!(resolved.ok(), expected);
    }

    #[test]
    fn test_missing_explicit_interpreter() {
        let result = resolve_base_interpreter(Some(Path::new("/nonexistent/bin/python3")));
        assert!(matches!(
            result,
            Err(ConfigError::InterpreterResolution { .. })
        ));
    }

    #[test]
    fn test_no_candidate_on_path() {
        let result = find_on_path(&["pyvenv-no-such-python-binary"]);
        assert!(matches!(result, Err(ConfigError::InterpreterNotFound(_))));
    }
}
