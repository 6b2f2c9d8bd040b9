//! Utility functions for resolving paths in Python virtual environments
//!
//! This module provides platform-specific path resolution for:
//! - site-packages directory
//! - Python executable
//! - the scripts directory

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The name of the library directory in a Python venv
/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const PYTHON_LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const PYTHON_LIB_DIR: &str = "lib";

/// The name of the binaries/scripts directory in a Python venv
/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

/// Prefix of the versioned directory under `lib/` (e.g. `python3.12`)
pub const PYTHON_VERSION_PREFIX: &str = "python";

/// Package index directory name
pub const SITE_PACKAGES_DIR: &str = "site-packages";

/// Candidate executable names in a venv
#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Expected environment substructure is missing
#[derive(Error, Debug)]
pub enum VenvPathError {
    #[error("Virtual environment not found: {}", .0.display())]
    VenvNotFound(PathBuf),

    #[error("lib directory not found: {}", .0.display())]
    LibDirNotFound(PathBuf),

    #[error("Unable to find site-packages path in venv: {}", .0.display())]
    SitePackagesNotFound(PathBuf),

    #[error("bin directory not found: {}", .0.display())]
    BinDirNotFound(PathBuf),

    #[error("Python executable not found in {}", .0.display())]
    PythonNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The on-disk layout of a created virtual environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub site_packages: PathBuf,
    pub python: PathBuf,
}

impl Environment {
    /// Resolve all well-known locations inside an existing environment
    pub fn resolve(root: &Path) -> Result<Self, VenvPathError> {
        let site_packages = resolve_site_packages(root)?;
        let python = resolve_python_exe(root)?;
        Ok(Environment {
            root: root.to_path_buf(),
            bin_dir: root.join(PYTHON_BIN_DIR),
            site_packages,
            python,
        })
    }
}

/// Resolve the site-packages path for a Python virtual environment
///
/// # Platform differences
///
/// - **Unix/macOS**: `.venv/lib/python3.X/site-packages`
/// - **Windows**: `.venv/Lib/site-packages`
pub fn resolve_site_packages(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    #[cfg(windows)]
    {
        let site_packages = venv_path.join(PYTHON_LIB_DIR).join(SITE_PACKAGES_DIR);
        if !site_packages.is_dir() {
            return Err(VenvPathError::SitePackagesNotFound(venv_path.to_path_buf()));
        }
        Ok(site_packages)
    }

    #[cfg(not(windows))]
    {
        let lib_dir = venv_path.join(PYTHON_LIB_DIR);
        if !lib_dir.is_dir() {
            return Err(VenvPathError::LibDirNotFound(lib_dir));
        }

        let entries = fs::read_dir(&lib_dir).map_err(|source| VenvPathError::Io {
            path: lib_dir.clone(),
            source,
        })?;

        // Only one pythonX.Y directory is expected; sort so the choice is stable if not
        let mut version_dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with(PYTHON_VERSION_PREFIX)
            })
            .map(|e| e.path())
            .collect();
        version_dirs.sort();

        version_dirs
            .into_iter()
            .map(|dir| dir.join(SITE_PACKAGES_DIR))
            .find(|site_packages| site_packages.is_dir())
            .ok_or_else(|| VenvPathError::SitePackagesNotFound(venv_path.to_path_buf()))
    }
}

/// Resolve the Python executable path for a virtual environment
///
/// # Platform differences
///
/// - **Unix/macOS**: `.venv/bin/python3` or `.venv/bin/python`
/// - **Windows**: `.venv/Scripts/python.exe`
pub fn resolve_python_exe(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    let bin_dir = venv_path.join(PYTHON_BIN_DIR);
    if !bin_dir.is_dir() {
        return Err(VenvPathError::BinDirNotFound(bin_dir));
    }

    PYTHON_EXE_CANDIDATES
        .iter()
        .map(|exe| bin_dir.join(exe))
        .find(|candidate| candidate.is_file())
        .ok_or(VenvPathError::PythonNotFound(bin_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(not(windows))]
    fn create_mock_venv_unix(python_version: &str) -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        let venv_path = temp_dir.path();

        let site_packages = venv_path
            .join("lib")
            .join(python_version)
            .join("site-packages");
        fs::create_dir_all(&site_packages).ok()?;

        let bin_dir = venv_path.join("bin");
        fs::create_dir_all(&bin_dir).ok()?;
        fs::write(bin_dir.join("python3"), "").ok()?;

        Some(temp_dir)
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_unix() {
        let Some(temp_venv) = create_mock_venv_unix("python3.12") else {
            return;
        };
        let result = resolve_site_packages(temp_venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("lib/python3.12/site-packages")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_site_packages_skips_versioned_dir_without_index() {
        let Some(temp_venv) = create_mock_venv_unix("python3.12") else {
            return;
        };
        // Sorts first but has no site-packages
        assert!(fs::create_dir_all(temp_venv.path().join("lib").join("python3.10")).is_ok());
        let result = resolve_site_packages(temp_venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("lib/python3.12/site-packages")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_site_packages_missing_is_structure_error() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        assert!(fs::create_dir_all(temp.path().join("lib").join("pypy")).is_ok());
        let result = resolve_site_packages(temp.path());
        assert!(matches!(
            result,
            Err(VenvPathError::SitePackagesNotFound(_))
        ));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_environment_unix() {
        let Some(temp_venv) = create_mock_venv_unix("python3.11") else {
            return;
        };
        let env = Environment::resolve(temp_venv.path());
        let Ok(env) = env else {
            panic!("environment should resolve");
        };
        assert_eq!(env.bin_dir, temp_venv.path().join("bin"));
        assert!(env.python.ends_with("bin/python3"));
        assert!(env.site_packages.ends_with("lib/python3.11/site-packages"));
    }

    #[test]
    fn test_venv_not_found() {
        let non_existent = PathBuf::from("/tmp/non_existent_venv_12345");
        let result = resolve_site_packages(&non_existent);
        assert!(matches!(result, Err(VenvPathError::VenvNotFound(_))));
    }

    #[test]
    fn test_platform_constants() {
        #[cfg(not(windows))]
        {
            assert_eq!(PYTHON_LIB_DIR, "lib");
            assert_eq!(PYTHON_BIN_DIR, "bin");
        }
        #[cfg(windows)]
        {
            assert_eq!(PYTHON_LIB_DIR, "Lib");
            assert_eq!(PYTHON_BIN_DIR, "Scripts");
        }
    }
}
