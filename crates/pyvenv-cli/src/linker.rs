//! Linking manifest files into site-packages
//!
//! Files are never copied. Each target is a symlink to the real path of its
//! source; a source that does not exist produces a dangling link rather than
//! an error.

use crate::errors::BuildError;
use pyvenv_logger as logger;
use pyvenv_manifest::EnvFile;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Outcome of a linking pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkReport {
    pub linked: usize,
}

/// Absolute, symlink-resolved form of `path`, relative paths taken from `base`.
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are appended as-is, so missing paths still resolve. `..`
/// below the existing ancestor is applied lexically.
pub fn resolve_lenient(path: &Path, base: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing: Vec<Component<'_>> = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(resolved, |mut acc, component| {
                        if *component == Component::ParentDir {
                            acc.pop();
                        } else {
                            acc.push(component);
                        }
                        acc
                    }));
            }
            Err(e) => {
                let (Some(parent), Some(last)) = (existing.parent(), existing.components().next_back())
                else {
                    return Err(e);
                };
                missing.push(last);
                existing = parent;
            }
        }
    }
}

/// Reject targets that would land outside site-packages
fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

/// Symlink every file into `site_packages` at its target path.
///
/// Source paths are resolved against `base`, the directory the manifest's
/// paths are relative to.
pub fn link_files(
    site_packages: &Path,
    files: &[EnvFile],
    base: &Path,
) -> Result<LinkReport, BuildError> {
    let mut report = LinkReport::default();

    for file in files {
        let relative = Path::new(&file.target_path);
        let target = site_packages.join(relative);
        let source = Path::new(&file.source_path);

        let link_error = |source_err: io::Error| BuildError::Link {
            target: target.clone(),
            source_path: source.to_path_buf(),
            source: source_err,
        };

        if !is_contained(relative) {
            return Err(link_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "target path escapes site-packages",
            )));
        }

        let resolved = resolve_lenient(source, base).map_err(link_error)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(link_error)?;
        }
        create_symlink(&resolved, &target).map_err(link_error)?;

        report.linked += 1;
    }

    logger::debug(&format!(
        "Linked {} files into {}",
        report.linked,
        site_packages.display()
    ));
    Ok(report)
}
