//! Console script generation
//!
//! Linked distributions are not installed by pip, so nothing writes their
//! `console_scripts` wrappers. This module writes them, pointing at the
//! environment's own interpreter.

use crate::errors::BuildError;
use pyvenv_config::Environment;
use pyvenv_logger as logger;
use pyvenv_manifest::EntryPointSource;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONSOLE_SCRIPTS_GROUP: &str = "console_scripts";

/// Render a console script that runs `module:object` with `python`.
///
/// Dotted objects import their first component and call the full path.
pub fn console_script(python: &Path, module: &str, object: &str) -> String {
    let import_name = object.split('.').next().unwrap_or(object);
    format!(
        r#"#!{python}
# -*- coding: utf-8 -*-
import re
import sys
from {module} import {import_name}
if __name__ == '__main__':
    sys.argv[0] = re.sub(r'(-script\.pyw|\.exe)?$', '', sys.argv[0])
    sys.exit({object}())
"#,
        python = python.display(),
    )
}

/// Interpreter named in script shebangs
fn shebang_interpreter(env: &Environment) -> PathBuf {
    if cfg!(windows) {
        env.python.clone()
    } else {
        env.bin_dir.join("python3")
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Write a script for every console entry point that has none yet.
///
/// Existing files in the scripts directory are never touched, so re-running
/// against the same environment changes nothing. Returns the scripts written.
pub fn generate_console_scripts(
    env: &Environment,
    source: &dyn EntryPointSource,
) -> Result<Vec<PathBuf>, BuildError> {
    let python = shebang_interpreter(env);
    let entry_points =
        source.list_entry_points(CONSOLE_SCRIPTS_GROUP, &[env.site_packages.clone()]);
    let mut written = Vec::new();

    for ep in entry_points {
        let script = env.bin_dir.join(&ep.name);
        if fs::symlink_metadata(&script).is_ok() {
            logger::debug(&format!("Keeping existing script: {}", script.display()));
            continue;
        }

        let Some(object) = ep.object.as_deref() else {
            logger::warn(&format!(
                "Skipping console script '{}': entry point {} names no object",
                ep.name, ep.module
            ));
            continue;
        };

        let script_error = |source| BuildError::Script {
            path: script.clone(),
            source,
        };
        fs::write(&script, console_script(&python, &ep.module, object)).map_err(script_error)?;
        make_executable(&script).map_err(script_error)?;

        logger::debug(&format!(
            "Wrote console script {} -> {}:{}",
            script.display(),
            ep.module,
            object
        ));
        written.push(script);
    }

    Ok(written)
}
