//! The build pipeline: read manifest, create environment, link, write
//! scripts, run extra pip commands.

use crate::env_builder::EnvironmentBuilder;
use crate::errors::BuildError;
use crate::linker;
use crate::post_install::{Launcher, PostInstallRunner};
use crate::process::CommandRunner;
use crate::scripts;
use pyvenv_config::{resolve_base_interpreter, BuildConfig};
use pyvenv_logger as logger;
use pyvenv_manifest::{read_deps_file, EntryPointSource};
use std::path::{Path, PathBuf};
use tracing::info;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub venv_path: PathBuf,
    pub linked: usize,
    pub scripts: usize,
    pub extra_commands: usize,
}

/// Collaborators of a build that touch the outside world
pub struct BuildContext<'a> {
    /// Directory the manifest's source paths are relative to
    pub source_root: PathBuf,
    pub runner: &'a dyn CommandRunner,
    pub entry_points: &'a dyn EntryPointSource,
    pub launcher: Launcher,
}

/// Build the environment at `venv_arg` (relative to the working directory)
pub fn handle_build(
    venv_arg: &Path,
    config: &BuildConfig,
    ctx: &BuildContext<'_>,
) -> Result<BuildSummary, BuildError> {
    logger::step(&format!("Reading manifest {}", config.deps_file.display()));
    let files = read_deps_file(&config.deps_file)?;
    logger::info(&format!("{} files to link", files.len()));

    let interpreter = resolve_base_interpreter(config.python.as_deref())?;
    let venv_path = config.destination(venv_arg);
    info!("Building {} with {}", venv_path.display(), interpreter.display());

    let env = EnvironmentBuilder::new(interpreter).create(&venv_path, ctx.runner)?;

    logger::step(&format!(
        "Linking into {}",
        env.site_packages.display()
    ));
    let report = linker::link_files(&env.site_packages, &files, &ctx.source_root)?;

    logger::step("Generating console scripts");
    let written = scripts::generate_console_scripts(&env, ctx.entry_points)?;

    if !config.extra_pip_commands.is_empty() {
        logger::step(&format!(
            "Running {} extra pip commands",
            config.extra_pip_commands.len()
        ));
        PostInstallRunner::new(&env, ctx.launcher.clone(), ctx.runner)
            .run_all(&config.extra_pip_commands)?;
    }

    Ok(BuildSummary {
        venv_path,
        linked: report.linked,
        scripts: written.len(),
        extra_commands: config.extra_pip_commands.len(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::testing::RecordingRunner;
    use crate::process::{CommandStatus, Invocation};
    use pyvenv_manifest::{DistInfoEntryPoints, EntryPoint};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    /// Lays out the tree `python -m venv` would create instead of running it
    struct FakeVenv {
        inner: RecordingRunner,
    }

    impl CommandRunner for FakeVenv {
        fn run(&self, invocation: &Invocation) -> io::Result<CommandStatus> {
            let status = self.inner.run(invocation)?;
            if invocation.args.first().is_some_and(|a| a == "-m") {
                let Some(dest) = invocation.args.last().map(PathBuf::from) else {
                    return Ok(status);
                };
                fs::create_dir_all(dest.join("lib/python3.12/site-packages"))?;
                fs::create_dir_all(dest.join("bin"))?;
                fs::write(dest.join("bin/python3"), "")?;
            }
            Ok(status)
        }
    }

    struct NoEntryPoints;

    impl EntryPointSource for NoEntryPoints {
        fn list_entry_points(&self, _group: &str, _paths: &[PathBuf]) -> Vec<EntryPoint> {
            Vec::new()
        }
    }

    fn config_for(temp: &TempDir, deps: &str, extra: &[&str]) -> Option<BuildConfig> {
        let deps_file = temp.path().join("deps.json");
        fs::write(&deps_file, deps).ok()?;
        // Any existing file stands in for the base interpreter
        let python = temp.path().join("python3");
        fs::write(&python, "").ok()?;
        Some(BuildConfig {
            deps_file,
            working_directory: temp.path().join("cwd"),
            extra_pip_commands: extra.iter().map(|c| (*c).to_string()).collect(),
            python: Some(python),
            log_file: None,
        })
    }

    #[test]
    fn test_pipeline_links_generates_and_runs_extras() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let source_root = temp.path().join("execroot/ws");
        assert!(fs::create_dir_all(source_root.join("pkg")).is_ok());
        assert!(fs::create_dir_all(temp.path().join("execroot/tool_dep/tool-1.0.dist-info")).is_ok());
        assert!(fs::write(source_root.join("pkg/mod_pb2.py"), "").is_ok());
        assert!(fs::write(
            temp.path().join("execroot/tool_dep/tool-1.0.dist-info/entry_points.txt"),
            "[console_scripts]\ntool = tool.cli:main\n"
        )
        .is_ok());

        let deps = r#"{"imports": ["tool_dep"], "files": [
            {"t": "G", "p": "pkg/mod_pb2.py"},
            {"t": "S", "p": "pkg/source.py"},
            {"t": "E", "p": "../tool_dep/tool-1.0.dist-info/entry_points.txt"},
            {"t": "E", "p": "../unrelated/x.py"}
        ]}"#;
        let Some(config) = config_for(&temp, deps, &["install black"]) else {
            return;
        };

        let runner = FakeVenv {
            inner: RecordingRunner::default(),
        };
        let ctx = BuildContext {
            source_root,
            runner: &runner,
            entry_points: &DistInfoEntryPoints::new(),
            launcher: Launcher::Direct,
        };

        let summary = handle_build(Path::new(".venv"), &config, &ctx);
        let venv = temp.path().join("cwd/.venv");
        assert_eq!(
            summary.ok(),
            Some(BuildSummary {
                venv_path: venv.clone(),
                linked: 2,
                scripts: 1,
                extra_commands: 1,
            })
        );

        let site = venv.join("lib/python3.12/site-packages");
        assert!(fs::symlink_metadata(site.join("pkg/mod_pb2.py")).is_ok());
        assert!(fs::symlink_metadata(site.join("pkg/source.py")).is_err());
        let script = fs::read_to_string(venv.join("bin/tool")).unwrap_or_default();
        assert!(script.contains("from tool.cli import main"));

        let displays = runner.inner.displays();
        assert_eq!(displays.len(), 2);
        assert!(displays[0].contains("-m venv --clear --symlinks"));
        assert_eq!(displays[1], "pip --no-input install black");
    }

    #[test]
    fn test_bad_manifest_fails_before_environment_creation() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let Some(config) = config_for(&temp, r#"{"files": []}"#, &[]) else {
            return;
        };
        let runner = RecordingRunner::default();
        let ctx = BuildContext {
            source_root: temp.path().to_path_buf(),
            runner: &runner,
            entry_points: &NoEntryPoints,
            launcher: Launcher::Direct,
        };

        let result = handle_build(Path::new(".venv"), &config, &ctx);
        assert!(matches!(result, Err(BuildError::Manifest(_))));
        assert!(runner.calls.borrow().is_empty());
        assert!(!temp.path().join("cwd/.venv").exists());
    }
}
