//! Extra pip commands run against the new environment
//!
//! Each command is its own subprocess, run with the environment activated
//! through variables (`VIRTUAL_ENV`, `PATH`) rather than a sourced activate
//! script. Commands run in order and the first failure aborts the run.

use crate::errors::BuildError;
use crate::process::{CommandRunner, Invocation};
use colored::Colorize;
use pyvenv_config::build_config::EXTRA_PIP_COMMANDS_VAR;
use pyvenv_config::{ConfigError, Environment};
use pyvenv_logger as logger;
use std::ffi::OsString;
use std::path::PathBuf;

/// zsh locations checked in order; zsh runs scripts whose shebang points at another script
pub const ZSH_CANDIDATES: &[&str] = &["/bin/zsh", "/usr/bin/zsh"];

#[cfg(windows)]
const PIP_EXE: &str = "pip.exe";
#[cfg(not(windows))]
const PIP_EXE: &str = "pip";

/// How each pip command is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// `zsh -c '"$@"' zsh <pip> ...`
    Zsh(PathBuf),
    /// Execute pip directly
    Direct,
}

impl Launcher {
    /// Prefer zsh when installed, otherwise run pip directly
    pub fn detect() -> Self {
        Self::detect_from(ZSH_CANDIDATES)
    }

    pub fn detect_from(candidates: &[&str]) -> Self {
        candidates
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
            .map_or(Launcher::Direct, Launcher::Zsh)
    }
}

/// Split a command line into words.
///
/// Supports single quotes, double quotes and backslash escapes; no other
/// shell syntax is interpreted.
pub fn split_args(line: &str) -> Result<Vec<String>, ConfigError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(line, "single quote")),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unterminated(line, "double quote")),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(line, "double quote")),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(ch) => current.push(ch),
                    None => return Err(unterminated(line, "escape")),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn unterminated(line: &str, what: &str) -> ConfigError {
    ConfigError::InvalidVar {
        name: EXTRA_PIP_COMMANDS_VAR,
        reason: format!("unterminated {} in `{}`", what, line),
    }
}

/// Runs pip subcommands inside a built environment
pub struct PostInstallRunner<'a> {
    env: &'a Environment,
    launcher: Launcher,
    runner: &'a dyn CommandRunner,
}

impl<'a> PostInstallRunner<'a> {
    pub fn new(env: &'a Environment, launcher: Launcher, runner: &'a dyn CommandRunner) -> Self {
        PostInstallRunner {
            env,
            launcher,
            runner,
        }
    }

    fn pip_path(&self) -> PathBuf {
        self.env.bin_dir.join(PIP_EXE)
    }

    /// `PATH` with the environment's scripts directory first
    fn activated_path(&self) -> Result<OsString, ConfigError> {
        let mut paths = vec![self.env.bin_dir.clone()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths).map_err(|e| ConfigError::InvalidVar {
            name: "PATH",
            reason: e.to_string(),
        })
    }

    /// Build the invocation for one `pip --no-input <subcommand>`
    pub fn pip_invocation(&self, subcommand: &str) -> Result<Invocation, BuildError> {
        let words = split_args(subcommand)?;
        let display = format!("pip --no-input {}", subcommand.trim());
        let pip = self.pip_path();

        let invocation = match &self.launcher {
            Launcher::Zsh(zsh) => Invocation::new(zsh, display)
                .args(["-c", "\"$@\"", "zsh"])
                .arg(pip.as_os_str()),
            Launcher::Direct => Invocation::new(pip, display),
        };

        Ok(invocation
            .arg("--no-input")
            .args(words)
            .env("VIRTUAL_ENV", self.env.root.as_os_str())
            .env("PATH", self.activated_path()?)
            .env_remove("PYTHONHOME"))
    }

    /// Run every subcommand in order, stopping at the first failure
    pub fn run_all(&self, commands: &[String]) -> Result<(), BuildError> {
        // Parse everything up front so a quoting error fails before anything runs
        let invocations = commands
            .iter()
            .map(|cmd| self.pip_invocation(cmd))
            .collect::<Result<Vec<_>, _>>()?;

        for invocation in invocations {
            println!("\n{}", format!("> {}", invocation.display).green());

            let status = self
                .runner
                .run(&invocation)
                .map_err(|source| BuildError::Spawn {
                    command: invocation.display.clone(),
                    source,
                })?;

            if !status.success() {
                return Err(BuildError::Subprocess {
                    command: invocation.display,
                    code: status.code,
                });
            }
            logger::debug(&format!("Finished: {}", invocation.display));
        }

        Ok(())
    }
}
