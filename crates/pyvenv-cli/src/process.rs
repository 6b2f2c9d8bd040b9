//! Subprocess execution
//!
//! Every external command is described as an [`Invocation`] and executed
//! through a [`CommandRunner`], so callers can be exercised without spawning
//! real processes.

use pyvenv_logger as logger;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables set for the child on top of the inherited environment
    pub env: Vec<(OsString, OsString)>,
    /// Variables removed from the child's environment
    pub env_remove: Vec<OsString>,
    /// Capture stdout/stderr into the log instead of inheriting the console
    pub capture: bool,
    /// Human readable form used in messages
    pub display: String,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, display: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            env_remove: Vec::new(),
            capture: false,
            display: display.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the child was terminated by a signal
    pub code: Option<i32>,
    /// Captured stderr; empty when output went to the console
    pub stderr: String,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    /// Run the command to completion
    fn run(&self, invocation: &Invocation) -> io::Result<CommandStatus>;
}

/// Runs invocations as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandStatus> {
        logger::debug(&format!("Running: {}", invocation.display));

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for key in &invocation.env_remove {
            command.env_remove(key);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        if invocation.capture {
            let output = command.output()?;
            logger::capture_output(&invocation.display, &output);
            Ok(CommandStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = command.status()?;
            Ok(CommandStatus {
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}
