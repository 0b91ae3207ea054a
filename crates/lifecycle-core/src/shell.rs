//! Process execution port.
//!
//! The run loop never spawns processes itself. It builds an [`Invocation`]
//! (component directory + command) and hands it to a [`Shell`]. The
//! production implementation, [`SystemShell`], runs the invocation through
//! `sh -c`; tests substitute a recording fake.

use crate::error::{LifecycleError, Result};
use crate::registry::Component;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_SHELL: &str = "sh";

/// A command bound to the directory it must run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root_dir: String,
    pub command: String,
}

impl Invocation {
    pub fn new(component: &Component, command: impl Into<String>) -> Self {
        Self {
            root_dir: component.root_dir.clone(),
            command: command.into(),
        }
    }

    /// The exact string handed to the shell: fail fast, enter the component
    /// directory, then run the command.
    pub fn script(&self) -> String {
        let dir = shlex::try_quote(&self.root_dir).unwrap_or(Cow::Borrowed(&self.root_dir));
        format!("set -e; cd {dir}; {}", self.command)
    }
}

/// Result of a captured run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait Shell {
    /// Run with inherited stdio and return the exit code.
    fn run(&mut self, invocation: &Invocation) -> Result<Option<i32>>;

    /// Run with stdout and stderr captured separately.
    fn capture(&mut self, invocation: &Invocation) -> Result<Captured>;
}

// ---------------------------------------------------------------------------
// SystemShell
// ---------------------------------------------------------------------------

/// Runs invocations through a real shell, with `workdir` (the project root) as
/// the starting directory so relative `rootDir` values resolve against it.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: PathBuf,
    workdir: PathBuf,
}

impl SystemShell {
    /// Resolve `shell` on PATH (or use it as-is when it is already a path).
    pub fn detect(shell: &str, workdir: &Path) -> Result<Self> {
        let program =
            which::which(shell).map_err(|_| LifecycleError::ShellUnavailable(shell.to_string()))?;
        tracing::debug!(shell = %program.display(), "shell resolved");
        Ok(Self {
            program,
            workdir: workdir.to_path_buf(),
        })
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(invocation.script())
            .current_dir(&self.workdir);
        cmd
    }

    fn spawn_error(&self, invocation: &Invocation, source: std::io::Error) -> LifecycleError {
        LifecycleError::Spawn {
            command: invocation.script(),
            source,
        }
    }
}

impl Shell for SystemShell {
    fn run(&mut self, invocation: &Invocation) -> Result<Option<i32>> {
        let status = self
            .command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(invocation, e))?;
        Ok(status.code())
    }

    fn capture(&mut self, invocation: &Invocation) -> Result<Captured> {
        let output = self
            .command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(invocation, e))?;
        Ok(Captured {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
