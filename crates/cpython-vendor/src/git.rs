//! Thin wrapper around the `git` executable.
//!
//! Every call is synchronous. Mutating commands go through [`Git::run`], which
//! turns a non-zero exit into [`VendorError::SyncFailed`] carrying the captured
//! stderr. Queries that are allowed to fail go through [`Git::query`].

use crate::error::VendorError;
use crate::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Handle on a git executable.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Git::new("git")
    }
}

impl Git {
    /// Use the given git executable (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Git {
            program: program.into(),
        }
    }

    /// The executable this handle invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a git command and fail unless it exits successfully.
    ///
    /// `cwd` of `None` runs in the current directory (used for `clone`).
    pub fn run<I, S>(&self, cwd: Option<&Path>, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (command, output) = self.exec(cwd, args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(VendorError::SyncFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a read-only git command, returning its stdout only on success.
    pub fn query<I, S>(&self, cwd: &Path, args: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (command, output) = self.exec(Some(cwd), args)?;

        if !output.status.success() {
            debug!(
                "git {} exited with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
    }

    fn exec<I, S>(&self, cwd: Option<&Path>, args: I) -> Result<(String, Output)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        let command = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!(cwd = ?cwd, "git {}", command);
        let output = cmd.output().map_err(|source| VendorError::GitUnavailable {
            program: self.program.display().to_string(),
            source,
        })?;

        Ok((command, output))
    }
}
