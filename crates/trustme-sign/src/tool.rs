//! Invocation of external command-line tools.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::info;

use crate::error::ToolError;

/// How an unsuccessful tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(pub Option<i32>);

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("termination by signal"),
        }
    }
}

/// A program path plus its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolInvocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Path of the executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg:?}")?;
        }
        Ok(())
    }
}

/// Runs external tools to completion.
pub trait ToolRunner {
    /// Run `invocation`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] if the tool cannot be launched or exits unsuccessfully.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;
}

/// [`ToolRunner`] that spawns real child processes with stdout discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        info!("launching {invocation}");
        let status = Command::new(invocation.program())
            .args(invocation.args())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| ToolError::Spawn {
                tool: invocation.program().to_owned(),
                source,
            })?;
        if !status.success() {
            return Err(ToolError::Failed {
                tool: invocation.program().to_owned(),
                outcome: ExitOutcome(status.code()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_each_argument() {
        let inv = ToolInvocation::new("makecert")
            .arg("-n")
            .arg("CN=Microsoft Corporation");
        assert_eq!(inv.to_string(), r#""makecert" "-n" "CN=Microsoft Corporation""#);
    }

    #[test]
    fn exit_outcome_renders_code_or_signal() {
        assert_eq!(ExitOutcome(Some(2)).to_string(), "exit code 2");
        assert_eq!(ExitOutcome(None).to_string(), "termination by signal");
    }
}
