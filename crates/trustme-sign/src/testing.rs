//! Scripted stand-in for makecert, pvk2pfx and vsixsigntool.
//!
//! Enabled by the `test-util` feature. [`ScriptedTools`] writes the files the
//! real tools would write, records every invocation, and can be told to fail.

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ToolError;
use crate::tool::{ExitOutcome, ToolInvocation, ToolRunner};

/// Bytes vsixsigntool appends to a package to change its hash.
pub const FAKE_SIGNATURE: &[u8] = b"<signature/>";

/// The argument following the first occurrence of `flag` in `invocation`.
#[must_use]
pub fn flag_value<'a>(invocation: &'a ToolInvocation, flag: &str) -> Option<&'a OsStr> {
    let args = invocation.args();
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(OsString::as_os_str)
}

/// File stem of the invoked program, e.g. `pvk2pfx` for `C:\sdk\pvk2pfx.exe`.
#[must_use]
pub fn tool_stem(program: &Path) -> String {
    program
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// [`ToolRunner`] emulating the external tools on the local filesystem.
#[derive(Debug, Default)]
pub struct ScriptedTools {
    calls: Mutex<Vec<ToolInvocation>>,
    fail_tool: Option<(String, usize)>,
    skip_pfx: bool,
    signing_is_noop: bool,
}

impl ScriptedTools {
    /// Tools that all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (0-based) call of the tool whose file stem is `stem` exit with code 1.
    #[must_use]
    pub fn failing(mut self, stem: &str, nth: usize) -> Self {
        self.fail_tool = Some((stem.to_owned(), nth));
        self
    }

    /// pvk2pfx succeeds without writing the PFX.
    #[must_use]
    pub fn without_pfx_output(mut self) -> Self {
        self.skip_pfx = true;
        self
    }

    /// vsixsigntool succeeds without changing the package.
    #[must_use]
    pub fn noop_signing(mut self) -> Self {
        self.signing_is_noop = true;
        self
    }

    /// Every invocation so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invocations of the tool whose file stem is `stem`.
    #[must_use]
    pub fn calls_to(&self, stem: &str) -> Vec<ToolInvocation> {
        self.calls()
            .into_iter()
            .filter(|c| tool_stem(c.program()) == stem)
            .collect()
    }

    fn record(&self, invocation: &ToolInvocation, stem: &str) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let nth = calls
            .iter()
            .filter(|c| tool_stem(c.program()) == stem)
            .count();
        calls.push(invocation.clone());
        nth
    }

    fn emulate(&self, invocation: &ToolInvocation, stem: &str) -> io::Result<()> {
        match stem {
            "makecert" => {
                fs::write(required(invocation, "-sv")?, b"fake private key")?;
                fs::write(last_arg(invocation)?, b"fake certificate")
            }
            "pvk2pfx" if self.skip_pfx => Ok(()),
            "pvk2pfx" => fs::write(required(invocation, "-pfx")?, b"fake pfx"),
            "vsixsigntool" if self.signing_is_noop => Ok(()),
            "vsixsigntool" => OpenOptions::new()
                .append(true)
                .open(last_arg(invocation)?)?
                .write_all(FAKE_SIGNATURE),
            other => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no scripted behaviour for {other}"),
            )),
        }
    }
}

fn required(invocation: &ToolInvocation, flag: &str) -> io::Result<PathBuf> {
    flag_value(invocation, flag).map(PathBuf::from).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("missing {flag} argument"))
    })
}

fn last_arg(invocation: &ToolInvocation) -> io::Result<PathBuf> {
    invocation
        .args()
        .last()
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no arguments"))
}

impl ToolRunner for ScriptedTools {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        let stem = tool_stem(invocation.program());
        let nth = self.record(invocation, &stem);
        if self
            .fail_tool
            .as_ref()
            .is_some_and(|(tool, n)| *tool == stem && *n == nth)
        {
            return Err(ToolError::Failed {
                tool: invocation.program().to_owned(),
                outcome: ExitOutcome(Some(1)),
            });
        }
        self.emulate(invocation, &stem)
            .map_err(|source| ToolError::Spawn {
                tool: invocation.program().to_owned(),
                source,
            })
    }
}
