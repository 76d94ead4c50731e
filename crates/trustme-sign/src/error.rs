//! Error types for provisioning and signing operations.

use std::path::PathBuf;

use thiserror::Error;
use trustme_core::types::Sha256Hex;

use crate::tool::ExitOutcome;

/// Errors raised by an external tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool could not be started.
    #[error("failed to launch {}: {source}", .tool.display())]
    Spawn {
        /// Path of the executable.
        tool: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The tool ran but did not exit successfully.
    #[error("{} failed with {outcome}", .tool.display())]
    Failed {
        /// Path of the executable.
        tool: PathBuf,
        /// How the process ended.
        outcome: ExitOutcome,
    },
}

/// Errors that can occur while generating the signing credential.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// makecert or pvk2pfx failed.
    #[error("certificate generation failed: {0}")]
    Tool(#[from] ToolError),
    /// pvk2pfx reported success but produced no PFX.
    #[error("key packaging tool did not produce {}", .0.display())]
    MissingCredential(PathBuf),
}

/// Errors that can occur while signing one package.
#[derive(Debug, Error)]
pub enum SignError {
    /// The signing tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// A package or cache file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The cache file did not change when the old hash was substituted.
    #[error("cache patching failed: {} does not contain {hash} or the hash did not change", .cache.display())]
    CachePatchFailed {
        /// The cache file that was searched.
        cache: PathBuf,
        /// The pre-signing hash that was looked for.
        hash: Sha256Hex,
    },
}

/// Error returned when the credential cannot be moved to its destination.
///
/// The credential is left at `from` so it can be recovered by hand.
#[derive(Debug, Error)]
#[error("failed to move credential from {} to {}: {source}", .from.display(), .to.display())]
pub struct RelocateError {
    /// Temporary location of the credential.
    pub from: PathBuf,
    /// Requested destination.
    pub to: PathBuf,
    /// Underlying I/O error.
    pub source: std::io::Error,
}
