//! Job configuration: the external tool paths and the ordered list of packages to re-sign.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a job configuration.
#[derive(Debug, Error)]
pub enum JobError {
    /// The configuration file could not be read.
    #[error("failed to read job configuration {}: {source}", .path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for the job schema.
    #[error("invalid JSON job configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The configuration is not valid TOML for the job schema.
    #[error("invalid TOML job configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// Two packages refer to the same file.
    #[error("packages '{first}' and '{second}' share the {field} path {}", .path.display())]
    DuplicatePath {
        /// Which package field collided (`vsix` or `cache`).
        field: &'static str,
        /// The shared path.
        path: PathBuf,
        /// Name of the package that claimed the path first.
        first: String,
        /// Name of the package that claimed it again.
        second: String,
    },
}

/// Paths to the external executables a run depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Certificate creation tool.
    pub makecert: PathBuf,
    /// Tool that combines a `.pvk` private key and `.cer` certificate into a `.pfx`.
    pub pvk2pfx: PathBuf,
    /// VSIX signing tool.
    pub vsixsigntool: PathBuf,
}

/// One package to re-sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Display name, used only in logs and error messages.
    pub name: String,
    /// The `.vsix` file, signed in place.
    pub vsix: PathBuf,
    /// Binary cache file embedding the uppercase hex SHA-256 of the vsix.
    pub cache: PathBuf,
}

/// A complete job description. Package order is preserved from the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// External tool locations.
    pub tools: ToolPaths,
    /// Packages to process, in order.
    pub packages: Vec<PackageSpec>,
}

impl JobConfig {
    /// Load a job from `path`. Files with a `.toml` extension are parsed as
    /// TOML; anything else is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] if the file cannot be read, does not match the
    /// schema, or two packages alias the same file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let raw = std::fs::read_to_string(path).map_err(|source| JobError::Read {
            path: path.to_owned(),
            source,
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    /// Parse and validate a JSON job description.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Json`] on a schema mismatch, or
    /// [`JobError::DuplicatePath`] if packages alias.
    pub fn from_json_str(raw: &str) -> Result<Self, JobError> {
        let job: Self = serde_json::from_str(raw)?;
        job.validate()?;
        Ok(job)
    }

    /// Parse and validate a TOML job description.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Toml`] on a schema mismatch, or
    /// [`JobError::DuplicatePath`] if packages alias.
    pub fn from_toml_str(raw: &str) -> Result<Self, JobError> {
        let job: Self = toml::from_str(raw)?;
        job.validate()?;
        Ok(job)
    }

    /// Check that no two packages share a vsix or cache file.
    ///
    /// Paths that exist are compared after [`std::fs::canonicalize`], so links
    /// and `..` detours to the same file collide. Paths that do not exist yet
    /// are compared lexically with `.` components removed.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::DuplicatePath`] naming both packages.
    pub fn validate(&self) -> Result<(), JobError> {
        check_unique(&self.packages, "vsix", |p| &p.vsix)?;
        check_unique(&self.packages, "cache", |p| &p.cache)
    }
}

fn check_unique(
    packages: &[PackageSpec],
    field: &'static str,
    key: impl Fn(&PackageSpec) -> &PathBuf,
) -> Result<(), JobError> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::new();
    for package in packages {
        let path = key(package);
        if let Some(first) = seen.insert(identity(path), &package.name) {
            return Err(JobError::DuplicatePath {
                field,
                path: path.clone(),
                first: first.to_owned(),
                second: package.name.clone(),
            });
        }
    }
    Ok(())
}

/// The form of `path` used to detect two packages naming one file.
fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}
