//! Runs a complete re-signing job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use thiserror::Error;

use trustme_core::job::{JobConfig, JobError};
use trustme_sign::error::{ProvisionError, RelocateError, SignError};
use trustme_sign::provision::CertificateProvisioner;
use trustme_sign::signer::{PackageSigner, SignedPackage};
use trustme_sign::tool::ToolRunner;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The job configuration could not be loaded.
    #[error(transparent)]
    Job(#[from] JobError),
    /// The signing credential could not be generated.
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    /// A package failed to sign; later packages were not attempted.
    #[error("package '{name}' failed: {source}")]
    Package {
        /// Display name of the failing package.
        name: String,
        /// What went wrong.
        source: SignError,
    },
    /// The credential could not be moved to its destination.
    #[error(transparent)]
    Relocate(#[from] RelocateError),
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Final location of the credential.
    pub credential: PathBuf,
    /// One report per package, in job order.
    pub packages: Vec<SignedPackage>,
}

/// Drives one credential through every package of a job.
pub struct Orchestrator {
    runner: Arc<dyn ToolRunner>,
    temp_dir: Option<PathBuf>,
}

impl Orchestrator {
    /// Create an orchestrator running tools through `runner`.
    #[must_use]
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            temp_dir: None,
        }
    }

    /// Generate the credential in `dir` rather than the platform temp directory.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Load the job at `config` and run it.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Job`] if the configuration is unusable, otherwise
    /// any error from [`Orchestrator::run`].
    pub fn run_from_file(&self, config: &Path, destination: &Path) -> Result<RunSummary, RunError> {
        info!("reading configuration from {}", config.display());
        let job = JobConfig::load(config)?;
        self.run(&job, destination)
    }

    /// Provision a credential, sign every package in order, then move the
    /// credential to `destination`.
    ///
    /// The first failing package stops the run; the credential is deleted
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] describing the first failure.
    pub fn run(&self, job: &JobConfig, destination: &Path) -> Result<RunSummary, RunError> {
        let runner = self.runner.as_ref();
        let mut provisioner =
            CertificateProvisioner::new(runner, &job.tools.makecert, &job.tools.pvk2pfx);
        if let Some(dir) = &self.temp_dir {
            provisioner = provisioner.temp_dir(dir);
        }
        let credential = provisioner.provision()?;

        let signer = PackageSigner::new(runner, &job.tools.vsixsigntool, credential.path());
        let mut packages = Vec::with_capacity(job.packages.len());
        for package in &job.packages {
            match signer.sign(package) {
                Ok(report) => packages.push(report),
                Err(source) => {
                    error!("package '{}' failed, discarding credential", package.name);
                    credential.discard();
                    return Err(RunError::Package {
                        name: package.name.clone(),
                        source,
                    });
                }
            }
        }

        let credential = credential.relocate(destination)?;
        info!("signed {} package(s)", packages.len());
        Ok(RunSummary {
            credential,
            packages,
        })
    }
}
