//! Generation of the throwaway self-signed signing credential.

use std::path::{Path, PathBuf};

use log::info;
use uuid::Uuid;

use crate::credential::{remove_best_effort, TempCredential};
use crate::error::ProvisionError;
use crate::tool::{ToolInvocation, ToolRunner};

/// Subject name written into the generated certificate.
pub const CERT_SUBJECT: &str = "CN=Microsoft Corporation";
/// RSA key length in bits.
pub const KEY_LENGTH_BITS: u32 = 4096;

/// Sibling temp-file paths derived from one random identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    /// Certificate written by makecert.
    pub cer: PathBuf,
    /// Private key written by makecert.
    pub pvk: PathBuf,
    /// Combined credential written by pvk2pfx.
    pub pfx: PathBuf,
}

impl CredentialPaths {
    /// Derive the `.cer`, `.pvk` and `.pfx` paths for `id` inside `dir`.
    #[must_use]
    pub fn new(dir: &Path, id: Uuid) -> Self {
        let stem = id.to_string();
        Self {
            cer: dir.join(format!("{stem}.cer")),
            pvk: dir.join(format!("{stem}.pvk")),
            pfx: dir.join(format!("{stem}.pfx")),
        }
    }
}

/// Builds the makecert command line for a self-signed, exportable, SHA-256
/// authority certificate.
#[must_use]
pub fn makecert_invocation(makecert: &Path, paths: &CredentialPaths) -> ToolInvocation {
    ToolInvocation::new(makecert)
        .arg("-r")
        .arg("-pe")
        .arg("-n")
        .arg(CERT_SUBJECT)
        .arg("-a")
        .arg("sha256")
        .arg("-cy")
        .arg("authority")
        .arg("-sky")
        .arg("signature")
        .arg("-len")
        .arg(KEY_LENGTH_BITS.to_string())
        .arg("-sv")
        .arg(&paths.pvk)
        .arg(&paths.cer)
}

/// Builds the pvk2pfx command line combining key and certificate into a PFX.
#[must_use]
pub fn pvk2pfx_invocation(pvk2pfx: &Path, paths: &CredentialPaths) -> ToolInvocation {
    ToolInvocation::new(pvk2pfx)
        .arg("-pvk")
        .arg(&paths.pvk)
        .arg("-spc")
        .arg(&paths.cer)
        .arg("-pfx")
        .arg(&paths.pfx)
}

/// Produces a fresh PFX credential using makecert and pvk2pfx.
pub struct CertificateProvisioner<'a> {
    runner: &'a dyn ToolRunner,
    makecert: &'a Path,
    pvk2pfx: &'a Path,
    temp_dir: PathBuf,
}

impl<'a> CertificateProvisioner<'a> {
    /// Create a provisioner writing into the platform temp directory.
    #[must_use]
    pub fn new(runner: &'a dyn ToolRunner, makecert: &'a Path, pvk2pfx: &'a Path) -> Self {
        Self {
            runner,
            makecert,
            pvk2pfx,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Write intermediate and output files into `dir` instead.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Generate the credential.
    ///
    /// The `.pvk` and `.cer` intermediates are removed whatever the outcome.
    /// On failure the `.pfx` is removed too before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] if either tool fails or no PFX is produced.
    pub fn provision(&self) -> Result<TempCredential, ProvisionError> {
        info!("generating certificate");
        let paths = CredentialPaths::new(&self.temp_dir, Uuid::new_v4());
        let credential = TempCredential::new(paths.pfx.clone());

        let outcome = self.run_tools(&paths);
        remove_best_effort(&paths.pvk);
        remove_best_effort(&paths.cer);
        outcome?;

        if !credential.path().is_file() {
            return Err(ProvisionError::MissingCredential(paths.pfx));
        }
        info!("credential generated at {}", credential.path().display());
        Ok(credential)
    }

    fn run_tools(&self, paths: &CredentialPaths) -> Result<(), ProvisionError> {
        self.runner.run(&makecert_invocation(self.makecert, paths))?;
        self.runner.run(&pvk2pfx_invocation(self.pvk2pfx, paths))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(inv: &ToolInvocation) -> Vec<String> {
        inv.args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn paths_share_the_identifier() {
        let id = Uuid::new_v4();
        let paths = CredentialPaths::new(Path::new("/tmp"), id);
        for p in [&paths.cer, &paths.pvk, &paths.pfx] {
            assert_eq!(p.file_stem().unwrap(), id.to_string().as_str());
        }
        assert_eq!(paths.pfx.extension().unwrap(), "pfx");
    }

    #[test]
    fn makecert_arguments_are_fixed() {
        let paths = CredentialPaths::new(Path::new("t"), Uuid::nil());
        let inv = makecert_invocation(Path::new("makecert.exe"), &paths);
        let pvk = paths.pvk.to_string_lossy().into_owned();
        let cer = paths.cer.to_string_lossy().into_owned();
        assert_eq!(
            rendered(&inv),
            [
                "-r", "-pe", "-n", CERT_SUBJECT, "-a", "sha256", "-cy", "authority", "-sky",
                "signature", "-len", "4096", "-sv", pvk.as_str(), cer.as_str()
            ]
        );
    }

    #[test]
    fn pvk2pfx_arguments_name_all_three_files() {
        let paths = CredentialPaths::new(Path::new("t"), Uuid::nil());
        let inv = pvk2pfx_invocation(Path::new("pvk2pfx.exe"), &paths);
        let pvk = paths.pvk.to_string_lossy().into_owned();
        let cer = paths.cer.to_string_lossy().into_owned();
        let pfx = paths.pfx.to_string_lossy().into_owned();
        assert_eq!(rendered(&inv), ["-pvk", pvk.as_str(), "-spc", cer.as_str(), "-pfx", pfx.as_str()]);
        assert_eq!(inv.program(), Path::new("pvk2pfx.exe"));
    }
}
