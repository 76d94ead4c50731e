//! Re-signing of a single package and the matching cache update.

use std::fs;
use std::path::Path;

use log::info;
use trustme_core::hash::hash_file;
use trustme_core::job::PackageSpec;
use trustme_core::types::Sha256Hex;

use crate::error::SignError;
use crate::patch::patch_cache;
use crate::tool::{ToolInvocation, ToolRunner};

/// Outcome of signing one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPackage {
    /// Display name from the job.
    pub name: String,
    /// Hash of the vsix before signing.
    pub original_hash: Sha256Hex,
    /// Hash of the vsix after signing.
    pub signed_hash: Sha256Hex,
    /// Occurrences of the original hash replaced in the cache.
    pub replacements: usize,
}

/// Builds the vsixsigntool command line for an in-place signature.
#[must_use]
pub fn vsixsigntool_invocation(vsixsigntool: &Path, pfx: &Path, vsix: &Path) -> ToolInvocation {
    ToolInvocation::new(vsixsigntool)
        .arg("sign")
        .arg("/f")
        .arg(pfx)
        .arg(vsix)
}

/// Signs packages with one credential and keeps their cache files in step.
pub struct PackageSigner<'a> {
    runner: &'a dyn ToolRunner,
    vsixsigntool: &'a Path,
    credential: &'a Path,
}

impl<'a> PackageSigner<'a> {
    /// Create a signer using the PFX at `credential`.
    #[must_use]
    pub fn new(runner: &'a dyn ToolRunner, vsixsigntool: &'a Path, credential: &'a Path) -> Self {
        Self {
            runner,
            vsixsigntool,
            credential,
        }
    }

    /// Sign `package.vsix` in place and rewrite its hash inside `package.cache`.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Tool`] if the signing tool fails,
    /// [`SignError::Io`] if a file cannot be read or written, or
    /// [`SignError::CachePatchFailed`] if the cache would be left unchanged.
    pub fn sign(&self, package: &PackageSpec) -> Result<SignedPackage, SignError> {
        info!("processing package: {}", package.name);

        let original_hash = hash(&package.vsix)?;
        info!("original SHA256: {original_hash}");

        self.runner.run(&vsixsigntool_invocation(
            self.vsixsigntool,
            self.credential,
            &package.vsix,
        ))?;

        let signed_hash = hash(&package.vsix)?;
        info!("new SHA256: {signed_hash}");

        info!("reading cache file {}", package.cache.display());
        let cache = fs::read(&package.cache).map_err(|source| SignError::Io {
            path: package.cache.clone(),
            source,
        })?;

        info!("patching cache");
        let patch = patch_cache(&cache, &original_hash, &signed_hash).ok_or_else(|| {
            SignError::CachePatchFailed {
                cache: package.cache.clone(),
                hash: original_hash.clone(),
            }
        })?;
        info!("replaced {} occurrence(s) of the original hash", patch.replacements);

        info!("writing patched cache back");
        fs::write(&package.cache, &patch.bytes).map_err(|source| SignError::Io {
            path: package.cache.clone(),
            source,
        })?;

        Ok(SignedPackage {
            name: package.name.clone(),
            original_hash,
            signed_hash,
            replacements: patch.replacements,
        })
    }
}

fn hash(path: &Path) -> Result<Sha256Hex, SignError> {
    hash_file(path).map_err(|source| SignError::Io {
        path: path.to_owned(),
        source,
    })
}
