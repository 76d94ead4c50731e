//! Ownership of the temporary signing credential.
//!
//! A [`TempCredential`] is created as soon as its path is chosen and deletes
//! the file when dropped. The only way to keep the file is
//! [`TempCredential::relocate`], which moves it to its final destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::RelocateError;

/// Remove `path`, ignoring a missing file and logging any other failure.
///
/// Never fails: cleanup must not mask the error that triggered it.
pub fn remove_best_effort(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {e}", path.display()),
    }
}

/// A credential file at a temporary path, deleted on drop unless relocated.
#[derive(Debug)]
pub struct TempCredential {
    path: PathBuf,
    armed: bool,
}

impl TempCredential {
    /// Take ownership of `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Current (temporary) location of the credential.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the credential now.
    pub fn discard(self) {
        drop(self);
    }

    /// Move the credential to `destination`, consuming the guard.
    ///
    /// If `destination` is an existing directory the file keeps its temporary
    /// name inside it. An existing file at the destination is replaced. A
    /// plain rename is tried first; when that fails (for example across
    /// filesystems) the file is copied and the temporary copy removed.
    ///
    /// Returns the final path.
    ///
    /// # Errors
    ///
    /// Returns [`RelocateError`] if neither rename nor copy succeeds. The
    /// credential is then left at its temporary path so it is not lost.
    pub fn relocate(mut self, destination: &Path) -> Result<PathBuf, RelocateError> {
        self.armed = false;
        let target = match self.path.file_name() {
            Some(name) if destination.is_dir() => destination.join(name),
            _ => destination.to_owned(),
        };
        info!(
            "moving credential from {} to {}",
            self.path.display(),
            target.display()
        );

        if let Err(e) = fs::rename(&self.path, &target) {
            debug!("rename failed ({e}), falling back to copy");
            fs::copy(&self.path, &target).map_err(|source| RelocateError {
                from: self.path.clone(),
                to: target.clone(),
                source,
            })?;
            remove_best_effort(&self.path);
        }
        Ok(target)
    }
}

impl Drop for TempCredential {
    fn drop(&mut self) {
        if self.armed {
            remove_best_effort(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn drop_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cred.pfx");
        fs::write(&path, b"pfx").unwrap();
        drop(TempCredential::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn drop_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let cred = TempCredential::new(dir.path().join("never-created.pfx"));
        cred.discard();
    }

    #[test]
    fn remove_best_effort_swallows_errors() {
        let dir = tempdir().unwrap();
        // Removing a directory with remove_file fails with something other than NotFound.
        remove_best_effort(dir.path());
        assert!(dir.path().exists());
    }

    #[test]
    fn relocate_moves_file() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("1234.pfx");
        let dest = dir.path().join("final.pfx");
        fs::write(&tmp, b"pfx").unwrap();

        let moved = TempCredential::new(tmp.clone()).relocate(&dest).unwrap();
        assert_eq!(moved, dest);
        assert!(!tmp.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"pfx");
    }

    #[test]
    fn relocate_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("1234.pfx");
        let dest = dir.path().join("final.pfx");
        fs::write(&tmp, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        TempCredential::new(tmp).relocate(&dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn relocate_into_directory_keeps_file_name() {
        let dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let tmp = dir.path().join("1234.pfx");
        fs::write(&tmp, b"pfx").unwrap();

        let moved = TempCredential::new(tmp).relocate(out.path()).unwrap();
        assert_eq!(moved, out.path().join("1234.pfx"));
        assert!(moved.exists());
    }

    #[test]
    fn failed_relocate_leaves_credential_in_place() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("1234.pfx");
        fs::write(&tmp, b"pfx").unwrap();
        let dest = dir.path().join("missing-dir").join("final.pfx");

        let err = TempCredential::new(tmp.clone()).relocate(&dest).unwrap_err();
        assert_eq!(err.from, tmp);
        assert!(tmp.exists());
    }
}
