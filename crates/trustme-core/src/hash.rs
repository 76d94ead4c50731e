//! SHA-256 hashing of package files.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::Sha256Hex;

/// Hash the full contents of the file at `path`.
///
/// The file is streamed through the hasher rather than loaded into memory.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> io::Result<Sha256Hex> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(Sha256Hex::from_digest(&hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.vsix");
        std::fs::write(&path, b"some vsix bytes").unwrap();
        let expected = Sha256Hex::from_digest(&Sha256::digest(b"some vsix bytes"));
        assert_eq!(hash_file(&path).unwrap(), expected);
    }
}
