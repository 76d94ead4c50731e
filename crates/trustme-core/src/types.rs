//! Digest newtype shared by the hasher and the cache patcher.

use std::fmt;

/// A SHA-256 digest rendered as exactly 64 uppercase hex characters.
///
/// This is the form in which installer cache files embed package hashes, so
/// the ASCII bytes of [`Sha256Hex::as_bytes`] are what gets searched for and
/// substituted during cache patching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Hex(String);

impl Sha256Hex {
    /// Render a raw digest as uppercase hex.
    ///
    /// Callers pass the 32-byte output of a SHA-256 hasher.
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode_upper(digest))
    }

    /// Return the uppercase hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the ASCII bytes of the uppercase hex string.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Sha256Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_uppercase_hex() {
        let digest = Sha256Hex::from_digest(&[0xab; 32]);
        assert_eq!(digest.as_str(), "AB".repeat(32));
        assert_eq!(digest.to_string(), digest.as_str());
        assert_eq!(digest.as_bytes().len(), 64);
    }
}
