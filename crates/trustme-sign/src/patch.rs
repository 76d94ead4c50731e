//! Substitution of an embedded package hash inside an opaque cache blob.

use trustme_core::types::Sha256Hex;

/// Result of a successful cache patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePatch {
    /// The patched cache content.
    pub bytes: Vec<u8>,
    /// How many occurrences of the old hash were replaced.
    pub replacements: usize,
}

/// Replace every non-overlapping occurrence of `needle` in `haystack`,
/// scanning left to right.
///
/// Returns the new buffer and the number of replacements made. An empty
/// needle matches nothing.
#[must_use]
pub fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> (Vec<u8>, usize) {
    if needle.is_empty() || needle.len() > haystack.len() {
        return (haystack.to_vec(), 0);
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut count = 0;
    let mut pos = 0;
    while pos < haystack.len() {
        if haystack[pos..].starts_with(needle) {
            out.extend_from_slice(replacement);
            pos += needle.len();
            count += 1;
        } else {
            out.push(haystack[pos]);
            pos += 1;
        }
    }
    (out, count)
}

/// Swap the ASCII form of `original` for `signed` throughout `cache`.
///
/// Returns `None` when the output would be byte-identical to the input:
/// either `original` does not occur, or the two hashes are equal. Callers
/// must treat that as a failure, since writing the cache back would leave a
/// stale hash behind.
#[must_use]
pub fn patch_cache(cache: &[u8], original: &Sha256Hex, signed: &Sha256Hex) -> Option<CachePatch> {
    let (bytes, replacements) = replace_all(cache, original.as_bytes(), signed.as_bytes());
    if bytes == cache {
        return None;
    }
    Some(CachePatch {
        bytes,
        replacements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(fill: u8) -> Sha256Hex {
        Sha256Hex::from_digest(&[fill; 32])
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn replace_all_handles_edges() {
        assert_eq!(replace_all(b"abcabc", b"abc", b"X"), (b"XX".to_vec(), 2));
        assert_eq!(replace_all(b"aaaa", b"aa", b"b"), (b"bb".to_vec(), 2));
        assert_eq!(replace_all(b"xyz", b"", b"q"), (b"xyz".to_vec(), 0));
        assert_eq!(replace_all(b"ab", b"abc", b"q"), (b"ab".to_vec(), 0));
        assert_eq!(replace_all(b"", b"a", b"q"), (Vec::new(), 0));
    }

    #[test]
    fn patch_replaces_every_occurrence() {
        let old = digest(0x1a);
        let new = digest(0x2b);
        let mut cache = b"\x00\x01header".to_vec();
        cache.extend_from_slice(old.as_bytes());
        cache.extend_from_slice(b"/\xff\xfe");
        cache.extend_from_slice(old.as_bytes());

        let patch = patch_cache(&cache, &old, &new).unwrap();
        assert_eq!(patch.replacements, 2);
        assert_eq!(count(&patch.bytes, old.as_bytes()), 0);
        assert_eq!(count(&patch.bytes, new.as_bytes()), 2);
        assert!(patch.bytes.starts_with(b"\x00\x01header"));
        assert_eq!(patch.bytes.len(), cache.len());
    }

    #[test]
    fn patch_fails_when_hash_absent() {
        let old = digest(0x1a);
        let new = digest(0x2b);
        assert!(patch_cache(b"no hash in here", &old, &new).is_none());
    }

    #[test]
    fn patch_fails_when_hash_unchanged() {
        let same = digest(0x1a);
        let mut cache = b"prefix".to_vec();
        cache.extend_from_slice(same.as_bytes());
        assert!(patch_cache(&cache, &same, &same).is_none());
    }

    #[test]
    fn lowercase_occurrence_is_not_matched() {
        let old = digest(0x1a);
        let new = digest(0x2b);
        let cache = old.as_str().to_ascii_lowercase().into_bytes();
        assert!(patch_cache(&cache, &old, &new).is_none());
    }
}
