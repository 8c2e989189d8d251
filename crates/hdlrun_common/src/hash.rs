//! Content hashing for incremental compile invalidation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Two source files with the same `ContentHash` are assumed to have identical
/// content. The compile state cache stores one hash per source file to detect
/// which files changed since the last run, and a combined fingerprint of each
/// file's direct dependencies to detect upstream changes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Combines a sequence of hashes into a single fingerprint.
    ///
    /// The result depends on the order of the inputs, so callers must supply
    /// them in a deterministic order (compile order for dependency
    /// fingerprints).
    pub fn combine<'a>(hashes: impl IntoIterator<Item = &'a ContentHash>) -> Self {
        let mut buf = Vec::new();
        for h in hashes {
            buf.extend_from_slice(&h.0);
        }
        Self::from_bytes(&buf)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"entity top is end;");
        let b = ContentHash::from_bytes(b"entity top is end;");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"package p is end;");
        let b = ContentHash::from_bytes(b"package q is end;");
        assert_ne!(a, b);
    }

    #[test]
    fn combine_is_order_sensitive() {
        let a = ContentHash::from_bytes(b"a");
        let b = ContentHash::from_bytes(b"b");
        let ab = ContentHash::combine([&a, &b]);
        let ba = ContentHash::combine([&b, &a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn combine_empty_is_stable() {
        let x = ContentHash::combine([]);
        let y = ContentHash::combine([]);
        assert_eq!(x, y);
    }

    #[test]
    fn display_format() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32, "Display should be 32 hex chars");
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(")"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
