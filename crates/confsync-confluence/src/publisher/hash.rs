//! Content hashing for change detection.
//!
//! The published bytes of every page and attachment are hashed and the
//! digest is stored as a content property on the remote side. On the next
//! publish the stored digest decides whether an update call is needed at
//! all, which is what makes republishing an unchanged tree free of
//! mutations.

use sha2::{Digest, Sha256};

/// Property key under which a page's content hash is stored.
///
/// Attachment hashes use the attachment's own ID as the key, stored on
/// the owning page.
pub const CONTENT_HASH_KEY: &str = "content-hash";

/// Hex-encoded SHA-256 digest of the given bytes.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Whether the stored digest differs from the new one.
///
/// A missing stored digest always counts as changed.
#[must_use]
pub fn hash_changed(stored: Option<&str>, new: &str) -> bool {
    stored.is_none_or(|s| s != new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hash_is_64_hex_chars() {
        let hash = content_hash(b"<p>some page body</p>");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_known_vector() {
        // sha256("Hello")
        assert_eq!(
            content_hash(b"Hello"),
            "185f8db32271fe25f561a6fc938b2e264306ec304eda518007d1764826381969"
        );
    }

    #[test]
    fn test_hash_empty_input() {
        // sha256("")
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_differs_for_different_input() {
        assert_ne!(content_hash(b"one"), content_hash(b"two"));
    }

    #[test]
    fn test_hash_changed_missing_stored() {
        assert!(hash_changed(None, "abc"));
    }

    #[test]
    fn test_hash_changed_same() {
        assert!(!hash_changed(Some("abc"), "abc"));
    }

    #[test]
    fn test_hash_changed_different() {
        assert!(hash_changed(Some("abc"), "def"));
    }
}
