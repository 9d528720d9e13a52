//! Markup fingerprinting.
//!
//! A fingerprint ties a validation verdict to the exact markup it was
//! computed for, so later edits invalidate it.

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 of markup text.
#[must_use]
pub fn fingerprint(markup: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markup.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the first eight characters of a fingerprint, for display.
#[must_use]
pub fn short(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let a = fingerprint("<devops-config/>");
        assert_eq!(a, fingerprint("<devops-config/>"));
        assert_ne!(a, fingerprint("<devops-config />"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_short() {
        let full = fingerprint("x");
        assert_eq!(short(&full).len(), 8);
        assert_eq!(short("abc"), "abc");
    }
}
