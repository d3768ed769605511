//! Entity tags for served images.

use sha2::{Digest, Sha256};

/// Returns a quoted strong ETag: the hex SHA-256 of the content.
pub fn etag_for(bytes: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(bytes)))
}

/// Returns true if an `If-None-Match` header value matches `etag`.
///
/// Handles comma-separated lists, weak validators and `*`.
pub fn if_none_match_hits(header: &str, etag: &str) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_full_sha256_hex() {
        assert_eq!(
            etag_for(b"abc"),
            "\"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\""
        );
    }

    #[test]
    fn test_etag_is_stable_and_quoted() {
        let a = etag_for(b"image-bytes");
        let b = etag_for(b"image-bytes");
        assert_eq!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a.len(), 66);
        assert_ne!(a, etag_for(b"other-bytes"));
    }

    #[test]
    fn test_if_none_match() {
        let tag = etag_for(b"x");
        assert!(if_none_match_hits(&tag, &tag));
        assert!(if_none_match_hits(&format!("\"nope\", {}", tag), &tag));
        assert!(if_none_match_hits(&format!("W/{}", tag), &tag));
        assert!(if_none_match_hits("*", &tag));
        assert!(!if_none_match_hits("\"nope\"", &tag));
    }
}
