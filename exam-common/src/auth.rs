//! Update secret verification
//!
//! Dataset updates are gated by a single shared secret taken from the
//! bootstrap configuration. An unset secret disables updates entirely.
//!
//! Comparison is done on SHA-256 digests so the check does not leak the
//! length of the configured secret or stop at the first differing byte.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 digest of a secret as 64 hex characters
///
/// # Examples
///
/// ```
/// use exam_common::auth::secret_digest;
///
/// let digest = secret_digest("hunter2");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn secret_digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify an attempted secret against the configured one
///
/// Returns `false` when no secret is configured.
pub fn verify_update_secret(configured: Option<&str>, attempt: &str) -> bool {
    let Some(configured) = configured else {
        return false;
    };
    if configured.is_empty() {
        return false;
    }

    let expected = Sha256::digest(configured.as_bytes());
    let provided = Sha256::digest(attempt.as_bytes());

    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret_accepted() {
        assert!(verify_update_secret(Some("s3cret"), "s3cret"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(!verify_update_secret(Some("s3cret"), "s3cret "));
        assert!(!verify_update_secret(Some("s3cret"), ""));
    }

    #[test]
    fn test_unset_secret_rejects_everything() {
        assert!(!verify_update_secret(None, ""));
        assert!(!verify_update_secret(None, "anything"));
        assert!(!verify_update_secret(Some(""), ""));
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let a = secret_digest("abc");
        assert_eq!(a, secret_digest("abc"));
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(a, secret_digest("abd"));
    }
}
