//! Spec content checksum computation and verification.

use podlock_util::errors::PodlockError;
use podlock_util::hash::{sha1_bytes, sha256_bytes};

/// Compute the native (SHA-256) checksum of spec content.
pub fn compute(content: &[u8]) -> String {
    sha256_bytes(content)
}

/// Verify spec content against a recorded checksum.
///
/// The digest length selects the algorithm: 40 hex digits are verified as
/// legacy SHA-1, anything else as SHA-256. Comparison is case-insensitive.
pub fn verify(package: &str, expected: &str, content: &[u8]) -> miette::Result<()> {
    let actual = if expected.len() == 40 {
        sha1_bytes(content)
    } else {
        sha256_bytes(content)
    };

    if actual.eq_ignore_ascii_case(expected) {
        tracing::debug!("checksum ok for {package}");
        Ok(())
    } else {
        Err(PodlockError::ChecksumMismatch {
            package: package.to_string(),
            expected: expected.to_string(),
            actual,
        }
        .into())
    }
}
