//! Payload checksums
//!
//! Load batches are written to intermediate storage by the transform stage
//! and read back by the load stage. The SHA-256 of the bytes written travels
//! with the batch descriptor so the load stage can detect a payload that
//! changed or was truncated in between.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of raw bytes
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use animal_etl::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"[]");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Check `data` against an expected hex checksum (case-insensitive)
pub fn verify_checksum(data: &[u8], expected: &str) -> bool {
    calculate_checksum_bytes(data).eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum_bytes() {
        let checksum = calculate_checksum_bytes(b"Hello, World!");

        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_value() {
        assert_eq!(
            calculate_checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_checksum() {
        let data = br#"[{"id":1,"name":"Lion","friends":[],"born_at":null}]"#;
        let checksum = calculate_checksum_bytes(data);

        assert!(verify_checksum(data, &checksum));
        assert!(verify_checksum(data, &checksum.to_uppercase()));
        assert!(!verify_checksum(b"[]", &checksum));
    }
}
