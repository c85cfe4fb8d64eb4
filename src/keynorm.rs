//! Key normalization
//!
//! Maps caller-supplied key material of any length onto a fixed-length
//! symmetric key: longer material is truncated, shorter material is
//! right-padded with ASCII `=`.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use zeroize::Zeroizing;

/// Length of the AES-128 key used by envelopes and bundles
pub const KEY_LEN: usize = 16;

/// Filler byte appended to short key material
const PAD_BYTE: u8 = b'=';

/// Normalize `material` to exactly `target_len` bytes.
///
/// Empty material yields `target_len` filler bytes. Callers that use the
/// result as a key go through [`derive_key`], which refuses empty material.
pub fn normalize(material: &[u8], target_len: usize) -> Vec<u8> {
    let mut key = material[..material.len().min(target_len)].to_vec();
    key.resize(target_len, PAD_BYTE);
    key
}

/// Derive the 16-byte envelope key from caller key material.
pub fn derive_key(material: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if material.is_empty() {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyKeyMaterial,
            "key material must not be empty",
        ));
    }

    let normalized = Zeroizing::new(normalize(material, KEY_LEN));
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&normalized);
    Ok(key)
}

/// Byte-order reversal of a key (not bit reversal).
pub fn reverse_key(key: &[u8; KEY_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut reversed = Zeroizing::new(*key);
    reversed.reverse();
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_material_is_padded() {
        assert_eq!(normalize(b"test", KEY_LEN), b"test============".to_vec());
    }

    #[test]
    fn test_long_material_is_truncated() {
        let material: Vec<u8> = (0..20).collect();
        assert_eq!(normalize(&material, KEY_LEN), material[..16].to_vec());
    }

    #[test]
    fn test_exact_material_unchanged() {
        let material = b"0123456789abcdef";
        assert_eq!(normalize(material, KEY_LEN), material.to_vec());
    }

    #[test]
    fn test_empty_material_normalizes_to_filler() {
        assert_eq!(normalize(b"", KEY_LEN), vec![b'='; KEY_LEN]);
    }

    #[test]
    fn test_other_target_lengths() {
        assert_eq!(normalize(b"abc", 5), b"abc==".to_vec());
        assert_eq!(normalize(b"abcdefgh", 3), b"abc".to_vec());
        assert!(normalize(b"abc", 0).is_empty());
    }

    #[test]
    fn test_derive_key_rejects_empty() {
        let err = derive_key(b"").expect_err("expected empty key material error");
        assert_eq!(err.kind, Some(ErrorKind::EmptyKeyMaterial));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_derive_key() {
        let key = derive_key(b"secret").unwrap();
        assert_eq!(&key[..], b"secret==========");
    }

    #[test]
    fn test_reverse_key() {
        let key: [u8; KEY_LEN] = *b"0123456789abcdef";
        assert_eq!(&reverse_key(&key)[..], b"fedcba9876543210");
        assert_eq!(*reverse_key(&reverse_key(&key)), key);
    }
}
