//! Short tokens derived from hashes or randomness

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Offset into the encoded digest where shortened hash tokens start
const HASH_TOKEN_OFFSET: usize = 10;

/// Encoded length of a SHA-256 digest in padded base64url
const ENCODED_DIGEST_LEN: usize = 44;

/// Longest shortened hash token
pub const MAX_HASH_TOKEN_LEN: usize = ENCODED_DIGEST_LEN - HASH_TOKEN_OFFSET;

/// SHA-256 of `data` as padded base64url text.
///
/// A `len` of zero returns the full 44-character encoding; otherwise the
/// `len` characters starting at offset 10 are returned.
pub fn hash_token(data: &[u8], len: usize) -> Result<String> {
    if len > MAX_HASH_TOKEN_LEN {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidLength,
            format!(
                "hash token length {} exceeds maximum of {}",
                len, MAX_HASH_TOKEN_LEN
            ),
        ));
    }

    let encoded = URL_SAFE.encode(Sha256::digest(data));
    if len == 0 {
        return Ok(encoded);
    }
    Ok(encoded[HASH_TOKEN_OFFSET..HASH_TOKEN_OFFSET + len].to_string())
}

/// `n` random bytes as lowercase hex.
pub fn random_hex(n: usize) -> Result<String> {
    random_hex_with_rng(n, &mut OsRng)
}

pub fn random_hex_with_rng<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Result<String> {
    Ok(hex::encode(random_bytes(n, rng)?))
}

/// `n` characters of base64url text drawn from `n` random bytes.
pub fn random_text(n: usize) -> Result<String> {
    random_text_with_rng(n, &mut OsRng)
}

pub fn random_text_with_rng<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Result<String> {
    let mut encoded = URL_SAFE.encode(random_bytes(n, rng)?);
    encoded.truncate(n);
    Ok(encoded)
}

fn random_bytes<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; n];
    rng.try_fill_bytes(&mut bytes).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Randomness,
            "failed to read from random source",
            e,
        )
    })?;
    Ok(bytes)
}
