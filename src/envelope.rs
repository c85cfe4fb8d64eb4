//! Symmetric envelopes using AES-128 in cipher-feedback mode
//!
//! An envelope is the unpadded base64url encoding of:
//! - iv: 16 random bytes
//! - ciphertext: AES-128-CFB of the PKCS#7 padded plaintext
//!
//! Envelopes carry no authentication tag. A wrong key is detected only
//! through invalid padding, which is likely but not certain.

use crate::armor;
use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use aes::Aes128;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

type Aes128CfbEnc = cfb_mode::Encryptor<Aes128>;
type Aes128CfbDec = cfb_mode::Decryptor<Aes128>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Length of the initialization vector prefix in bytes
pub const IV_LEN: usize = 16;

/// PKCS#7 pad `plaintext` to a multiple of [`BLOCK_SIZE`].
///
/// Block-aligned input still receives a full block of padding.
pub fn pad(plaintext: &[u8]) -> Vec<u8> {
    let n = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(plaintext.len() + n);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + n, n as u8);
    padded
}

/// Strip PKCS#7 padding.
pub fn unpad(padded: &[u8]) -> Result<&[u8]> {
    let Some(&last) = padded.last() else {
        return Err(unpad_error("nothing to unpad"));
    };
    let n = last as usize;

    if n > padded.len() {
        return Err(unpad_error(
            "padding longer than data; this could happen when an incorrect key is used",
        ));
    }

    let (body, padding) = padded.split_at(padded.len() - n);
    if n == 0 || n > BLOCK_SIZE || padding.iter().any(|&b| b != last) {
        return Err(unpad_error(
            "invalid padding; this could happen when an incorrect key is used",
        ));
    }

    Ok(body)
}

/// Seal `plaintext` under a 16-byte key with a fresh random IV.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<String> {
    seal_with_rng(key, plaintext, &mut OsRng)
}

/// Seal `plaintext` drawing the IV from `rng`.
pub fn seal_with_rng<R: RngCore + CryptoRng + ?Sized>(
    key: &[u8],
    plaintext: &[u8],
    rng: &mut R,
) -> Result<String> {
    let mut iv = [0u8; IV_LEN];
    rng.try_fill_bytes(&mut iv).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Randomness,
            "failed to generate initialization vector",
            e,
        )
    })?;

    seal_with_iv(key, plaintext, &iv)
}

/// Seal `plaintext` using the provided IV.
///
/// This function is ONLY for known-answer tests that need deterministic output.
/// NEVER use this in production - always use `seal()` which generates a random IV.
pub fn seal_with_iv(key: &[u8], plaintext: &[u8], iv: &[u8; IV_LEN]) -> Result<String> {
    let cipher = Aes128CfbEnc::new_from_slices(key, iv).map_err(|_| cipher_init_error(key))?;

    let padded = Zeroizing::new(pad(plaintext));
    let mut output = Vec::with_capacity(IV_LEN + padded.len());
    output.extend_from_slice(iv);
    output.extend_from_slice(&padded);
    cipher.encrypt(&mut output[IV_LEN..]);

    tracing::trace!(
        plaintext_len = plaintext.len(),
        sealed_len = output.len(),
        "sealed envelope"
    );

    Ok(armor::wrap(&output))
}

/// Open an envelope produced by [`seal`] with the same key.
pub fn open(key: &[u8], envelope: &str) -> Result<Vec<u8>> {
    if key.len() != BLOCK_SIZE {
        return Err(cipher_init_error(key));
    }

    let mut decoded = Zeroizing::new(
        armor::unwrap(envelope).map_err(|e| e.with_context("failed to decode envelope"))?,
    );
    if decoded.is_empty() || decoded.len() % BLOCK_SIZE != 0 {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::Decode,
            format!(
                "decoded envelope length {} is not a positive multiple of the block size",
                decoded.len()
            ),
        ));
    }

    let (iv, body) = decoded.split_at_mut(IV_LEN);
    let cipher = Aes128CfbDec::new_from_slices(key, iv).map_err(|_| cipher_init_error(key))?;
    cipher.decrypt(body);

    let plaintext = unpad(body)?.to_vec();
    tracing::trace!(plaintext_len = plaintext.len(), "opened envelope");
    Ok(plaintext)
}

fn cipher_init_error(key: &[u8]) -> SealkitError {
    SealkitError::with_kind(
        ErrorCategory::User,
        ErrorKind::CipherInit,
        format!(
            "invalid key length {}; expected {} bytes",
            key.len(),
            BLOCK_SIZE
        ),
    )
}

fn unpad_error(msg: &str) -> SealkitError {
    SealkitError::with_kind(ErrorCategory::User, ErrorKind::Unpad, msg)
}
