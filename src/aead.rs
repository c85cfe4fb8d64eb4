//! AES-GCM sealing with a caller-managed nonce
//!
//! Unlike envelopes, the nonce is supplied by the caller and is not part
//! of the output. Never seal two messages under the same key and nonce.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use aes::Aes192;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};

/// Length of a GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

enum GcmCipher {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl GcmCipher {
    fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 => Ok(Self::Aes128(Box::new(Aes128Gcm::new(key.into())))),
            24 => Ok(Self::Aes192(Box::new(Aes192Gcm::new(key.into())))),
            32 => Ok(Self::Aes256(Box::new(Aes256Gcm::new(key.into())))),
            n => Err(SealkitError::with_kind(
                ErrorCategory::User,
                ErrorKind::CipherInit,
                format!("invalid AES-GCM key length {}; expected 16, 24 or 32 bytes", n),
            )),
        }
    }
}

fn check_nonce(nonce: &[u8]) -> Result<&Nonce<U12>> {
    if nonce.len() != NONCE_LEN {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::CipherInit,
            format!(
                "invalid nonce length {}; expected {} bytes",
                nonce.len(),
                NONCE_LEN
            ),
        ));
    }
    Ok(Nonce::from_slice(nonce))
}

/// Encrypt and authenticate `plaintext`. The output carries a 16-byte tag.
pub fn seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = check_nonce(nonce)?;
    let sealed = match GcmCipher::new(key)? {
        GcmCipher::Aes128(cipher) => cipher.encrypt(nonce, plaintext),
        GcmCipher::Aes192(cipher) => cipher.encrypt(nonce, plaintext),
        GcmCipher::Aes256(cipher) => cipher.encrypt(nonce, plaintext),
    };
    sealed.map_err(|_| {
        SealkitError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::Encryption,
            "AES-GCM encryption failed",
        )
    })
}

/// Verify and decrypt a message produced by [`seal`].
pub fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let nonce = check_nonce(nonce)?;
    let opened = match GcmCipher::new(key)? {
        GcmCipher::Aes128(cipher) => cipher.decrypt(nonce, ciphertext),
        GcmCipher::Aes192(cipher) => cipher.decrypt(nonce, ciphertext),
        GcmCipher::Aes256(cipher) => cipher.decrypt(nonce, ciphertext),
    };
    opened.map_err(|_| {
        SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::Decryption,
            "corrupt input, tampered-with data, or wrong key",
        )
    })
}
