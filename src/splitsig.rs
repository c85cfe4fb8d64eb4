//! Split-signature artifacts
//!
//! A raw signature is too large for a single RSA-OAEP/SHA-256 block
//! (capacity `k - 66` bytes for a k-byte modulus), so it travels as two
//! chunks, `signature[..100]` and `signature[100..]`, each OAEP encrypted
//! to the recipient. The artifact is the padded base64url encoding of
//!
//! ```text
//! oaep(chunk1) || "|||" || oaep(chunk2)
//! ```
//!
//! Both OAEP blocks are exactly as long as the recipient modulus, which
//! is how the two chunks are located again. A `|||` sequence inside an
//! OAEP block therefore does not confuse recovery.

use crate::armor;
use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use crate::keys;
use crate::rawsig;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Signature bytes carried by the first chunk
pub const FIRST_CHUNK_LEN: usize = 100;

/// Separator between the two encrypted chunks
pub const SEPARATOR: &[u8] = b"|||";

/// Sign `message` and encrypt the signature to the recipient.
pub fn produce_artifact(
    signer_private_pem: &[u8],
    message: &[u8],
    recipient_public_pem: &[u8],
) -> Result<String> {
    let signer = keys::parse_private_key(signer_private_pem)?;
    let recipient = keys::parse_public_key(recipient_public_pem)?;
    produce_artifact_with_keys(&signer, message, &recipient, &mut OsRng)
}

pub fn produce_artifact_with_keys<R: RngCore + CryptoRng>(
    signer: &RsaPrivateKey,
    message: &[u8],
    recipient: &RsaPublicKey,
    rng: &mut R,
) -> Result<String> {
    // Recovery treats an empty message as failure, so it could never come back out.
    if message.is_empty() {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidLength,
            "cannot produce an artifact for an empty message",
        ));
    }

    let signature = rawsig::sign_with_key(signer, message)?;
    let (first, second) = signature.split_at(signature.len().min(FIRST_CHUNK_LEN));

    let first = keys::encrypt_oaep_with_rng(recipient, first, rng)
        .map_err(|e| e.with_context("failed to encrypt first signature chunk"))?;
    let second = keys::encrypt_oaep_with_rng(recipient, second, rng)
        .map_err(|e| e.with_context("failed to encrypt second signature chunk"))?;

    let mut joined = Vec::with_capacity(first.len() + SEPARATOR.len() + second.len());
    joined.extend_from_slice(&first);
    joined.extend_from_slice(SEPARATOR);
    joined.extend_from_slice(&second);

    tracing::debug!(
        message_len = message.len(),
        signature_len = signature.len(),
        artifact_len = joined.len(),
        "produced split-signature artifact"
    );
    Ok(armor::wrap_padded(&joined))
}

/// Decrypt an artifact and recover the message the signer signed.
pub fn recover_message(
    recipient_private_pem: &[u8],
    signer_public_pem: &[u8],
    artifact: &str,
) -> Result<Vec<u8>> {
    let recipient = keys::parse_private_key(recipient_private_pem)?;
    let signer = keys::parse_public_key(signer_public_pem)?;
    recover_message_with_keys(&recipient, &signer, artifact)
}

pub fn recover_message_with_keys(
    recipient: &RsaPrivateKey,
    signer: &RsaPublicKey,
    artifact: &str,
) -> Result<Vec<u8>> {
    let decoded =
        armor::unwrap_lenient(artifact).map_err(|e| e.with_context("failed to decode artifact"))?;
    let (first, second) = split_chunks(&decoded, recipient.size())?;

    let mut signature = Zeroizing::new(
        keys::decrypt_oaep(recipient, first)
            .map_err(|e| e.with_context("failed to decrypt first signature chunk"))?,
    );
    signature.extend_from_slice(
        &keys::decrypt_oaep(recipient, second)
            .map_err(|e| e.with_context("failed to decrypt second signature chunk"))?,
    );

    let message = rawsig::recover_with_key(signer, &signature);
    if message.is_empty() {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::Decode,
            "no message could be recovered from the signature; wrong signer key?",
        ));
    }

    tracing::debug!(message_len = message.len(), "recovered message from artifact");
    Ok(message)
}

/// Locate the two OAEP blocks of `block_len` bytes around the separator.
fn split_chunks(decoded: &[u8], block_len: usize) -> Result<(&[u8], &[u8])> {
    let expected_len = 2 * block_len + SEPARATOR.len();
    if decoded.len() != expected_len {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedArtifact,
            format!(
                "artifact is {} bytes; expected two {} byte chunks and a separator",
                decoded.len(),
                block_len
            ),
        ));
    }

    let (first, rest) = decoded.split_at(block_len);
    let Some(second) = rest.strip_prefix(SEPARATOR) else {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedArtifact,
            "artifact chunks are not separated by the expected separator",
        ));
    };

    Ok((first, second))
}
