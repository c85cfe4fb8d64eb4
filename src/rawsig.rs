//! Raw RSA signatures with message recovery
//!
//! Signing applies PKCS#1 v1.5 type 1 padding directly to the message
//! bytes, with no hash and no DigestInfo prefix, so a k-byte modulus can
//! carry at most k - 11 message bytes.
//!
//! Recovery does not verify. It runs the public-key transform and strips
//! the padding block `00 01 FF..FF 00` by scanning for the first `FF 00`
//! pair at or after offset 2 of the minimal big-endian encoding (which drops
//! the leading `00`). This is an approximation of PKCS#1 unpadding, not a
//! verified-safe primitive: it accepts any value that happens to contain an
//! `FF 00` pair and returns an empty message when none exists.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use crate::keys;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

/// Bytes of PKCS#1 v1.5 padding overhead
pub const PKCS1_OVERHEAD: usize = 11;

/// End of the padding block
const PADDING_END: [u8; 2] = [0xFF, 0x00];

/// Largest message a raw signature under `key` can carry.
pub fn max_message_len(key: &impl PublicKeyParts) -> usize {
    key.size().saturating_sub(PKCS1_OVERHEAD)
}

/// Sign `message` with a PEM encoded PKCS#1 private key.
pub fn sign(private_pem: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let private_key = keys::parse_private_key(private_pem)?;
    sign_with_key(&private_key, message)
}

/// Sign `message` without hashing it.
pub fn sign_with_key(private_key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let max_len = max_message_len(private_key);
    if message.len() > max_len {
        return Err(SealkitError::with_kind(
            ErrorCategory::User,
            ErrorKind::MessageTooLong,
            format!(
                "message of {} bytes exceeds the {} byte raw signature capacity",
                message.len(),
                max_len
            ),
        ));
    }

    let signature = private_key
        .sign(Pkcs1v15Sign::new_unprefixed(), message)
        .map_err(|e| {
            SealkitError::with_source(
                ErrorCategory::Internal,
                "raw PKCS#1 v1.5 signing failed",
                e,
            )
        })?;

    tracing::debug!(
        message_len = message.len(),
        signature_len = signature.len(),
        "created raw signature"
    );
    Ok(signature)
}

/// Recover the signed message using a PEM encoded PKIX public key.
pub fn recover_message(public_pem: &[u8], signature: &[u8]) -> Result<Vec<u8>> {
    let public_key = keys::parse_public_key(public_pem)?;
    Ok(recover_with_key(&public_key, signature))
}

/// Recover the signed message from `signature`.
///
/// Returns an empty vector when no padding terminator is found; callers
/// must treat an empty result as a failed recovery.
pub fn recover_with_key(public_key: &RsaPublicKey, signature: &[u8]) -> Vec<u8> {
    let m = BigUint::from_bytes_be(signature);
    let c = m.modpow(public_key.e(), public_key.n());
    let out = c.to_bytes_be();

    let start = out
        .get(2..)
        .and_then(|tail| tail.windows(2).position(|w| w == PADDING_END))
        .map(|pos| pos + 2 + PADDING_END.len());

    match start {
        Some(start) => {
            tracing::trace!(message_len = out.len() - start, "recovered message");
            out[start..].to_vec()
        }
        None => {
            tracing::debug!("no padding terminator in recovered block");
            Vec::new()
        }
    }
}
