//! Layered secret bundles
//!
//! Two secrets are joined with a `|||` separator and sealed twice: the
//! inner envelope under the normalized key, the outer envelope under the
//! byte-reversed normalized key. The token is the outer envelope text.
//!
//! Secrets containing `|||` cannot be told apart from the separator on
//! the way back out. Splitting always happens at the first occurrence.

use crate::envelope;
use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use crate::keynorm::{derive_key, reverse_key};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Separator between the two secrets inside the inner envelope
pub const SEPARATOR: &[u8] = b"|||";

/// Bundle two secrets into one opaque token.
pub fn combine(key_material: &[u8], first: &[u8], second: &[u8]) -> Result<String> {
    combine_with_rng(key_material, first, second, &mut OsRng)
}

/// Bundle two secrets, drawing both IVs from `rng`.
pub fn combine_with_rng<R: RngCore + CryptoRng + ?Sized>(
    key_material: &[u8],
    first: &[u8],
    second: &[u8],
    rng: &mut R,
) -> Result<String> {
    let key = derive_key(key_material)?;

    let mut joined = Zeroizing::new(Vec::with_capacity(
        first.len() + SEPARATOR.len() + second.len(),
    ));
    joined.extend_from_slice(first);
    joined.extend_from_slice(SEPARATOR);
    joined.extend_from_slice(second);

    let inner = envelope::seal_with_rng(&key[..], &joined, rng)
        .map_err(|e| e.with_context("failed to seal inner envelope"))?;
    let token = envelope::seal_with_rng(&reverse_key(&key)[..], inner.as_bytes(), rng)
        .map_err(|e| e.with_context("failed to seal outer envelope"))?;

    tracing::debug!(
        first_len = first.len(),
        second_len = second.len(),
        token_len = token.len(),
        "combined secrets"
    );
    Ok(token)
}

/// Recover both secrets from a token produced by [`combine`].
pub fn split(key_material: &[u8], token: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let key = derive_key(key_material)?;

    let inner = Zeroizing::new(
        envelope::open(&reverse_key(&key)[..], token)
            .map_err(|e| e.with_context("failed to open outer envelope"))?,
    );
    // The inner envelope is base64 text; anything else means the outer
    // layer decrypted to garbage under a wrong key.
    let inner = std::str::from_utf8(&inner).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            "outer envelope does not contain an inner envelope",
            e,
        )
    })?;
    let joined = Zeroizing::new(
        envelope::open(&key[..], inner)
            .map_err(|e| e.with_context("failed to open inner envelope"))?,
    );

    let pos = joined
        .windows(SEPARATOR.len())
        .position(|w| w == SEPARATOR)
        .ok_or_else(|| {
            SealkitError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedBundle,
                "bundle does not contain a secret separator",
            )
        })?;

    let first = joined[..pos].to_vec();
    let second = joined[pos + SEPARATOR.len()..].to_vec();
    tracing::debug!(
        first_len = first.len(),
        second_len = second.len(),
        "split bundle"
    );
    Ok((first, second))
}
