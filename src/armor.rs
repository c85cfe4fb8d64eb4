//! Text armoring for binary data
//!
//! Envelopes and bundle tokens use base64url with the `=` padding removed.
//! The armored format is:
//! - Free of whitespace (including newlines)
//! - Safe to embed in URLs
//! - Safe to pass unescaped in a POSIX shell
//!
//! Split-signature artifacts keep their padding; decoding them accepts
//! either form.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, URL_SAFE, URL_SAFE_NO_PAD,
};

/// base64url decoder that accepts input with or without trailing `=`
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Wrap bytes in unpadded base64url text.
pub fn wrap(body: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(body)
}

/// Unwrap unpadded base64url text, restoring `=` padding to the next
/// multiple of four before decoding.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    let mut padded = String::with_capacity(armored.len() + 3);
    padded.push_str(armored);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    URL_SAFE.decode(&padded).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}

/// Wrap bytes in padded base64url text.
pub fn wrap_padded(body: &[u8]) -> String {
    URL_SAFE.encode(body)
}

/// Unwrap base64url text regardless of whether it carries padding.
pub fn unwrap_lenient(armored: &str) -> Result<Vec<u8>> {
    URL_SAFE_LENIENT.decode(armored).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
