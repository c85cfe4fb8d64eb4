//! Golden test vector validation
//!
//! The vectors were produced by an independent implementation and pin the
//! wire formats: envelope text, raw signatures, split-signature artifacts
//! and hash tokens.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::Deserialize;

use sealkit::{envelope, keys, rawsig, splitsig, token};

const SIGNER_PRIVATE: &str = include_str!("../testdata/signer_private.pem");
const SIGNER_PUBLIC: &str = include_str!("../testdata/signer_public.pem");
const SIGNER_PUBLIC_LEGACY_LABEL: &str = include_str!("../testdata/signer_public_legacy_label.pem");
const RECIPIENT_PRIVATE: &str = include_str!("../testdata/recipient_private.pem");

#[derive(Debug, Deserialize)]
struct GoldenVectors {
    envelopes: Vec<EnvelopeVector>,
    signatures: Vec<SignatureVector>,
    artifacts: Vec<ArtifactVector>,
    hash_tokens: Vec<HashTokenVector>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeVector {
    key: String,
    iv: String,
    plaintext: String,
    envelope: String,
    comment: String,
}

#[derive(Debug, Deserialize)]
struct SignatureVector {
    message: String,
    signature: String,
    comment: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactVector {
    message: String,
    artifact: String,
    comment: String,
}

#[derive(Debug, Deserialize)]
struct HashTokenVector {
    data: String,
    len: usize,
    token: String,
}

fn load_golden_vectors() -> serde_json::Result<GoldenVectors> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data)
}

fn decode(field: &str, value: &str) -> Vec<u8> {
    BASE64_STANDARD
        .decode(value)
        .unwrap_or_else(|e| panic!("failed to decode {}: {}", field, e))
}

#[test]
fn test_envelope_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    assert!(!vectors.envelopes.is_empty(), "No envelope vectors were tested");

    for (i, vector) in vectors.envelopes.iter().enumerate() {
        let key = decode("key", &vector.key);
        let iv: [u8; envelope::IV_LEN] = decode("iv", &vector.iv)
            .try_into()
            .expect("iv must be 16 bytes");
        let plaintext = decode("plaintext", &vector.plaintext);

        let sealed = envelope::seal_with_iv(&key, &plaintext, &iv)
            .unwrap_or_else(|e| panic!("vector {} ({}): seal failed: {}", i, vector.comment, e));
        assert_eq!(
            sealed, vector.envelope,
            "vector {} ({}): envelope mismatch",
            i, vector.comment
        );

        let opened = envelope::open(&key, &vector.envelope)
            .unwrap_or_else(|e| panic!("vector {} ({}): open failed: {}", i, vector.comment, e));
        assert_eq!(
            opened, plaintext,
            "vector {} ({}): plaintext mismatch",
            i, vector.comment
        );
    }
}

#[test]
fn test_signature_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    assert!(!vectors.signatures.is_empty(), "No signature vectors were tested");

    for (i, vector) in vectors.signatures.iter().enumerate() {
        let message = decode("message", &vector.message);
        let expected = decode("signature", &vector.signature);

        // PKCS#1 v1.5 type-1 padding is deterministic.
        let signature = rawsig::sign(SIGNER_PRIVATE.as_bytes(), &message)
            .unwrap_or_else(|e| panic!("vector {} ({}): sign failed: {}", i, vector.comment, e));
        assert_eq!(
            signature, expected,
            "vector {} ({}): signature mismatch",
            i, vector.comment
        );

        let recovered = rawsig::recover_message(SIGNER_PUBLIC.as_bytes(), &expected)
            .unwrap_or_else(|e| panic!("vector {} ({}): recover failed: {}", i, vector.comment, e));
        assert_eq!(
            recovered, message,
            "vector {} ({}): recovered message mismatch",
            i, vector.comment
        );
    }
}

#[test]
fn test_artifact_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    assert!(!vectors.artifacts.is_empty(), "No artifact vectors were tested");

    for (i, vector) in vectors.artifacts.iter().enumerate() {
        let message = decode("message", &vector.message);
        let recovered = splitsig::recover_message(
            RECIPIENT_PRIVATE.as_bytes(),
            SIGNER_PUBLIC.as_bytes(),
            &vector.artifact,
        )
        .unwrap_or_else(|e| panic!("vector {} ({}): recover failed: {:#}", i, vector.comment, e));
        assert_eq!(
            recovered, message,
            "vector {} ({}): recovered message mismatch",
            i, vector.comment
        );
    }
}

/// The artifact text may arrive with its padding stripped.
#[test]
fn test_artifact_without_padding() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors.artifacts[0];

    let recovered = splitsig::recover_message(
        RECIPIENT_PRIVATE.as_bytes(),
        SIGNER_PUBLIC.as_bytes(),
        vector.artifact.trim_end_matches('='),
    )
    .expect("recover failed");
    assert_eq!(recovered, decode("message", &vector.message));
}

#[test]
fn test_hash_token_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    assert!(!vectors.hash_tokens.is_empty(), "No hash token vectors were tested");

    for vector in &vectors.hash_tokens {
        let data = decode("data", &vector.data);
        assert_eq!(
            token::hash_token(&data, vector.len).expect("hash token failed"),
            vector.token,
            "hash token mismatch for len {}",
            vector.len
        );
    }
}

/// Public keys are accepted regardless of the PEM label they carry.
#[test]
fn test_legacy_public_key_label() {
    let modern = keys::parse_public_key(SIGNER_PUBLIC.as_bytes()).expect("parse PUBLIC KEY");
    let legacy = keys::parse_public_key(SIGNER_PUBLIC_LEGACY_LABEL.as_bytes())
        .expect("parse RSA PUBLIC KEY");
    assert_eq!(modern, legacy);

    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors.signatures[0];
    let recovered = rawsig::recover_message(
        SIGNER_PUBLIC_LEGACY_LABEL.as_bytes(),
        &decode("signature", &vector.signature),
    )
    .expect("recover failed");
    assert_eq!(recovered, decode("message", &vector.message));
}
