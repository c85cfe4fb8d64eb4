//! RSA key handling and OAEP confidentiality
//!
//! Private keys are PEM armored PKCS#1, public keys PEM armored PKIX
//! (SubjectPublicKeyInfo). The PEM label is not checked, so public keys
//! armored as `RSA PUBLIC KEY` but holding PKIX bytes load as well.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::der::pem;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Default modulus size for generated keys
pub const DEFAULT_KEY_BITS: usize = 2048;

/// A freshly generated, PEM encoded key pair
pub struct KeyPair {
    pub private_pem: Zeroizing<String>,
    pub public_pem: String,
}

/// Generate an RSA key pair of `bits` modulus bits.
pub fn generate_keypair(bits: usize) -> Result<KeyPair> {
    generate_keypair_with_rng(bits, &mut OsRng)
}

pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(
    bits: usize,
    rng: &mut R,
) -> Result<KeyPair> {
    let private_key = RsaPrivateKey::new(rng, bits).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::KeyGeneration,
            format!("failed to generate {}-bit RSA key", bits),
            e,
        )
    })?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| key_generation_error(format!("failed to encode private key: {}", e)))?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| key_generation_error(format!("failed to encode public key: {}", e)))?;

    tracing::debug!(bits, "generated RSA key pair");
    Ok(KeyPair {
        private_pem,
        public_pem,
    })
}

/// Parse a PEM armored PKCS#1 private key.
pub fn parse_private_key(pem_text: &[u8]) -> Result<RsaPrivateKey> {
    let (_label, der) = pem::decode_vec(pem_text)
        .map_err(|e| key_parse_error(format!("failed to decode private key PEM: {}", e)))?;
    let der = Zeroizing::new(der);
    RsaPrivateKey::from_pkcs1_der(&der)
        .map_err(|e| key_parse_error(format!("failed to parse PKCS#1 private key: {}", e)))
}

/// Parse a PEM armored PKIX public key.
pub fn parse_public_key(pem_text: &[u8]) -> Result<RsaPublicKey> {
    let (_label, der) = pem::decode_vec(pem_text)
        .map_err(|e| key_parse_error(format!("failed to decode public key PEM: {}", e)))?;
    RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| key_parse_error(format!("failed to parse PKIX public key: {}", e)))
}

/// RSA-OAEP encrypt with SHA-256 and an empty label.
pub fn encrypt_oaep(public_key: &RsaPublicKey, data: &[u8]) -> Result<Vec<u8>> {
    encrypt_oaep_with_rng(public_key, data, &mut OsRng)
}

pub fn encrypt_oaep_with_rng<R: RngCore + CryptoRng>(
    public_key: &RsaPublicKey,
    data: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    public_key
        .encrypt(rng, Oaep::new::<Sha256>(), data)
        .map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Encryption,
                format!("OAEP encryption of {} bytes failed", data.len()),
                e,
            )
        })
}

/// RSA-OAEP decrypt with SHA-256 and an empty label.
pub fn decrypt_oaep(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    private_key
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Decryption,
                "OAEP decryption failed; wrong key or corrupted ciphertext",
                e,
            )
        })
}

fn key_parse_error(msg: String) -> SealkitError {
    SealkitError::with_kind(ErrorCategory::User, ErrorKind::KeyParse, msg)
}

fn key_generation_error(msg: String) -> SealkitError {
    SealkitError::with_kind(ErrorCategory::Internal, ErrorKind::KeyGeneration, msg)
}
