//! Sealkit - envelope encryption, secret bundling and split RSA signatures
//!
//! - [`envelope`]: AES-128-CFB envelopes with a random IV, as base64url text
//! - [`bundle`]: two secrets sealed into one token under layered keys
//! - [`rawsig`]: unhashed PKCS#1 v1.5 signatures with message recovery
//! - [`splitsig`]: raw signatures carried as two RSA-OAEP encrypted chunks
//! - [`decoy`]: signature-shaped filler with salt markers at fixed offsets

#![forbid(unsafe_code)]

pub mod aead;
pub mod armor;
pub mod bundle;
pub mod commands;
pub mod decoy;
pub mod envelope;
pub mod error;
pub mod keynorm;
pub mod keys;
pub mod keysource;
pub mod rawsig;
pub mod splitsig;
pub mod token;

pub use error::{ErrorCategory, ErrorKind, Result, SealkitError};
