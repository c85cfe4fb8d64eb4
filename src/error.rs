use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error is not caused by
    /// the caller, merely that the code cannot tell.
    Internal,

    /// The caller provided invalid input (malformed keys, tokens or salts,
    /// the wrong key, oversized messages).
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A PEM or DER encoded RSA key could not be parsed.
    KeyParse,
    /// The symmetric key or nonce has the wrong length for the cipher.
    CipherInit,
    /// Base64 or structural decoding of an envelope or artifact failed.
    Decode,
    /// The padding block is invalid; usually the wrong key or tampering.
    Unpad,
    /// A decrypted bundle lacks the separator between its two secrets.
    MalformedBundle,
    /// A split-signature artifact does not consist of exactly two chunks.
    MalformedArtifact,
    /// The message exceeds what a raw PKCS#1 v1.5 signature can carry.
    MessageTooLong,
    /// Public-key or authenticated decryption failed.
    Decryption,
    /// Public-key or authenticated encryption failed.
    Encryption,
    /// A decoy salt does not end in a usable interval digit.
    BadSaltFormat,
    /// Key material was empty.
    EmptyKeyMaterial,
    /// A requested length is outside what the operation can produce.
    InvalidLength,
    /// The operating system random source failed.
    Randomness,
    /// RSA key-pair generation or encoding failed.
    KeyGeneration,
    /// Key material could not be obtained from the configured source.
    KeyMaterialUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SealkitError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SealkitError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that retains the originating source error.
    pub fn with_source(
        category: ErrorCategory,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: None,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The message describing the failing step.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving
    /// the original as source. Category and kind carry over unchanged.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SealkitError>;
