//! Sources of symmetric key material for the command-line tool

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for obtaining key material from various sources
pub trait KeySource {
    /// Read key material as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the material wrapped in `Zeroizing` so it is wiped from
    /// memory when dropped.
    fn read_key_material(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns fixed key material (for testing)
pub struct ConstantKeySource {
    material: Zeroizing<Vec<u8>>,
}

impl ConstantKeySource {
    pub fn new(material: Vec<u8>) -> Self {
        Self {
            material: Zeroizing::new(material),
        }
    }
}

impl KeySource for ConstantKeySource {
    fn read_key_material(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.material).clone()))
    }
}

/// Reads key material verbatim from any io::Read source, until EOF
pub struct ReaderKeySource {
    reader: Box<dyn Read>,
}

impl ReaderKeySource {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeySource for ReaderKeySource {
    fn read_key_material(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading key material: {}", e),
                e,
            )
        })?;
        Ok(data)
    }
}

/// Reads key material from the terminal with no echo
pub struct TerminalKeySource;

impl TerminalKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for TerminalKeySource {
    /// Read key material from the terminal.
    ///
    /// Note: Terminal input is limited to UTF-8 due to rpassword library constraints.
    /// For non-UTF-8 key material, use --key-stdin instead.
    fn read_key_material(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(SealkitError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyMaterialUnavailable,
                "cannot read key from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(b"Key (sealkit): ")
            .and_then(|()| stderr.flush())
            .map_err(|e| {
                SealkitError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;

        // rpassword returns a String (UTF-8 only) that is not zeroized
        let material = rpassword::read_password().map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyMaterialUnavailable,
                format!("failure reading key: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(material.into_bytes()))
    }
}
