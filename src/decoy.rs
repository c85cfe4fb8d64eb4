//! Decoy signatures
//!
//! A salt is a run of marker bytes followed by one ASCII digit, the
//! interval. A decoy for salt `AB3` is `3 * 2` bytes of random filler with
//! `A` at offset 0 and `B` at offset 3.
//!
//! Decoys only have to look like signatures to casual inspection. Anyone
//! who knows the salt can produce one, so a passing check proves nothing
//! about who made the decoy.

use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Outcome of comparing a decoy against its salt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyCheck {
    matched: Vec<usize>,
    markers: usize,
    expected_len: usize,
    actual_len: usize,
}

impl DecoyCheck {
    /// Marker indices whose byte was found at its expected offset.
    pub fn matched_positions(&self) -> &[usize] {
        &self.matched
    }

    /// Number of markers the salt defines.
    pub fn marker_count(&self) -> usize {
        self.markers
    }

    /// True when the decoy has the expected length and every marker matched.
    pub fn is_match(&self) -> bool {
        self.matched.len() == self.markers && self.actual_len == self.expected_len
    }
}

/// Split a salt into its markers and interval.
fn parse_salt(salt: &[u8]) -> Result<(&[u8], usize)> {
    let Some((&digit, markers)) = salt.split_last() else {
        return Err(bad_salt("salt is empty"));
    };
    if !digit.is_ascii_digit() {
        return Err(bad_salt(format!(
            "salt must end in an interval digit, found byte 0x{:02x}",
            digit
        )));
    }

    let interval = usize::from(digit - b'0');
    if interval == 0 && !markers.is_empty() {
        return Err(bad_salt("salt interval must be at least 1"));
    }
    Ok((markers, interval))
}

/// Generate a decoy for `salt` using the OS random source.
pub fn generate(salt: &[u8]) -> Result<Vec<u8>> {
    generate_with_rng(salt, &mut OsRng)
}

pub fn generate_with_rng<R: RngCore + CryptoRng>(salt: &[u8], rng: &mut R) -> Result<Vec<u8>> {
    let (markers, interval) = parse_salt(salt)?;

    let mut decoy = vec![0u8; interval * markers.len()];
    rng.try_fill_bytes(&mut decoy).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Randomness,
            "failed to generate decoy filler",
            e,
        )
    })?;
    for (i, &marker) in markers.iter().enumerate() {
        decoy[i * interval] = marker;
    }

    tracing::debug!(
        markers = markers.len(),
        interval,
        decoy_len = decoy.len(),
        "generated decoy"
    );
    Ok(decoy)
}

/// Read the markers back out of `decoy` and compare them with `salt`.
///
/// Never panics on short decoys; missing offsets count as mismatches.
pub fn extract(salt: &[u8], decoy: &[u8]) -> Result<DecoyCheck> {
    let (markers, interval) = parse_salt(salt)?;

    let matched = markers
        .iter()
        .enumerate()
        .filter(|&(i, marker)| decoy.get(i * interval) == Some(marker))
        .map(|(i, _)| i)
        .collect();

    Ok(DecoyCheck {
        matched,
        markers: markers.len(),
        expected_len: interval * markers.len(),
        actual_len: decoy.len(),
    })
}

fn bad_salt(msg: impl Into<String>) -> SealkitError {
    SealkitError::with_kind(ErrorCategory::User, ErrorKind::BadSaltFormat, msg)
}
