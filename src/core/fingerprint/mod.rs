//! # Fingerprint Module
//!
//! Fixed-length perceptual hash codes and the Hamming distance between them.
//!
//! Fingerprints arrive from the upstream hashing step as hex strings
//! (conventionally 16 hex digits = 64 bits). Two codes can only be compared
//! when they have the same bit length; there is no truncation or padding.
//!
//! ## Example
//! ```rust,ignore
//! use photo_dedup_engine::core::fingerprint::Fingerprint;
//!
//! let a = Fingerprint::from_hex("ff00ff00ff00ff00")?;
//! let b = Fingerprint::from_hex("ff00ff00ff00ff01")?;
//! assert_eq!(a.distance(&b)?, 1);
//! ```

use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A perceptual hash decoded into raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Decode a fingerprint from its hex representation
    ///
    /// Case-insensitive. Empty strings and odd-length or non-hex input are
    /// rejected with `CompareError::InvalidHash`.
    pub fn from_hex(value: &str) -> Result<Self, CompareError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CompareError::InvalidHash {
                value: value.to_string(),
                reason: "fingerprint is empty".to_string(),
            });
        }

        let bytes = hex::decode(trimmed).map_err(|e| CompareError::InvalidHash {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { bytes })
    }

    /// Hamming distance to another fingerprint of the same width
    ///
    /// Symmetric, and zero only when both codes are identical.
    pub fn distance(&self, other: &Self) -> Result<u32, CompareError> {
        if self.bytes.len() != other.bytes.len() {
            return Err(CompareError::IncompatibleHash {
                left_bits: self.bit_count(),
                right_bits: other.bit_count(),
            });
        }

        Ok(self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Total number of bits in the code
    pub fn bit_count(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }

    /// Lower-case hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = CompareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_hex()
    }
}
