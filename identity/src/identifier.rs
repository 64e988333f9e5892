//! # Identifiers
//!
//! Content-addressed IDs for everything in the credential tree: NymIDs,
//! credential IDs, seed fingerprints. An `Identifier` is a 32-byte BLAKE3
//! digest, displayed as base58 because humans copy these around and base58
//! has no ambiguous characters to fat-finger.
//!
//! The first base58 character of an identifier is what signature metadata
//! carries as a lookup hint. It is a hint, not a fingerprint. One character
//! out of 58 collides constantly, and that is fine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::IDENTIFIER_LENGTH;

/// Errors from parsing an identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("invalid base58 encoding")]
    InvalidEncoding,

    #[error("wrong length: expected {IDENTIFIER_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte content address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_LENGTH]);

impl Identifier {
    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; IDENTIFIER_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Hashes `data` into an identifier.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Try to build an identifier from a slice, checking the length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, IdentifierError> {
        let bytes: [u8; IDENTIFIER_LENGTH] = slice
            .try_into()
            .map_err(|_| IdentifierError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LENGTH] {
        &self.0
    }

    /// The all-zero identifier. Never the hash of anything real.
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; IDENTIFIER_LENGTH]
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, IdentifierError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| IdentifierError::InvalidEncoding)?;
        Self::try_from_slice(&bytes)
    }

    /// First character of the base58 form. Used by signature metadata.
    pub fn first_char(&self) -> char {
        self.to_base58().chars().next().unwrap_or('1')
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_base58();
        write!(f, "Identifier({})", &encoded[..encoded.len().min(12)])
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Identifier::from_base58(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Identifier::try_from_slice(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
