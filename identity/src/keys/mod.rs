//! # Asymmetric Keys
//!
//! One key abstraction over three very different algorithm families:
//!
//! - **RSA** (legacy) — big moduli, PKCS#1 v1.5 signatures, no curve
//!   arithmetic. Still here because old credentials still need verifying.
//! - **secp256k1** — ECDSA, ECDH, BIP-32 derivation. The default.
//! - **Ed25519** — Schnorr-style signatures, ECDH through the Montgomery
//!   form, SLIP-0010 derivation (hardened only).
//!
//! [`AsymmetricKey`] is the tagged value callers hold. The per-algorithm
//! math lives behind the [`KeyProvider`] and [`EcdsaProvider`] traits.
//! Curve-only operations exist on every key and return
//! [`KeyError::Unsupported`] for RSA instead of vanishing from the API.
//!
//! ## Security considerations
//!
//! - Private keys are stored wrapped under a password and only unwrapped
//!   inside a call that was handed a `PasswordPrompt`.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

pub mod ed25519;
pub mod hd;
pub mod key;
pub mod keypair;
pub mod metadata;
pub mod provider;
pub mod rsa;
pub mod secp256k1;

pub use hd::{HdNode, HdPath};
pub use key::AsymmetricKey;
pub use keypair::Keypair;
pub use metadata::SignatureMetadata;
pub use provider::{provider, EcdsaProvider, KeyProvider};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{AUTH_KEY, ENCRYPT_KEY, SIGN_KEY};
use crate::crypto::EncryptionError;

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed. Leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    #[error("invalid private key bytes")]
    InvalidPrivateKey,

    #[error("invalid key size: {0} bits")]
    InvalidKeySize(usize),

    #[error("{operation} is not supported for {algorithm}")]
    Unsupported {
        algorithm: Algorithm,
        operation: &'static str,
    },

    #[error("unsupported key version {0}")]
    UnsupportedVersion(u32),

    #[error("no private key available")]
    MissingPrivateKey,

    #[error("key is locked: wrong password or damaged ciphertext")]
    Locked,

    #[error("key generation failed")]
    GenerationFailed,

    #[error("signing failed")]
    SigningFailed,

    #[error("tweak does not produce a valid key")]
    InvalidTweak,

    #[error("{algorithm} only supports hardened derivation")]
    HardenedOnly { algorithm: Algorithm },

    #[error("hardened derivation needs the private key")]
    PublicHardenedDerivation,

    #[error("derivation path too deep")]
    PathTooDeep,

    #[error("key is not hierarchical-deterministic")]
    NotHd,

    #[error("seed unavailable")]
    MissingSeed,

    #[error("key role mismatch")]
    RoleMismatch,
}

impl From<EncryptionError> for KeyError {
    fn from(_: EncryptionError) -> Self {
        KeyError::Locked
    }
}

/// Asymmetric algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Algorithm {
    /// Legacy RSA.
    Rsa,
    Secp256k1,
    Ed25519,
}

impl Algorithm {
    /// Curves can do ECDH, increments, and HD derivation. RSA can't.
    pub fn is_elliptic_curve(&self) -> bool {
        !matches!(self, Algorithm::Rsa)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Rsa => "rsa",
            Algorithm::Secp256k1 => "secp256k1",
            Algorithm::Ed25519 => "ed25519",
        })
    }
}

/// What a key in a key credential is for.
///
/// Serialization order is auth, encrypt, sign. Do not reorder the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Auth,
    Encrypt,
    Sign,
}

impl Role {
    /// All roles in serialization order.
    pub const ALL: [Role; 3] = [Role::Auth, Role::Encrypt, Role::Sign];

    /// Single-character tag used in signature metadata.
    pub fn as_char(&self) -> char {
        match self {
            Role::Auth => 'A',
            Role::Encrypt => 'E',
            Role::Sign => 'S',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Role::Auth),
            'E' => Some(Role::Encrypt),
            'S' => Some(Role::Sign),
            _ => None,
        }
    }

    /// Last component of the HD path for keys with this role.
    pub fn hd_index(&self) -> u32 {
        match self {
            Role::Auth => AUTH_KEY,
            Role::Encrypt => ENCRYPT_KEY,
            Role::Sign => SIGN_KEY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_char_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_char(role.as_char()), Some(role));
        }
        assert_eq!(Role::from_char('0'), None);
    }

    #[test]
    fn test_role_order_is_auth_encrypt_sign() {
        let mut roles = vec![Role::Sign, Role::Auth, Role::Encrypt];
        roles.sort();
        assert_eq!(roles, Role::ALL.to_vec());
    }

    #[test]
    fn test_only_rsa_is_not_a_curve() {
        assert!(!Algorithm::Rsa.is_elliptic_curve());
        assert!(Algorithm::Secp256k1.is_elliptic_curve());
        assert!(Algorithm::Ed25519.is_elliptic_curve());
    }

    #[test]
    fn test_encryption_failure_reads_as_locked() {
        let err: KeyError = EncryptionError::DecryptFailed.into();
        assert_eq!(err, KeyError::Locked);
    }
}
