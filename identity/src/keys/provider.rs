//! # Algorithm Providers
//!
//! The per-algorithm math behind [`AsymmetricKey`](super::AsymmetricKey).
//! Providers are stateless unit structs; [`provider`] hands out the static
//! instance for an algorithm.
//!
//! All private material crosses this boundary as a [`Secret`]. Providers
//! never see a password and never see ciphertext.

use crate::crypto::Secret;

use super::ed25519::Ed25519Provider;
use super::rsa::RsaProvider;
use super::secp256k1::Secp256k1Provider;
use super::{Algorithm, KeyError};

static RSA: RsaProvider = RsaProvider;
static SECP256K1: Secp256k1Provider = Secp256k1Provider;
static ED25519: Ed25519Provider = Ed25519Provider;

/// Operations every algorithm supports.
pub trait KeyProvider: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Generate a fresh keypair. `key_size` only matters for RSA.
    fn generate(&self, key_size: usize) -> Result<(Vec<u8>, Secret), KeyError>;

    /// Recompute the public key from private material.
    fn public_from_private(&self, private: &Secret) -> Result<Vec<u8>, KeyError>;

    /// Reject malformed public key bytes.
    fn validate_public(&self, public: &[u8]) -> Result<(), KeyError>;

    fn sign(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError>;

    fn verify(&self, message: &[u8], signature: &[u8], public: &[u8]) -> bool;

    /// The curve half of this provider, if there is one.
    fn ecdsa(&self) -> Result<&dyn EcdsaProvider, KeyError>;
}

/// Curve-only operations: ECDH, homomorphic increments, HD expansion.
pub trait EcdsaProvider: KeyProvider {
    /// DER-encoded signature. Ed25519 has no DER form and returns raw bytes.
    fn sign_der(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError>;

    /// Raw ECDH shared secret between our private key and a peer public key.
    fn shared_secret(&self, private: &Secret, public: &[u8]) -> Result<Secret, KeyError>;

    /// `private + tweak`, as a new private key.
    fn increment_private(&self, private: &Secret, tweak: &[u8; 32]) -> Result<Secret, KeyError>;

    /// `public + tweak·G`, matching [`increment_private`](Self::increment_private).
    fn increment_public(&self, public: &[u8], tweak: &[u8; 32]) -> Result<Vec<u8>, KeyError>;

    /// Turn the left half of an HD node hash into private key material.
    fn private_from_node(&self, il: &[u8; 32]) -> Result<Secret, KeyError>;
}

/// The static provider for `algorithm`.
pub fn provider(algorithm: Algorithm) -> &'static dyn KeyProvider {
    match algorithm {
        Algorithm::Rsa => &RSA,
        Algorithm::Secp256k1 => &SECP256K1,
        Algorithm::Ed25519 => &ED25519,
    }
}

/// The static curve provider for `algorithm`, or `Unsupported` for RSA.
pub fn ecdsa(algorithm: Algorithm) -> Result<&'static dyn EcdsaProvider, KeyError> {
    match algorithm {
        Algorithm::Secp256k1 => Ok(&SECP256K1),
        Algorithm::Ed25519 => Ok(&ED25519),
        Algorithm::Rsa => Err(KeyError::Unsupported {
            algorithm,
            operation: "elliptic curve arithmetic",
        }),
    }
}
