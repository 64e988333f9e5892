//! # Protocol Configuration & Constants
//!
//! Every magic number in the credential core lives here. If you're
//! hardcoding a derivation index or a KDF context somewhere else, you're
//! doing it wrong and you owe the team coffee.
//!
//! Most of these values are wire-visible. HD path indices and KDF contexts
//! decide which keys a seed produces and which bytes a password unlocks, so
//! changing one silently orphans every identity created before the change.

use serde::{Deserialize, Serialize};

use crate::keys::Algorithm;

// ---------------------------------------------------------------------------
// HD Derivation
// ---------------------------------------------------------------------------

/// Set on a child index to request hardened derivation.
pub const HARDENED: u32 = 0x8000_0000;

/// Purpose level of every nym key path. "OTNM" in ASCII.
pub const NYM_PURPOSE: u32 = 0x4f54_4e4d;

/// Final path component for authentication keys. "AUTH".
pub const AUTH_KEY: u32 = 0x4155_5448;

/// Final path component for encryption keys. "ENCR".
pub const ENCRYPT_KEY: u32 = 0x454e_4352;

/// Final path component for signing keys. "SIGN".
pub const SIGN_KEY: u32 = 0x5349_474e;

/// HMAC key for the BIP-32 master node on secp256k1.
pub const SECP256K1_SEED_KEY: &[u8] = b"Bitcoin seed";

/// HMAC key for the SLIP-0010 master node on Ed25519.
pub const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// Chain codes are always 32 bytes, on every curve.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// Default amount of fresh entropy for a newly minted seed.
pub const DEFAULT_SEED_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Key Material
// ---------------------------------------------------------------------------

/// SEC1 compressed secp256k1 point.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// Big-endian secp256k1 scalar.
pub const SECP256K1_PRIVATE_KEY_LENGTH: usize = 32;

/// Compressed Edwards point.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// An Ed25519 seed. HD keys keep this form so they can derive children.
pub const ED25519_SEED_LENGTH: usize = 32;

/// An expanded Ed25519 key: scalar followed by the nonce prefix. Keys that
/// went through a homomorphic increment only exist in this form.
pub const ED25519_EXPANDED_KEY_LENGTH: usize = 64;

/// Default modulus size for legacy RSA credentials.
pub const DEFAULT_RSA_KEY_SIZE: usize = 2048;

/// Anything below this is a toy. Tests use it to stay fast.
pub const MIN_RSA_KEY_SIZE: usize = 1024;

/// Identifiers are BLAKE3 digests.
pub const IDENTIFIER_LENGTH: usize = 32;

/// Upper bound on a single `Secret`. Nothing we store comes close.
pub const MAX_SECRET_LENGTH: usize = 1 << 20;

// ---------------------------------------------------------------------------
// Symmetric Encryption
// ---------------------------------------------------------------------------

/// AES-256-GCM key length.
pub const AES_KEY_LENGTH: usize = 32;

/// 96-bit GCM nonce.
pub const AES_NONCE_LENGTH: usize = 12;

/// Per-secret salt mixed into the password KDF.
pub const SALT_LENGTH: usize = 16;

/// Context for wrapping private keys and chain codes under a password.
pub const KDF_CONTEXT_PRIVATE_KEY: &str = "nym-identity 2026-01-01 private key wrapping";

/// Context for wrapping symmetric keys under a session password.
pub const KDF_CONTEXT_SYMMETRIC_KEY: &str = "nym-identity 2026-01-01 symmetric key wrapping";

/// Context for turning an ECDH shared secret into a session password.
pub const KDF_CONTEXT_SESSION_PASSWORD: &str = "nym-identity 2026-01-01 session password";

/// Context for deriving an X25519 transport key from a private key.
pub const KDF_CONTEXT_TRANSPORT_KEY: &str = "nym-identity 2026-01-01 transport key";

/// Context for seed fingerprints.
pub const KDF_CONTEXT_SEED_FINGERPRINT: &str = "nym-identity 2026-01-01 seed fingerprint";

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Newest authority version this crate knows how to produce.
pub const AUTHORITY_VERSION: u32 = 6;

/// Newest contact data format.
pub const CONTACT_DATA_VERSION: u32 = 6;

/// Newest verification set format.
pub const VERIFICATION_SET_VERSION: u32 = 1;

/// Oldest serialized asymmetric key version still accepted.
pub const MIN_KEY_VERSION: u32 = 1;

/// Newest serialized asymmetric key version.
pub const MAX_KEY_VERSION: u32 = 2;

/// Version of NymID sources and serialized source proofs.
pub const SOURCE_VERSION: u32 = 1;

/// Version of signature records.
pub const SIGNATURE_VERSION: u32 = 1;

/// Placeholder meaning "no key type hint" in signature metadata lookups.
pub const METADATA_UNSPECIFIED: char = '0';

// ---------------------------------------------------------------------------
// Algorithm Support
// ---------------------------------------------------------------------------

/// Which key algorithms this process is willing to generate.
///
/// Child key creation walks a fixed preference order and skips anything
/// switched off here. Loading and verifying existing keys ignores these
/// switches: an old RSA credential still verifies on a node that refuses to
/// mint new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmSupport {
    pub secp256k1: bool,
    pub ed25519: bool,
    pub rsa: bool,
}

impl AlgorithmSupport {
    /// Every algorithm on.
    pub const ALL: Self = Self {
        secp256k1: true,
        ed25519: true,
        rsa: true,
    };

    /// Returns `true` if new keys of `algorithm` may be generated.
    pub fn supports(&self, algorithm: Algorithm) -> bool {
        match algorithm {
            Algorithm::Secp256k1 => self.secp256k1,
            Algorithm::Ed25519 => self.ed25519,
            Algorithm::Rsa => self.rsa,
        }
    }

    /// Copy of `self` with `algorithm` switched off.
    pub fn without(mut self, algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Secp256k1 => self.secp256k1 = false,
            Algorithm::Ed25519 => self.ed25519 = false,
            Algorithm::Rsa => self.rsa = false,
        }
        self
    }
}

impl Default for AlgorithmSupport {
    fn default() -> Self {
        Self::ALL
    }
}
