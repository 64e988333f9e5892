//! # Hashing Utilities
//!
//! Hash functions used throughout the credential core. Two families, each
//! with a job:
//!
//! - **BLAKE3** — Our default. Credential IDs, NymIDs, seed fingerprints,
//!   and every KDF we own go through BLAKE3, usually in `derive_key` mode so
//!   that two contexts can never produce the same output by accident.
//!
//! - **SHA-2 / RIPEMD-160 / HMAC** — For interoperability. ECDSA signs
//!   SHA-256 digests, BIP-32 derives children with HMAC-SHA512, and key
//!   fingerprints are the first four bytes of `RIPEMD160(SHA256(pubkey))`.
//!   None of this was our choice and none of it is negotiable.
//!
//! ## On hash function choice
//!
//! When building nym-native data structures, always prefer BLAKE3. When a
//! standard tells you what to use, use exactly that and nothing "better".
//! A fingerprint that's 5% faster and 100% incompatible is worthless.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use nym_identity::crypto::sha256;
///
/// let hash = sha256(b"nym");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Compute the SHA-512 hash of the input data.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// `RIPEMD160(SHA256(data))`, the Bitcoin-style key fingerprint hash.
///
/// BIP-32 parent fingerprints are the first four bytes of this applied to
/// the parent's serialized public key.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Compute the BLAKE3 hash of the input data.
///
/// This is the workhorse: every content address in the credential tree is
/// one of these.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Compute a domain-separated hash using BLAKE3 with a context string.
///
/// This uses BLAKE3's built-in `derive_key` mode, which is the proper way
/// to do domain separation with BLAKE3. Don't try to prepend a tag manually.
/// The context string picks a different internal IV, so cross-context
/// collisions are impossible by construction.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Domain-separated hash over several parts without concatenating them.
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// HMAC-SHA256. Session tags are built on this.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// HMAC-SHA512 over several parts. BIP-32 and SLIP-0010 node derivation.
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
