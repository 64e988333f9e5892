//! # Hierarchical Deterministic Keys
//!
//! BIP-32 on secp256k1, SLIP-0010 on Ed25519. Same seed, same curve, same
//! path: byte-identical keys, on every machine, forever. That property is
//! the whole point, so the derivation follows the published specs to the
//! letter, including the HMAC keys ("Bitcoin seed", "ed25519 seed").
//!
//! ## Nym key paths
//!
//! Every credential key lives at
//!
//! ```text
//! m / NYM_PURPOSE' / nym' / credset' / credential_index' / role'
//! ```
//!
//! All components are hardened. A leaked child key can't be walked back up
//! to its siblings that way.
//!
//! ## Ed25519 is hardened-only
//!
//! There is no public-key derivation on Ed25519 under SLIP-0010. Asking for
//! a non-hardened Ed25519 child gets you `KeyError::HardenedOnly`.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use super::provider::ecdsa;
use super::{Algorithm, KeyError, Role};
use crate::config::{
    ED25519_SEED_KEY, ED25519_SEED_LENGTH, HARDENED, NYM_PURPOSE, SECP256K1_SEED_KEY,
};
use crate::crypto::hash::{hash160, hmac_sha512};
use crate::crypto::Secret;
use crate::identifier::Identifier;

/// A derivation path anchored to a seed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HdPath {
    /// Fingerprint of the seed the path starts from.
    root: Identifier,
    children: Vec<u32>,
}

impl HdPath {
    pub fn new(root: Identifier, children: Vec<u32>) -> Self {
        Self { root, children }
    }

    /// The path of one key in one credential of one nym.
    pub fn nym_key(root: Identifier, nym: u32, credset: u32, index: u32, role: Role) -> Self {
        Self {
            root,
            children: vec![
                NYM_PURPOSE | HARDENED,
                nym | HARDENED,
                credset | HARDENED,
                index | HARDENED,
                role.hd_index() | HARDENED,
            ],
        }
    }

    pub fn root(&self) -> &Identifier {
        &self.root
    }

    pub fn children(&self) -> &[u32] {
        &self.children
    }

    /// Nym index, if this is a nym key path.
    pub fn nym(&self) -> Option<u32> {
        self.nym_component(1)
    }

    pub fn credset(&self) -> Option<u32> {
        self.nym_component(2)
    }

    pub fn credential_index(&self) -> Option<u32> {
        self.nym_component(3)
    }

    /// This path extended by one more step.
    pub fn child(&self, index: u32) -> Self {
        let mut children = self.children.clone();
        children.push(index);
        Self {
            root: self.root,
            children,
        }
    }

    fn nym_component(&self, position: usize) -> Option<u32> {
        if self.children.first() != Some(&(NYM_PURPOSE | HARDENED)) {
            return None;
        }
        self.children.get(position).map(|c| c & !HARDENED)
    }
}

impl fmt::Display for HdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.children {
            if child & HARDENED != 0 {
                write!(f, "/{}'", child & !HARDENED)?;
            } else {
                write!(f, "/{child}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for HdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HdPath({:?}, {})", self.root, self)
    }
}

/// BIP-32 style fingerprint: first four bytes of `hash160(public)`.
pub fn fingerprint(public: &[u8]) -> u32 {
    let hash = hash160(public);
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

/// One node of an HD tree.
#[derive(Clone)]
pub struct HdNode {
    algorithm: Algorithm,
    private: Option<Secret>,
    public: Vec<u8>,
    chain_code: Secret,
    depth: u8,
    parent_fingerprint: u32,
    child_number: u32,
}

impl HdNode {
    /// The master node for `seed` on `algorithm`'s curve.
    pub fn master(algorithm: Algorithm, seed: &Secret) -> Result<Self, KeyError> {
        let hmac_key = match algorithm {
            Algorithm::Secp256k1 => SECP256K1_SEED_KEY,
            Algorithm::Ed25519 => ED25519_SEED_KEY,
            Algorithm::Rsa => {
                return Err(KeyError::Unsupported {
                    algorithm,
                    operation: "hd derivation",
                })
            }
        };
        let provider = ecdsa(algorithm)?;
        let (il, chain_code) = split(hmac_sha512(hmac_key, &[seed.bytes()]));
        let private = provider.private_from_node(&il)?;
        let public = provider.public_from_private(&private)?;
        Ok(Self {
            algorithm,
            private: Some(private),
            public,
            chain_code,
            depth: 0,
            parent_fingerprint: 0,
            child_number: 0,
        })
    }

    /// Reassemble a node from stored key material.
    pub fn from_parts(
        algorithm: Algorithm,
        private: Option<Secret>,
        public: Vec<u8>,
        chain_code: Secret,
        depth: u8,
        parent_fingerprint: u32,
    ) -> Self {
        Self {
            algorithm,
            private,
            public,
            chain_code,
            depth,
            parent_fingerprint,
            child_number: 0,
        }
    }

    /// Derive child `index`. Set [`HARDENED`] for hardened derivation.
    pub fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        let hardened = index & HARDENED != 0;
        if self.algorithm == Algorithm::Ed25519 && !hardened {
            return Err(KeyError::HardenedOnly {
                algorithm: self.algorithm,
            });
        }
        let provider = ecdsa(self.algorithm)?;
        let depth = self.depth.checked_add(1).ok_or(KeyError::PathTooDeep)?;
        let index_bytes = index.to_be_bytes();

        let digest = match (&self.private, hardened) {
            (Some(private), true) => {
                if self.algorithm == Algorithm::Ed25519 && private.len() != ED25519_SEED_LENGTH {
                    // Incremented Ed25519 keys have no seed to derive from.
                    return Err(KeyError::InvalidPrivateKey);
                }
                hmac_sha512(
                    self.chain_code.bytes(),
                    &[&[0u8], private.bytes(), &index_bytes],
                )
            }
            (None, true) => return Err(KeyError::PublicHardenedDerivation),
            (_, false) => hmac_sha512(self.chain_code.bytes(), &[&self.public, &index_bytes]),
        };
        let (il, chain_code) = split(digest);

        let (private, public) = match &self.private {
            Some(parent) => {
                let child = match self.algorithm {
                    Algorithm::Ed25519 => provider.private_from_node(&il)?,
                    _ => provider.increment_private(parent, &il)?,
                };
                let public = provider.public_from_private(&child)?;
                (Some(child), public)
            }
            None => (None, provider.increment_public(&self.public, &il)?),
        };

        Ok(Self {
            algorithm: self.algorithm,
            private,
            public,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
        })
    }

    /// Walk every step of `path` from this node.
    pub fn derive_path(&self, path: &[u32]) -> Result<Self, KeyError> {
        path.iter()
            .try_fold(self.clone(), |node, index| node.derive_child(*index))
    }

    /// Drop the private half. The result can only derive non-hardened children.
    pub fn neuter(&self) -> Self {
        Self {
            private: None,
            ..self.clone()
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn private_key(&self) -> Option<&Secret> {
        self.private.as_ref()
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    pub fn chain_code(&self) -> &Secret {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn fingerprint(&self) -> u32 {
        fingerprint(&self.public)
    }
}

impl fmt::Debug for HdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HdNode({}, depth={}, fp={:08x}, private={})",
            self.algorithm,
            self.depth,
            self.fingerprint(),
            self.private.is_some()
        )
    }
}

fn split(digest: [u8; 64]) -> ([u8; 32], Secret) {
    let digest = Zeroizing::new(digest);
    let mut il = [0u8; 32];
    il.copy_from_slice(&digest[..32]);
    (il, Secret::from_bytes(&digest[32..]))
}
