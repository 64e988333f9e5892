//! # Credential and Seed Stores
//!
//! The two collaborators an [`Authority`](crate::authority::Authority) talks
//! to but does not own:
//!
//! | Trait              | Holds                          | Used for                               |
//! |--------------------|--------------------------------|----------------------------------------|
//! | [`CredentialStore`]| serialized credentials, by ID  | saving new credentials, `Index` loads  |
//! | [`SeedStore`]      | HD seeds, by fingerprint       | deriving keys, allocating nym indices  |
//!
//! Real deployments back these with a wallet database. The in-memory
//! versions here are what tests and the tool use.
//!
//! ## Thread Safety
//!
//! Both traits are `Send + Sync` and are shared as `Arc<dyn _>`. The
//! in-memory implementations guard their maps with a `parking_lot::RwLock`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AlgorithmSupport, DEFAULT_SEED_LENGTH, KDF_CONTEXT_SEED_FINGERPRINT};
use crate::crypto::hash::domain_separated_hash;
use crate::crypto::{Secret, SecretError};
use crate::identifier::Identifier;
use crate::proto::SerializedCredential;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown seed {0}")]
    UnknownSeed(Identifier),

    #[error("seed entropy is empty")]
    EmptyEntropy,

    #[error("nym index space exhausted for seed {0}")]
    IndexExhausted(Identifier),

    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Serialized credentials, addressed by credential ID.
pub trait CredentialStore: Send + Sync {
    fn load_credential(&self, id: &Identifier) -> Option<SerializedCredential>;

    /// Store `credential` under its ID. Returns `false` if it has no ID.
    fn save_credential(&self, credential: &SerializedCredential) -> bool;
}

/// HD seeds, addressed by fingerprint.
pub trait SeedStore: Send + Sync {
    fn seed(&self, fingerprint: &Identifier) -> Option<Secret>;

    /// Store `entropy` as a seed and return its fingerprint. Importing the
    /// same entropy twice is harmless.
    fn import_seed(&self, entropy: &Secret) -> Result<Identifier, StoreError>;

    /// The default seed, created on first use.
    fn default_seed(&self) -> Result<Identifier, StoreError>;

    /// Allocate the next unused nym index under `fingerprint`.
    fn next_nym_index(&self, fingerprint: &Identifier) -> Result<u32, StoreError>;
}

/// Fingerprint of a seed. Safe to store and log; reveals nothing about the
/// seed.
pub fn seed_fingerprint(seed: &Secret) -> Identifier {
    Identifier::from_bytes(domain_separated_hash(
        KDF_CONTEXT_SEED_FINGERPRINT,
        seed.bytes(),
    ))
}

// ---------------------------------------------------------------------------
// In-memory Credential Store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<HashMap<Identifier, SerializedCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }

    /// Forget a credential. Lets tests simulate a store that lost one.
    pub fn remove(&self, id: &Identifier) -> Option<SerializedCredential> {
        self.credentials.write().remove(id)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load_credential(&self, id: &Identifier) -> Option<SerializedCredential> {
        self.credentials.read().get(id).cloned()
    }

    fn save_credential(&self, credential: &SerializedCredential) -> bool {
        let Some(id) = credential.id else {
            return false;
        };
        self.credentials.write().insert(id, credential.clone());
        true
    }
}

// ---------------------------------------------------------------------------
// In-memory Seed Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SeedState {
    seeds: HashMap<Identifier, Secret>,
    next_index: HashMap<Identifier, u32>,
    default: Option<Identifier>,
}

#[derive(Default)]
pub struct MemorySeedStore {
    state: RwLock<SeedState>,
}

impl MemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeedStore for MemorySeedStore {
    fn seed(&self, fingerprint: &Identifier) -> Option<Secret> {
        self.state.read().seeds.get(fingerprint).cloned()
    }

    fn import_seed(&self, entropy: &Secret) -> Result<Identifier, StoreError> {
        if entropy.is_empty() {
            return Err(StoreError::EmptyEntropy);
        }
        let fingerprint = seed_fingerprint(entropy);
        let mut state = self.state.write();
        state
            .seeds
            .entry(fingerprint)
            .or_insert_with(|| entropy.clone());
        if state.default.is_none() {
            state.default = Some(fingerprint);
        }
        Ok(fingerprint)
    }

    fn default_seed(&self) -> Result<Identifier, StoreError> {
        if let Some(fingerprint) = self.state.read().default {
            return Ok(fingerprint);
        }
        let seed = Secret::random(DEFAULT_SEED_LENGTH)?;
        let fingerprint = seed_fingerprint(&seed);
        let mut state = self.state.write();
        // Another thread may have won the race between the two locks.
        if let Some(existing) = state.default {
            return Ok(existing);
        }
        state.seeds.insert(fingerprint, seed);
        state.default = Some(fingerprint);
        Ok(fingerprint)
    }

    fn next_nym_index(&self, fingerprint: &Identifier) -> Result<u32, StoreError> {
        let mut state = self.state.write();
        if !state.seeds.contains_key(fingerprint) {
            return Err(StoreError::UnknownSeed(*fingerprint));
        }
        let next = state.next_index.entry(*fingerprint).or_insert(0);
        let index = *next;
        *next = next
            .checked_add(1)
            .ok_or(StoreError::IndexExhausted(*fingerprint))?;
        Ok(index)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything an authority needs from outside: stores and algorithm policy.
#[derive(Clone)]
pub struct CredentialContext {
    pub seeds: Arc<dyn SeedStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub support: AlgorithmSupport,
}

impl CredentialContext {
    pub fn new(seeds: Arc<dyn SeedStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            seeds,
            credentials,
            support: AlgorithmSupport::default(),
        }
    }

    /// Fresh in-memory stores, every algorithm enabled.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemorySeedStore::new()),
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    pub fn with_support(mut self, support: AlgorithmSupport) -> Self {
        self.support = support;
        self
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("support", &self.support)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_is_idempotent() {
        let store = MemorySeedStore::new();
        let entropy = Secret::from_bytes(&[4u8; 32]);
        let a = store.import_seed(&entropy).unwrap();
        let b = store.import_seed(&entropy).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.seed(&a).unwrap().bytes(), entropy.bytes());
        assert_eq!(store.default_seed().unwrap(), a);
    }

    #[test]
    fn test_empty_entropy_rejected() {
        let store = MemorySeedStore::new();
        assert!(matches!(
            store.import_seed(&Secret::new()),
            Err(StoreError::EmptyEntropy)
        ));
    }

    #[test]
    fn test_default_seed_is_created_once() {
        let store = MemorySeedStore::new();
        let a = store.default_seed().unwrap();
        let b = store.default_seed().unwrap();
        assert_eq!(a, b);
        assert_eq!(store.seed(&a).unwrap().len(), DEFAULT_SEED_LENGTH);
    }

    #[test]
    fn test_nym_indices_increase() {
        let store = MemorySeedStore::new();
        let fp = store.default_seed().unwrap();
        assert_eq!(store.next_nym_index(&fp).unwrap(), 0);
        assert_eq!(store.next_nym_index(&fp).unwrap(), 1);
        assert!(matches!(
            store.next_nym_index(&Identifier::hash(b"nope")),
            Err(StoreError::UnknownSeed(_))
        ));
    }

    #[test]
    fn test_credential_store_requires_id() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty());
        let fingerprint = seed_fingerprint(&Secret::from_bytes(&[1u8; 32]));
        assert!(!fingerprint.is_empty());
        assert!(store.load_credential(&fingerprint).is_none());
    }
}
