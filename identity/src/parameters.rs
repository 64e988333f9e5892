//! # Parameters
//!
//! Everything needed to create (or recreate) a credential: which algorithm,
//! legacy or HD, where the NymID comes from, and for HD keys which seed and
//! which path.
//!
//! Parameters are a plain value. Build one, tweak it with setters, hand a
//! reference to [`Authority::new`](crate::authority::Authority::new) or
//! [`Authority::add_child_key_credential`](crate::authority::Authority::add_child_key_credential).
//! Nothing mutates a `Parameters` behind your back.
//!
//! ## The `set_nym` coupling
//!
//! Setting an explicit nym index also turns auto-indexing off. That is
//! deliberate: an explicit nym index means "recreate exactly this path",
//! and auto-indexing would silently pick a different one.

use serde::Serialize;
use thiserror::Error;

use crate::claims::{ContactData, VerificationSet};
use crate::config::{DEFAULT_RSA_KEY_SIZE, MIN_RSA_KEY_SIZE};
use crate::crypto::Secret;
use crate::identifier::Identifier;
use crate::keys::{Algorithm, Keypair, Role};
use crate::proto::canonical_bytes;

/// Errors from [`Parameters::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("hd credentials need an elliptic curve")]
    HdRequiresCurve,

    #[error("rsa key size {0} is below the minimum")]
    KeySizeTooSmall(usize),

    #[error("unsupported nym id source: {0:?}")]
    UnsupportedSource(SourceType),

    #[error("provided keypair must be a signing keypair with a private key")]
    InvalidKeypair,
}

/// Algorithm family as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum ParameterType {
    /// RSA.
    Legacy,
    Secp256k1,
    Ed25519,
}

impl ParameterType {
    pub fn algorithm(self) -> Algorithm {
        match self {
            ParameterType::Legacy => Algorithm::Rsa,
            ParameterType::Secp256k1 => Algorithm::Secp256k1,
            ParameterType::Ed25519 => Algorithm::Ed25519,
        }
    }

    pub fn from_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Rsa => ParameterType::Legacy,
            Algorithm::Secp256k1 => ParameterType::Secp256k1,
            Algorithm::Ed25519 => ParameterType::Ed25519,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum CredentialType {
    /// Freshly generated random keys.
    Legacy,
    /// Keys derived from a seed.
    Hd,
}

/// Where a NymID comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum SourceType {
    /// A public key.
    PubKey,
    /// A BIP-47 payment code. Not supported here.
    Bip47,
}

/// How the master credential proves it belongs to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum SourceProofType {
    /// The master's own self-signature, made with the source key.
    SelfSignature,
    /// An explicit signature by the source.
    Signature,
}

/// Credential creation parameters.
#[derive(Debug, Clone)]
pub struct Parameters {
    nym_type: ParameterType,
    credential_type: CredentialType,
    source_type: SourceType,
    source_proof_type: SourceProofType,
    seed: Option<Identifier>,
    use_default_seed: bool,
    nym: u32,
    credset: u32,
    cred_index: u32,
    auto_index: bool,
    entropy: Option<Secret>,
    key_size: usize,
    contact_data: Option<ContactData>,
    verification_set: Option<VerificationSet>,
    keypair: Option<Keypair>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(ParameterType::Secp256k1, CredentialType::Hd)
    }
}

impl Parameters {
    pub fn new(nym_type: ParameterType, credential_type: CredentialType) -> Self {
        Self {
            nym_type,
            credential_type,
            source_type: SourceType::PubKey,
            source_proof_type: SourceProofType::SelfSignature,
            seed: None,
            use_default_seed: true,
            nym: 0,
            credset: 0,
            cred_index: 0,
            auto_index: true,
            entropy: None,
            key_size: DEFAULT_RSA_KEY_SIZE,
            contact_data: None,
            verification_set: None,
            keypair: None,
        }
    }

    /// Legacy RSA with the given modulus size.
    pub fn with_key_size(bits: usize) -> Self {
        let mut params = Self::new(ParameterType::Legacy, CredentialType::Legacy);
        params.key_size = bits;
        params
    }

    /// HD secp256k1 from a known seed and nym index. Auto-indexing is off.
    pub fn from_seed(fingerprint: Identifier, nym: u32) -> Self {
        let mut params = Self::default();
        params.set_seed(fingerprint);
        params.set_nym(nym);
        params
    }

    /// A copy switched to `nym_type`. Switching to RSA also resets the
    /// credential, source and proof types to the only ones RSA supports.
    pub fn change_type(&self, nym_type: ParameterType) -> Self {
        let mut params = self.clone();
        params.nym_type = nym_type;
        if nym_type == ParameterType::Legacy {
            params.credential_type = CredentialType::Legacy;
            params.source_type = SourceType::PubKey;
            params.source_proof_type = SourceProofType::SelfSignature;
        }
        params
    }

    /// Digest over every field that affects what gets generated. Used to
    /// deduplicate parameter sets, never as a key or credential ID.
    pub fn hash(&self) -> Identifier {
        #[derive(Serialize)]
        struct Canonical<'a> {
            nym_type: ParameterType,
            credential_type: CredentialType,
            source_type: SourceType,
            source_proof_type: SourceProofType,
            seed: Option<Identifier>,
            use_default_seed: bool,
            nym: u32,
            credset: u32,
            cred_index: u32,
            auto_index: bool,
            entropy: Option<&'a [u8]>,
            key_size: u64,
            contact_data: Option<&'a ContactData>,
            verification_set: Option<&'a VerificationSet>,
            keypair: Option<&'a [u8]>,
        }

        Identifier::hash(&canonical_bytes(&Canonical {
            nym_type: self.nym_type,
            credential_type: self.credential_type,
            source_type: self.source_type,
            source_proof_type: self.source_proof_type,
            seed: self.seed,
            use_default_seed: self.use_default_seed,
            nym: self.nym,
            credset: self.credset,
            cred_index: self.cred_index,
            auto_index: self.auto_index,
            entropy: self.entropy.as_ref().map(|e| e.bytes()),
            key_size: self.key_size as u64,
            contact_data: self.contact_data.as_ref(),
            verification_set: self.verification_set.as_ref(),
            keypair: self.keypair.as_ref().map(|k| k.public_key().public_key()),
        }))
    }

    /// Reject combinations nothing can build.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.credential_type == CredentialType::Hd && !self.algorithm().is_elliptic_curve() {
            return Err(ParameterError::HdRequiresCurve);
        }
        if self.algorithm() == Algorithm::Rsa && self.key_size < MIN_RSA_KEY_SIZE {
            return Err(ParameterError::KeySizeTooSmall(self.key_size));
        }
        if self.source_type != SourceType::PubKey {
            return Err(ParameterError::UnsupportedSource(self.source_type));
        }
        if let Some(keypair) = &self.keypair {
            if keypair.role() != Role::Sign || !keypair.has_private() {
                return Err(ParameterError::InvalidKeypair);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn nym_type(&self) -> ParameterType {
        self.nym_type
    }

    pub fn algorithm(&self) -> Algorithm {
        self.nym_type.algorithm()
    }

    pub fn credential_type(&self) -> CredentialType {
        self.credential_type
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn source_proof_type(&self) -> SourceProofType {
        self.source_proof_type
    }

    pub fn seed(&self) -> Option<&Identifier> {
        self.seed.as_ref()
    }

    pub fn use_default_seed(&self) -> bool {
        self.use_default_seed
    }

    pub fn nym(&self) -> u32 {
        self.nym
    }

    pub fn credset(&self) -> u32 {
        self.credset
    }

    pub fn cred_index(&self) -> u32 {
        self.cred_index
    }

    pub fn auto_index(&self) -> bool {
        self.auto_index
    }

    pub fn entropy(&self) -> Option<&Secret> {
        self.entropy.as_ref()
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn contact_data(&self) -> Option<&ContactData> {
        self.contact_data.as_ref()
    }

    pub fn verification_set(&self) -> Option<&VerificationSet> {
        self.verification_set.as_ref()
    }

    /// Ready-made signing keypair for the master credential, if any.
    pub fn keypair(&self) -> Option<&Keypair> {
        self.keypair.as_ref()
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    pub fn set_seed(&mut self, fingerprint: Identifier) {
        self.seed = Some(fingerprint);
    }

    /// Use the seed store's default seed when no seed is set.
    pub fn set_default(&mut self, use_default_seed: bool) {
        self.use_default_seed = use_default_seed;
    }

    /// Sets the nym index and disables auto-indexing.
    pub fn set_nym(&mut self, nym: u32) {
        self.nym = nym;
        self.auto_index = false;
    }

    pub fn set_credset(&mut self, credset: u32) {
        self.credset = credset;
    }

    /// Recorded in [`Parameters::hash`] only. An [`Authority`] assigns
    /// credential indices itself: 0 for the master, then its own running
    /// index for every child, whatever this field says.
    ///
    /// [`Authority`]: crate::authority::Authority
    pub fn set_cred_index(&mut self, index: u32) {
        self.cred_index = index;
    }

    pub fn set_entropy(&mut self, entropy: Secret) {
        self.entropy = Some(entropy);
    }

    pub fn set_key_size(&mut self, bits: usize) {
        self.key_size = bits;
    }

    pub fn set_contact_data(&mut self, data: ContactData) {
        self.contact_data = Some(data);
    }

    pub fn set_verification_set(&mut self, set: VerificationSet) {
        self.verification_set = Some(set);
    }

    pub fn set_keypair(&mut self, keypair: Keypair) {
        self.keypair = Some(keypair);
    }

    pub fn set_source_proof_type(&mut self, proof_type: SourceProofType) {
        self.source_proof_type = proof_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_algorithm_map_is_bidirectional() {
        for t in [
            ParameterType::Legacy,
            ParameterType::Secp256k1,
            ParameterType::Ed25519,
        ] {
            assert_eq!(ParameterType::from_algorithm(t.algorithm()), t);
        }
    }

    #[test]
    fn test_defaults() {
        let params = Parameters::default();
        assert_eq!(params.algorithm(), Algorithm::Secp256k1);
        assert_eq!(params.credential_type(), CredentialType::Hd);
        assert!(params.auto_index());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_change_type_to_rsa_resets() {
        let mut params = Parameters::default();
        params.set_source_proof_type(SourceProofType::Signature);
        let rsa = params.change_type(ParameterType::Legacy);
        assert_eq!(rsa.algorithm(), Algorithm::Rsa);
        assert_eq!(rsa.credential_type(), CredentialType::Legacy);
        assert_eq!(rsa.source_type(), SourceType::PubKey);
        assert_eq!(rsa.source_proof_type(), SourceProofType::SelfSignature);
        // The original is untouched.
        assert_eq!(params.source_proof_type(), SourceProofType::Signature);
    }

    #[test]
    fn test_change_type_between_curves_keeps_hd() {
        let ed = Parameters::default().change_type(ParameterType::Ed25519);
        assert_eq!(ed.credential_type(), CredentialType::Hd);
        assert_eq!(ed.algorithm(), Algorithm::Ed25519);
    }

    #[test]
    fn test_set_nym_disables_auto_index() {
        let mut params = Parameters::default();
        params.set_nym(4);
        assert!(!params.auto_index());
        assert_eq!(params.nym(), 4);

        let seeded = Parameters::from_seed(Identifier::hash(b"seed"), 2);
        assert!(!seeded.auto_index());
        assert_eq!(seeded.seed(), Some(&Identifier::hash(b"seed")));
    }

    #[test]
    fn test_hash_tracks_fields() {
        let a = Parameters::default();
        let mut b = a.clone();
        assert_eq!(a.hash(), b.hash());
        b.set_cred_index(3);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validate_rejects_bad_combinations() {
        let hd_rsa = Parameters::new(ParameterType::Legacy, CredentialType::Hd);
        assert_eq!(hd_rsa.validate(), Err(ParameterError::HdRequiresCurve));

        assert_eq!(
            Parameters::with_key_size(512).validate(),
            Err(ParameterError::KeySizeTooSmall(512))
        );

        let mut bip47 = Parameters::default();
        bip47.source_type = SourceType::Bip47;
        assert_eq!(
            bip47.validate(),
            Err(ParameterError::UnsupportedSource(SourceType::Bip47))
        );
    }
}
