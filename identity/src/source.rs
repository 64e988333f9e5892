//! # NymID Sources
//!
//! A NymID is not random. It is the hash of a *source*, and the master
//! credential has to prove it belongs to that source. Only public-key
//! sources are implemented: the source is the master's signing key, and
//! `NymID = BLAKE3(bincode(source))`.
//!
//! Two proofs are accepted:
//!
//! - **SelfSignature**: the master's signing key *is* the source key, so a
//!   valid public self-signature on the master is the proof.
//! - **Signature**: an explicit `NymIdSource`-role signature over the
//!   master's public form, made with the source key through [`NymIdSource::sign`].

use thiserror::Error;

use crate::config::SOURCE_VERSION;
use crate::credential::{Credential, HasKeys, KeyMode};
use crate::crypto::PasswordPrompt;
use crate::identifier::Identifier;
use crate::keys::{AsymmetricKey, KeyError, Keypair, Role};
use crate::parameters::{SourceProofType, SourceType};
use crate::proto::{canonical_bytes, SerializedNymIdSource};
use crate::signature::{Signature, SignatureRole};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported source type {0:?}")]
    UnsupportedType(SourceType),

    #[error("unsupported source version {0}")]
    UnsupportedVersion(u32),

    #[error("source key must be a signing key")]
    WrongRole,

    #[error("keypair does not match the source key")]
    KeyMismatch,

    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NymIdSource {
    version: u32,
    source_type: SourceType,
    public_key: AsymmetricKey,
}

impl NymIdSource {
    /// Public-key source from a signing keypair.
    pub fn new(keypair: &Keypair) -> Result<Self, SourceError> {
        if keypair.role() != Role::Sign {
            return Err(SourceError::WrongRole);
        }
        Ok(Self {
            version: SOURCE_VERSION,
            source_type: SourceType::PubKey,
            public_key: keypair.public_key().public_only(),
        })
    }

    pub fn from_serialized(serialized: &SerializedNymIdSource) -> Result<Self, SourceError> {
        if serialized.version != SOURCE_VERSION {
            return Err(SourceError::UnsupportedVersion(serialized.version));
        }
        if serialized.source_type != SourceType::PubKey {
            return Err(SourceError::UnsupportedType(serialized.source_type));
        }
        let public_key = AsymmetricKey::from_serialized(&serialized.public_key)?;
        if public_key.role() != Role::Sign {
            return Err(SourceError::WrongRole);
        }
        Ok(Self {
            version: serialized.version,
            source_type: serialized.source_type,
            public_key: public_key.public_only(),
        })
    }

    pub fn serialize(&self) -> SerializedNymIdSource {
        SerializedNymIdSource {
            version: self.version,
            source_type: self.source_type,
            public_key: self.public_key.serialize(false),
        }
    }

    pub fn nym_id(&self) -> Identifier {
        Identifier::hash(&canonical_bytes(&self.serialize()))
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn public_key(&self) -> &AsymmetricKey {
        &self.public_key
    }

    /// Sign `content` as the source. `keypair` must hold the source key.
    pub fn sign(
        &self,
        keypair: &Keypair,
        content: &[u8],
        prompt: &PasswordPrompt,
    ) -> Result<Signature, SourceError> {
        if keypair.public_key().public_key() != self.public_key.public_key() {
            return Err(SourceError::KeyMismatch);
        }
        let bytes = keypair.sign(content, prompt)?;
        Ok(Signature::new(
            self.nym_id(),
            SignatureRole::NymIdSource,
            bytes,
            None,
        ))
    }

    /// Check a signature made through [`sign`](Self::sign).
    pub fn verify_signature(&self, content: &[u8], signature: &Signature) -> bool {
        signature.role == SignatureRole::NymIdSource
            && signature.credential_id == self.nym_id()
            && self.public_key.verify(content, &signature.signature)
    }

    /// Does `master` prove it belongs to this source?
    pub fn verify(&self, master: &Credential) -> bool {
        if master.nym_id() != &self.nym_id() {
            return false;
        }
        match master.source_proof() {
            Some(SourceProofType::SelfSignature) => {
                let Some(signer) = master.public_key(Role::Sign) else {
                    return false;
                };
                if signer.public_key() != self.public_key.public_key() {
                    return false;
                }
                let bytes = master.signing_bytes(KeyMode::Public);
                master.signatures().iter().any(|sig| {
                    sig.role == SignatureRole::PublicCredential
                        && sig.credential_id == *master.id()
                        && self.public_key.verify(&bytes, &sig.signature)
                })
            }
            Some(SourceProofType::Signature) => {
                let bytes = master.signing_bytes(KeyMode::Public);
                master
                    .signatures()
                    .iter()
                    .any(|sig| self.verify_signature(&bytes, sig))
            }
            None => false,
        }
    }
}
