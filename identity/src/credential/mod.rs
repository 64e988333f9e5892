//! # Credentials
//!
//! A credential is a signed, versioned, content-addressed statement made by
//! (or on behalf of) a nym. There are four kinds:
//!
//! | Role        | Payload                         | Signed by                   |
//! |-------------|---------------------------------|-----------------------------|
//! | `MasterKey` | three keypairs + NymID source   | itself (and maybe the source) |
//! | `ChildKey`  | three keypairs                  | itself, then the master     |
//! | `Contact`   | [`ContactData`]                 | the master                  |
//! | `Verify`    | [`VerificationSet`]             | the master                  |
//!
//! They share one struct. The role-specific payload lives in
//! [`CredentialKind`], and the key-bearing kinds expose their keypairs
//! through the [`HasKeys`] trait.
//!
//! ## Identity
//!
//! `ID = BLAKE3(bincode(public form))`, where the public form has no
//! signatures, no ID, and `mode = Public` regardless of the credential's
//! actual mode. A private credential and its public projection therefore
//! have the same ID, and the ID survives any number of serialization round
//! trips.
//!
//! ## Signing order
//!
//! 1. Public self-signature over the public form (key credentials).
//! 2. Private self-signature over the private form (key credentials in
//!    private mode only).
//! 3. Master signature over the public form (everything but the master).
//!
//! After that the credential is immutable. Revocation moves it between an
//! authority's maps; nothing here changes.

pub mod contact;
pub mod key;
pub mod primary;
pub mod secondary;
pub mod verification;

pub use key::KeyCredential;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::{ContactData, VerificationSet};
use crate::config::METADATA_UNSPECIFIED;
use crate::crypto::PasswordPrompt;
use crate::identifier::Identifier;
use crate::keys::{AsymmetricKey, KeyError, Keypair, Role, SignatureMetadata};
use crate::parameters::{CredentialType, SourceProofType};
use crate::proto::{
    SerializedChildData, SerializedCredential, SerializedMasterData, SerializedSourceProof,
};
use crate::signature::{Signature, SignatureRole};
use crate::source::{NymIdSource, SourceError};

/// Errors from building, loading or signing credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("credential is missing its {0}")]
    Missing(&'static str),

    #[error("serialized credential id does not match its content")]
    IdMismatch,

    #[error("malformed key credential")]
    MalformedKeys,

    #[error("credential has no keys")]
    NoKeys,

    #[error("master credential cannot be signed by a master")]
    NotAChild,

    #[error("credential kind does not match its role")]
    RoleMismatch,
}

/// What a credential is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CredentialRole {
    MasterKey,
    ChildKey,
    Contact,
    Verify,
}

/// Whether a credential carries private keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyMode {
    Public,
    Private,
}

/// How far a credential has got through signing and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CredentialState {
    Unsigned,
    SelfSigned,
    MasterSigned,
    Verified,
}

/// Named permissions a key credential may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SignMessage,
    EncryptMessage,
    AuthenticateConnection,
    SignChildCredential,
}

/// Role-specific payload.
#[derive(Debug, Clone)]
pub enum CredentialKind {
    Primary {
        keys: KeyCredential,
        source: NymIdSource,
        proof: SourceProofType,
    },
    Secondary(KeyCredential),
    Contact(ContactData),
    Verification(VerificationSet),
}

/// Access to the three keypairs of key-bearing credentials.
pub trait HasKeys {
    fn key_credential(&self) -> Option<&KeyCredential>;

    fn keypair(&self, role: Role) -> Option<&Keypair> {
        self.key_credential().map(|keys| keys.keypair(role))
    }

    fn public_key(&self, role: Role) -> Option<&AsymmetricKey> {
        self.keypair(role).map(|pair| pair.public_key())
    }

    /// Candidate keys for `signature`. A hint of `'A'`, `'E'` or `'S'`
    /// searches that role inclusively; [`METADATA_UNSPECIFIED`] searches all
    /// three roles and only trusts metadata.
    fn get_public_keys_by_signature<'a>(
        &'a self,
        out: &mut Vec<&'a AsymmetricKey>,
        signature: &Signature,
        hint: char,
    ) -> usize {
        let Some(keys) = self.key_credential() else {
            return 0;
        };
        if hint == METADATA_UNSPECIFIED {
            return Role::ALL
                .iter()
                .map(|role| {
                    keys.keypair(*role)
                        .get_public_key_by_signature(out, signature, false)
                })
                .sum();
        }
        match Role::from_char(hint) {
            Some(role) => keys
                .keypair(role)
                .get_public_key_by_signature(out, signature, true),
            None => 0,
        }
    }
}

/// A credential of any kind.
#[derive(Debug, Clone)]
pub struct Credential {
    id: Identifier,
    version: u32,
    credential_type: CredentialType,
    mode: KeyMode,
    nym_id: Identifier,
    master_id: Identifier,
    signatures: Vec<Signature>,
    kind: CredentialKind,
}

impl HasKeys for Credential {
    fn key_credential(&self) -> Option<&KeyCredential> {
        match &self.kind {
            CredentialKind::Primary { keys, .. } | CredentialKind::Secondary(keys) => Some(keys),
            CredentialKind::Contact(_) | CredentialKind::Verification(_) => None,
        }
    }
}

impl Credential {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// An unsigned credential with its ID computed. `master_id` is ignored
    /// for masters, whose master ID is their own ID.
    pub(crate) fn unsigned(
        version: u32,
        credential_type: CredentialType,
        mode: KeyMode,
        nym_id: Identifier,
        master_id: Identifier,
        kind: CredentialKind,
    ) -> Self {
        let mut credential = Self {
            id: Identifier::default(),
            version,
            credential_type,
            mode,
            nym_id,
            master_id,
            signatures: Vec::new(),
            kind,
        };
        credential.id = credential.calculate_id();
        if credential.role() == CredentialRole::MasterKey {
            credential.master_id = credential.id;
        }
        credential.attach_metadata();
        credential
    }

    /// Load a serialized credential. Checks shape and ID; signatures are
    /// checked by [`validate`](Self::validate).
    pub fn from_serialized(serialized: &SerializedCredential) -> Result<Self, CredentialError> {
        let id = serialized.id.ok_or(CredentialError::Missing("id"))?;
        let key_credential = || -> Result<KeyCredential, CredentialError> {
            let public = serialized
                .public_credential
                .as_ref()
                .ok_or(CredentialError::Missing("public keys"))?;
            let private = match serialized.mode {
                KeyMode::Private => Some(
                    serialized
                        .private_credential
                        .as_ref()
                        .ok_or(CredentialError::Missing("private keys"))?,
                ),
                KeyMode::Public => None,
            };
            KeyCredential::from_serialized(public, private)
        };
        let child_master = || {
            serialized
                .child_data
                .as_ref()
                .map(|child| child.master_id)
                .ok_or(CredentialError::Missing("master id"))
        };

        let (kind, master_id) = match serialized.role {
            CredentialRole::MasterKey => {
                let master = serialized
                    .master_data
                    .as_ref()
                    .ok_or(CredentialError::Missing("source"))?;
                let kind = CredentialKind::Primary {
                    keys: key_credential()?,
                    source: NymIdSource::from_serialized(&master.source)?,
                    proof: master.source_proof.proof_type,
                };
                (kind, id)
            }
            CredentialRole::ChildKey => {
                (CredentialKind::Secondary(key_credential()?), child_master()?)
            }
            CredentialRole::Contact => {
                let data = serialized
                    .contact_data
                    .clone()
                    .ok_or(CredentialError::Missing("contact data"))?;
                (CredentialKind::Contact(data), child_master()?)
            }
            CredentialRole::Verify => {
                let set = serialized
                    .verification
                    .clone()
                    .ok_or(CredentialError::Missing("verification set"))?;
                (CredentialKind::Verification(set), child_master()?)
            }
        };

        let mode = match kind {
            CredentialKind::Primary { .. } | CredentialKind::Secondary(_) => serialized.mode,
            _ => KeyMode::Public,
        };
        let mut credential = Self {
            id,
            version: serialized.version,
            credential_type: serialized.credential_type,
            mode,
            nym_id: serialized.nym_id,
            master_id,
            signatures: serialized.signatures.clone(),
            kind,
        };
        if credential.calculate_id() != id {
            return Err(CredentialError::IdMismatch);
        }
        credential.attach_metadata();
        Ok(credential)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    fn serialize_as(
        &self,
        mode: KeyMode,
        id: Option<Identifier>,
        signatures: Vec<Signature>,
    ) -> SerializedCredential {
        let keys = self.key_credential();
        let (master_data, child_data) = match &self.kind {
            CredentialKind::Primary { source, proof, .. } => (
                Some(SerializedMasterData {
                    version: self.version,
                    source: source.serialize(),
                    source_proof: SerializedSourceProof {
                        version: self.version,
                        proof_type: *proof,
                    },
                }),
                None,
            ),
            _ => (
                None,
                Some(SerializedChildData {
                    version: self.version,
                    master_id: self.master_id,
                }),
            ),
        };
        SerializedCredential {
            version: self.version,
            id,
            credential_type: self.credential_type,
            role: self.role(),
            mode,
            nym_id: self.nym_id,
            master_data,
            child_data,
            public_credential: keys.map(|k| k.serialize(KeyMode::Public)),
            private_credential: match mode {
                KeyMode::Private => keys.map(|k| k.serialize(KeyMode::Private)),
                KeyMode::Public => None,
            },
            contact_data: match &self.kind {
                CredentialKind::Contact(data) => Some(data.clone()),
                _ => None,
            },
            verification: match &self.kind {
                CredentialKind::Verification(set) => Some(set.clone()),
                _ => None,
            },
            signatures,
        }
    }

    fn calculate_id(&self) -> Identifier {
        Identifier::hash(&self.serialize_as(KeyMode::Public, None, Vec::new()).canonical_bytes())
    }

    /// The bytes a signature at `mode`'s privacy level covers.
    pub(crate) fn signing_bytes(&self, mode: KeyMode) -> Vec<u8> {
        self.serialize_as(mode, Some(self.id), Vec::new())
            .canonical_bytes()
    }

    /// Serialized form. The private form (keys and private self-signature)
    /// is produced only when asked for and available.
    pub fn serialize(&self, include_private: bool) -> SerializedCredential {
        if include_private && self.mode == KeyMode::Private {
            return self.serialize_as(KeyMode::Private, Some(self.id), self.signatures.clone());
        }
        let public_signatures = self
            .signatures
            .iter()
            .filter(|sig| sig.role != SignatureRole::PrivateCredential)
            .cloned()
            .collect();
        self.serialize_as(KeyMode::Public, Some(self.id), public_signatures)
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    /// Public self-signature, plus the private one in private mode.
    pub fn self_sign(&mut self, prompt: &PasswordPrompt) -> Result<(), CredentialError> {
        let keys = self.key_credential().ok_or(CredentialError::NoKeys)?;
        let signer = keys.keypair(Role::Sign);
        let metadata = signer.metadata().copied();

        let public = signer.sign(&self.signing_bytes(KeyMode::Public), prompt)?;
        let mut signatures = vec![Signature::new(
            self.id,
            SignatureRole::PublicCredential,
            public,
            metadata,
        )];
        if self.mode == KeyMode::Private {
            let private = signer.sign(&self.signing_bytes(KeyMode::Private), prompt)?;
            signatures.push(Signature::new(
                self.id,
                SignatureRole::PrivateCredential,
                private,
                metadata,
            ));
        }
        self.signatures.extend(signatures);
        Ok(())
    }

    /// Delegation signature from `master` over this credential's public form.
    pub fn add_master_signature(
        &mut self,
        master: &Credential,
        prompt: &PasswordPrompt,
    ) -> Result<(), CredentialError> {
        if self.role() == CredentialRole::MasterKey {
            return Err(CredentialError::NotAChild);
        }
        if !master.has_capability(Capability::SignChildCredential) {
            return Err(CredentialError::Key(KeyError::MissingPrivateKey));
        }
        let signer = master
            .keypair(Role::Sign)
            .ok_or(CredentialError::NoKeys)?;
        let bytes = signer.sign(&self.signing_bytes(KeyMode::Public), prompt)?;
        self.signatures.push(Signature::new(
            master.id,
            SignatureRole::PublicCredential,
            bytes,
            signer.metadata().copied(),
        ));
        Ok(())
    }

    pub(crate) fn push_signature(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    /// Sign `message` with the `key` keypair.
    pub fn sign(
        &self,
        message: &[u8],
        role: SignatureRole,
        key: Role,
        prompt: &PasswordPrompt,
    ) -> Result<Signature, CredentialError> {
        let keypair = self.keypair(key).ok_or(CredentialError::NoKeys)?;
        let bytes = keypair.sign(message, prompt)?;
        Ok(Signature::new(self.id, role, bytes, keypair.metadata().copied()))
    }

    /// Check a signature this credential claims to have made.
    pub fn verify_signature(&self, message: &[u8], signature: &Signature, key: Role) -> bool {
        if signature.credential_id != self.id {
            return false;
        }
        self.keypair(key)
            .map(|pair| pair.verify(message, &signature.signature))
            .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    fn self_signatures_valid(&self) -> bool {
        let Some(signer) = self.keypair(Role::Sign) else {
            // Contact and verification credentials carry no self-signature.
            return true;
        };
        let check = |role: SignatureRole, mode: KeyMode| {
            let bytes = self.signing_bytes(mode);
            self.signatures.iter().any(|sig| {
                sig.role == role
                    && sig.credential_id == self.id
                    && signer.verify(&bytes, &sig.signature)
            })
        };
        check(SignatureRole::PublicCredential, KeyMode::Public)
            && (self.mode == KeyMode::Public
                || check(SignatureRole::PrivateCredential, KeyMode::Private))
    }

    fn master_signature_valid(&self, master: &Credential) -> bool {
        let Some(signer) = master.keypair(Role::Sign) else {
            return false;
        };
        let bytes = self.signing_bytes(KeyMode::Public);
        self.signatures.iter().any(|sig| {
            sig.role == SignatureRole::PublicCredential
                && sig.credential_id == master.id
                && signer.verify(&bytes, &sig.signature)
        })
    }

    /// How far this credential verifies against `master`. Pass the
    /// credential itself as `master` to validate a master.
    pub fn validate(&self, master: &Credential) -> CredentialState {
        if !self.self_signatures_valid() {
            return CredentialState::Unsigned;
        }
        if let CredentialKind::Primary { source, .. } = &self.kind {
            let verified = master.id == self.id
                && source.nym_id() == self.nym_id
                && source.verify(self);
            return if verified {
                CredentialState::Verified
            } else {
                CredentialState::SelfSigned
            };
        }
        if master.role() != CredentialRole::MasterKey
            || self.master_id != master.id
            || !self.master_signature_valid(master)
        {
            return CredentialState::SelfSigned;
        }
        if self.nym_id == master.nym_id && master.validate(master) == CredentialState::Verified {
            CredentialState::Verified
        } else {
            CredentialState::MasterSigned
        }
    }

    /// `validate(master) == Verified`.
    pub fn verify(&self, master: &Credential) -> bool {
        self.validate(master) == CredentialState::Verified
    }

    /// Whether this credential is allowed to do `capability` right now.
    pub fn has_capability(&self, capability: Capability) -> bool {
        let has = |role: Role| {
            self.keypair(role)
                .map(|pair| pair.has_private())
                .unwrap_or(false)
        };
        match (capability, self.role()) {
            (Capability::SignChildCredential, CredentialRole::MasterKey) => has(Role::Sign),
            (Capability::SignMessage, CredentialRole::ChildKey) => has(Role::Sign),
            (Capability::EncryptMessage, CredentialRole::ChildKey) => has(Role::Encrypt),
            (
                Capability::AuthenticateConnection,
                CredentialRole::MasterKey | CredentialRole::ChildKey,
            ) => has(Role::Auth),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn credential_type(&self) -> CredentialType {
        self.credential_type
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn nym_id(&self) -> &Identifier {
        &self.nym_id
    }

    pub fn master_id(&self) -> &Identifier {
        &self.master_id
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn kind(&self) -> &CredentialKind {
        &self.kind
    }

    pub fn role(&self) -> CredentialRole {
        match self.kind {
            CredentialKind::Primary { .. } => CredentialRole::MasterKey,
            CredentialKind::Secondary(_) => CredentialRole::ChildKey,
            CredentialKind::Contact(_) => CredentialRole::Contact,
            CredentialKind::Verification(_) => CredentialRole::Verify,
        }
    }

    /// Signing state from the signatures present, without checking them.
    pub fn state(&self) -> CredentialState {
        let own = self
            .signatures
            .iter()
            .any(|sig| sig.credential_id == self.id && sig.role == SignatureRole::PublicCredential);
        let delegated = self.signatures.iter().any(|sig| {
            sig.credential_id == self.master_id
                && sig.credential_id != self.id
                && sig.role == SignatureRole::PublicCredential
        });
        match (self.key_credential().is_some(), own, delegated) {
            (_, _, true) => CredentialState::MasterSigned,
            (true, true, false) => CredentialState::SelfSigned,
            _ => CredentialState::Unsigned,
        }
    }

    pub fn contact_data(&self) -> Option<&ContactData> {
        match &self.kind {
            CredentialKind::Contact(data) => Some(data),
            _ => None,
        }
    }

    pub fn verification_set(&self) -> Option<&VerificationSet> {
        match &self.kind {
            CredentialKind::Verification(set) => Some(set),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&NymIdSource> {
        match &self.kind {
            CredentialKind::Primary { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn source_proof(&self) -> Option<SourceProofType> {
        match &self.kind {
            CredentialKind::Primary { proof, .. } => Some(*proof),
            _ => None,
        }
    }

    fn attach_metadata(&mut self) {
        let (nym_id, master_id, id) = (self.nym_id, self.master_id, self.id);
        let keys = match &mut self.kind {
            CredentialKind::Primary { keys, .. } | CredentialKind::Secondary(keys) => keys,
            _ => return,
        };
        for role in Role::ALL {
            keys.keypair_mut(role)
                .set_metadata(SignatureMetadata::new(role, &nym_id, &master_id, &id));
        }
    }
}
