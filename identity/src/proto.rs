//! # Serialized Forms
//!
//! The wire and storage shapes of keys, credentials and authorities. These
//! are plain data: public fields, serde derives, no behaviour beyond
//! canonical encoding. Live types convert into and out of them and do all
//! the validation on the way in.
//!
//! ## Canonical bytes
//!
//! Anything that gets hashed or signed is encoded with bincode 1.x. Every
//! collection here is a `Vec` in a defined order, never a hash map, so the
//! same value always produces the same bytes. JSON is for humans and the
//! tool, and is never hashed.

use serde::{Deserialize, Serialize};

use crate::claims::{ContactData, VerificationSet};
use crate::credential::{CredentialRole, KeyMode};
use crate::crypto::EncryptedSecret;
use crate::identifier::Identifier;
use crate::keys::{Algorithm, HdPath, Role};
use crate::parameters::{CredentialType, SourceProofType, SourceType};
use crate::signature::Signature;

/// HD properties of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedHdProperties {
    pub path: HdPath,
    pub depth: u8,
    /// Fingerprint of the parent node's public key.
    pub parent: u32,
    /// Omitted from public forms.
    pub chain_code: Option<EncryptedSecret>,
}

/// One asymmetric key. `private_key` is present only in private forms and is
/// always password-wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAsymmetricKey {
    pub version: u32,
    pub algorithm: Algorithm,
    pub role: Role,
    pub public_key: Vec<u8>,
    pub private_key: Option<EncryptedSecret>,
    pub hd: Option<SerializedHdProperties>,
}

/// The key payload of a primary or secondary credential.
///
/// `keys` is ordered auth, encrypt, sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedKeyCredential {
    pub version: u32,
    pub mode: KeyMode,
    pub keys: Vec<SerializedAsymmetricKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNymIdSource {
    pub version: u32,
    pub source_type: SourceType,
    pub public_key: SerializedAsymmetricKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSourceProof {
    pub version: u32,
    pub proof_type: SourceProofType,
}

/// What only the master credential carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMasterData {
    pub version: u32,
    pub source: SerializedNymIdSource,
    pub source_proof: SerializedSourceProof,
}

/// What every non-master credential carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedChildData {
    pub version: u32,
    pub master_id: Identifier,
}

/// A credential of any role.
///
/// `id` is `None` in the form that gets hashed into the ID, and `Some` in
/// every form that gets signed or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedCredential {
    pub version: u32,
    pub id: Option<Identifier>,
    pub credential_type: CredentialType,
    pub role: CredentialRole,
    pub mode: KeyMode,
    pub nym_id: Identifier,
    pub master_data: Option<SerializedMasterData>,
    pub child_data: Option<SerializedChildData>,
    pub public_credential: Option<SerializedKeyCredential>,
    pub private_credential: Option<SerializedKeyCredential>,
    pub contact_data: Option<ContactData>,
    pub verification: Option<VerificationSet>,
    pub signatures: Vec<Signature>,
}

impl SerializedCredential {
    /// Canonical bytes for hashing and signing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(self)
    }
}

/// How an authority lists its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityMode {
    /// IDs only. Bodies are fetched from a credential store.
    Index,
    /// Bodies inline.
    Full,
}

/// An authority.
///
/// In `Index` mode `master_credential` is `None` and the `*_children`
/// vectors are empty. In `Full` mode `active_children` carries the bodies
/// and `active_child_ids` is empty. Revoked credentials are always listed by
/// ID, since their bodies are discarded on revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAuthority {
    pub version: u32,
    pub index: u32,
    pub mode: AuthorityMode,
    pub nym_id: Identifier,
    pub master_id: Identifier,
    pub master_credential: Option<SerializedCredential>,
    pub active_child_ids: Vec<Identifier>,
    pub active_children: Vec<SerializedCredential>,
    pub revoked_child_ids: Vec<Identifier>,
    pub revoked_children: Vec<SerializedCredential>,
}

/// Deterministic bincode encoding.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // bincode can only fail on types serde cannot describe or on writer
    // errors; neither exists for in-memory encoding of these types.
    bincode::serialize(value).unwrap_or_else(|e| unreachable!("bincode encoding failed: {e}"))
}
