//! # Signatures
//!
//! A `Signature` is a signed blob plus enough context to find the key that
//! made it: the signing credential's ID, what the signature is *for*, and an
//! optional four-character [`SignatureMetadata`] hint.
//!
//! The role matters. A credential signature and a message signature made by
//! the same key are not interchangeable, and verifiers check the role before
//! they check the math.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SIGNATURE_VERSION;
use crate::identifier::Identifier;
use crate::keys::SignatureMetadata;

/// What a signature vouches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureRole {
    /// Self-signature over a credential's public form, or the master's
    /// delegation signature over a child credential.
    PublicCredential,
    /// Self-signature over a credential's private form.
    PrivateCredential,
    /// Signature by the NymID source over the master credential.
    NymIdSource,
    /// Signature over a contact claim.
    Claim,
    /// Signature over a verification of someone else's claim.
    Verification,
    /// Ordinary message signature.
    Message,
    PeerRequest,
    PeerReply,
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureRole::PublicCredential => "public-credential",
            SignatureRole::PrivateCredential => "private-credential",
            SignatureRole::NymIdSource => "nym-id-source",
            SignatureRole::Claim => "claim",
            SignatureRole::Verification => "verification",
            SignatureRole::Message => "message",
            SignatureRole::PeerRequest => "peer-request",
            SignatureRole::PeerReply => "peer-reply",
        };
        f.write_str(name)
    }
}

/// A signature record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub version: u32,
    /// The credential whose key produced `signature`.
    pub credential_id: Identifier,
    pub role: SignatureRole,
    pub signature: Vec<u8>,
    pub metadata: Option<SignatureMetadata>,
}

impl Signature {
    pub fn new(
        credential_id: Identifier,
        role: SignatureRole,
        signature: Vec<u8>,
        metadata: Option<SignatureMetadata>,
    ) -> Self {
        Self {
            version: SIGNATURE_VERSION,
            credential_id,
            role,
            signature,
            metadata,
        }
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// The same signature with its metadata stripped.
    pub fn without_metadata(&self) -> Self {
        Self {
            metadata: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature({}, by {:?}, {} bytes",
            self.role,
            self.credential_id,
            self.signature.len()
        )?;
        if let Some(metadata) = &self.metadata {
            write!(f, ", {metadata}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Role;

    #[test]
    fn test_new_signature_uses_current_version() {
        let sig = Signature::new(Identifier::hash(b"c"), SignatureRole::Message, vec![1, 2], None);
        assert_eq!(sig.version, SIGNATURE_VERSION);
        assert!(!sig.has_metadata());
    }

    #[test]
    fn test_without_metadata() {
        let id = Identifier::hash(b"c");
        let metadata = SignatureMetadata::new(Role::Auth, &id, &id, &id);
        let sig = Signature::new(id, SignatureRole::Message, vec![9], Some(metadata));
        assert!(sig.has_metadata());
        let bare = sig.without_metadata();
        assert!(!bare.has_metadata());
        assert_eq!(bare.signature, sig.signature);
    }

    #[test]
    fn test_signature_bincode_roundtrip() {
        let id = Identifier::hash(b"c");
        let metadata = SignatureMetadata::new(Role::Sign, &id, &id, &id);
        let sig = Signature::new(id, SignatureRole::PublicCredential, vec![7; 64], Some(metadata));
        let bytes = bincode::serialize(&sig).unwrap();
        let back: Signature = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, sig);
    }
}
