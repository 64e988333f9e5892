//! # Keypairs
//!
//! A `Keypair` binds one public key and at most one private key under a
//! single [`Role`]. Verification-only nyms hold public-only keypairs; asking
//! one of them for its private key is an error, not a `None`.
//!
//! The keypair also knows its own [`SignatureMetadata`] once the owning
//! credential has an ID. That lets a verifier skip keys that obviously did
//! not make a given signature.

use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use super::{AsymmetricKey, KeyError, Role, SignatureMetadata};
use crate::config::KDF_CONTEXT_TRANSPORT_KEY;
use crate::crypto::hash::domain_separated_hash;
use crate::crypto::PasswordPrompt;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypair {
    role: Role,
    public: AsymmetricKey,
    private: Option<AsymmetricKey>,
    metadata: Option<SignatureMetadata>,
}

impl Keypair {
    /// Split `key` into its public half and, if it has one, its private half.
    pub fn new(key: AsymmetricKey) -> Self {
        let public = key.public_only();
        let private = key.has_private().then_some(key);
        Self {
            role: public.role(),
            public,
            private,
            metadata: None,
        }
    }

    /// Pair up separately loaded halves. They must agree on role and public
    /// key bytes.
    pub fn from_parts(
        public: AsymmetricKey,
        private: Option<AsymmetricKey>,
    ) -> Result<Self, KeyError> {
        if let Some(private) = &private {
            if private.role() != public.role() {
                return Err(KeyError::RoleMismatch);
            }
            if private.public_key() != public.public_key()
                || private.algorithm() != public.algorithm()
            {
                return Err(KeyError::InvalidPublicKey);
            }
        }
        Ok(Self {
            role: public.role(),
            public: public.public_only(),
            private,
            metadata: None,
        })
    }

    /// This keypair minus its private key.
    pub fn public_only(&self) -> Self {
        Self {
            private: None,
            ..self.clone()
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    pub fn public_key(&self) -> &AsymmetricKey {
        &self.public
    }

    pub fn private_key(&self) -> Result<&AsymmetricKey, KeyError> {
        self.private.as_ref().ok_or(KeyError::MissingPrivateKey)
    }

    pub fn metadata(&self) -> Option<&SignatureMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: SignatureMetadata) {
        self.metadata = Some(metadata);
    }

    pub fn sign(&self, message: &[u8], prompt: &PasswordPrompt) -> Result<Vec<u8>, KeyError> {
        self.private_key()?.sign(message, prompt)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.public.verify(message, signature)
    }

    /// Push the public key onto `out` if it could have made `signature`.
    ///
    /// Metadata on the signature, when present, has to match this keypair's
    /// metadata exactly. A signature without metadata matches only when the
    /// caller asked for an `inclusive` search. Returns the number of keys
    /// added (zero or one).
    pub fn get_public_key_by_signature<'a>(
        &'a self,
        out: &mut Vec<&'a AsymmetricKey>,
        signature: &Signature,
        inclusive: bool,
    ) -> usize {
        let matches = match (&signature.metadata, &self.metadata) {
            (Some(theirs), Some(ours)) => theirs == ours,
            (Some(_), None) | (None, _) => inclusive,
        };
        if matches {
            out.push(&self.public);
            1
        } else {
            0
        }
    }

    /// Static X25519 keypair for transport-layer authentication, derived
    /// from the private key. Same private key, same transport key.
    pub fn get_transport_key(
        &self,
        prompt: &PasswordPrompt,
    ) -> Result<(X25519Public, StaticSecret), KeyError> {
        let private = self.private_key()?;
        private.ecdsa()?;
        let material = private.private_key(prompt)?;
        let secret = StaticSecret::from(domain_separated_hash(
            KDF_CONTEXT_TRANSPORT_KEY,
            material.bytes(),
        ));
        Ok((X25519Public::from(&secret), secret))
    }
}
