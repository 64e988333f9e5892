//! # Symmetric Keys
//!
//! A `SymmetricKey` is an AES-256 key that travels wrapped under a password.
//! Peers use one to encrypt a payload for a nym: the sender picks a random
//! key, wraps it under an ECDH-derived session password, and ships both.
//! The recipient's [`Authority::unlock`](crate::authority::Authority::unlock)
//! rederives the password and calls [`SymmetricKey::unlock`].

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use super::encryption::{self, wrapping_key, EncryptionError};
use super::secret::Secret;
use crate::config::{AES_KEY_LENGTH, KDF_CONTEXT_SYMMETRIC_KEY, SALT_LENGTH};

/// A password-wrapped AES-256 key.
#[derive(Clone, Serialize, Deserialize)]
pub struct SymmetricKey {
    salt: Vec<u8>,
    wrapped: Vec<u8>,
    #[serde(skip)]
    unlocked: Option<Zeroizing<[u8; AES_KEY_LENGTH]>>,
}

impl SymmetricKey {
    /// Fresh random key, wrapped under `password` and left unlocked.
    pub fn generate(password: &Secret) -> Result<Self, EncryptionError> {
        let mut raw = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        rand::rngs::OsRng.fill_bytes(&mut raw[..]);
        let mut salt = vec![0u8; SALT_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut salt);

        let kek = wrapping_key(KDF_CONTEXT_SYMMETRIC_KEY, &salt, password);
        let wrapped = encryption::encrypt_with_aad(&kek, &raw[..], &salt)?;
        Ok(Self {
            salt,
            wrapped,
            unlocked: Some(raw),
        })
    }

    /// Try `password`. On success the key stays unlocked until [`lock`](Self::lock).
    pub fn unlock(&mut self, password: &Secret) -> bool {
        if self.salt.len() != SALT_LENGTH {
            return false;
        }
        let kek = wrapping_key(KDF_CONTEXT_SYMMETRIC_KEY, &self.salt, password);
        let Ok(plain) = encryption::decrypt_with_aad(&kek, &self.wrapped, &self.salt) else {
            return false;
        };
        let plain = Zeroizing::new(plain);
        let Ok(raw) = <[u8; AES_KEY_LENGTH]>::try_from(plain.as_slice()) else {
            return false;
        };
        self.unlocked = Some(Zeroizing::new(raw));
        true
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.is_some()
    }

    /// Forget the unwrapped key. The wrapped form is kept.
    pub fn lock(&mut self) {
        self.unlocked = None;
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let key = self.unlocked.as_ref().ok_or(EncryptionError::Locked)?;
        encryption::encrypt(key, plaintext)
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let key = self.unlocked.as_ref().ok_or(EncryptionError::Locked)?;
        encryption::decrypt(key, data)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey(unlocked={})", self.is_unlocked())
    }
}
