//! # AES-256-GCM Encryption
//!
//! Authenticated encryption for private key material at rest, chain codes,
//! and symmetric session keys.
//!
//! We use AES-256-GCM because it's an AEAD cipher: authentication and
//! encryption in one operation, hardware-accelerated basically everywhere.
//!
//! ## Nonce management
//!
//! GCM is notoriously unforgiving about nonce reuse. Our strategy: random
//! 96-bit nonces from a CSPRNG, and a fresh salt (so a fresh key) for every
//! wrapped secret. Each derived key encrypts exactly one plaintext.
//!
//! ## Wire format
//!
//! `encrypt()` returns `nonce || ciphertext` as a single `Vec<u8>`. The first
//! 12 bytes are the nonce, the rest is the ciphertext + auth tag.
//!
//! ## Password wrapping
//!
//! [`EncryptedSecret`] is what an `AsymmetricKey` stores instead of a private
//! key. The wrapping key is `BLAKE3-derive_key(context, salt || password)`,
//! and the salt doubles as associated data so a ciphertext can't be grafted
//! onto another key's salt.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use super::hash::domain_separated_hash_multi;
use super::password::PasswordPrompt;
use super::secret::Secret;
use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, KDF_CONTEXT_PRIVATE_KEY, SALT_LENGTH};

/// Errors that can occur during encryption/decryption.
///
/// We intentionally keep these vague. The difference between "wrong
/// password" and "corrupted ciphertext" is none of an attacker's business.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes")]
    InvalidKeyLength,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,

    #[error("invalid salt length: expected {SALT_LENGTH} bytes")]
    InvalidSalt,

    #[error("key is locked")]
    Locked,
}

/// Encrypt plaintext with AES-256-GCM using a random nonce.
///
/// # Example
///
/// ```
/// use nym_identity::crypto::encryption::{encrypt, decrypt};
///
/// let key = [0x42u8; 32]; // In real code, use a properly derived key!
/// let sealed = encrypt(&key, b"chain code").unwrap();
/// assert_eq!(decrypt(&key, &sealed).unwrap(), b"chain code");
/// ```
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    encrypt_with_aad(key, plaintext, &[])
}

/// Decrypt data previously encrypted with [`encrypt`].
///
/// Returns `EncryptionError::DecryptFailed` on a wrong key or any
/// modification to the data. We don't distinguish between those on purpose.
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    decrypt_with_aad(key, data, &[])
}

/// Encrypt with Additional Authenticated Data. Same `nonce || ciphertext`
/// format as [`encrypt`]; the AAD is authenticated but not stored.
pub fn encrypt_with_aad(
    key: &[u8; AES_KEY_LENGTH],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data produced by [`encrypt_with_aad`]. The AAD must match.
pub fn decrypt_with_aad(
    key: &[u8; AES_KEY_LENGTH],
    data: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Derive a one-off wrapping key from a salt and a password.
pub(crate) fn wrapping_key(
    context: &str,
    salt: &[u8],
    password: &Secret,
) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    Zeroizing::new(domain_separated_hash_multi(
        context,
        &[salt, password.bytes()],
    ))
}

/// A secret sealed under a password. The only form in which private keys
/// and chain codes are ever serialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    salt: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl EncryptedSecret {
    /// Seal `plaintext` under the prompt's password.
    pub fn seal(plaintext: &Secret, prompt: &PasswordPrompt) -> Result<Self, EncryptionError> {
        let mut salt = vec![0u8; SALT_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        let key = wrapping_key(KDF_CONTEXT_PRIVATE_KEY, &salt, prompt.password());
        let ciphertext = encrypt_with_aad(&key, plaintext.bytes(), &salt)?;
        Ok(Self { salt, ciphertext })
    }

    /// Open with the prompt's password. The plaintext never leaves a `Secret`.
    pub fn open(&self, prompt: &PasswordPrompt) -> Result<Secret, EncryptionError> {
        self.check()?;
        let key = wrapping_key(KDF_CONTEXT_PRIVATE_KEY, &self.salt, prompt.password());
        let plaintext = Zeroizing::new(decrypt_with_aad(&key, &self.ciphertext, &self.salt)?);
        Ok(Secret::from_bytes(&plaintext))
    }

    /// Structural validation. Used when loading serialized keys.
    pub fn check(&self) -> Result<(), EncryptionError> {
        if self.salt.len() != SALT_LENGTH {
            return Err(EncryptionError::InvalidSalt);
        }
        if self.ciphertext.len() < AES_NONCE_LENGTH + 16 {
            return Err(EncryptionError::CiphertextTooShort);
        }
        Ok(())
    }
}

impl fmt::Debug for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedSecret({} bytes)", self.ciphertext.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        // A fixed key for testing. Never use a predictable key in production.
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    fn prompt(password: &str) -> PasswordPrompt {
        PasswordPrompt::with_password("test", Secret::from_text(password))
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"the quick brown fox jumps over the lazy dog";

        let sealed = encrypt(&key, plaintext).unwrap();
        let recovered = decrypt(&key, &sealed).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let key = test_key();
        let sealed = encrypt(&key, b"secret").unwrap();

        let mut wrong_key = test_key();
        wrong_key[0] ^= 0xFF;

        assert_eq!(
            decrypt(&wrong_key, &sealed),
            Err(EncryptionError::DecryptFailed)
        );
    }

    #[test]
    fn test_modified_ciphertext_fails_decryption() {
        let key = test_key();
        let mut sealed = encrypt(&key, b"secret").unwrap();
        sealed[AES_NONCE_LENGTH] ^= 0xFF;

        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn test_ciphertext_length() {
        // Sealed output should be nonce (12) + plaintext length + auth tag (16).
        let key = test_key();
        let plaintext = b"exactly 26 bytes of input!";
        let sealed = encrypt(&key, plaintext).unwrap();
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + plaintext.len() + 16);
    }

    #[test]
    fn test_wrong_aad_fails_decryption() {
        let key = test_key();
        let sealed = encrypt_with_aad(&key, b"secret", b"correct-aad").unwrap();
        assert!(decrypt_with_aad(&key, &sealed, b"wrong-aad").is_err());
        assert!(decrypt_with_aad(&key, &sealed, b"correct-aad").is_ok());
    }

    #[test]
    fn test_decrypt_too_short() {
        let key = test_key();
        assert_eq!(
            decrypt(&key, &[0u8; 4]),
            Err(EncryptionError::CiphertextTooShort)
        );
    }

    #[test]
    fn test_sealed_secret_roundtrip() {
        let secret = Secret::from_bytes(&[0x11; 32]);
        let sealed = EncryptedSecret::seal(&secret, &prompt("hunter2")).unwrap();
        let opened = sealed.open(&prompt("hunter2")).unwrap();
        assert_eq!(opened.bytes(), secret.bytes());
    }

    #[test]
    fn test_sealed_secret_wrong_password() {
        let secret = Secret::from_bytes(&[0x11; 32]);
        let sealed = EncryptedSecret::seal(&secret, &prompt("hunter2")).unwrap();
        assert_eq!(
            sealed.open(&prompt("hunter3")).unwrap_err(),
            EncryptionError::DecryptFailed
        );
    }

    #[test]
    fn test_sealing_twice_uses_fresh_salt() {
        let secret = Secret::from_bytes(&[0x22; 32]);
        let a = EncryptedSecret::seal(&secret, &prompt("pw")).unwrap();
        let b = EncryptedSecret::seal(&secret, &prompt("pw")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_swapped_salt_fails() {
        let secret = Secret::from_bytes(&[0x33; 32]);
        let a = EncryptedSecret::seal(&secret, &prompt("pw")).unwrap();
        let b = EncryptedSecret::seal(&secret, &prompt("pw")).unwrap();
        let grafted = EncryptedSecret {
            salt: b.salt.clone(),
            ciphertext: a.ciphertext.clone(),
        };
        assert!(grafted.open(&prompt("pw")).is_err());
    }

    #[test]
    fn test_check_rejects_truncated() {
        let bad = EncryptedSecret {
            salt: vec![0u8; 3],
            ciphertext: vec![0u8; 40],
        };
        assert_eq!(bad.check(), Err(EncryptionError::InvalidSalt));
    }
}
