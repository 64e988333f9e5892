//! # Legacy RSA
//!
//! PKCS#1 v1.5 signatures over SHA-256, keys encoded as PKCS#1 DER.
//!
//! RSA keys are not a curve. No ECDH, no session tags, no HD derivation,
//! no increments. `ecdsa()` says so with a typed error and everything that
//! depends on it fails gracefully.

use ::rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use ::rsa::pkcs1v15::{Signature as RsaSignature, SigningKey, VerifyingKey};
use ::rsa::signature::{SignatureEncoding, Signer, Verifier};
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use rand::rngs::OsRng;
use sha2::Sha256;

use super::provider::{EcdsaProvider, KeyProvider};
use super::{Algorithm, KeyError};
use crate::config::MIN_RSA_KEY_SIZE;
use crate::crypto::Secret;

/// RSA provider.
pub struct RsaProvider;

impl RsaProvider {
    fn private_key(private: &Secret) -> Result<RsaPrivateKey, KeyError> {
        RsaPrivateKey::from_pkcs1_der(private.bytes()).map_err(|_| KeyError::InvalidPrivateKey)
    }

    fn public_key(public: &[u8]) -> Result<RsaPublicKey, KeyError> {
        RsaPublicKey::from_pkcs1_der(public).map_err(|_| KeyError::InvalidPublicKey)
    }

    fn encode_public(public: &RsaPublicKey) -> Result<Vec<u8>, KeyError> {
        Ok(public
            .to_pkcs1_der()
            .map_err(|_| KeyError::InvalidPublicKey)?
            .as_bytes()
            .to_vec())
    }
}

impl KeyProvider for RsaProvider {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }

    fn generate(&self, key_size: usize) -> Result<(Vec<u8>, Secret), KeyError> {
        if key_size < MIN_RSA_KEY_SIZE {
            return Err(KeyError::InvalidKeySize(key_size));
        }
        let private =
            RsaPrivateKey::new(&mut OsRng, key_size).map_err(|_| KeyError::GenerationFailed)?;
        let public = Self::encode_public(&RsaPublicKey::from(&private))?;
        let der = private
            .to_pkcs1_der()
            .map_err(|_| KeyError::GenerationFailed)?;
        Ok((public, Secret::from_bytes(der.as_bytes())))
    }

    fn public_from_private(&self, private: &Secret) -> Result<Vec<u8>, KeyError> {
        let private = Self::private_key(private)?;
        Self::encode_public(&RsaPublicKey::from(&private))
    }

    fn validate_public(&self, public: &[u8]) -> Result<(), KeyError> {
        Self::public_key(public).map(|_| ())
    }

    fn sign(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError> {
        let signing_key = SigningKey::<Sha256>::new(Self::private_key(private)?);
        let signature = signing_key
            .try_sign(message)
            .map_err(|_| KeyError::SigningFailed)?;
        Ok(signature.to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public: &[u8]) -> bool {
        let Ok(public) = Self::public_key(public) else {
            return false;
        };
        let Ok(signature) = RsaSignature::try_from(signature) else {
            return false;
        };
        VerifyingKey::<Sha256>::new(public)
            .verify(message, &signature)
            .is_ok()
    }

    fn ecdsa(&self) -> Result<&dyn EcdsaProvider, KeyError> {
        Err(KeyError::Unsupported {
            algorithm: Algorithm::Rsa,
            operation: "elliptic curve arithmetic",
        })
    }
}
