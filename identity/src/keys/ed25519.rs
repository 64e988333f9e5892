//! # Ed25519
//!
//! Ed25519 with one twist: homomorphic increments. `private + t` has to
//! match `public + t·B`, which is impossible if all you keep is the 32-byte
//! seed (the seed gets hashed and clamped before it becomes a scalar). So
//! this provider accepts two private key forms:
//!
//! - **32-byte seed** — what generation and SLIP-0010 derivation produce.
//!   Expanded with SHA-512 on use, exactly like any other Ed25519 library.
//! - **64-byte expanded key** — `scalar || nonce_prefix`, with the scalar
//!   stored canonically (already reduced). Increments produce this form.
//!
//! Signing goes through ed25519-dalek's hazmat `raw_sign`, so signatures are
//! standard Ed25519 and verify with any stock verifier.
//!
//! ECDH maps the Edwards point to its Montgomery form and returns the
//! X25519-style u-coordinate of `a·P`.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::Scalar;
use ed25519_dalek::hazmat::{raw_sign, ExpandedSecretKey};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use rand::RngCore;
use sha2::Sha512;

use super::provider::{EcdsaProvider, KeyProvider};
use super::{Algorithm, KeyError};
use crate::config::{ED25519_EXPANDED_KEY_LENGTH, ED25519_PUBLIC_KEY_LENGTH, ED25519_SEED_LENGTH};
use crate::crypto::hash::sha512;
use crate::crypto::Secret;

/// Ed25519 provider.
pub struct Ed25519Provider;

impl Ed25519Provider {
    fn expanded(private: &Secret) -> Result<ExpandedSecretKey, KeyError> {
        match private.len() {
            ED25519_SEED_LENGTH => {
                let seed: [u8; ED25519_SEED_LENGTH] = private
                    .bytes()
                    .try_into()
                    .map_err(|_| KeyError::InvalidPrivateKey)?;
                Ok(ExpandedSecretKey::from(&seed))
            }
            ED25519_EXPANDED_KEY_LENGTH => {
                let mut scalar_bytes = [0u8; 32];
                let mut hash_prefix = [0u8; 32];
                scalar_bytes.copy_from_slice(&private.bytes()[..32]);
                hash_prefix.copy_from_slice(&private.bytes()[32..]);
                let scalar = Option::<Scalar>::from(Scalar::from_canonical_bytes(scalar_bytes))
                    .ok_or(KeyError::InvalidPrivateKey)?;
                Ok(ExpandedSecretKey {
                    scalar,
                    hash_prefix,
                })
            }
            _ => Err(KeyError::InvalidPrivateKey),
        }
    }

    fn encode_expanded(key: &ExpandedSecretKey) -> Secret {
        let mut bytes = [0u8; ED25519_EXPANDED_KEY_LENGTH];
        bytes[..32].copy_from_slice(key.scalar.as_bytes());
        bytes[32..].copy_from_slice(&key.hash_prefix);
        let secret = Secret::from_bytes(&bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        secret
    }

    fn point(public: &[u8]) -> Result<EdwardsPoint, KeyError> {
        let bytes: [u8; ED25519_PUBLIC_KEY_LENGTH] =
            public.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        CompressedEdwardsY(bytes)
            .decompress()
            .ok_or(KeyError::InvalidPublicKey)
    }

    fn public_of(key: &ExpandedSecretKey) -> Vec<u8> {
        EdwardsPoint::mul_base(&key.scalar)
            .compress()
            .to_bytes()
            .to_vec()
    }
}

impl KeyProvider for Ed25519Provider {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ed25519
    }

    fn generate(&self, _key_size: usize) -> Result<(Vec<u8>, Secret), KeyError> {
        let mut seed = [0u8; ED25519_SEED_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        let private = Secret::from_bytes(&seed);
        zeroize::Zeroize::zeroize(&mut seed);
        let public = self.public_from_private(&private)?;
        Ok((public, private))
    }

    fn public_from_private(&self, private: &Secret) -> Result<Vec<u8>, KeyError> {
        Ok(Self::public_of(&Self::expanded(private)?))
    }

    fn validate_public(&self, public: &[u8]) -> Result<(), KeyError> {
        let point = Self::point(public)?;
        if point.is_small_order() {
            return Err(KeyError::InvalidPublicKey);
        }
        Ok(())
    }

    fn sign(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError> {
        let expanded = Self::expanded(private)?;
        let verifying_key = VerifyingKey::from(&expanded);
        let signature = raw_sign::<Sha512>(&expanded, message, &verifying_key);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public: &[u8]) -> bool {
        let Ok(public) = <[u8; ED25519_PUBLIC_KEY_LENGTH]>::try_from(public) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&public) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }

    fn ecdsa(&self) -> Result<&dyn EcdsaProvider, KeyError> {
        Ok(self)
    }
}

impl EcdsaProvider for Ed25519Provider {
    fn sign_der(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError> {
        self.sign(message, private)
    }

    fn shared_secret(&self, private: &Secret, public: &[u8]) -> Result<Secret, KeyError> {
        let expanded = Self::expanded(private)?;
        let peer = Self::point(public)?;
        if peer.is_small_order() {
            return Err(KeyError::InvalidPublicKey);
        }
        let shared = (peer * expanded.scalar).to_montgomery();
        Ok(Secret::from_bytes(shared.as_bytes()))
    }

    fn increment_private(&self, private: &Secret, tweak: &[u8; 32]) -> Result<Secret, KeyError> {
        let expanded = Self::expanded(private)?;
        let t = Scalar::from_bytes_mod_order(*tweak);
        let scalar = expanded.scalar + t;
        if scalar == Scalar::ZERO {
            return Err(KeyError::InvalidTweak);
        }
        // The nonce prefix has to move too, or two related keys would share
        // deterministic nonces.
        let digest = sha512(&[expanded.hash_prefix.as_slice(), tweak.as_slice()].concat());
        let mut hash_prefix = [0u8; 32];
        hash_prefix.copy_from_slice(&digest[..32]);
        Ok(Self::encode_expanded(&ExpandedSecretKey {
            scalar,
            hash_prefix,
        }))
    }

    fn increment_public(&self, public: &[u8], tweak: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        let t = Scalar::from_bytes_mod_order(*tweak);
        let point = Self::point(public)? + EdwardsPoint::mul_base(&t);
        if point.is_small_order() {
            return Err(KeyError::InvalidTweak);
        }
        Ok(point.compress().to_bytes().to_vec())
    }

    fn private_from_node(&self, il: &[u8; 32]) -> Result<Secret, KeyError> {
        Ok(Secret::from_bytes(il))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (Vec<u8>, Secret) {
        Ed25519Provider.generate(0).unwrap()
    }

    #[test]
    fn test_matches_stock_ed25519() {
        // A seed-form key must produce the same public key and signatures
        // as plain ed25519-dalek.
        let seed = [7u8; 32];
        let stock = ed25519_dalek::SigningKey::from_bytes(&seed);
        let private = Secret::from_bytes(&seed);

        let public = Ed25519Provider.public_from_private(&private).unwrap();
        assert_eq!(public, stock.verifying_key().to_bytes().to_vec());

        let ours = Ed25519Provider.sign(b"msg", &private).unwrap();
        let theirs = ed25519_dalek::Signer::sign(&stock, b"msg");
        assert_eq!(ours, theirs.to_bytes().to_vec());
    }

    #[test]
    fn test_sign_verify() {
        let (public, private) = keypair();
        let sig = Ed25519Provider.sign(b"hello", &private).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(Ed25519Provider.verify(b"hello", &sig, &public));
        assert!(!Ed25519Provider.verify(b"hellO", &sig, &public));
    }

    #[test]
    fn test_ecdh_is_symmetric() {
        let (pub_a, priv_a) = keypair();
        let (pub_b, priv_b) = keypair();
        let ab = Ed25519Provider.shared_secret(&priv_a, &pub_b).unwrap();
        let ba = Ed25519Provider.shared_secret(&priv_b, &pub_a).unwrap();
        assert_eq!(ab.bytes(), ba.bytes());
    }

    #[test]
    fn test_increments_agree_and_sign() {
        let (public, private) = keypair();
        let tweak = [0x24u8; 32];
        let private2 = Ed25519Provider.increment_private(&private, &tweak).unwrap();
        let public2 = Ed25519Provider.increment_public(&public, &tweak).unwrap();

        assert_eq!(private2.len(), ED25519_EXPANDED_KEY_LENGTH);
        assert_eq!(
            Ed25519Provider.public_from_private(&private2).unwrap(),
            public2
        );

        // The incremented key is a perfectly ordinary Ed25519 key.
        let sig = Ed25519Provider.sign(b"blinded", &private2).unwrap();
        assert!(Ed25519Provider.verify(b"blinded", &sig, &public2));
    }

    #[test]
    fn test_increment_is_composable() {
        let (public, private) = keypair();
        let a = [1u8; 32];
        let b = [2u8; 32];
        let twice = Ed25519Provider
            .increment_private(&Ed25519Provider.increment_private(&private, &a).unwrap(), &b)
            .unwrap();
        let twice_public = Ed25519Provider
            .increment_public(&Ed25519Provider.increment_public(&public, &a).unwrap(), &b)
            .unwrap();
        assert_eq!(
            Ed25519Provider.public_from_private(&twice).unwrap(),
            twice_public
        );
    }

    #[test]
    fn test_rejects_bad_private_length() {
        let bad = Secret::from_bytes(&[1u8; 48]);
        assert_eq!(
            Ed25519Provider.sign(b"m", &bad).unwrap_err(),
            KeyError::InvalidPrivateKey
        );
    }

    #[test]
    fn test_rejects_small_order_public() {
        // The identity point compresses to 0x01 followed by zeros.
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert_eq!(
            Ed25519Provider.validate_public(&identity),
            Err(KeyError::InvalidPublicKey)
        );
    }
}
