//! # secp256k1
//!
//! ECDSA over SHA-256, ECDH, and the scalar/point arithmetic BIP-32 needs.
//! Public keys are 33-byte SEC1 compressed points, private keys 32-byte
//! big-endian scalars.
//!
//! `sign` produces the compact 64-byte `r || s` form; `sign_der` produces
//! DER. `verify` accepts either, because peers disagree about which one is
//! "the" ECDSA signature and life is too short to argue.

use k256::ecdh::diffie_hellman;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::group::Curve;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey};
use rand::rngs::OsRng;

use super::provider::{EcdsaProvider, KeyProvider};
use super::{Algorithm, KeyError};
use crate::config::{SECP256K1_PRIVATE_KEY_LENGTH, SECP256K1_PUBLIC_KEY_LENGTH};
use crate::crypto::Secret;

/// secp256k1 provider.
pub struct Secp256k1Provider;

impl Secp256k1Provider {
    fn secret_key(private: &Secret) -> Result<SecretKey, KeyError> {
        if private.len() != SECP256K1_PRIVATE_KEY_LENGTH {
            return Err(KeyError::InvalidPrivateKey);
        }
        SecretKey::from_slice(private.bytes()).map_err(|_| KeyError::InvalidPrivateKey)
    }

    fn public_key(public: &[u8]) -> Result<PublicKey, KeyError> {
        if public.len() != SECP256K1_PUBLIC_KEY_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        PublicKey::from_sec1_bytes(public).map_err(|_| KeyError::InvalidPublicKey)
    }

    fn encode_public(public: &PublicKey) -> Vec<u8> {
        public.to_encoded_point(true).as_bytes().to_vec()
    }

    fn tweak_scalar(tweak: &[u8; 32]) -> Result<Scalar, KeyError> {
        // Tweaks at or above the group order are rejected, as BIP-32 requires.
        Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(tweak)))
            .ok_or(KeyError::InvalidTweak)
    }

    fn parse_signature(signature: &[u8]) -> Option<EcdsaSignature> {
        if signature.len() == 64 {
            EcdsaSignature::from_slice(signature).ok()
        } else {
            EcdsaSignature::from_der(signature).ok()
        }
    }

    fn sign_raw(message: &[u8], private: &Secret) -> Result<EcdsaSignature, KeyError> {
        let signing_key = SigningKey::from(&Self::secret_key(private)?);
        signing_key
            .try_sign(message)
            .map_err(|_| KeyError::SigningFailed)
    }
}

impl KeyProvider for Secp256k1Provider {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Secp256k1
    }

    fn generate(&self, _key_size: usize) -> Result<(Vec<u8>, Secret), KeyError> {
        let secret = SecretKey::random(&mut OsRng);
        let public = Self::encode_public(&secret.public_key());
        Ok((public, Secret::from_bytes(&secret.to_bytes())))
    }

    fn public_from_private(&self, private: &Secret) -> Result<Vec<u8>, KeyError> {
        Ok(Self::encode_public(&Self::secret_key(private)?.public_key()))
    }

    fn validate_public(&self, public: &[u8]) -> Result<(), KeyError> {
        Self::public_key(public).map(|_| ())
    }

    fn sign(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError> {
        Ok(Self::sign_raw(message, private)?.to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public: &[u8]) -> bool {
        let Ok(public) = Self::public_key(public) else {
            return false;
        };
        let Some(signature) = Self::parse_signature(signature) else {
            return false;
        };
        VerifyingKey::from(&public)
            .verify(message, &signature)
            .is_ok()
    }

    fn ecdsa(&self) -> Result<&dyn EcdsaProvider, KeyError> {
        Ok(self)
    }
}

impl EcdsaProvider for Secp256k1Provider {
    fn sign_der(&self, message: &[u8], private: &Secret) -> Result<Vec<u8>, KeyError> {
        Ok(Self::sign_raw(message, private)?.to_der().as_bytes().to_vec())
    }

    fn shared_secret(&self, private: &Secret, public: &[u8]) -> Result<Secret, KeyError> {
        let secret = Self::secret_key(private)?;
        let peer = Self::public_key(public)?;
        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        Ok(Secret::from_bytes(shared.raw_secret_bytes().as_slice()))
    }

    fn increment_private(&self, private: &Secret, tweak: &[u8; 32]) -> Result<Secret, KeyError> {
        let secret = Self::secret_key(private)?;
        let sum = *secret.to_nonzero_scalar() + Self::tweak_scalar(tweak)?;
        let sum = Option::<NonZeroScalar>::from(NonZeroScalar::new(sum))
            .ok_or(KeyError::InvalidTweak)?;
        Ok(Secret::from_bytes(&SecretKey::from(sum).to_bytes()))
    }

    fn increment_public(&self, public: &[u8], tweak: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        let point = Self::public_key(public)?.to_projective()
            + ProjectivePoint::GENERATOR * Self::tweak_scalar(tweak)?;
        let public = PublicKey::from_affine(point.to_affine()).map_err(|_| KeyError::InvalidTweak)?;
        Ok(Self::encode_public(&public))
    }

    fn private_from_node(&self, il: &[u8; 32]) -> Result<Secret, KeyError> {
        // A node hash outside [1, n) is an invalid child. BIP-32 says skip
        // the index; we surface it and let the caller pick another.
        SecretKey::from_slice(il).map_err(|_| KeyError::InvalidTweak)?;
        Ok(Secret::from_bytes(il))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (Vec<u8>, Secret) {
        Secp256k1Provider.generate(0).unwrap()
    }

    #[test]
    fn test_key_lengths() {
        let (public, private) = keypair();
        assert_eq!(public.len(), SECP256K1_PUBLIC_KEY_LENGTH);
        assert_eq!(private.len(), SECP256K1_PRIVATE_KEY_LENGTH);
        assert!(public[0] == 0x02 || public[0] == 0x03);
    }

    #[test]
    fn test_sign_verify_compact_and_der() {
        let (public, private) = keypair();
        let compact = Secp256k1Provider.sign(b"msg", &private).unwrap();
        let der = Secp256k1Provider.sign_der(b"msg", &private).unwrap();
        assert_eq!(compact.len(), 64);
        assert_ne!(der.len(), 64);
        assert!(Secp256k1Provider.verify(b"msg", &compact, &public));
        assert!(Secp256k1Provider.verify(b"msg", &der, &public));
        assert!(!Secp256k1Provider.verify(b"other", &compact, &public));
    }

    #[test]
    fn test_signing_is_deterministic() {
        // RFC 6979 nonces: same key, same message, same signature.
        let (_, private) = keypair();
        let a = Secp256k1Provider.sign(b"msg", &private).unwrap();
        let b = Secp256k1Provider.sign(b"msg", &private).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ecdh_is_symmetric() {
        let (pub_a, priv_a) = keypair();
        let (pub_b, priv_b) = keypair();
        let ab = Secp256k1Provider.shared_secret(&priv_a, &pub_b).unwrap();
        let ba = Secp256k1Provider.shared_secret(&priv_b, &pub_a).unwrap();
        assert_eq!(ab.bytes(), ba.bytes());
        assert_eq!(ab.len(), 32);
    }

    #[test]
    fn test_increments_agree() {
        let (public, private) = keypair();
        let tweak = [0x42u8; 32];
        let private2 = Secp256k1Provider.increment_private(&private, &tweak).unwrap();
        let public2 = Secp256k1Provider.increment_public(&public, &tweak).unwrap();
        assert_eq!(
            Secp256k1Provider.public_from_private(&private2).unwrap(),
            public2
        );
        assert_ne!(public, public2);
    }

    #[test]
    fn test_tweak_above_order_rejected() {
        let (public, private) = keypair();
        let tweak = [0xffu8; 32];
        assert_eq!(
            Secp256k1Provider.increment_private(&private, &tweak).unwrap_err(),
            KeyError::InvalidTweak
        );
        assert_eq!(
            Secp256k1Provider.increment_public(&public, &tweak).unwrap_err(),
            KeyError::InvalidTweak
        );
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert_eq!(
            Secp256k1Provider.validate_public(&[2u8; 32]),
            Err(KeyError::InvalidPublicKey)
        );
        let short = Secret::from_bytes(&[1u8; 31]);
        assert_eq!(
            Secp256k1Provider.sign(b"m", &short).unwrap_err(),
            KeyError::InvalidPrivateKey
        );
    }
}
