//! # AsymmetricKey
//!
//! The key value every credential holds: algorithm, role, version, public
//! bytes, and (maybe) a password-wrapped private key. HD keys also carry
//! their derivation path, depth, parent fingerprint and a wrapped chain code.
//!
//! ## Private material
//!
//! An `AsymmetricKey` never holds plaintext private bytes. Every operation
//! that needs them takes a [`PasswordPrompt`], unwraps into a [`Secret`] for
//! the duration of the call, and lets the `Secret` zero itself on drop. A
//! wrong password surfaces as [`KeyError::Locked`] and leaves the key as it
//! was.
//!
//! ## Session tags
//!
//! `calculate_tag` and `calculate_session_password` are how a sender
//! addresses a symmetric key to a recipient's encryption key without
//! revealing who the recipient is. Both sides compute the same ECDH secret;
//! the tag is `HMAC-SHA256(shared, domain)` truncated to 32 bits, and the
//! session password is a domain-separated BLAKE3 of the same secret.

use std::fmt;

use super::hd::{self, HdNode, HdPath};
use super::provider::{ecdsa, provider, EcdsaProvider};
use super::{Algorithm, KeyError, Role};
use crate::config::{KDF_CONTEXT_SESSION_PASSWORD, MAX_KEY_VERSION, MIN_KEY_VERSION};
use crate::crypto::hash::{domain_separated_hash, hmac_sha256};
use crate::crypto::{EncryptedSecret, PasswordPrompt, Secret};
use crate::identifier::Identifier;
use crate::proto::{SerializedAsymmetricKey, SerializedHdProperties};

#[derive(Clone, PartialEq, Eq)]
struct HdProperties {
    path: HdPath,
    depth: u8,
    parent: u32,
    chain_code: Option<EncryptedSecret>,
}

/// A public key, optionally with its wrapped private half.
#[derive(Clone, PartialEq, Eq)]
pub struct AsymmetricKey {
    version: u32,
    algorithm: Algorithm,
    role: Role,
    public: Vec<u8>,
    private: Option<EncryptedSecret>,
    hd: Option<HdProperties>,
}

fn check_version(version: u32) -> Result<(), KeyError> {
    if (MIN_KEY_VERSION..=MAX_KEY_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(KeyError::UnsupportedVersion(version))
    }
}

impl AsymmetricKey {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Fresh random key. `key_size` is only read for RSA.
    pub fn generate(
        algorithm: Algorithm,
        role: Role,
        key_size: usize,
        version: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        check_version(version)?;
        let (public, private) = provider(algorithm).generate(key_size)?;
        Ok(Self {
            version,
            algorithm,
            role,
            public,
            private: Some(EncryptedSecret::seal(&private, prompt)?),
            hd: None,
        })
    }

    /// Wrap existing private key material.
    pub fn from_private(
        algorithm: Algorithm,
        role: Role,
        private: &Secret,
        version: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        check_version(version)?;
        let public = provider(algorithm).public_from_private(private)?;
        Ok(Self {
            version,
            algorithm,
            role,
            public,
            private: Some(EncryptedSecret::seal(private, prompt)?),
            hd: None,
        })
    }

    /// HD key at `path` below `seed`.
    pub fn derive(
        algorithm: Algorithm,
        role: Role,
        seed: &Secret,
        path: &HdPath,
        version: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        check_version(version)?;
        let node = HdNode::master(algorithm, seed)?.derive_path(path.children())?;
        Self::from_node(&node, role, path.clone(), version, prompt)
    }

    fn from_node(
        node: &HdNode,
        role: Role,
        path: HdPath,
        version: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        let private = node
            .private_key()
            .map(|private| EncryptedSecret::seal(private, prompt))
            .transpose()?;
        Ok(Self {
            version,
            algorithm: node.algorithm(),
            role,
            public: node.public_key().to_vec(),
            private,
            hd: Some(HdProperties {
                path,
                depth: node.depth(),
                parent: node.parent_fingerprint(),
                chain_code: Some(EncryptedSecret::seal(node.chain_code(), prompt)?),
            }),
        })
    }

    /// Load a serialized key. Fails closed on anything unexpected.
    pub fn from_serialized(serialized: &SerializedAsymmetricKey) -> Result<Self, KeyError> {
        check_version(serialized.version)?;
        provider(serialized.algorithm).validate_public(&serialized.public_key)?;
        if let Some(private) = &serialized.private_key {
            private.check().map_err(|_| KeyError::InvalidPrivateKey)?;
        }
        let hd = match &serialized.hd {
            None => None,
            Some(_) if !serialized.algorithm.is_elliptic_curve() => {
                return Err(KeyError::Unsupported {
                    algorithm: serialized.algorithm,
                    operation: "hd derivation",
                })
            }
            Some(props) => {
                if let Some(chain_code) = &props.chain_code {
                    chain_code.check().map_err(|_| KeyError::InvalidPrivateKey)?;
                }
                Some(HdProperties {
                    path: props.path.clone(),
                    depth: props.depth,
                    parent: props.parent,
                    chain_code: props.chain_code.clone(),
                })
            }
        };
        Ok(Self {
            version: serialized.version,
            algorithm: serialized.algorithm,
            role: serialized.role,
            public: serialized.public_key.clone(),
            private: serialized.private_key.clone(),
            hd,
        })
    }

    /// Serialized form, with or without the wrapped private half.
    pub fn serialize(&self, include_private: bool) -> SerializedAsymmetricKey {
        SerializedAsymmetricKey {
            version: self.version,
            algorithm: self.algorithm,
            role: self.role,
            public_key: self.public.clone(),
            private_key: if include_private { self.private.clone() } else { None },
            hd: self.hd.as_ref().map(|hd| SerializedHdProperties {
                path: hd.path.clone(),
                depth: hd.depth,
                parent: hd.parent,
                chain_code: if include_private { hd.chain_code.clone() } else { None },
            }),
        }
    }

    /// The same key without private material or chain code.
    pub fn public_only(&self) -> Self {
        Self {
            private: None,
            hd: self.hd.as_ref().map(|hd| HdProperties {
                chain_code: None,
                ..hd.clone()
            }),
            ..self.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Whether a wrapped private key is present. Never unwraps it.
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    pub fn is_hd(&self) -> bool {
        self.hd.is_some()
    }

    pub fn path(&self) -> Option<&HdPath> {
        self.hd.as_ref().map(|hd| &hd.path)
    }

    pub fn depth(&self) -> Option<u8> {
        self.hd.as_ref().map(|hd| hd.depth)
    }

    /// Parent fingerprint, for HD keys.
    pub fn parent(&self) -> Option<u32> {
        self.hd.as_ref().map(|hd| hd.parent)
    }

    /// First four bytes of `hash160(public_key)`.
    pub fn fingerprint(&self) -> u32 {
        hd::fingerprint(&self.public)
    }

    pub fn chain_code(&self, prompt: &PasswordPrompt) -> Result<Secret, KeyError> {
        let hd = self.hd.as_ref().ok_or(KeyError::NotHd)?;
        let chain_code = hd.chain_code.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        Ok(chain_code.open(prompt)?)
    }

    /// Unwrap the private key.
    pub fn private_key(&self, prompt: &PasswordPrompt) -> Result<Secret, KeyError> {
        let private = self.private.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        Ok(private.open(prompt)?)
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    pub fn sign(&self, message: &[u8], prompt: &PasswordPrompt) -> Result<Vec<u8>, KeyError> {
        let private = self.private_key(prompt)?;
        provider(self.algorithm).sign(message, &private)
    }

    /// DER-encoded signature. Curves only.
    pub fn sign_der(&self, message: &[u8], prompt: &PasswordPrompt) -> Result<Vec<u8>, KeyError> {
        let curve = self.ecdsa()?;
        let private = self.private_key(prompt)?;
        curve.sign_der(message, &private)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        provider(self.algorithm).verify(message, signature, &self.public)
    }

    // -----------------------------------------------------------------------
    // Curve operations
    // -----------------------------------------------------------------------

    /// The curve provider, or `Unsupported` for RSA.
    pub fn ecdsa(&self) -> Result<&'static dyn EcdsaProvider, KeyError> {
        ecdsa(self.algorithm)
    }

    /// Raw ECDH secret between this private key and `peer`.
    pub fn shared_secret(
        &self,
        peer: &AsymmetricKey,
        prompt: &PasswordPrompt,
    ) -> Result<Secret, KeyError> {
        let curve = self.ecdsa()?;
        if peer.algorithm != self.algorithm {
            return Err(KeyError::InvalidPublicKey);
        }
        let private = self.private_key(prompt)?;
        curve.shared_secret(&private, &peer.public)
    }

    /// 32-bit tag addressing a session key to the holder of `peer`,
    /// scoped by `domain`.
    pub fn calculate_tag(
        &self,
        peer: &AsymmetricKey,
        domain: &Identifier,
        prompt: &PasswordPrompt,
    ) -> Result<u32, KeyError> {
        let shared = self.shared_secret(peer, prompt)?;
        let mac = hmac_sha256(shared.bytes(), domain.as_bytes());
        Ok(u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]]))
    }

    /// Password for a symmetric key shared with the holder of `peer`.
    pub fn calculate_session_password(
        &self,
        peer: &AsymmetricKey,
        prompt: &PasswordPrompt,
    ) -> Result<Secret, KeyError> {
        let shared = self.shared_secret(peer, prompt)?;
        Ok(Secret::from_bytes(&domain_separated_hash(
            KDF_CONTEXT_SESSION_PASSWORD,
            shared.bytes(),
        )))
    }

    /// `private + tweak`, as a new, non-HD key with the same role. The
    /// result is wrapped under the same prompt.
    pub fn increment_private(
        &self,
        tweak: &[u8; 32],
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        let curve = self.ecdsa()?;
        let private = curve.increment_private(&self.private_key(prompt)?, tweak)?;
        let public = curve.public_from_private(&private)?;
        Ok(Self {
            version: self.version,
            algorithm: self.algorithm,
            role: self.role,
            public,
            private: Some(EncryptedSecret::seal(&private, prompt)?),
            hd: None,
        })
    }

    /// `public + tweak·G`, as a new public-only key.
    pub fn increment_public(&self, tweak: &[u8; 32]) -> Result<Self, KeyError> {
        let public = self.ecdsa()?.increment_public(&self.public, tweak)?;
        Ok(Self {
            version: self.version,
            algorithm: self.algorithm,
            role: self.role,
            public,
            private: None,
            hd: None,
        })
    }

    /// HD child `index`. Hardened children need the private key; a
    /// public-only parent yields a public-only child.
    pub fn child_key(&self, index: u32, prompt: &PasswordPrompt) -> Result<Self, KeyError> {
        let hd = self.hd.as_ref().ok_or(KeyError::NotHd)?;
        let private = self
            .private
            .as_ref()
            .map(|private| private.open(prompt))
            .transpose()?;
        let node = HdNode::from_parts(
            self.algorithm,
            private,
            self.public.clone(),
            self.chain_code(prompt)?,
            hd.depth,
            hd.parent,
        );
        let child = node.derive_child(index)?;
        Self::from_node(&child, self.role, hd.path.child(index), self.version, prompt)
    }
}

impl fmt::Debug for AsymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AsymmetricKey({}, {:?}, v{}, {}",
            self.algorithm,
            self.role,
            self.version,
            hex::encode(&self.public)
        )?;
        if let Some(hd) = &self.hd {
            write!(f, ", {}", hd.path)?;
        }
        if self.private.is_some() {
            write!(f, ", private")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HARDENED;

    fn prompt() -> PasswordPrompt {
        PasswordPrompt::with_password("test", Secret::from_text("hunter2"))
    }

    fn seed() -> Secret {
        Secret::from_bytes(&[0x5a; 32])
    }

    fn path(role: Role) -> HdPath {
        HdPath::nym_key(Identifier::hash(b"seed"), 0, 0, 1, role)
    }

    #[test]
    fn test_generate_sign_verify_all_algorithms() {
        for (algorithm, size) in [
            (Algorithm::Secp256k1, 0),
            (Algorithm::Ed25519, 0),
            (Algorithm::Rsa, 1024),
        ] {
            let key = AsymmetricKey::generate(algorithm, Role::Sign, size, 2, &prompt()).unwrap();
            let sig = key.sign(b"message", &prompt()).unwrap();
            assert!(key.verify(b"message", &sig));
            assert!(!key.verify(b"massage", &sig));
            assert!(key.public_only().verify(b"message", &sig));
        }
    }

    #[test]
    fn test_wrong_password_is_locked() {
        let key =
            AsymmetricKey::generate(Algorithm::Secp256k1, Role::Sign, 0, 1, &prompt()).unwrap();
        let wrong = PasswordPrompt::with_password("test", Secret::from_text("hunter3"));
        assert_eq!(key.sign(b"m", &wrong).unwrap_err(), KeyError::Locked);
        // Still usable with the right one.
        assert!(key.sign(b"m", &prompt()).is_ok());
    }

    #[test]
    fn test_has_private() {
        let key =
            AsymmetricKey::generate(Algorithm::Ed25519, Role::Auth, 0, 1, &prompt()).unwrap();
        assert!(key.has_private());
        let public = key.public_only();
        assert!(!public.has_private());
        assert_eq!(
            public.sign(b"m", &prompt()).unwrap_err(),
            KeyError::MissingPrivateKey
        );
    }

    #[test]
    fn test_derive_is_deterministic() {
        for algorithm in [Algorithm::Secp256k1, Algorithm::Ed25519] {
            let a = AsymmetricKey::derive(algorithm, Role::Sign, &seed(), &path(Role::Sign), 2, &prompt())
                .unwrap();
            let b = AsymmetricKey::derive(algorithm, Role::Sign, &seed(), &path(Role::Sign), 2, &prompt())
                .unwrap();
            assert_eq!(a.public_key(), b.public_key());
            assert_eq!(
                a.private_key(&prompt()).unwrap().bytes(),
                b.private_key(&prompt()).unwrap().bytes()
            );
            assert_eq!(a.depth(), Some(5));
            assert!(a.is_hd());
        }
    }

    #[test]
    fn test_rsa_has_no_curve_operations() {
        let rsa = AsymmetricKey::generate(Algorithm::Rsa, Role::Encrypt, 1024, 1, &prompt()).unwrap();
        assert!(matches!(rsa.ecdsa(), Err(KeyError::Unsupported { .. })));
        assert!(matches!(
            rsa.calculate_tag(&rsa, &Identifier::hash(b"d"), &prompt()),
            Err(KeyError::Unsupported { .. })
        ));
        assert!(matches!(
            rsa.increment_public(&[1u8; 32]),
            Err(KeyError::Unsupported { .. })
        ));
        assert!(matches!(
            AsymmetricKey::derive(Algorithm::Rsa, Role::Sign, &seed(), &path(Role::Sign), 1, &prompt()),
            Err(KeyError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_tags_and_session_passwords_agree() {
        for algorithm in [Algorithm::Secp256k1, Algorithm::Ed25519] {
            let alice = AsymmetricKey::generate(algorithm, Role::Encrypt, 0, 1, &prompt()).unwrap();
            let bob = AsymmetricKey::generate(algorithm, Role::Encrypt, 0, 1, &prompt()).unwrap();
            let domain = Identifier::hash(b"bob's master");

            let a = alice.calculate_tag(&bob.public_only(), &domain, &prompt()).unwrap();
            let b = bob.calculate_tag(&alice.public_only(), &domain, &prompt()).unwrap();
            assert_eq!(a, b);

            let other = Identifier::hash(b"someone else");
            assert_ne!(
                a,
                alice.calculate_tag(&bob.public_only(), &other, &prompt()).unwrap()
            );

            let pa = alice.calculate_session_password(&bob, &prompt()).unwrap();
            let pb = bob.calculate_session_password(&alice, &prompt()).unwrap();
            assert_eq!(pa.bytes(), pb.bytes());
        }
    }

    #[test]
    fn test_mixed_algorithm_ecdh_rejected() {
        let secp = AsymmetricKey::generate(Algorithm::Secp256k1, Role::Encrypt, 0, 1, &prompt()).unwrap();
        let ed = AsymmetricKey::generate(Algorithm::Ed25519, Role::Encrypt, 0, 1, &prompt()).unwrap();
        assert_eq!(
            secp.shared_secret(&ed, &prompt()).unwrap_err(),
            KeyError::InvalidPublicKey
        );
    }

    #[test]
    fn test_increments_match() {
        for algorithm in [Algorithm::Secp256k1, Algorithm::Ed25519] {
            let key = AsymmetricKey::generate(algorithm, Role::Sign, 0, 1, &prompt()).unwrap();
            let tweak = [3u8; 32];
            let private = key.increment_private(&tweak, &prompt()).unwrap();
            let public = key.increment_public(&tweak).unwrap();
            assert_eq!(private.public_key(), public.public_key());
            let sig = private.sign(b"blinded", &prompt()).unwrap();
            assert!(public.verify(b"blinded", &sig));
        }
    }

    #[test]
    fn test_child_key_matches_direct_derivation() {
        let parent_path = HdPath::new(Identifier::hash(b"seed"), vec![HARDENED | 44]);
        let parent = AsymmetricKey::derive(
            Algorithm::Secp256k1,
            Role::Sign,
            &seed(),
            &parent_path,
            2,
            &prompt(),
        )
        .unwrap();
        let child = parent.child_key(HARDENED | 7, &prompt()).unwrap();
        let direct = AsymmetricKey::derive(
            Algorithm::Secp256k1,
            Role::Sign,
            &seed(),
            &parent_path.child(HARDENED | 7),
            2,
            &prompt(),
        )
        .unwrap();
        assert_eq!(child.public_key(), direct.public_key());
        assert_eq!(child.parent(), Some(parent.fingerprint()));
        assert_eq!(child.path(), direct.path());
    }

    #[test]
    fn test_serialized_roundtrip_and_public_form() {
        let key = AsymmetricKey::derive(
            Algorithm::Ed25519,
            Role::Auth,
            &seed(),
            &path(Role::Auth),
            2,
            &prompt(),
        )
        .unwrap();
        let full = AsymmetricKey::from_serialized(&key.serialize(true)).unwrap();
        assert_eq!(full, key);

        let public = key.serialize(false);
        assert!(public.private_key.is_none());
        assert!(public.hd.as_ref().unwrap().chain_code.is_none());
        let loaded = AsymmetricKey::from_serialized(&public).unwrap();
        assert_eq!(loaded, key.public_only());
    }

    #[test]
    fn test_from_serialized_fails_closed() {
        let key = AsymmetricKey::generate(Algorithm::Secp256k1, Role::Sign, 0, 1, &prompt()).unwrap();

        let mut bad_version = key.serialize(false);
        bad_version.version = 99;
        assert_eq!(
            AsymmetricKey::from_serialized(&bad_version).unwrap_err(),
            KeyError::UnsupportedVersion(99)
        );

        let mut short = key.serialize(false);
        short.public_key.pop();
        assert_eq!(
            AsymmetricKey::from_serialized(&short).unwrap_err(),
            KeyError::InvalidPublicKey
        );

        let mut wrong_algorithm = key.serialize(false);
        wrong_algorithm.algorithm = Algorithm::Ed25519;
        assert!(AsymmetricKey::from_serialized(&wrong_algorithm).is_err());
    }
}
