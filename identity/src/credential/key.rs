//! The three keypairs behind every master and child key credential.

use tracing::debug;

use super::{CredentialError, KeyMode};
use crate::authority::versions;
use crate::crypto::{PasswordPrompt, Secret};
use crate::identifier::Identifier;
use crate::keys::{Algorithm, AsymmetricKey, HdPath, KeyError, Keypair, Role};
use crate::parameters::{CredentialType, Parameters};
use crate::proto::SerializedKeyCredential;

/// Seed material for HD key credentials.
#[derive(Clone, Copy)]
pub struct SeedRef<'a> {
    pub secret: &'a Secret,
    pub fingerprint: Identifier,
}

/// Auth, encrypt and sign keypairs.
#[derive(Debug, Clone)]
pub struct KeyCredential {
    subversion: u32,
    auth: Keypair,
    encrypt: Keypair,
    sign: Keypair,
}

impl KeyCredential {
    /// Generate or derive the three keys for credential `index`.
    ///
    /// HD parameters need `seed`; the keys land at
    /// `m/purpose'/nym'/credset'/index'/role'`. A ready-made signing keypair
    /// in `params` replaces the generated sign key.
    pub fn new(
        params: &Parameters,
        seed: Option<SeedRef<'_>>,
        index: u32,
        subversion: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, KeyError> {
        let key_version = versions::subversion_to_key_version(subversion)
            .ok_or(KeyError::UnsupportedVersion(subversion))?;
        let algorithm = params.algorithm();

        let make = |role: Role| -> Result<Keypair, KeyError> {
            if role == Role::Sign {
                if let Some(provided) = params.keypair() {
                    debug!("using provided signing keypair");
                    return Ok(provided.clone());
                }
            }
            let key = match params.credential_type() {
                CredentialType::Hd => {
                    let seed = seed.ok_or(KeyError::MissingSeed)?;
                    let path = HdPath::nym_key(
                        seed.fingerprint,
                        params.nym(),
                        params.credset(),
                        index,
                        role,
                    );
                    AsymmetricKey::derive(algorithm, role, seed.secret, &path, key_version, prompt)?
                }
                CredentialType::Legacy => AsymmetricKey::generate(
                    algorithm,
                    role,
                    params.key_size(),
                    key_version,
                    prompt,
                )?,
            };
            Ok(Keypair::new(key))
        };

        Ok(Self {
            subversion,
            auth: make(Role::Auth)?,
            encrypt: make(Role::Encrypt)?,
            sign: make(Role::Sign)?,
        })
    }

    /// Rebuild from serialized public keys and, in private mode, the
    /// matching private keys.
    pub fn from_serialized(
        public: &SerializedKeyCredential,
        private: Option<&SerializedKeyCredential>,
    ) -> Result<Self, CredentialError> {
        let ordered = |keys: &SerializedKeyCredential| -> Result<Vec<AsymmetricKey>, CredentialError> {
            if keys.keys.len() != Role::ALL.len() {
                return Err(CredentialError::MalformedKeys);
            }
            keys.keys
                .iter()
                .zip(Role::ALL)
                .map(|(key, role)| {
                    if key.role != role {
                        return Err(CredentialError::MalformedKeys);
                    }
                    Ok(AsymmetricKey::from_serialized(key)?)
                })
                .collect()
        };

        if versions::subversion_to_key_version(public.version).is_none() {
            return Err(CredentialError::MalformedKeys);
        }
        let publics = ordered(public)?;
        let privates = match private {
            Some(private) => {
                if private.version != public.version || private.mode != KeyMode::Private {
                    return Err(CredentialError::MalformedKeys);
                }
                ordered(private)?.into_iter().map(Some).collect()
            }
            None => vec![None, None, None],
        };
        if public.mode != KeyMode::Public {
            return Err(CredentialError::MalformedKeys);
        }

        let mut pairs = publics
            .into_iter()
            .zip(privates)
            .map(|(public, private)| {
                if private.as_ref().is_some_and(|p| !p.has_private()) {
                    return Err(CredentialError::MalformedKeys);
                }
                Ok(Keypair::from_parts(public, private)?)
            })
            .collect::<Result<Vec<_>, CredentialError>>()?
            .into_iter();

        let (Some(auth), Some(encrypt), Some(sign)) = (pairs.next(), pairs.next(), pairs.next())
        else {
            return Err(CredentialError::MalformedKeys);
        };
        Ok(Self {
            subversion: public.version,
            auth,
            encrypt,
            sign,
        })
    }

    /// Keys in auth, encrypt, sign order.
    pub fn serialize(&self, mode: KeyMode) -> SerializedKeyCredential {
        let keys = Role::ALL
            .iter()
            .map(|role| {
                let pair = self.keypair(*role);
                match (mode, pair.private_key()) {
                    (KeyMode::Private, Ok(private)) => private.serialize(true),
                    _ => pair.public_key().serialize(false),
                }
            })
            .collect();
        SerializedKeyCredential {
            version: self.subversion,
            mode,
            keys,
        }
    }

    pub fn keypair(&self, role: Role) -> &Keypair {
        match role {
            Role::Auth => &self.auth,
            Role::Encrypt => &self.encrypt,
            Role::Sign => &self.sign,
        }
    }

    pub(crate) fn keypair_mut(&mut self, role: Role) -> &mut Keypair {
        match role {
            Role::Auth => &mut self.auth,
            Role::Encrypt => &mut self.encrypt,
            Role::Sign => &mut self.sign,
        }
    }

    pub fn subversion(&self) -> u32 {
        self.subversion
    }

    /// Algorithm of the encryption key. Peers pick their algorithm from this.
    pub fn algorithm(&self) -> Algorithm {
        self.encrypt.public_key().algorithm()
    }

    pub fn has_private_keys(&self) -> bool {
        Role::ALL.iter().all(|role| self.keypair(*role).has_private())
    }
}
