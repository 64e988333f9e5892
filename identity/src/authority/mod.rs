//! # Authority
//!
//! An `Authority` is the credential tree for one nym: a single master
//! credential at index 0 and everything the master has signed for.
//!
//! ```text
//!                    ┌───────────────┐
//!                    │    master     │  index 0, signs children only
//!                    └───────┬───────┘
//!        ┌───────────────────┼────────────────────┐
//!  ┌─────┴─────┐      ┌──────┴──────┐      ┌──────┴───────┐
//!  │ child key │ ...  │   contact   │ ...  │ verification │
//!  └───────────┘      └─────────────┘      └──────────────┘
//!   index 1, 2, ...     claims              judgements
//! ```
//!
//! ## Invariants
//!
//! - Exactly one master, and it verifies against its own NymID source.
//! - Every active child verifies against the master.
//! - `index` only grows. A failed or revoked child still burns its index,
//!   so no HD path is ever handed out twice.
//! - Construction is all-or-nothing: `new` and `load` either return a fully
//!   checked authority or an error.
//!
//! ## Thread Safety
//!
//! Nothing in here locks. Mutation takes `&mut self`, so the borrow checker
//! enforces the single-writer rule. Once built, `&Authority` can be shared
//! across threads for verification.

pub mod versions;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, warn};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::claims::{ContactData, VerificationItem, VerificationSet};
use crate::config::AlgorithmSupport;
use crate::credential::key::SeedRef;
use crate::credential::primary::{self, MASTER_INDEX};
use crate::credential::{
    contact, secondary, verification, Capability, Credential, CredentialError, CredentialRole,
    CredentialState, HasKeys, KeyMode,
};
use crate::crypto::{PasswordPrompt, Secret, SymmetricKey};
use crate::identifier::Identifier;
use crate::keys::{Algorithm, AsymmetricKey, HdPath, KeyError, Role};
use crate::parameters::{CredentialType, ParameterError, ParameterType, Parameters};
use crate::proto::{AuthorityMode, SerializedAuthority, SerializedCredential};
use crate::signature::{Signature, SignatureRole};
use crate::source::NymIdSource;
use crate::store::{CredentialContext, StoreError};

/// Order in which child key algorithms are tried.
pub const ALGORITHM_PREFERENCE: [Algorithm; 3] =
    [Algorithm::Secp256k1, Algorithm::Ed25519, Algorithm::Rsa];

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("unsupported authority version {0}")]
    UnsupportedVersion(u32),

    #[error("unsupported {kind} version {version}")]
    UnsupportedDataVersion { kind: &'static str, version: u32 },

    #[error("no seed available for HD credentials")]
    MissingSeed,

    #[error("credential {0} not found")]
    MissingCredential(Identifier),

    #[error("nym id does not match the source")]
    NymIdMismatch,

    #[error("master credential does not verify")]
    InvalidMaster,

    #[error("child credential {0} does not verify against the master")]
    InvalidChild(Identifier),

    #[error("malformed serialized authority: {0}")]
    Malformed(&'static str),

    #[error("signature role {0} is not permitted here")]
    RoleNotPermitted(SignatureRole),

    #[error("no credential is able to sign")]
    NoSigner,

    #[error("no supported algorithm produced a child key credential")]
    NoSupportedAlgorithm,

    #[error("credential index space exhausted")]
    IndexExhausted,
}

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Authority {
    context: CredentialContext,
    source: NymIdSource,
    nym_id: Identifier,
    version: u32,
    index: u32,
    mode: KeyMode,
    master: Credential,
    key_credentials: BTreeMap<Identifier, Credential>,
    contact_credentials: BTreeMap<Identifier, Credential>,
    verification_credentials: BTreeMap<Identifier, Credential>,
    revoked: Vec<Identifier>,
}

impl Authority {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create a new authority: a master at index 0, one child key credential
    /// at index 1, plus any contact data or verification set carried by
    /// `params`.
    ///
    /// HD parameters resolve their seed in this order: fresh entropy from
    /// `params` (imported into the seed store), an explicit seed fingerprint,
    /// then the store's default seed. With auto-indexing on, the nym index
    /// is allocated from the seed store.
    pub fn new(
        context: CredentialContext,
        params: &Parameters,
        version: u32,
        prompt: &PasswordPrompt,
    ) -> Result<Self, AuthorityError> {
        params.validate()?;
        let version =
            versions::nym_to_authority(version).ok_or(AuthorityError::UnsupportedVersion(version))?;

        let mut params = params.clone();
        let seed = match params.credential_type() {
            CredentialType::Hd => {
                let fingerprint = Self::resolve_seed(&context, &params)?;
                if params.auto_index() {
                    let nym = context.seeds.next_nym_index(&fingerprint)?;
                    params.set_nym(nym);
                }
                let secret = context
                    .seeds
                    .seed(&fingerprint)
                    .ok_or(StoreError::UnknownSeed(fingerprint))?;
                Some((secret, fingerprint))
            }
            CredentialType::Legacy => None,
        };
        let seed_ref = seed.as_ref().map(|(secret, fingerprint)| SeedRef {
            secret,
            fingerprint: *fingerprint,
        });

        let master = primary::create(&params, seed_ref, MASTER_INDEX, version, prompt)?;
        let source = master
            .source()
            .cloned()
            .ok_or(CredentialError::Missing("source"))?;

        let mut authority = Self {
            context,
            nym_id: source.nym_id(),
            source,
            version,
            index: MASTER_INDEX + 1,
            mode: KeyMode::Private,
            master,
            key_credentials: BTreeMap::new(),
            contact_credentials: BTreeMap::new(),
            verification_credentials: BTreeMap::new(),
            revoked: Vec::new(),
        };
        authority.save(&authority.master);

        authority.add_child_key_credential(&params, prompt)?;
        if let Some(data) = params.contact_data().filter(|data| !data.is_empty()) {
            authority.add_contact_credential(data, prompt)?;
        }
        if let Some(set) = params.verification_set().filter(|set| !set.is_empty()) {
            authority.add_verification_credential(set, prompt)?;
        }

        info!(
            nym_id = %authority.nym_id,
            master_id = %authority.master.id(),
            version,
            "created authority"
        );
        Ok(authority)
    }

    fn resolve_seed(
        context: &CredentialContext,
        params: &Parameters,
    ) -> Result<Identifier, AuthorityError> {
        if let Some(entropy) = params.entropy() {
            return Ok(context.seeds.import_seed(entropy)?);
        }
        if let Some(fingerprint) = params.seed() {
            return Ok(*fingerprint);
        }
        if params.use_default_seed() {
            return Ok(context.seeds.default_seed()?);
        }
        Err(AuthorityError::MissingSeed)
    }

    /// Rebuild an authority for the nym derived from `source`.
    ///
    /// In `Index` mode every credential body, revoked ones included, is
    /// fetched from the context's credential store and a single missing ID
    /// fails the whole load. Every active child must verify against the
    /// master.
    pub fn load(
        context: CredentialContext,
        source: &NymIdSource,
        serialized: &SerializedAuthority,
    ) -> Result<Self, AuthorityError> {
        versions::nym_to_authority(serialized.version)
            .ok_or(AuthorityError::UnsupportedVersion(serialized.version))?;
        let nym_id = source.nym_id();
        if serialized.nym_id != nym_id {
            warn!(expected = %nym_id, found = %serialized.nym_id, "rejected authority for another nym");
            return Err(AuthorityError::NymIdMismatch);
        }
        if serialized.index <= MASTER_INDEX {
            return Err(AuthorityError::Malformed("index does not leave room for the master"));
        }

        let fetch = |id: &Identifier| -> Result<SerializedCredential, AuthorityError> {
            context
                .credentials
                .load_credential(id)
                .ok_or(AuthorityError::MissingCredential(*id))
        };

        let (master, children, revoked) = match serialized.mode {
            AuthorityMode::Index => {
                if serialized.master_credential.is_some() || !serialized.active_children.is_empty()
                {
                    return Err(AuthorityError::Malformed("index mode carries credential bodies"));
                }
                let master = fetch(&serialized.master_id)?;
                let children = serialized
                    .active_child_ids
                    .iter()
                    .map(fetch)
                    .collect::<Result<Vec<_>, _>>()?;
                for id in &serialized.revoked_child_ids {
                    fetch(id)?;
                }
                (master, children, serialized.revoked_child_ids.clone())
            }
            AuthorityMode::Full => {
                if !serialized.active_child_ids.is_empty() {
                    return Err(AuthorityError::Malformed("full mode lists child ids"));
                }
                let master = serialized
                    .master_credential
                    .clone()
                    .ok_or(AuthorityError::Malformed("full mode without a master"))?;
                let revoked = serialized
                    .revoked_child_ids
                    .iter()
                    .copied()
                    .chain(serialized.revoked_children.iter().filter_map(|child| child.id))
                    .collect();
                (master, serialized.active_children.clone(), revoked)
            }
        };

        let master = Credential::from_serialized(&master)?;
        if master.role() != CredentialRole::MasterKey || *master.id() != serialized.master_id {
            return Err(AuthorityError::InvalidMaster);
        }
        if master.source() != Some(source) || master.validate(&master) != CredentialState::Verified
        {
            warn!(master_id = %master.id(), "master credential failed verification");
            return Err(AuthorityError::InvalidMaster);
        }

        let mut authority = Self {
            context,
            source: source.clone(),
            nym_id,
            version: serialized.version,
            index: serialized.index,
            mode: master.mode(),
            master,
            key_credentials: BTreeMap::new(),
            contact_credentials: BTreeMap::new(),
            verification_credentials: BTreeMap::new(),
            revoked,
        };

        for child in &children {
            let child = Credential::from_serialized(child)?;
            if child.validate(&authority.master) != CredentialState::Verified {
                warn!(credential_id = %child.id(), "child credential failed verification");
                return Err(AuthorityError::InvalidChild(*child.id()));
            }
            let id = *child.id();
            let map = match child.role() {
                CredentialRole::ChildKey => &mut authority.key_credentials,
                CredentialRole::Contact => &mut authority.contact_credentials,
                CredentialRole::Verify => &mut authority.verification_credentials,
                CredentialRole::MasterKey => return Err(AuthorityError::InvalidChild(id)),
            };
            if map.insert(id, child).is_some() {
                return Err(AuthorityError::Malformed("duplicate child credential"));
            }
        }

        debug!(
            nym_id = %authority.nym_id,
            children = children.len(),
            "loaded authority"
        );
        Ok(authority)
    }

    fn save(&self, credential: &Credential) {
        if !self
            .context
            .credentials
            .save_credential(&credential.serialize(true))
        {
            warn!(credential_id = %credential.id(), "credential store refused credential");
        }
    }

    // -----------------------------------------------------------------------
    // Adding credentials
    // -----------------------------------------------------------------------

    /// Create a child key credential at the next index.
    ///
    /// The algorithm is not taken from `params`: secp256k1, Ed25519 and RSA
    /// are tried in that order, skipping anything switched off in the
    /// context's [`AlgorithmSupport`], and the first one that works wins.
    /// The index is consumed even if every attempt fails. An HD master whose
    /// seed is missing from the seed store can only get RSA children.
    pub fn add_child_key_credential(
        &mut self,
        params: &Parameters,
        prompt: &PasswordPrompt,
    ) -> Result<Identifier, AuthorityError> {
        let index = self.index;
        self.index = self
            .index
            .checked_add(1)
            .ok_or(AuthorityError::IndexExhausted)?;

        let master_is_hd = self.path().is_some();
        let hd = self.master_hd_context();
        let seed_ref = hd.as_ref().map(|(_, secret, fingerprint)| SeedRef {
            secret,
            fingerprint: *fingerprint,
        });

        for algorithm in ALGORITHM_PREFERENCE {
            if !self.context.support.supports(algorithm) {
                debug!(%algorithm, "algorithm disabled, skipping");
                continue;
            }
            if master_is_hd && hd.is_none() && algorithm != Algorithm::Rsa {
                debug!(%algorithm, "master seed unavailable, skipping");
                continue;
            }
            let child_params = match (algorithm, &hd) {
                (Algorithm::Rsa, _) | (_, None) => {
                    let mut child = Parameters::new(
                        ParameterType::from_algorithm(algorithm),
                        CredentialType::Legacy,
                    );
                    child.set_key_size(params.key_size());
                    child
                }
                (_, Some((path, _, fingerprint))) => {
                    let mut child =
                        Parameters::new(ParameterType::from_algorithm(algorithm), CredentialType::Hd);
                    child.set_seed(*fingerprint);
                    child.set_nym(path.nym().unwrap_or_default());
                    child.set_credset(path.credset().unwrap_or_default());
                    child
                }
            };
            match secondary::create(
                &self.master,
                &child_params,
                seed_ref,
                index,
                self.version,
                prompt,
            ) {
                Ok(credential) => {
                    let id = *credential.id();
                    self.save(&credential);
                    self.key_credentials.insert(id, credential);
                    return Ok(id);
                }
                Err(err) => {
                    debug!(%algorithm, index, error = %err, "child key creation failed, trying next");
                }
            }
        }
        warn!(index, "no algorithm produced a child key credential");
        Err(AuthorityError::NoSupportedAlgorithm)
    }

    /// The master's HD path and the seed behind it. `None` for a legacy
    /// master, or an HD master whose seed is not in the seed store.
    fn master_hd_context(&self) -> Option<(HdPath, Secret, Identifier)> {
        let path = self.path().cloned()?;
        let fingerprint = *path.root();
        match self.context.seeds.seed(&fingerprint) {
            Some(secret) => Some((path, secret, fingerprint)),
            None => {
                debug!(seed = %fingerprint, "master seed not in store, only RSA children possible");
                None
            }
        }
    }

    /// Publish `data` in a contact credential. Bumps the authority version
    /// if the data format needs a newer one.
    pub fn add_contact_credential(
        &mut self,
        data: &ContactData,
        prompt: &PasswordPrompt,
    ) -> Result<Identifier, AuthorityError> {
        let required = versions::contact_data_to_authority(data.version).ok_or(
            AuthorityError::UnsupportedDataVersion {
                kind: "contact data",
                version: data.version,
            },
        )?;
        let version = self.version.max(required);
        let credential = contact::create(&self.master, data, version, prompt)?;
        let id = *credential.id();
        if version != self.version {
            info!(from = self.version, to = version, "authority version upgraded for contact data");
            self.version = version;
        }
        self.save(&credential);
        self.contact_credentials.insert(id, credential);
        Ok(id)
    }

    /// Publish `set` in a verification credential. Bumps the authority
    /// version if the set format needs a newer one.
    pub fn add_verification_credential(
        &mut self,
        set: &VerificationSet,
        prompt: &PasswordPrompt,
    ) -> Result<Identifier, AuthorityError> {
        let required = versions::verification_set_to_authority(set.version).ok_or(
            AuthorityError::UnsupportedDataVersion {
                kind: "verification set",
                version: set.version,
            },
        )?;
        let version = self.version.max(required);
        let credential = verification::create(&self.master, set, version, prompt)?;
        let id = *credential.id();
        if version != self.version {
            info!(from = self.version, to = version, "authority version upgraded for verification set");
            self.version = version;
        }
        self.save(&credential);
        self.verification_credentials.insert(id, credential);
        Ok(id)
    }

    pub fn set_algorithm_support(&mut self, support: AlgorithmSupport) {
        self.context.support = support;
    }

    // -----------------------------------------------------------------------
    // Signing and verification
    // -----------------------------------------------------------------------

    /// Sign `message` in `role` with the `key` keypair.
    ///
    /// Credential signatures come from the master. Source and private
    /// credential signatures are never made through an authority. Everything
    /// else is signed by the first child key credential able to.
    pub fn sign(
        &self,
        message: &[u8],
        role: SignatureRole,
        key: Role,
        prompt: &PasswordPrompt,
    ) -> Result<Signature, AuthorityError> {
        match role {
            SignatureRole::PublicCredential => {
                if !self.master.has_capability(Capability::SignChildCredential) {
                    return Err(AuthorityError::NoSigner);
                }
                Ok(self.master.sign(message, role, key, prompt)?)
            }
            SignatureRole::NymIdSource | SignatureRole::PrivateCredential => {
                Err(AuthorityError::RoleNotPermitted(role))
            }
            _ => {
                for credential in self
                    .key_credentials
                    .values()
                    .filter(|credential| credential.has_capability(Capability::SignMessage))
                {
                    match credential.sign(message, role, key, prompt) {
                        Ok(signature) => return Ok(signature),
                        Err(err) => {
                            debug!(credential_id = %credential.id(), error = %err, "signer failed, trying next");
                        }
                    }
                }
                Err(AuthorityError::NoSigner)
            }
        }
    }

    /// Check a signature made by one of this authority's child key
    /// credentials. Signatures claiming to come from the master are always
    /// rejected: the master only signs credentials.
    pub fn verify(&self, message: &[u8], signature: &Signature, key: Role) -> bool {
        if signature.credential_id == *self.master.id() {
            debug!("rejected message signature attributed to the master");
            return false;
        }
        match self.key_credentials.get(&signature.credential_id) {
            Some(credential) => credential.verify_signature(message, signature, key),
            None => false,
        }
    }

    /// Re-check the whole tree. Every credential is checked and every
    /// failure is logged; the result is `true` only if all of them pass.
    pub fn verify_internally(&self) -> bool {
        let mut ok = true;
        if self.master.validate(&self.master) != CredentialState::Verified {
            warn!(master_id = %self.master.id(), "master credential failed verification");
            ok = false;
        }
        if self.master.source() != Some(&self.source) {
            warn!(master_id = %self.master.id(), "master credential carries a different source");
            ok = false;
        }
        for credential in self.active_credentials() {
            if credential.validate(&self.master) != CredentialState::Verified {
                warn!(credential_id = %credential.id(), role = ?credential.role(), "child credential failed verification");
                ok = false;
            }
        }
        ok
    }

    /// Try to unlock `key`, a symmetric key addressed to this nym.
    ///
    /// The sender publishes an ephemeral `dh_public` key and a 32-bit `tag`
    /// computed from it, our encryption key and our master ID. Each child
    /// key credential that can decrypt recomputes the tag from its side; on
    /// a match it derives the session password and tries it on `key`.
    pub fn unlock(
        &self,
        dh_public: &AsymmetricKey,
        tag: u32,
        algorithm: Algorithm,
        key: &mut SymmetricKey,
        prompt: &PasswordPrompt,
    ) -> bool {
        let domain = *self.master.id();
        for credential in self
            .key_credentials
            .values()
            .filter(|credential| credential.has_capability(Capability::EncryptMessage))
        {
            let Some(private) = credential
                .keypair(Role::Encrypt)
                .and_then(|pair| pair.private_key().ok())
            else {
                continue;
            };
            if private.algorithm() != algorithm {
                continue;
            }
            match private.calculate_tag(dh_public, &domain, prompt) {
                Ok(candidate) if candidate == tag => {}
                Ok(_) => continue,
                Err(err) => {
                    debug!(credential_id = %credential.id(), error = %err, "tag calculation failed");
                    continue;
                }
            }
            debug!(credential_id = %credential.id(), "tag matched");
            let password = match private.calculate_session_password(dh_public, prompt) {
                Ok(password) => password,
                Err(err) => {
                    debug!(credential_id = %credential.id(), error = %err, "session password failed");
                    continue;
                }
            };
            if key.unlock(&password) {
                return true;
            }
        }
        false
    }

    /// The master ID (the tag domain) and the distinct encryption
    /// algorithms a peer can pick from.
    pub fn encryption_targets(&self) -> (Identifier, Vec<Algorithm>) {
        let mut algorithms = Vec::new();
        for credential in self.key_credentials.values() {
            if let Some(algorithm) = credential.key_credential().map(|keys| keys.algorithm()) {
                if !algorithms.contains(&algorithm) {
                    algorithms.push(algorithm);
                }
            }
        }
        (*self.master.id(), algorithms)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Children are listed key credentials first, then contact, then
    /// verification. Revoked credentials are listed by ID in both modes.
    pub fn serialize(&self, mode: AuthorityMode) -> SerializedAuthority {
        self.serialize_with(mode, self.mode == KeyMode::Private)
    }

    /// Full form with every private key left out. This is what peers get.
    pub fn serialize_public(&self) -> SerializedAuthority {
        self.serialize_with(AuthorityMode::Full, false)
    }

    fn serialize_with(&self, mode: AuthorityMode, include_private: bool) -> SerializedAuthority {
        let (master_credential, active_child_ids, active_children) = match mode {
            AuthorityMode::Index => (
                None,
                self.active_credentials().map(|c| *c.id()).collect(),
                Vec::new(),
            ),
            AuthorityMode::Full => (
                Some(self.master.serialize(include_private)),
                Vec::new(),
                self.active_credentials()
                    .map(|c| c.serialize(include_private))
                    .collect(),
            ),
        };
        SerializedAuthority {
            version: self.version,
            index: self.index,
            mode,
            nym_id: self.nym_id,
            master_id: *self.master.id(),
            master_credential,
            active_child_ids,
            active_children,
            revoked_child_ids: self.revoked.clone(),
            revoked_children: Vec::new(),
        }
    }

    fn active_credentials(&self) -> impl Iterator<Item = &Credential> {
        self.key_credentials
            .values()
            .chain(self.contact_credentials.values())
            .chain(self.verification_credentials.values())
    }

    // -----------------------------------------------------------------------
    // Revocation
    // -----------------------------------------------------------------------

    /// Revoke every contact credential. Only the IDs are kept.
    pub fn revoke_contact_credentials(&mut self) -> Vec<Identifier> {
        let ids: Vec<Identifier> = std::mem::take(&mut self.contact_credentials)
            .into_keys()
            .collect();
        self.revoked.extend(&ids);
        info!(count = ids.len(), "revoked contact credentials");
        ids
    }

    /// Revoke every verification credential. Only the IDs are kept.
    pub fn revoke_verification_credentials(&mut self) -> Vec<Identifier> {
        let ids: Vec<Identifier> = std::mem::take(&mut self.verification_credentials)
            .into_keys()
            .collect();
        self.revoked.extend(&ids);
        info!(count = ids.len(), "revoked verification credentials");
        ids
    }

    /// Revoke one child key credential. Its index stays burned.
    pub fn revoke_child_key_credential(&mut self, id: &Identifier) -> bool {
        if self.key_credentials.remove(id).is_none() {
            return false;
        }
        self.revoked.push(*id);
        info!(credential_id = %id, "revoked child key credential");
        true
    }

    // -----------------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------------

    /// Sign a judgement on someone else's claim.
    pub fn sign_verification(
        &self,
        claim_id: Identifier,
        valid: bool,
        prompt: &PasswordPrompt,
    ) -> Result<VerificationItem, AuthorityError> {
        let mut item = VerificationItem::new(claim_id, valid);
        let signature = self.sign(
            &item.signing_bytes(),
            SignatureRole::Verification,
            Role::Sign,
            prompt,
        )?;
        item.signature = Some(signature);
        Ok(item)
    }

    /// Was `item` signed by this authority?
    pub fn verify_verification(&self, item: &VerificationItem) -> bool {
        match &item.signature {
            Some(signature) if signature.role == SignatureRole::Verification => {
                self.verify(&item.signing_bytes(), signature, Role::Sign)
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn nym_id(&self) -> &Identifier {
        &self.nym_id
    }

    pub fn master_id(&self) -> &Identifier {
        self.master.id()
    }

    pub fn master(&self) -> &Credential {
        &self.master
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The next child credential index.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn source(&self) -> &NymIdSource {
        &self.source
    }

    pub fn context(&self) -> &CredentialContext {
        &self.context
    }

    /// Any credential in the tree, the master included.
    pub fn get_credential(&self, id: &Identifier) -> Option<&Credential> {
        if id == self.master.id() {
            return Some(&self.master);
        }
        self.key_credentials
            .get(id)
            .or_else(|| self.contact_credentials.get(id))
            .or_else(|| self.verification_credentials.get(id))
    }

    pub fn child_ids(&self) -> Vec<Identifier> {
        self.active_credentials().map(|c| *c.id()).collect()
    }

    pub fn key_credential_ids(&self) -> Vec<Identifier> {
        self.key_credentials.keys().copied().collect()
    }

    pub fn revoked_ids(&self) -> &[Identifier] {
        &self.revoked
    }

    /// Contact data of the first contact credential. Further contact
    /// credentials are kept but not merged.
    pub fn get_contact_data(&self) -> Option<&ContactData> {
        self.contact_credentials
            .values()
            .next()
            .and_then(|c| c.contact_data())
    }

    /// Verification set of the first verification credential.
    pub fn get_verification_set(&self) -> Option<&VerificationSet> {
        self.verification_credentials
            .values()
            .next()
            .and_then(|c| c.verification_set())
    }

    /// Candidate public keys for `signature`, from the child key credential
    /// it names. See [`HasKeys::get_public_keys_by_signature`] for `hint`.
    pub fn get_public_keys_by_signature<'a>(
        &'a self,
        out: &mut Vec<&'a AsymmetricKey>,
        signature: &Signature,
        hint: char,
    ) -> usize {
        self.key_credentials
            .get(&signature.credential_id)
            .map(|credential| credential.get_public_keys_by_signature(out, signature, hint))
            .unwrap_or(0)
    }

    /// Public `role` key of the first child key credential.
    pub fn get_public_key(&self, role: Role) -> Option<&AsymmetricKey> {
        self.key_credentials
            .values()
            .find_map(|credential| credential.public_key(role))
    }

    /// HD path of the master signing key, if the master is HD.
    pub fn path(&self) -> Option<&HdPath> {
        self.master
            .public_key(Role::Sign)
            .and_then(|key| key.path())
    }

    /// Static X25519 transport keypair, derived from the master's
    /// authentication key.
    pub fn transport_key(
        &self,
        prompt: &PasswordPrompt,
    ) -> Result<(X25519Public, StaticSecret), AuthorityError> {
        let keypair = self
            .master
            .keypair(Role::Auth)
            .ok_or(CredentialError::NoKeys)?;
        Ok(keypair.get_transport_key(prompt)?)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.master.has_capability(capability)
            || self
                .key_credentials
                .values()
                .any(|credential| credential.has_capability(capability))
    }
}
