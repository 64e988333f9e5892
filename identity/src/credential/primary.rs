//! Master credentials.
//!
//! The master is created once per authority, always at credential index 0,
//! and from then on does exactly one thing: sign other credentials. It never
//! signs messages.

use tracing::info;

use super::key::{KeyCredential, SeedRef};
use super::{Credential, CredentialError, CredentialKind, HasKeys, KeyMode};
use crate::authority::versions;
use crate::crypto::PasswordPrompt;
use crate::identifier::Identifier;
use crate::keys::Role;
use crate::parameters::{Parameters, SourceProofType};
use crate::source::NymIdSource;

/// Credential index every master lives at.
pub const MASTER_INDEX: u32 = 0;

/// Create and sign a master credential for an authority at `authority_version`.
///
/// # Panics
///
/// If `index` is not [`MASTER_INDEX`]. A master anywhere else is a bug in
/// the caller, not a recoverable condition.
pub fn create(
    params: &Parameters,
    seed: Option<SeedRef<'_>>,
    index: u32,
    authority_version: u32,
    prompt: &PasswordPrompt,
) -> Result<Credential, CredentialError> {
    assert_eq!(index, MASTER_INDEX, "master credential must be created at index 0");

    let version = versions::authority_to_primary(authority_version)
        .ok_or(CredentialError::Missing("primary version"))?;
    let subversion = versions::key_credential_subversion(version)
        .ok_or(CredentialError::Missing("key credential subversion"))?;

    let keys = KeyCredential::new(params, seed, index, subversion, prompt)?;
    let source = NymIdSource::new(keys.keypair(Role::Sign))?;
    let nym_id = source.nym_id();
    let proof = params.source_proof_type();

    let mut master = Credential::unsigned(
        version,
        params.credential_type(),
        KeyMode::Private,
        nym_id,
        Identifier::default(),
        CredentialKind::Primary {
            keys,
            source: source.clone(),
            proof,
        },
    );
    master.self_sign(prompt)?;

    if proof == SourceProofType::Signature {
        let signer = master.keypair(Role::Sign).ok_or(CredentialError::NoKeys)?;
        let signature = source.sign(signer, &master.signing_bytes(KeyMode::Public), prompt)?;
        master.push_signature(signature);
    }

    info!(nym_id = %nym_id, master_id = %master.id(), "created master credential");
    Ok(master)
}
