//! Child key credentials: the keys a nym actually uses.

use tracing::info;

use super::key::{KeyCredential, SeedRef};
use super::{Credential, CredentialError, CredentialKind, CredentialRole, KeyMode};
use crate::authority::versions;
use crate::crypto::PasswordPrompt;
use crate::parameters::Parameters;

/// Create a child key credential at `index`, self-signed and signed by
/// `master`.
pub fn create(
    master: &Credential,
    params: &Parameters,
    seed: Option<SeedRef<'_>>,
    index: u32,
    authority_version: u32,
    prompt: &PasswordPrompt,
) -> Result<Credential, CredentialError> {
    if master.role() != CredentialRole::MasterKey {
        return Err(CredentialError::RoleMismatch);
    }
    let version = versions::authority_to_secondary(authority_version)
        .ok_or(CredentialError::Missing("secondary version"))?;
    let subversion = versions::key_credential_subversion(version)
        .ok_or(CredentialError::Missing("key credential subversion"))?;

    let keys = KeyCredential::new(params, seed, index, subversion, prompt)?;
    let mut credential = Credential::unsigned(
        version,
        params.credential_type(),
        KeyMode::Private,
        *master.nym_id(),
        *master.id(),
        CredentialKind::Secondary(keys),
    );
    credential.self_sign(prompt)?;
    credential.add_master_signature(master, prompt)?;

    info!(
        credential_id = %credential.id(),
        index,
        algorithm = %params.algorithm(),
        "created child key credential"
    );
    Ok(credential)
}
