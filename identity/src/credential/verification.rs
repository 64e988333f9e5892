//! Verification credentials: a nym's judgements on other nyms' claims.

use tracing::info;

use super::{Credential, CredentialError, CredentialKind, CredentialRole, KeyMode};
use crate::authority::versions;
use crate::claims::VerificationSet;
use crate::crypto::PasswordPrompt;
use crate::parameters::CredentialType;

/// Wrap `set` in a credential signed by `master`.
pub fn create(
    master: &Credential,
    set: &VerificationSet,
    authority_version: u32,
    prompt: &PasswordPrompt,
) -> Result<Credential, CredentialError> {
    if master.role() != CredentialRole::MasterKey {
        return Err(CredentialError::RoleMismatch);
    }
    let version = versions::authority_to_verification(authority_version)
        .ok_or(CredentialError::Missing("verification version"))?;

    let mut credential = Credential::unsigned(
        version,
        CredentialType::Legacy,
        KeyMode::Public,
        *master.nym_id(),
        *master.id(),
        CredentialKind::Verification(set.clone()),
    );
    credential.add_master_signature(master, prompt)?;

    info!(credential_id = %credential.id(), items = set.items.len(), "created verification credential");
    Ok(credential)
}
