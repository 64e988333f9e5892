//! Contact credentials: a nym's claims about itself, signed by its master.

use tracing::info;

use super::{Credential, CredentialError, CredentialKind, CredentialRole, KeyMode};
use crate::authority::versions;
use crate::claims::ContactData;
use crate::crypto::PasswordPrompt;
use crate::parameters::CredentialType;

/// Wrap `data` in a credential signed by `master`.
pub fn create(
    master: &Credential,
    data: &ContactData,
    authority_version: u32,
    prompt: &PasswordPrompt,
) -> Result<Credential, CredentialError> {
    if master.role() != CredentialRole::MasterKey {
        return Err(CredentialError::RoleMismatch);
    }
    let version = versions::authority_to_contact(authority_version)
        .ok_or(CredentialError::Missing("contact version"))?;

    let mut credential = Credential::unsigned(
        version,
        CredentialType::Legacy,
        KeyMode::Public,
        *master.nym_id(),
        *master.id(),
        CredentialKind::Contact(data.clone()),
    );
    credential.add_master_signature(master, prompt)?;

    info!(credential_id = %credential.id(), items = data.items.len(), "created contact credential");
    Ok(credential)
}
