//! Signature metadata: four characters riding along with a signature so a
//! verifier can guess which key made it without trying all of them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Role;
use crate::identifier::Identifier;

/// Key type plus the first base58 character of the NymID, the master
/// credential ID and the child credential ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureMetadata {
    key_type: char,
    nym_id: char,
    master_id: char,
    credential_id: char,
}

impl SignatureMetadata {
    pub fn new(role: Role, nym_id: &Identifier, master_id: &Identifier, credential_id: &Identifier) -> Self {
        Self {
            key_type: role.as_char(),
            nym_id: nym_id.first_char(),
            master_id: master_id.first_char(),
            credential_id: credential_id.first_char(),
        }
    }

    pub fn key_type(&self) -> char {
        self.key_type
    }

    /// The role encoded in the key type, if it is a known one.
    pub fn role(&self) -> Option<Role> {
        Role::from_char(self.key_type)
    }

    pub fn nym_id(&self) -> char {
        self.nym_id
    }

    pub fn master_id(&self) -> char {
        self.master_id
    }

    pub fn credential_id(&self) -> char {
        self.credential_id
    }
}

impl fmt::Display for SignatureMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.key_type, self.nym_id, self.master_id, self.credential_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_uses_first_characters() {
        let nym = Identifier::hash(b"nym");
        let master = Identifier::hash(b"master");
        let child = Identifier::hash(b"child");
        let metadata = SignatureMetadata::new(Role::Sign, &nym, &master, &child);

        assert_eq!(metadata.role(), Some(Role::Sign));
        let rendered = metadata.to_string();
        assert_eq!(rendered.chars().count(), 4);
        assert!(rendered.starts_with('S'));
        assert_eq!(rendered.chars().nth(1), nym.to_base58().chars().next());
        assert_eq!(rendered.chars().nth(3), child.to_base58().chars().next());
    }
}
