//! # Version Tables
//!
//! Fixed maps from an authority version to the versions of everything it
//! contains, and back. They decide what bytes go on the wire, so changing a
//! row breaks compatibility with every peer still on the old row. Add rows;
//! never edit them.

/// Authority version -> contact credential version.
pub const AUTHORITY_TO_CONTACT: &[(u32, u32)] = &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

/// Authority version -> master credential version.
pub const AUTHORITY_TO_PRIMARY: &[(u32, u32)] = &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

/// Authority version -> child key credential version.
pub const AUTHORITY_TO_SECONDARY: &[(u32, u32)] =
    &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

/// Authority version -> verification credential version.
pub const AUTHORITY_TO_VERIFICATION: &[(u32, u32)] =
    &[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1)];

/// Nym version -> authority version.
pub const NYM_TO_AUTHORITY: &[(u32, u32)] = &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

/// Key credential version -> key credential subversion.
pub const KEY_CREDENTIAL_SUBVERSION: &[(u32, u32)] =
    &[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 2)];

/// Key credential subversion -> asymmetric key version.
pub const SUBVERSION_TO_KEY_VERSION: &[(u32, u32)] = &[(1, 1), (2, 2)];

/// Contact data version -> minimum authority version that can carry it.
pub const CONTACT_DATA_TO_AUTHORITY: &[(u32, u32)] =
    &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];

/// Verification set version -> minimum authority version that can carry it.
pub const VERIFICATION_SET_TO_AUTHORITY: &[(u32, u32)] = &[(1, 1)];

fn lookup(table: &[(u32, u32)], version: u32) -> Option<u32> {
    table
        .iter()
        .find(|(from, _)| *from == version)
        .map(|(_, to)| *to)
}

pub fn authority_to_contact(version: u32) -> Option<u32> {
    lookup(AUTHORITY_TO_CONTACT, version)
}

pub fn authority_to_primary(version: u32) -> Option<u32> {
    lookup(AUTHORITY_TO_PRIMARY, version)
}

pub fn authority_to_secondary(version: u32) -> Option<u32> {
    lookup(AUTHORITY_TO_SECONDARY, version)
}

pub fn authority_to_verification(version: u32) -> Option<u32> {
    lookup(AUTHORITY_TO_VERIFICATION, version)
}

pub fn nym_to_authority(version: u32) -> Option<u32> {
    lookup(NYM_TO_AUTHORITY, version)
}

pub fn key_credential_subversion(version: u32) -> Option<u32> {
    lookup(KEY_CREDENTIAL_SUBVERSION, version)
}

pub fn subversion_to_key_version(subversion: u32) -> Option<u32> {
    lookup(SUBVERSION_TO_KEY_VERSION, subversion)
}

pub fn contact_data_to_authority(version: u32) -> Option<u32> {
    lookup(CONTACT_DATA_TO_AUTHORITY, version)
}

pub fn verification_set_to_authority(version: u32) -> Option<u32> {
    lookup(VERIFICATION_SET_TO_AUTHORITY, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AUTHORITY_VERSION;

    #[test]
    fn test_every_authority_version_maps_everywhere() {
        for version in 1..=AUTHORITY_VERSION {
            assert!(authority_to_contact(version).is_some());
            assert!(authority_to_primary(version).is_some());
            assert!(authority_to_secondary(version).is_some());
            assert!(authority_to_verification(version).is_some());
            let key = authority_to_secondary(version).unwrap();
            let sub = key_credential_subversion(key).unwrap();
            assert!(subversion_to_key_version(sub).is_some());
        }
    }

    #[test]
    fn test_known_rows() {
        assert_eq!(authority_to_contact(6), Some(6));
        assert_eq!(authority_to_verification(6), Some(1));
        assert_eq!(key_credential_subversion(5), Some(1));
        assert_eq!(key_credential_subversion(6), Some(2));
        assert_eq!(subversion_to_key_version(2), Some(2));
        assert_eq!(nym_to_authority(6), Some(6));
        assert_eq!(contact_data_to_authority(6), Some(6));
        assert_eq!(verification_set_to_authority(1), Some(1));
    }

    #[test]
    fn test_unknown_versions() {
        assert_eq!(authority_to_primary(0), None);
        assert_eq!(authority_to_primary(AUTHORITY_VERSION + 1), None);
        assert_eq!(subversion_to_key_version(3), None);
    }
}
