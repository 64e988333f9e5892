//! # Claims
//!
//! The payloads of contact and verification credentials. A [`ContactData`]
//! is what a nym says about itself ("my email is ..."); a
//! [`VerificationSet`] is what a nym says about *other* nyms' claims
//! ("I checked, that email is real").
//!
//! Both are versioned separately from the credentials that carry them. A
//! newer payload version can force the owning authority to a newer version
//! too; see [`authority::versions`](crate::authority::versions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CONTACT_DATA_VERSION, VERIFICATION_SET_VERSION};
use crate::identifier::Identifier;
use crate::proto::canonical_bytes;
use crate::signature::Signature;

/// One claim a nym makes about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactItem {
    pub section: String,
    pub item_type: String,
    pub value: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub primary: bool,
    pub active: bool,
}

impl ContactItem {
    pub fn new(
        section: impl Into<String>,
        item_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            item_type: item_type.into(),
            value: value.into(),
            start: None,
            end: None,
            primary: false,
            active: true,
        }
    }

    /// Identifier of this claim when made by `nym_id`. Verifications point
    /// at claims by this ID.
    pub fn claim_id(&self, nym_id: &Identifier) -> Identifier {
        Identifier::hash(&canonical_bytes(&(nym_id, &self.section, &self.item_type, &self.value)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactData {
    pub version: u32,
    pub items: Vec<ContactItem>,
}

impl ContactData {
    pub fn new(items: Vec<ContactItem>) -> Self {
        Self {
            version: CONTACT_DATA_VERSION,
            items,
        }
    }

    pub fn with_version(version: u32, items: Vec<ContactItem>) -> Self {
        Self { version, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A judgement on someone else's claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationItem {
    pub claim_id: Identifier,
    pub valid: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Made by the verifying nym. `None` while the item is being signed.
    pub signature: Option<Signature>,
}

impl VerificationItem {
    pub fn new(claim_id: Identifier, valid: bool) -> Self {
        Self {
            claim_id,
            valid,
            start: None,
            end: None,
            signature: None,
        }
    }

    /// The bytes the signature covers: everything except the signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let unsigned = Self {
            signature: None,
            ..self.clone()
        };
        canonical_bytes(&unsigned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSet {
    pub version: u32,
    pub items: Vec<VerificationItem>,
}

impl VerificationSet {
    pub fn new(items: Vec<VerificationItem>) -> Self {
        Self {
            version: VERIFICATION_SET_VERSION,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
