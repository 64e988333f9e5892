//! # Password Prompts
//!
//! A `PasswordPrompt` is the capability token threaded through every call
//! that might need to touch private key material. It carries a human reason
//! ("sign child credential") and the password itself.
//!
//! Credential and authority code never looks inside. It forwards the prompt
//! down to the key-wrapping primitive in [`encryption`](super::encryption),
//! which is the only reader of the password.

use std::fmt;

use super::secret::Secret;

/// Reason plus password, passed by reference into key operations.
#[derive(Clone)]
pub struct PasswordPrompt {
    reason: String,
    password: Secret,
}

impl PasswordPrompt {
    /// A prompt with an empty password.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            password: Secret::new(),
        }
    }

    pub fn with_password(reason: impl Into<String>, password: Secret) -> Self {
        Self {
            reason: reason.into(),
            password,
        }
    }

    /// Why the caller wants access. Safe to log.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_password(&mut self, password: Secret) {
        self.password = password;
    }

    /// Same password, different reason.
    pub fn rephrase(&self, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            password: self.password.clone(),
        }
    }

    pub(crate) fn password(&self) -> &Secret {
        &self.password
    }
}

impl fmt::Debug for PasswordPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordPrompt({:?})", self.reason)
    }
}
