//! # Cryptographic Primitives
//!
//! Everything below the key layer: secure byte containers, password
//! prompts, hashing, and the AES-GCM wrapping that keeps private keys
//! encrypted at rest.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **BLAKE3** for identifiers and key derivation — fast and domain-separable.
//! - **SHA-256 / SHA-512 / RIPEMD-160** for signatures and HD derivation,
//!   because BIP-32 said so in 2012 and the world agreed.
//! - **HMAC** for BIP-32 node derivation and session tags.
//! - **AES-256-GCM** for anything that needs to stay secret.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. The only thing this module adds is the discipline of
//! never letting plaintext key material escape a `Secret`.

pub mod encryption;
pub mod hash;
pub mod password;
pub mod secret;
pub mod symmetric;

pub use encryption::{decrypt, encrypt, EncryptedSecret, EncryptionError};
pub use hash::{blake3_hash, domain_separated_hash, hash160, sha256};
pub use password::PasswordPrompt;
pub use secret::{Secret, SecretError, SecretMode};
pub use symmetric::SymmetricKey;
