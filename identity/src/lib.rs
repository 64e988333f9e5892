// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Nym Identity — Credential Core
//!
//! A nym is a pseudonym with teeth: a persistent identity that can sign,
//! encrypt, and prove it is still the same entity tomorrow, without ever
//! telling anyone who is behind it.
//!
//! This crate is the part of the stack that decides who gets to speak for a
//! nym. An [`Authority`](authority::Authority) owns one master credential and
//! a set of child credentials the master has delegated to. Everything else
//! (messaging, wallets, storage engines) sits on top and talks to the core
//! through sign / verify / serialize.
//!
//! ## Architecture
//!
//! - **crypto** — Secrets, password prompts, hashing, AES-GCM wrapping.
//! - **keys** — RSA, secp256k1, and Ed25519 keys, HD derivation, keypairs.
//! - **parameters** — How to create (or re-create) a credential.
//! - **source** — The public key a NymID is derived from.
//! - **credential** — Master, child key, contact, and verification credentials.
//! - **authority** — The tree of delegated signing power for one nym.
//! - **store** — Collaborator traits for credential and seed persistence.
//! - **proto** — Serialized forms. The bytes that get hashed and signed.
//! - **config** — Protocol constants and algorithm switches.
//!
//! ## Design Philosophy
//!
//! 1. Determinism is a feature. Same seed, same path, same key. Always.
//! 2. Private material stays encrypted until a `PasswordPrompt` says otherwise.
//! 3. Construction is all-or-nothing. There is no half-built Authority.
//! 4. Version tables are wire compatibility. Don't touch them casually.

pub mod authority;
pub mod claims;
pub mod config;
pub mod credential;
pub mod crypto;
pub mod identifier;
pub mod keys;
pub mod parameters;
pub mod proto;
pub mod signature;
pub mod source;
pub mod store;

pub use authority::{Authority, AuthorityError};
pub use identifier::Identifier;
pub use parameters::Parameters;
