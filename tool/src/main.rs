// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Nym Tool
//!
//! Entry point for the `nym-tool` binary. Parses CLI arguments, initializes
//! logging, and runs one of four subcommands:
//!
//! - `generate` — create a new authority and write it to a JSON bundle
//! - `verify`   — reload a bundle and re-check every signature
//! - `inspect`  — print a human-readable summary of a bundle
//! - `version`  — print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

use nym_identity::authority::Authority;
use nym_identity::claims::{ContactData, ContactItem};
use nym_identity::credential::{Credential, HasKeys};
use nym_identity::crypto::{PasswordPrompt, Secret};
use nym_identity::keys::{Algorithm, Role};
use nym_identity::parameters::{CredentialType, ParameterType, Parameters};
use nym_identity::proto::{AuthorityMode, SerializedAuthority, SerializedNymIdSource};
use nym_identity::source::NymIdSource;
use nym_identity::store::CredentialContext;

use cli::{AlgorithmArg, BundleArgs, Commands, GenerateArgs, NymToolCli};

/// What `generate` writes and the other subcommands read.
#[derive(Debug, Serialize, Deserialize)]
struct Bundle {
    created_at: DateTime<Utc>,
    source: SerializedNymIdSource,
    authority: SerializedAuthority,
}

fn main() -> Result<()> {
    let cli = NymToolCli::parse();
    logging::init_logging(cli.log_format());

    match cli.command {
        Commands::Generate(args) => generate(&args),
        Commands::Verify(args) => verify(&args),
        Commands::Inspect(args) => inspect(&args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Creates an authority in throwaway in-memory stores and writes it out.
fn generate(args: &GenerateArgs) -> Result<()> {
    let algorithm = match args.algorithm {
        AlgorithmArg::Secp256k1 => Algorithm::Secp256k1,
        AlgorithmArg::Ed25519 => Algorithm::Ed25519,
        AlgorithmArg::Rsa => Algorithm::Rsa,
    };
    let credential_type = if args.legacy || algorithm == Algorithm::Rsa {
        CredentialType::Legacy
    } else {
        CredentialType::Hd
    };

    let mut params = Parameters::new(ParameterType::from_algorithm(algorithm), credential_type);
    params.set_key_size(args.key_size);
    if let Some(seed) = &args.seed {
        let entropy = hex::decode(seed.trim()).context("seed is not valid hex")?;
        params.set_entropy(Secret::from_bytes(&entropy));
    }
    if let Some(nym) = args.nym {
        params.set_nym(nym);
    }
    if let Some(name) = &args.name {
        params.set_contact_data(ContactData::new(vec![ContactItem::new(
            "identifier",
            "name",
            name.as_str(),
        )]));
    }

    let prompt = PasswordPrompt::with_password("generate", Secret::from_text(&args.password));
    let authority = Authority::new(
        CredentialContext::in_memory(),
        &params,
        args.authority_version,
        &prompt,
    )
    .context("failed to create authority")?;

    let bundle = Bundle {
        created_at: Utc::now(),
        source: authority.source().serialize(),
        authority: if args.public_only {
            authority.serialize_public()
        } else {
            authority.serialize(AuthorityMode::Full)
        },
    };
    let json = serde_json::to_string_pretty(&bundle)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("failed to write bundle to {}", args.out.display()))?;

    tracing::info!(
        nym_id = %authority.nym_id(),
        out = %args.out.display(),
        "authority written"
    );
    println!("NymID     : {}", authority.nym_id());
    println!("Master ID : {}", authority.master_id());
    println!("Bundle    : {}", args.out.display());
    Ok(())
}

fn load(path: &Path) -> Result<(Bundle, Authority)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bundle from {}", path.display()))?;
    let bundle: Bundle = serde_json::from_str(&json).context("bundle is not valid JSON")?;
    let source = NymIdSource::from_serialized(&bundle.source).context("invalid NymID source")?;
    let authority = Authority::load(CredentialContext::in_memory(), &source, &bundle.authority)
        .context("failed to load authority")?;
    Ok((bundle, authority))
}

fn verify(args: &BundleArgs) -> Result<()> {
    let (_, authority) = load(&args.input)?;
    if !authority.verify_internally() {
        bail!("authority {} failed verification", authority.nym_id());
    }
    println!("OK {}", authority.nym_id());
    Ok(())
}

fn inspect(args: &BundleArgs) -> Result<()> {
    let (bundle, authority) = load(&args.input)?;
    println!("NymID      : {}", authority.nym_id());
    println!("Created    : {}", bundle.created_at.to_rfc3339());
    println!("Version    : {}", authority.version());
    println!("Mode       : {:?}", authority.mode());
    println!("Next index : {}", authority.index());
    println!("Master     : {}", authority.master_id());
    if let Some(path) = authority.path() {
        println!("HD path    : {path}");
    }
    if let Some(key) = authority.master().public_key(Role::Sign) {
        println!("Sign key   : {} {}", key.algorithm(), hex::encode(key.public_key()));
    }
    for id in authority.child_ids() {
        if let Some(credential) = authority.get_credential(&id) {
            println!("  {:<10} {} {}", format!("{:?}", credential.role()), id, describe(credential));
        }
    }
    for id in authority.revoked_ids() {
        println!("  {:<10} {}", "Revoked", id);
    }
    let (_, algorithms) = authority.encryption_targets();
    let algorithms: Vec<String> = algorithms.iter().map(ToString::to_string).collect();
    println!("Encrypt to : {}", algorithms.join(", "));
    Ok(())
}

fn describe(credential: &Credential) -> String {
    if let Some(key) = credential.public_key(Role::Sign) {
        return key.algorithm().to_string();
    }
    if let Some(data) = credential.contact_data() {
        return format!("{} item(s)", data.items.len());
    }
    if let Some(set) = credential.verification_set() {
        return format!("{} verification(s)", set.items.len());
    }
    String::new()
}

/// Prints version information to stdout.
fn print_version() {
    println!("nym-tool  {}", env!("CARGO_PKG_VERSION"));
    println!("authority {}", nym_identity::config::AUTHORITY_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(out: &Path) -> GenerateArgs {
        GenerateArgs {
            out: out.to_path_buf(),
            password: "pw".to_string(),
            algorithm: AlgorithmArg::Secp256k1,
            legacy: false,
            seed: Some(hex::encode([3u8; 32])),
            nym: None,
            key_size: 2048,
            authority_version: nym_identity::config::AUTHORITY_VERSION,
            name: Some("Alice".to_string()),
            public_only: false,
        }
    }

    #[test]
    fn test_generate_verify_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("alice.json");
        generate(&generate_args(&out)).unwrap();

        let input = BundleArgs { input: out.clone() };
        verify(&input).unwrap();
        inspect(&input).unwrap();

        let (bundle, authority) = load(&out).unwrap();
        assert_eq!(bundle.authority.mode, AuthorityMode::Full);
        assert!(authority.get_contact_data().is_some());
    }

    #[test]
    fn test_public_only_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public.json");
        let mut args = generate_args(&out);
        args.public_only = true;
        generate(&args).unwrap();

        let json = std::fs::read_to_string(&out).unwrap();
        assert!(!json.contains("\"private_credential\": {"));
        verify(&BundleArgs { input: out }).unwrap();
    }

    #[test]
    fn test_tampered_bundle_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tampered.json");
        generate(&generate_args(&out)).unwrap();

        let json = std::fs::read_to_string(&out).unwrap();
        let mut bundle: Bundle = serde_json::from_str(&json).unwrap();
        bundle.authority.version = 42;
        std::fs::write(&out, serde_json::to_string(&bundle).unwrap()).unwrap();
        assert!(verify(&BundleArgs { input: out }).is_err());
    }

    #[test]
    fn test_bad_seed_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = generate_args(&dir.path().join("x.json"));
        args.seed = Some("not hex".to_string());
        assert!(generate(&args).is_err());
    }
}
