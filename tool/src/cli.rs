//! # CLI Interface
//!
//! Defines the command-line argument structure for `nym-tool` using
//! `clap` derive. Supports four subcommands: `generate`, `verify`,
//! `inspect`, and `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Nym authority tool.
///
/// Creates new nym authorities and checks or summarizes existing ones.
/// Authorities travel as JSON bundles holding the NymID source and the
/// serialized authority in full mode.
#[derive(Parser, Debug)]
#[command(
    name = "nym-tool",
    about = "Generate, verify and inspect nym authorities",
    version,
    propagate_version = true
)]
pub struct NymToolCli {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "NYM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl NymToolCli {
    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str_lossy(&self.log_format)
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new authority and write it to a bundle.
    Generate(GenerateArgs),
    /// Load a bundle and re-check every signature in it.
    Verify(BundleArgs),
    /// Print a summary of a bundle.
    Inspect(BundleArgs),
    /// Print version information and exit.
    Version,
}

/// Key algorithm for the master credential.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlgorithmArg {
    Secp256k1,
    Ed25519,
    Rsa,
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Where to write the bundle.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Password protecting the private keys in the bundle.
    ///
    /// **Prefer the environment variable** over the flag; flags end up in
    /// shell history.
    #[arg(long, env = "NYM_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Master key algorithm. RSA implies non-HD keys.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Secp256k1)]
    pub algorithm: AlgorithmArg,

    /// Generate random keys instead of deriving them from a seed.
    #[arg(long)]
    pub legacy: bool,

    /// Hex-encoded seed entropy. A fresh seed is made when omitted.
    #[arg(long, env = "NYM_SEED")]
    pub seed: Option<String>,

    /// Nym index under the seed. Allocated automatically when omitted.
    #[arg(long)]
    pub nym: Option<u32>,

    /// RSA modulus size in bits.
    #[arg(long, default_value_t = 2048)]
    pub key_size: usize,

    /// Authority version to create. `--version` prints the tool version.
    #[arg(long = "authority-version", default_value_t = nym_identity::config::AUTHORITY_VERSION)]
    pub authority_version: u32,

    /// Publish a display name in a contact credential.
    #[arg(long)]
    pub name: Option<String>,

    /// Leave private keys out of the bundle.
    #[arg(long)]
    pub public_only: bool,
}

/// Arguments for subcommands that read a bundle.
#[derive(Parser, Debug)]
pub struct BundleArgs {
    /// Bundle to read.
    #[arg(long, short = 'i')]
    pub input: PathBuf,
}
