//! # CLI Interface
//!
//! Defines the command-line argument structure for `meridian` using `clap`
//! derive. Every command runs offline against a JSON ledger snapshot, so
//! the same inputs always give the same transaction.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meridian wallet operator tool.
///
/// Builds, signs and reviews ledger transactions with the Meridian wallet
/// core, using a JSON snapshot of the ledger in place of a live gateway.
#[derive(Parser, Debug)]
#[command(
    name = "meridian",
    about = "Meridian wallet operator tool",
    version,
    propagate_version = true
)]
pub struct MeridianCli {
    /// Log output format: `pretty` or `json`. Logs go to stderr.
    #[arg(long, global = true, env = "MERIDIAN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Builder configuration file (JSON). Missing fields take their defaults.
    #[arg(long, short = 'c', global = true, env = "MERIDIAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new account keypair.
    Keygen(KeygenArgs),
    /// Print the base fee the builder would pick right now.
    Fee(FeeArgs),
    /// Build (and optionally sign) a payment transaction.
    Build(BuildArgs),
    /// Review a transaction before signing it.
    Review(ReviewArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Write the hex-encoded secret key to this file (mode 0600 on Unix).
    /// Without it the secret is printed.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FeeArgs {
    /// Ledger snapshot (JSON).
    #[arg(long, short = 'l', env = "MERIDIAN_LEDGER")]
    pub ledger: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Ledger snapshot (JSON).
    #[arg(long, short = 'l', env = "MERIDIAN_LEDGER")]
    pub ledger: PathBuf,

    /// Source account id.
    #[arg(long)]
    pub from: String,

    /// Destination account id.
    #[arg(long)]
    pub to: String,

    /// Amount in units, up to 7 decimals (e.g. `12.5`).
    #[arg(long)]
    pub amount: String,

    /// `native` or `CODE:ISSUER`.
    #[arg(long, default_value = "native")]
    pub asset: String,

    /// Text memo, at most 28 bytes.
    #[arg(long)]
    pub memo: Option<String>,

    /// Build for the test network.
    #[arg(long)]
    pub testnet: bool,

    /// File holding the hex-encoded secret key to sign with.
    #[arg(long, env = "MERIDIAN_SIGNING_KEY")]
    pub sign_with: Option<PathBuf>,

    /// Password of the signing account, if it has one.
    #[arg(long, env = "MERIDIAN_PASSWORD", requires = "sign_with")]
    pub password: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Transaction to review (JSON, as printed by `build`).
    #[arg(long)]
    pub tx: PathBuf,

    /// Ledger snapshot (JSON).
    #[arg(long, short = 'l', env = "MERIDIAN_LEDGER")]
    pub ledger: PathBuf,

    /// Locally managed account ids. Repeat for several.
    #[arg(long = "local", required = true)]
    pub local: Vec<String>,

    /// Verify signatures cryptographically instead of trusting hints.
    #[arg(long)]
    pub verified: bool,
}
