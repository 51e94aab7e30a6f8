// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Meridian Operator Tool
//!
//! Entry point for the `meridian` binary. Parses CLI arguments, initializes
//! logging, loads the builder configuration and runs one subcommand:
//!
//! - `keygen`  : generate an account keypair
//! - `fee`     : show the base fee the builder would pick
//! - `build`   : build (and optionally sign) a payment
//! - `review`  : threat and signature review of a transaction
//! - `version` : print version information

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::{Commands, MeridianCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MeridianCli::parse();

    logging::init_logging(
        "meridian=info,meridian_wallet=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let config = commands::load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "builder configuration loaded");

    let output = match &cli.command {
        Commands::Keygen(args) => commands::keygen(args)?,
        Commands::Fee(args) => commands::fee(args, &config).await?,
        Commands::Build(args) => commands::build(args, &config).await?,
        Commands::Review(args) => commands::review(args, &config).await?,
        Commands::Version => commands::version(),
    };

    println!("{output}");
    Ok(())
}
