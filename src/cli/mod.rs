//! CLI module for scopegate
//!
//! Provides subcommands for working with scoped tokens:
//! - `sign`: issue a token for a subject with granted scopes
//! - `verify`: check a token's signature and time claims
//! - `inspect`: decode a token without verifying it

pub mod inspect;
pub mod sign;
pub mod verify;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::TokenFactory;
use crate::infrastructure::logging;

/// scopegate - Signed bearer tokens with packed per-domain scopes
#[derive(Parser)]
#[command(name = "scopegate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign a new token
    Sign(sign::SignArgs),

    /// Verify a token and print its claims
    Verify(verify::VerifyArgs),

    /// Decode a token without verifying it
    Inspect(inspect::InspectArgs),
}

/// Loads configuration, starts logging and builds the token factory
fn bootstrap() -> anyhow::Result<TokenFactory> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    config
        .build_factory()
        .context("Failed to build token factory")
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
