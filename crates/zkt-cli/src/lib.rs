//! # zkt-cli — Confidential Token CLI
//!
//! ## Subcommands
//!
//! - `zkt keygen`: generate a Paillier key pair and print the public key.
//! - `zkt demo`: register two accounts, mint, transfer, and print the
//!   decrypted balances, all in-process against the mock proof system.
//!
//! ```bash
//! zkt keygen --bits 96
//! ZKT_KEY_BITS=80 zkt demo --mint 1000 --transfer 50
//! zkt --config zkt.yaml demo --json
//! ```
//!
//! Handlers take parsed arguments and return an exit code; domain logic
//! lives in the library crates.

pub mod demo;
pub mod keygen;

use std::path::Path;

use anyhow::{Context, Result};
use zkt_protocol::ProtocolConfig;

/// Load a YAML config file, or defaults, then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ProtocolConfig> {
    match path {
        Some(p) => ProtocolConfig::load(p)
            .with_context(|| format!("loading configuration from {}", p.display())),
        None => ProtocolConfig::from_env().context("reading configuration from environment"),
    }
}
