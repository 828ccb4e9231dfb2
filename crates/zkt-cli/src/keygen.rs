//! # Keygen Subcommand
//!
//! Generates a Paillier key pair and prints the public half as JSON. The
//! private key is not printed.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use zkt_crypto::{KeyPair, PublicKey};
use zkt_protocol::ProtocolConfig;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Modulus size in bits. Defaults to the configured `key_bits`.
    #[arg(long)]
    pub bits: Option<u64>,
}

#[derive(Serialize)]
struct KeygenOutput<'a> {
    bits: u64,
    public_key: &'a PublicKey,
    ledger_form: [String; 3],
}

pub fn run_keygen(args: &KeygenArgs, config: &ProtocolConfig) -> Result<u8> {
    let bits = args.bits.unwrap_or(config.key_bits);
    let checked = ProtocolConfig {
        key_bits: bits,
        ..config.clone()
    };
    checked.validate()?;

    let keys = KeyPair::generate(bits, &mut rand::rngs::OsRng)?;
    let pk = keys.public_key();
    tracing::info!(bits, "generated key pair");

    let output = KeygenOutput {
        bits: pk.bits(),
        public_key: pk,
        ledger_form: pk.components().map(|c| c.to_string()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}
