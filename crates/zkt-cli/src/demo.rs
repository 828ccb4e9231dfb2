//! # Demo Subcommand
//!
//! Runs register → register → mint → transfer against an in-process ledger
//! and the mock proof system, then prints what each holder decrypts.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use zkt_core::{Address, Amount};
use zkt_ledger::{ConfidentialLedger, EventRecord};
use zkt_protocol::{ProtocolConfig, ProtocolOrchestrator};
use zkt_zkp::{MockProofSystem, Prover, Verifier};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Amount minted to the first account.
    #[arg(long, default_value_t = 1000)]
    pub mint: u64,

    /// Amount transferred from the first account to the second.
    #[arg(long, default_value_t = 50)]
    pub transfer: u64,

    /// Print the summary and event log as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct DemoSummary {
    pub token: String,
    pub sender: Address,
    pub receiver: Address,
    pub sender_balance: Amount,
    pub receiver_balance: Amount,
    pub events: Vec<EventRecord>,
}

pub fn run_demo(args: &DemoArgs, config: &ProtocolConfig) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let summary = runtime.block_on(demo(args, config.clone()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("token:    {}", summary.token);
        println!("sender:   {}  balance {}", summary.sender, summary.sender_balance);
        println!("receiver: {}  balance {}", summary.receiver, summary.receiver_balance);
        println!("events:   {}", summary.events.len());
    }
    Ok(0)
}

/// The demo flow, separated from printing.
pub async fn demo(args: &DemoArgs, config: ProtocolConfig) -> Result<DemoSummary> {
    let system = Arc::new(MockProofSystem::new());
    let (proving_keys, verifying_keys) = system.setup_all("zkt-demo");
    let ledger = Arc::new(ConfidentialLedger::new(
        Verifier::new(Arc::clone(&system), verifying_keys),
        config.ledger.clone(),
    ));
    let orch = ProtocolOrchestrator::new(
        Prover::new(system, proving_keys),
        Arc::clone(&ledger),
        config,
    )?;

    let sender = orch.generate_holder()?;
    let receiver = orch.generate_holder()?;
    orch.register(&sender).await.context("registering sender")?;
    orch.register(&receiver)
        .await
        .context("registering receiver")?;
    orch.mint(sender.address(), sender.address(), Amount(args.mint))
        .await
        .context("minting")?;
    orch.transfer(&sender, receiver.address(), Amount(args.transfer))
        .await
        .context("transferring")?;

    Ok(DemoSummary {
        token: format!("{} ({})", ledger.name(), ledger.symbol()),
        sender: sender.address(),
        receiver: receiver.address(),
        sender_balance: orch.balance_of(&sender)?,
        receiver_balance: orch.balance_of(&receiver)?,
        events: ledger.events(),
    })
}
