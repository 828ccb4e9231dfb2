//! # Protocol Orchestrator
//!
//! Sequences build inputs → prove → submit for each operation. Proving runs
//! on tokio's blocking pool under [`ProtocolConfig::prove_timeout`]; a
//! proof that misses the deadline is abandoned before anything reaches the
//! ledger, and its [`CancelFlag`] is raised so the backend stops work and
//! erases its scratch files. Dropping an operation's future raises it too.
//!
//! Transfers read the sender's balance ciphertext immediately before
//! building the proof. When the ledger answers `StaleBalance` the transfer
//! is rebuilt from a fresh read, up to `max_stale_retries` times.

use std::sync::Arc;

use rand::rngs::OsRng;
use zkt_core::{Address, Amount};
use zkt_crypto::{Ciphertext, PublicKey};
use zkt_ledger::{
    EventRecord, LedgerClient, LedgerError, LedgerTransaction, StateQuery, StateView,
    TokenMetadata,
};
use zkt_zkp::{CancelFlag, ProofSystem, ProvenStatement, Prover, StatementInputs};

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::holder::AccountHolder;

/// The caller-facing entry point: owns a prover and a ledger client.
pub struct ProtocolOrchestrator<P: ProofSystem + 'static, L: LedgerClient> {
    prover: Prover<P>,
    ledger: Arc<L>,
    config: ProtocolConfig,
}

impl<P, L> ProtocolOrchestrator<P, L>
where
    P: ProofSystem + 'static,
    L: LedgerClient,
{
    pub fn new(
        prover: Prover<P>,
        ledger: Arc<L>,
        config: ProtocolConfig,
    ) -> Result<Self, ProtocolError> {
        config.validate()?;
        Ok(Self {
            prover,
            ledger,
            config,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// A new holder with a key of the configured size.
    pub fn generate_holder(&self) -> Result<AccountHolder, ProtocolError> {
        Ok(AccountHolder::generate(self.config.key_bits, &mut OsRng)?)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Register `holder` with a proven encryption of zero.
    pub async fn register(&self, holder: &AccountHolder) -> Result<EventRecord, ProtocolError> {
        let pk = holder.public_key();
        let inputs = StatementInputs::registration(pk, pk.random_nonce(&mut OsRng))?;
        let proven = self.prove(inputs).await?;

        let record = self.submit(LedgerTransaction::Registration {
            caller: holder.address(),
            calldata: proven.calldata(),
            signals: proven.signals,
        })?;
        tracing::info!(address = %holder.address(), sequence = record.sequence, "registered");
        Ok(record)
    }

    /// Mint `amount` to `to`, encrypted under the key the ledger holds for it.
    pub async fn mint(
        &self,
        minter: Address,
        to: Address,
        amount: Amount,
    ) -> Result<EventRecord, ProtocolError> {
        let receiver_key = self
            .public_key_of(to)?
            .ok_or(LedgerError::NotRegistered(to))?;
        let r = receiver_key.random_nonce(&mut OsRng);
        let inputs = StatementInputs::mint(&receiver_key, amount, r)?;
        let proven = self.prove(inputs).await?;

        let record = self.submit(LedgerTransaction::Mint {
            caller: minter,
            to,
            calldata: proven.calldata(),
            signals: proven.signals,
        })?;
        tracing::info!(minter = %minter, to = %to, sequence = record.sequence, "minted");
        Ok(record)
    }

    /// Transfer `amount` from `sender` to `to`.
    pub async fn transfer(
        &self,
        sender: &AccountHolder,
        to: Address,
        amount: Amount,
    ) -> Result<EventRecord, ProtocolError> {
        let receiver_key = self
            .public_key_of(to)?
            .ok_or(LedgerError::NotRegistered(to))?;

        let mut attempt = 0u32;
        loop {
            let balance = self
                .encrypted_balance(sender.address())?
                .ok_or(LedgerError::NotRegistered(sender.address()))?;
            let inputs = self.transfer_inputs(sender, balance, &receiver_key, amount)?;
            let proven = self.prove(inputs).await?;

            let submitted = self.submit(LedgerTransaction::Transfer {
                caller: sender.address(),
                to,
                calldata: proven.calldata(),
                signals: proven.signals,
            });
            match submitted {
                Ok(record) => {
                    tracing::info!(
                        from = %sender.address(),
                        to = %to,
                        sequence = record.sequence,
                        attempts = attempt + 1,
                        "transferred"
                    );
                    return Ok(record);
                }
                Err(ProtocolError::Ledger(LedgerError::StaleBalance(addr)))
                    if attempt < self.config.max_stale_retries =>
                {
                    attempt += 1;
                    tracing::warn!(address = %addr, attempt, "stale balance, rebuilding transfer proof");
                }
                Err(e) => return Err(e),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Decrypt `holder`'s current ledger balance.
    pub fn balance_of(&self, holder: &AccountHolder) -> Result<Amount, ProtocolError> {
        let balance = self
            .encrypted_balance(holder.address())?
            .ok_or(LedgerError::NotRegistered(holder.address()))?;
        Ok(holder.decrypt_balance(&balance)?)
    }

    pub fn encrypted_balance(&self, address: Address) -> Result<Option<Ciphertext>, ProtocolError> {
        match self.ledger.read_state(StateQuery::BalanceOf { address })? {
            StateView::Balance(balance) => Ok(balance),
            other => Err(unexpected(other)),
        }
    }

    pub fn public_key_of(&self, address: Address) -> Result<Option<PublicKey>, ProtocolError> {
        match self.ledger.read_state(StateQuery::PublicKey { address })? {
            StateView::PublicKey(pk) => Ok(pk),
            other => Err(unexpected(other)),
        }
    }

    pub fn metadata(&self) -> Result<TokenMetadata, ProtocolError> {
        match self.ledger.read_state(StateQuery::Metadata)? {
            StateView::Metadata(m) => Ok(m),
            other => Err(unexpected(other)),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn transfer_inputs(
        &self,
        sender: &AccountHolder,
        balance: Ciphertext,
        receiver_key: &PublicKey,
        amount: Amount,
    ) -> Result<StatementInputs, ProtocolError> {
        let r_s = sender.public_key().random_nonce(&mut OsRng);
        let r_r = receiver_key.random_nonce(&mut OsRng);
        Ok(StatementInputs::transfer(
            sender.public_key(),
            sender.private_key(),
            balance,
            receiver_key,
            amount,
            r_s,
            r_r,
        )?)
    }

    /// Prove on the blocking pool, bounded by the configured timeout.
    ///
    /// On timeout, or when this future is dropped, the cancel flag is
    /// raised and the task's result is dropped unseen.
    async fn prove(&self, inputs: StatementInputs) -> Result<ProvenStatement, ProtocolError> {
        let statement = inputs.kind();
        let prover = self.prover.clone();
        let cancel = CancelFlag::new();
        let _cancel_on_exit = cancel.guard();
        let task = tokio::task::spawn_blocking(move || prover.prove_cancellable(inputs, &cancel));

        match tokio::time::timeout(self.config.prove_timeout(), task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join)) => Err(ProtocolError::ProvingAborted {
                statement,
                reason: join.to_string(),
            }),
            Err(_) => {
                tracing::warn!(
                    statement = %statement,
                    timeout_ms = self.config.prove_timeout_ms,
                    "proof generation timed out"
                );
                Err(ProtocolError::ProvingTimeout {
                    statement,
                    timeout_ms: self.config.prove_timeout_ms,
                })
            }
        }
    }

    fn submit(&self, tx: LedgerTransaction) -> Result<EventRecord, ProtocolError> {
        Ok(self.ledger.submit_transaction(tx)?)
    }
}

impl<P: ProofSystem + 'static, L: LedgerClient> std::fmt::Debug for ProtocolOrchestrator<P, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn unexpected(view: StateView) -> ProtocolError {
    ProtocolError::UnexpectedResponse(format!("{view:?}"))
}
