//! # Proof System Trait
//!
//! Defines the abstract interface for the proving/verification backend.
//! The transparent mock and the snarkjs adapter both satisfy it, so the
//! ledger and orchestrator are written once against the trait.
//!
//! ## Security Invariant
//!
//! The trait requires `Send + Sync` bounds so one backend can serve
//! concurrent provers and verifiers. `prove` consumes its inputs so the
//! witness is dropped (and wiped) when proving returns. `verify` is a pure
//! function of key, signals and proof.

use crate::cancel::CancelFlag;
use crate::error::{ProofError, VerifyError};
use crate::proof::{Proof, ProvenStatement, PublicSignals};
use crate::statement::{StatementInputs, StatementKind};

/// Abstract interface for a proof system.
pub trait ProofSystem: Send + Sync {
    /// Per-statement proving key.
    type ProvingKey: Send + Sync;
    /// Per-statement verifying key.
    type VerifyingKey: Clone + Send + Sync;

    /// Prove a statement. Fails with [`ProofError::UnsatisfiedConstraint`]
    /// when the witness does not satisfy the statement.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
    ) -> Result<ProvenStatement, ProofError>;

    /// Prove, stopping with [`ProofError::Cancelled`] once `cancel` is
    /// raised. The default checks the flag once and then proves to
    /// completion; backends that run external work override it.
    fn prove_cancellable(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
        cancel: &CancelFlag,
    ) -> Result<ProvenStatement, ProofError> {
        if cancel.is_cancelled() {
            return Err(ProofError::Cancelled);
        }
        self.prove(pk, inputs)
    }

    /// Verify a proof against ordered public signals.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        signals: &PublicSignals,
        proof: &Proof,
    ) -> Result<bool, VerifyError>;
}

/// One key per statement type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementKeys<K> {
    pub registration: K,
    pub mint: K,
    pub transfer: K,
}

impl<K> StatementKeys<K> {
    /// Build by calling `f` once per statement.
    pub fn try_from_fn<E>(mut f: impl FnMut(StatementKind) -> Result<K, E>) -> Result<Self, E> {
        Ok(Self {
            registration: f(StatementKind::Registration)?,
            mint: f(StatementKind::Mint)?,
            transfer: f(StatementKind::Transfer)?,
        })
    }

    pub fn get(&self, kind: StatementKind) -> &K {
        match kind {
            StatementKind::Registration => &self.registration,
            StatementKind::Mint => &self.mint,
            StatementKind::Transfer => &self.transfer,
        }
    }
}
