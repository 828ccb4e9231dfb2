//! # Mock Proof System
//!
//! A deterministic, transparent proof system for development and testing.
//! It evaluates the statement's relation on the witness exactly like a
//! circuit would, then emits Groth16-shaped coordinates derived by SHA-256
//! from the circuit key and the public signals.
//!
//! ## How It Works
//!
//! - `setup(statement, label)` derives a circuit digest from the statement
//!   and a setup label. Proving and verifying keys both carry it.
//! - `prove()` rejects unsatisfied witnesses, then computes each of the
//!   eight proof coordinates as
//!   `SHA256(domain || circuit_digest || signals || index) mod r`.
//! - `verify()` recomputes the coordinates and checks equality.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE AND NOT SOUND.** Anyone holding a verifying key can
//! recompute a valid proof for arbitrary signals. The mock exists so the
//! ledger and orchestrator can be exercised end to end without the external
//! Groth16 toolchain.

use zkt_core::{ContentDigest, FieldElement, Sha256Accumulator};

use crate::error::{ProofError, VerifyError};
use crate::proof::{Proof, ProvenStatement, PublicSignals};
use crate::statement::{StatementInputs, StatementKind};
use crate::traits::{ProofSystem, StatementKeys};

/// Mock proving key: the statement it proves and its circuit digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProvingKey {
    pub statement: StatementKind,
    pub circuit_digest: ContentDigest,
}

/// Mock verifying key. Same content as the proving key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockVerifyingKey {
    pub statement: StatementKind,
    pub circuit_digest: ContentDigest,
}

/// A deterministic mock proof system.
#[derive(Debug, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    pub fn new() -> Self {
        Self
    }

    /// Derive the key pair for one statement under a setup label.
    ///
    /// Different labels produce incompatible keys, standing in for
    /// independent trusted setups.
    pub fn setup(&self, statement: StatementKind, label: &str) -> (MockProvingKey, MockVerifyingKey) {
        let mut acc = Sha256Accumulator::with_domain("zkt.mock.setup.v1");
        acc.field(statement.circuit_id().as_bytes())
            .field(label.as_bytes());
        let circuit_digest = acc.finalize();
        (
            MockProvingKey {
                statement,
                circuit_digest,
            },
            MockVerifyingKey {
                statement,
                circuit_digest,
            },
        )
    }

    /// Keys for all three statements under one setup label.
    pub fn setup_all(
        &self,
        label: &str,
    ) -> (StatementKeys<MockProvingKey>, StatementKeys<MockVerifyingKey>) {
        let (rp, rv) = self.setup(StatementKind::Registration, label);
        let (mp, mv) = self.setup(StatementKind::Mint, label);
        let (tp, tv) = self.setup(StatementKind::Transfer, label);
        (
            StatementKeys {
                registration: rp,
                mint: mp,
                transfer: tp,
            },
            StatementKeys {
                registration: rv,
                mint: mv,
                transfer: tv,
            },
        )
    }

    fn coordinates(circuit_digest: &ContentDigest, signals: &PublicSignals) -> Proof {
        let coord = |index: u8| {
            let mut acc = Sha256Accumulator::with_domain("zkt.mock.proof.v1");
            acc.field(circuit_digest.as_bytes());
            acc.field(&(signals.len() as u64).to_be_bytes());
            for s in signals.as_slice() {
                acc.field(&s.to_bytes32());
            }
            acc.field(&[index]);
            FieldElement::from_bytes_reduced(acc.finalize().as_bytes())
        };
        Proof {
            pi_a: [coord(0), coord(1)],
            pi_b: [[coord(2), coord(3)], [coord(4), coord(5)]],
            pi_c: [coord(6), coord(7)],
        }
    }
}

impl ProofSystem for MockProofSystem {
    type ProvingKey = MockProvingKey;
    type VerifyingKey = MockVerifyingKey;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
    ) -> Result<ProvenStatement, ProofError> {
        let statement = inputs.kind();
        if pk.statement != statement {
            return Err(ProofError::KeyMismatch(format!(
                "{} proving key used for {statement}",
                pk.statement
            )));
        }
        inputs.check_constraints()?;
        let signals = inputs.public_signals()?;
        drop(inputs);

        let proof = Self::coordinates(&pk.circuit_digest, &signals);
        Ok(ProvenStatement {
            statement,
            proof,
            signals,
        })
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        signals: &PublicSignals,
        proof: &Proof,
    ) -> Result<bool, VerifyError> {
        if signals.len() != vk.statement.public_signal_count() {
            return Ok(false);
        }
        Ok(Self::coordinates(&vk.circuit_digest, signals) == *proof)
    }
}
