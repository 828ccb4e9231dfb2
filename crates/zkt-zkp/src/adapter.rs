//! # Prover and Verifier Adapters
//!
//! Bind a [`ProofSystem`] to one key per statement. The prover picks the
//! proving key from the inputs' statement kind; the verifier picks the
//! verifying key from the statement the caller claims.

use std::sync::Arc;
use std::time::Instant;

use crate::cancel::CancelFlag;
use crate::error::{CodecError, ProofError, VerifyError};
use crate::proof::{Proof, ProofCalldata, ProvenStatement, PublicSignals};
use crate::statement::{StatementInputs, StatementKind};
use crate::traits::{ProofSystem, StatementKeys};

/// Produces `(Proof, PublicSignals)` for any statement.
pub struct Prover<P: ProofSystem> {
    system: Arc<P>,
    keys: Arc<StatementKeys<P::ProvingKey>>,
}

impl<P: ProofSystem> Clone for Prover<P> {
    fn clone(&self) -> Self {
        Self {
            system: Arc::clone(&self.system),
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<P: ProofSystem> Prover<P> {
    pub fn new(system: Arc<P>, keys: StatementKeys<P::ProvingKey>) -> Self {
        Self {
            system,
            keys: Arc::new(keys),
        }
    }

    /// Prove `inputs` with the matching proving key.
    ///
    /// Blocking and potentially slow; async callers should run it on a
    /// blocking thread.
    pub fn prove(&self, inputs: StatementInputs) -> Result<ProvenStatement, ProofError> {
        self.prove_cancellable(inputs, &CancelFlag::new())
    }

    /// [`Prover::prove`], abandoned once `cancel` is raised.
    pub fn prove_cancellable(
        &self,
        inputs: StatementInputs,
        cancel: &CancelFlag,
    ) -> Result<ProvenStatement, ProofError> {
        let kind = inputs.kind();
        let started = Instant::now();
        let proven = self
            .system
            .prove_cancellable(self.keys.get(kind), inputs, cancel)?;

        if proven.statement != kind {
            return Err(ProofError::KeyMismatch(format!(
                "backend proved {} for {kind} inputs",
                proven.statement
            )));
        }
        if proven.signals.len() != kind.public_signal_count() {
            return Err(CodecError::SignalCount {
                statement: kind,
                expected: kind.public_signal_count(),
                actual: proven.signals.len(),
            }
            .into());
        }

        tracing::debug!(
            statement = %kind,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "proof generated"
        );
        Ok(proven)
    }
}

impl<P: ProofSystem> std::fmt::Debug for Prover<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prover").finish_non_exhaustive()
    }
}

/// Accepts or rejects `(signals, proof)` for a claimed statement.
pub struct Verifier<P: ProofSystem> {
    system: Arc<P>,
    keys: StatementKeys<P::VerifyingKey>,
}

impl<P: ProofSystem> Clone for Verifier<P> {
    fn clone(&self) -> Self {
        Self {
            system: Arc::clone(&self.system),
            keys: self.keys.clone(),
        }
    }
}

impl<P: ProofSystem> Verifier<P> {
    pub fn new(system: Arc<P>, keys: StatementKeys<P::VerifyingKey>) -> Self {
        Self { system, keys }
    }

    pub fn verifying_key(&self, kind: StatementKind) -> &P::VerifyingKey {
        self.keys.get(kind)
    }

    /// Verify a raw proof. A signal vector of the wrong length for the
    /// statement is a rejection, not an error.
    pub fn verify(
        &self,
        kind: StatementKind,
        signals: &PublicSignals,
        proof: &Proof,
    ) -> Result<bool, VerifyError> {
        if signals.len() != kind.public_signal_count() {
            return Ok(false);
        }
        self.system.verify(self.keys.get(kind), signals, proof)
    }

    /// Verify ledger calldata, undoing the `piB` wire swap first.
    pub fn verify_calldata(
        &self,
        kind: StatementKind,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError> {
        self.verify(kind, signals, &calldata.to_proof())
    }
}

impl<P: ProofSystem> std::fmt::Debug for Verifier<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::MockProofSystem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use zkt_core::{Amount, FieldElement};
    use zkt_crypto::KeyPair;

    fn setup() -> (Prover<MockProofSystem>, Verifier<MockProofSystem>) {
        let system = Arc::new(MockProofSystem::new());
        let (pks, vks) = system.setup_all("adapter-tests");
        (
            Prover::new(Arc::clone(&system), pks),
            Verifier::new(system, vks),
        )
    }

    #[test]
    fn prove_then_verify_calldata() {
        let (prover, verifier) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let kp = KeyPair::generate(96, &mut rng).unwrap();
        let pk = kp.public_key();
        let inputs = StatementInputs::mint(pk, Amount::new(1000), pk.random_nonce(&mut rng)).unwrap();
        let proven = prover.prove(inputs).unwrap();
        assert_eq!(proven.statement, StatementKind::Mint);
        assert!(verifier
            .verify_calldata(StatementKind::Mint, &proven.calldata(), &proven.signals)
            .unwrap());
    }

    #[test]
    fn calldata_without_swap_is_rejected() {
        let (prover, verifier) = setup();
        let mut rng = StdRng::seed_from_u64(2);
        let kp = KeyPair::generate(96, &mut rng).unwrap();
        let pk = kp.public_key();
        let inputs = StatementInputs::registration(pk, pk.random_nonce(&mut rng)).unwrap();
        let proven = prover.prove(inputs).unwrap();
        let p = &proven.proof;
        let unswapped = ProofCalldata {
            a: p.pi_a.clone(),
            b: p.pi_b.clone(),
            c: p.pi_c.clone(),
        };
        assert!(!verifier
            .verify_calldata(StatementKind::Registration, &unswapped, &proven.signals)
            .unwrap());
    }

    #[test]
    fn raised_flag_stops_proving_before_it_starts() {
        let (prover, _) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let kp = KeyPair::generate(96, &mut rng).unwrap();
        let pk = kp.public_key();
        let inputs = StatementInputs::mint(pk, Amount::new(1), pk.random_nonce(&mut rng)).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        assert!(matches!(
            prover.prove_cancellable(inputs, &cancel),
            Err(ProofError::Cancelled)
        ));
    }

    #[test]
    fn wrong_signal_count_is_a_rejection() {
        let (_, verifier) = setup();
        let proof = Proof {
            pi_a: [FieldElement::from_u64(1), FieldElement::from_u64(2)],
            pi_b: [
                [FieldElement::from_u64(3), FieldElement::from_u64(4)],
                [FieldElement::from_u64(5), FieldElement::from_u64(6)],
            ],
            pi_c: [FieldElement::from_u64(7), FieldElement::from_u64(8)],
        };
        let signals = PublicSignals::new(vec![FieldElement::from_u64(1)]);
        assert!(!verifier
            .verify(StatementKind::Transfer, &signals, &proof)
            .unwrap());
    }
}
