//! Orchestrator scenarios on a multi-threaded runtime: concurrent
//! transfers from one sender, parallel operations on disjoint accounts,
//! proving timeouts, and configuration loaded from YAML.

use std::sync::Arc;
use std::time::Duration;

use zkt_core::Amount;
use zkt_ledger::{ConfidentialLedger, LedgerError, MintPolicy};
use zkt_protocol::{ProtocolConfig, ProtocolError, ProtocolOrchestrator};
use zkt_zkp::{
    MockProofSystem, Proof, ProofError, ProofSystem, ProvenStatement, Prover, PublicSignals,
    StatementInputs, StatementKind, Verifier, VerifyError,
};

type Orchestrator<P> = ProtocolOrchestrator<P, ConfidentialLedger<P>>;

fn build<P: ProofSystem + 'static>(
    system: Arc<P>,
    keys: (
        zkt_zkp::StatementKeys<P::ProvingKey>,
        zkt_zkp::StatementKeys<P::VerifyingKey>,
    ),
    config: ProtocolConfig,
) -> Arc<Orchestrator<P>> {
    let (pks, vks) = keys;
    let ledger = Arc::new(ConfidentialLedger::new(
        Verifier::new(Arc::clone(&system), vks),
        config.ledger.clone(),
    ));
    Arc::new(ProtocolOrchestrator::new(Prover::new(system, pks), ledger, config).unwrap())
}

fn mock(config: ProtocolConfig) -> Arc<Orchestrator<MockProofSystem>> {
    let system = Arc::new(MockProofSystem::new());
    let keys = system.setup_all("async");
    build(system, keys, config)
}

// ── Concurrency ─────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_from_one_sender_all_settle() {
    let config = ProtocolConfig {
        max_stale_retries: 16,
        ..ProtocolConfig::default()
    };
    let orch = mock(config);
    let alice = Arc::new(orch.generate_holder().unwrap());
    orch.register(&alice).await.unwrap();
    orch.mint(alice.address(), alice.address(), Amount(100))
        .await
        .unwrap();

    let mut receivers = Vec::new();
    for _ in 0..4 {
        let r = orch.generate_holder().unwrap();
        orch.register(&r).await.unwrap();
        receivers.push(r);
    }

    let tasks: Vec<_> = receivers
        .iter()
        .map(|r| {
            let orch = Arc::clone(&orch);
            let alice = Arc::clone(&alice);
            let to = r.address();
            tokio::spawn(async move { orch.transfer(&alice, to, Amount(10)).await })
        })
        .collect();
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    assert_eq!(orch.balance_of(&alice).unwrap(), Amount(60));
    for r in &receivers {
        assert_eq!(orch.balance_of(r).unwrap(), Amount(10));
    }
    assert_eq!(orch.ledger().events().len(), 1 + 1 + 4 + 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_mints_run_in_parallel() {
    let orch = mock(ProtocolConfig::default());
    let mut holders = Vec::new();
    for _ in 0..6 {
        let h = orch.generate_holder().unwrap();
        orch.register(&h).await.unwrap();
        holders.push(Arc::new(h));
    }

    let tasks: Vec<_> = holders
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let orch = Arc::clone(&orch);
            let to = h.address();
            tokio::spawn(async move { orch.mint(to, to, Amount(i as u64 + 1)).await })
        })
        .collect();
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    for (i, h) in holders.iter().enumerate() {
        assert_eq!(orch.balance_of(h).unwrap(), Amount(i as u64 + 1));
    }
}

// ── Timeouts ────────────────────────────────────────────────────────────

struct Slow {
    inner: MockProofSystem,
    delay: Duration,
}

impl ProofSystem for Slow {
    type ProvingKey = <MockProofSystem as ProofSystem>::ProvingKey;
    type VerifyingKey = <MockProofSystem as ProofSystem>::VerifyingKey;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
    ) -> Result<ProvenStatement, ProofError> {
        std::thread::sleep(self.delay);
        self.inner.prove(pk, inputs)
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        signals: &PublicSignals,
        proof: &Proof,
    ) -> Result<bool, VerifyError> {
        self.inner.verify(vk, signals, proof)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abandoned_transfer_has_no_ledger_effect() {
    let system = Arc::new(Slow {
        inner: MockProofSystem::new(),
        delay: Duration::from_millis(150),
    });
    let keys = system.inner.setup_all("slow");
    let patient = build(Arc::clone(&system), keys.clone(), ProtocolConfig::default());

    let alice = patient.generate_holder().unwrap();
    let bob = patient.generate_holder().unwrap();
    patient.register(&alice).await.unwrap();
    patient.register(&bob).await.unwrap();
    patient
        .mint(alice.address(), alice.address(), Amount(40))
        .await
        .unwrap();

    // Same ledger, impatient orchestrator.
    let impatient = ProtocolOrchestrator::new(
        Prover::new(system, keys.0),
        Arc::clone(patient.ledger()),
        ProtocolConfig {
            prove_timeout_ms: 10,
            ..ProtocolConfig::default()
        },
    )
    .unwrap();

    let events_before = patient.ledger().events().len();
    let err = impatient
        .transfer(&alice, bob.address(), Amount(15))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::ProvingTimeout {
            statement: StatementKind::Transfer,
            ..
        }
    ));
    assert!(err.is_recoverable());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(patient.ledger().events().len(), events_before);
    assert_eq!(patient.balance_of(&alice).unwrap(), Amount(40));
    assert_eq!(patient.balance_of(&bob).unwrap(), Amount::ZERO);

    // A retry with enough time goes through.
    patient
        .transfer(&alice, bob.address(), Amount(15))
        .await
        .unwrap();
    assert_eq!(patient.balance_of(&alice).unwrap(), Amount(25));
}

// ── Configuration ───────────────────────────────────────────────────────

#[tokio::test]
async fn yaml_config_drives_ledger_and_orchestrator() {
    let minter = zkt_core::Address::from_bytes([0x42; 20]);
    let yaml = format!(
        "key_bits: 80\nmax_stale_retries: 0\nledger:\n  metadata:\n    name: Test Token\n    symbol: TST\n    decimals: 2\n  mint_policy:\n    mode: authorized\n    minters:\n      - \"{minter}\"\n"
    );
    let config = ProtocolConfig::from_yaml_str(&yaml).unwrap();
    assert_eq!(
        config.ledger.mint_policy,
        MintPolicy::Authorized {
            minters: [minter].into_iter().collect(),
        }
    );

    let orch = mock(config);
    let meta = orch.metadata().unwrap();
    assert_eq!((meta.symbol.as_str(), meta.decimals), ("TST", 2));

    let holder = orch.generate_holder().unwrap();
    assert_eq!(holder.public_key().bits(), 80);
    orch.register(&holder).await.unwrap();

    let err = orch
        .mint(holder.address(), holder.address(), Amount(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Ledger(LedgerError::UnauthorizedMinter(_))
    ));

    orch.mint(minter, holder.address(), Amount(5)).await.unwrap();
    assert_eq!(orch.balance_of(&holder).unwrap(), Amount(5));
}

#[test]
fn config_file_with_env_style_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zkt.yaml");
    std::fs::write(&path, "key_bits: 96\nprove_timeout_ms: 1000\n").unwrap();

    let mut config = ProtocolConfig::load(&path).unwrap();
    config
        .apply_overrides(|k| match k {
            "ZKT_PROVE_TIMEOUT_MS" => Some("2500".into()),
            _ => None,
        })
        .unwrap();
    config.validate().unwrap();
    assert_eq!(config.prove_timeout(), Duration::from_millis(2500));
}
