//! # Confidential Ledger
//!
//! Holds, per address, a public key and an encrypted balance. Registration,
//! mint and transfer are accepted only after the accompanying proof
//! verifies; balances then change by homomorphic combination of the stored
//! ciphertext with ciphertexts taken from the proof's public signals. The
//! ledger never decrypts.
//!
//! ## Concurrency
//!
//! Accounts live in a `DashMap` of `Arc<Mutex<Account>>` slots, inserted
//! only by an accepted registration. An operation clones the slot handles
//! out of the map, then locks them; a transfer locks both parties in
//! address order. Everything from the
//! freshness check to the commit happens under those locks, so two
//! transfers built against the same sender balance cannot both commit: the
//! second observes the moved balance and fails with `StaleBalance`.
//! Operations on disjoint accounts run in parallel.
//!
//! Lock order: map entry (registration only) or account slots (ascending
//! address), then the consumed-proof set, then the event log.
//!
//! ## Atomicity
//!
//! Every operation builds the next account records on copies, then runs
//! `authorize`, the last fallible step. The commit that follows only swaps
//! the copies in and appends the event. A failing operation leaves
//! accounts, the consumed-proof set and the event log untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use num_bigint::BigUint;
use parking_lot::{Mutex, RwLock};
use zkt_core::{Address, ContentDigest};
use zkt_crypto::{Ciphertext, PublicKey};
use zkt_zkp::{
    submission_digest, MintPublic, ProofCalldata, ProofSystem, PublicSignals, RegistrationPublic,
    StatementKind, TransferPublic, VerifyError, Verifier,
};

use crate::account::Account;
use crate::config::{LedgerConfig, TokenMetadata};
use crate::error::LedgerError;
use crate::events::{EventRecord, LedgerEvent};

type Slot = Arc<Mutex<Account>>;

/// The confidential ledger.
pub struct ConfidentialLedger<P: ProofSystem> {
    accounts: DashMap<Address, Slot>,
    consumed: Mutex<HashSet<ContentDigest>>,
    events: RwLock<Vec<EventRecord>>,
    verifier: Verifier<P>,
    config: LedgerConfig,
}

impl<P: ProofSystem> ConfidentialLedger<P> {
    pub fn new(verifier: Verifier<P>, config: LedgerConfig) -> Self {
        Self {
            accounts: DashMap::new(),
            consumed: Mutex::new(HashSet::new()),
            events: RwLock::new(Vec::new()),
            verifier,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Register `caller` with the key and zero-balance ciphertext in `signals`.
    ///
    /// An already registered caller is rejected with `AlreadyRegistered`
    /// before the proof is looked at. The key's modulus must exceed the
    /// `u64` amount range.
    pub fn registration(
        &self,
        caller: Address,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<EventRecord, LedgerError> {
        let kind = StatementKind::Registration;
        let result = (|| {
            if self.is_registered(&caller) {
                return Err(LedgerError::AlreadyRegistered(caller));
            }
            let public = RegistrationPublic::from_signals(signals)?;
            if !public.public_key.covers_amounts() {
                return Err(LedgerError::NarrowModulus {
                    address: caller,
                    bits: public.public_key.bits(),
                });
            }
            let mut account = Account::unregistered(caller);
            account.register(public.public_key.clone(), public.encrypted_balance, Utc::now())?;

            // The vacant entry stays claimed through verification and the
            // event append; a rejected registration never enters the map.
            match self.accounts.entry(caller) {
                Entry::Occupied(_) => Err(LedgerError::AlreadyRegistered(caller)),
                Entry::Vacant(vacant) => {
                    self.authorize(kind, calldata, signals)?;
                    let _slot = vacant.insert(Arc::new(Mutex::new(account)));
                    Ok(self.commit(LedgerEvent::Registration {
                        address: caller,
                        public_key: public.public_key,
                    }))
                }
            }
        })();

        let record = result.map_err(|e| self.rejected(kind, caller, e))?;
        tracing::info!(address = %caller, sequence = record.sequence, "Registration");
        Ok(record)
    }

    /// Add the encrypted issuance in `signals` to `to`'s balance.
    pub fn mint(
        &self,
        caller: Address,
        to: Address,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<EventRecord, LedgerError> {
        let kind = StatementKind::Mint;
        if !self.config.mint_policy.allows(&caller) {
            return Err(self.rejected(kind, caller, LedgerError::UnauthorizedMinter(caller)));
        }
        let slot = match self.slot(to) {
            Some(s) => s,
            None => return Err(self.rejected(kind, to, LedgerError::NotRegistered(to))),
        };
        let mut account = slot.lock();

        let result = (|| {
            let (key, balance) = account.registered()?;
            let public = MintPublic::from_signals(signals)?;
            if &public.receiver_key != key {
                return Err(LedgerError::PublicKeyMismatch(to));
            }
            let mut next = (*account).clone();
            next.apply_balance(key.add(balance, &public.encrypted_value)?, Utc::now())?;
            self.authorize(kind, calldata, signals)?;
            Ok((public.encrypted_value, next))
        })();

        let (encrypted_value, next) = match result {
            Ok(v) => v,
            Err(e) => return Err(self.rejected(kind, to, e)),
        };

        *account = next;
        let record = self.commit(LedgerEvent::Mint {
            minter: caller,
            to,
            encrypted_value,
        });
        tracing::info!(minter = %caller, to = %to, sequence = record.sequence, "Mint");
        Ok(record)
    }

    /// Move an encrypted amount from `caller` to `to`.
    ///
    /// The proof's `encryptedSenderBalance` must equal the sender's stored
    /// balance at the moment of the call; otherwise `StaleBalance`.
    pub fn transfer(
        &self,
        caller: Address,
        to: Address,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<EventRecord, LedgerError> {
        let kind = StatementKind::Transfer;
        if caller == to {
            return Err(self.rejected(kind, caller, LedgerError::SelfTransfer(caller)));
        }
        let public = TransferPublic::from_signals(signals)
            .map_err(|e| self.rejected(kind, caller, e.into()))?;

        let sender_slot = self
            .slot(caller)
            .ok_or_else(|| self.rejected(kind, caller, LedgerError::NotRegistered(caller)))?;
        let receiver_slot = self
            .slot(to)
            .ok_or_else(|| self.rejected(kind, to, LedgerError::NotRegistered(to)))?;

        // Lock in address order.
        let (mut sender, mut receiver) = if caller < to {
            let s = sender_slot.lock();
            let r = receiver_slot.lock();
            (s, r)
        } else {
            let r = receiver_slot.lock();
            let s = sender_slot.lock();
            (s, r)
        };

        let result = (|| {
            let (sender_key, sender_balance) = sender.registered()?;
            let (receiver_key, receiver_balance) = receiver.registered()?;
            if &public.sender_key != sender_key {
                return Err(LedgerError::PublicKeyMismatch(caller));
            }
            if &public.receiver_key != receiver_key {
                return Err(LedgerError::PublicKeyMismatch(to));
            }
            if &public.encrypted_sender_balance != sender_balance {
                return Err(LedgerError::StaleBalance(caller));
            }
            let now = Utc::now();
            let mut next_sender = (*sender).clone();
            next_sender.apply_balance(
                sender_key.add(sender_balance, &public.encrypted_sender_value)?,
                now,
            )?;
            let mut next_receiver = (*receiver).clone();
            next_receiver.apply_balance(
                receiver_key.add(receiver_balance, &public.encrypted_receiver_value)?,
                now,
            )?;
            self.authorize(kind, calldata, signals)?;
            Ok((next_sender, next_receiver))
        })();

        let (next_sender, next_receiver) = match result {
            Ok(v) => v,
            Err(e) => return Err(self.rejected(kind, caller, e)),
        };

        *sender = next_sender;
        *receiver = next_receiver;
        let record = self.commit(LedgerEvent::Transfer {
            from: caller,
            to,
            encrypted_sender_value: public.encrypted_sender_value,
            encrypted_receiver_value: public.encrypted_receiver_value,
        });
        tracing::info!(from = %caller, to = %to, sequence = record.sequence, "Transfer");
        Ok(record)
    }

    /// Check a proof without touching ledger state.
    pub fn verify_proof(
        &self,
        kind: StatementKind,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError> {
        self.verifier.verify_calldata(kind, calldata, signals)
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Encrypted balance of a registered account.
    pub fn balance_of(&self, address: &Address) -> Option<Ciphertext> {
        self.slot(*address)
            .and_then(|s| s.lock().encrypted_balance().cloned())
    }

    /// `[g, n, n^2]` of a registered account's key.
    pub fn get_pub_key(&self, address: &Address) -> Option<[BigUint; 3]> {
        self.public_key(address).map(|pk| pk.components())
    }

    pub fn public_key(&self, address: &Address) -> Option<PublicKey> {
        self.slot(*address)
            .and_then(|s| s.lock().public_key().cloned())
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.slot(*address)
            .map(|s| s.lock().is_registered())
            .unwrap_or(false)
    }

    /// Snapshot of an account record.
    pub fn account(&self, address: &Address) -> Option<Account> {
        self.slot(*address).map(|s| s.lock().clone())
    }

    pub fn registered_count(&self) -> usize {
        self.accounts
            .iter()
            .filter(|e| e.value().lock().is_registered())
            .count()
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.config.metadata
    }

    pub fn name(&self) -> &str {
        &self.config.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.metadata.decimals
    }

    /// All events in sequence order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.read().clone()
    }

    /// Events with `sequence > after`.
    pub fn events_since(&self, after: u64) -> Vec<EventRecord> {
        self.events
            .read()
            .iter()
            .filter(|r| r.sequence > after)
            .cloned()
            .collect()
    }

    pub fn is_consumed(&self, digest: &ContentDigest) -> bool {
        self.consumed.lock().contains(digest)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn slot(&self, address: Address) -> Option<Slot> {
        self.accounts.get(&address).map(|e| Arc::clone(e.value()))
    }

    /// Replay check, verification, then reservation of the submission
    /// digest. Must be the last fallible step before mutating an account.
    fn authorize(
        &self,
        kind: StatementKind,
        calldata: &ProofCalldata,
        signals: &PublicSignals,
    ) -> Result<(), LedgerError> {
        let proof = calldata.to_proof();
        let digest = submission_digest(kind, &proof, signals);
        if self.consumed.lock().contains(&digest) {
            return Err(LedgerError::ProofReplayed(digest));
        }
        if !self.verifier.verify(kind, signals, &proof)? {
            return Err(LedgerError::VerificationFailed(kind));
        }
        // Two accounts may share a key, so a concurrent submission of the
        // same proof can get here under a different account lock.
        if !self.consumed.lock().insert(digest) {
            return Err(LedgerError::ProofReplayed(digest));
        }
        Ok(())
    }

    fn commit(&self, event: LedgerEvent) -> EventRecord {
        let mut events = self.events.write();
        let record = EventRecord {
            sequence: events.len() as u64 + 1,
            event,
            timestamp: Utc::now(),
        };
        events.push(record.clone());
        record
    }

    fn rejected(&self, kind: StatementKind, address: Address, err: LedgerError) -> LedgerError {
        tracing::warn!(
            statement = %kind,
            address = %address,
            error = %err,
            recoverable = err.is_recoverable(),
            "operation rejected"
        );
        err
    }
}

impl<P: ProofSystem> std::fmt::Debug for ConfidentialLedger<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidentialLedger")
            .field("accounts", &self.accounts.len())
            .field("events", &self.events.read().len())
            .field("metadata", &self.config.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MintPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use zkt_core::{Amount, FieldElement};
    use zkt_crypto::KeyPair;
    use zkt_zkp::{MockProofSystem, ProvenStatement, Prover, StatementInputs};

    struct Harness {
        ledger: ConfidentialLedger<MockProofSystem>,
        prover: Prover<MockProofSystem>,
        rng: StdRng,
    }

    fn harness_with(config: LedgerConfig) -> Harness {
        let system = Arc::new(MockProofSystem::new());
        let (pks, vks) = system.setup_all("ledger-tests");
        Harness {
            ledger: ConfidentialLedger::new(Verifier::new(Arc::clone(&system), vks), config),
            prover: Prover::new(system, pks),
            rng: StdRng::seed_from_u64(42),
        }
    }

    fn harness() -> Harness {
        harness_with(LedgerConfig::default())
    }

    impl Harness {
        fn keys(&mut self) -> KeyPair {
            KeyPair::generate(96, &mut self.rng).unwrap()
        }

        fn prove_registration(&mut self, kp: &KeyPair) -> ProvenStatement {
            let r = kp.public_key().random_nonce(&mut self.rng);
            let inputs = StatementInputs::registration(kp.public_key(), r).unwrap();
            self.prover.prove(inputs).unwrap()
        }

        fn register(&mut self) -> (Address, KeyPair) {
            let addr = Address::random();
            let kp = self.keys();
            let proven = self.prove_registration(&kp);
            self.ledger
                .registration(addr, &proven.calldata(), &proven.signals)
                .unwrap();
            (addr, kp)
        }

        fn prove_mint(&mut self, kp: &KeyPair, value: u64) -> ProvenStatement {
            let r = kp.public_key().random_nonce(&mut self.rng);
            let inputs = StatementInputs::mint(kp.public_key(), Amount::new(value), r).unwrap();
            self.prover.prove(inputs).unwrap()
        }

        fn mint(&mut self, to: Address, kp: &KeyPair, value: u64) {
            let proven = self.prove_mint(kp, value);
            self.ledger
                .mint(to, to, &proven.calldata(), &proven.signals)
                .unwrap();
        }

        fn prove_transfer(
            &mut self,
            from: (&Address, &KeyPair),
            to: (&Address, &KeyPair),
            value: u64,
        ) -> ProvenStatement {
            let balance = self.ledger.balance_of(from.0).unwrap();
            let r_s = from.1.public_key().random_nonce(&mut self.rng);
            let r_r = to.1.public_key().random_nonce(&mut self.rng);
            let inputs = StatementInputs::transfer(
                from.1.public_key(),
                from.1.private_key(),
                balance,
                to.1.public_key(),
                Amount::new(value),
                r_s,
                r_r,
            )
            .unwrap();
            self.prover.prove(inputs).unwrap()
        }

        fn balance(&self, addr: &Address, kp: &KeyPair) -> Amount {
            let c = self.ledger.balance_of(addr).unwrap();
            kp.private_key().decrypt_amount(&c).unwrap()
        }
    }

    // ── Registration ────────────────────────────────────────────────

    #[test]
    fn registration_records_key_and_zero_balance() {
        let mut h = harness();
        let (addr, kp) = h.register();
        assert!(h.ledger.is_registered(&addr));
        assert_eq!(h.balance(&addr, &kp), Amount::ZERO);
        let [g, n, n2] = h.ledger.get_pub_key(&addr).unwrap();
        assert_eq!(&g, kp.public_key().g());
        assert_eq!(&n, kp.public_key().n());
        assert_eq!(n2, kp.public_key().n_squared());

        let events = h.ledger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.name(), "Registration");
        assert_eq!(events[0].sequence, 1);
    }

    #[test]
    fn second_registration_is_rejected_regardless_of_proof() {
        let mut h = harness();
        let addr = Address::random();
        let kp = h.keys();
        let proven = h.prove_registration(&kp);
        h.ledger
            .registration(addr, &proven.calldata(), &proven.signals)
            .unwrap();

        let err = h
            .ledger
            .registration(addr, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRegistered(a) if a == addr));

        // A fresh, valid proof for a new key is rejected the same way.
        let other = h.keys();
        let fresh = h.prove_registration(&other);
        let err = h
            .ledger
            .registration(addr, &fresh.calldata(), &fresh.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRegistered(_)));
        assert_eq!(h.ledger.public_key(&addr).as_ref(), Some(kp.public_key()));
        assert_eq!(h.ledger.events().len(), 1);
    }

    #[test]
    fn registration_proof_cannot_be_reused_for_another_address() {
        let mut h = harness();
        let kp = h.keys();
        let proven = h.prove_registration(&kp);
        h.ledger
            .registration(Address::random(), &proven.calldata(), &proven.signals)
            .unwrap();
        let err = h
            .ledger
            .registration(Address::random(), &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProofReplayed(_)));
    }

    #[test]
    fn registration_with_substituted_key_fails_verification() {
        let mut h = harness();
        let kp = h.keys();
        let other = h.keys();
        let proven = h.prove_registration(&kp);
        let mut signals = proven.signals.as_slice().to_vec();
        signals[1] = FieldElement::new(other.public_key().g().clone()).unwrap();
        signals[2] = FieldElement::new(other.public_key().n().clone()).unwrap();
        let signals = PublicSignals::new(signals);

        let addr = Address::random();
        let err = h
            .ledger
            .registration(addr, &proven.calldata(), &signals)
            .unwrap_err();
        // The ciphertext may not even be a valid residue under the other key.
        assert!(matches!(
            err,
            LedgerError::VerificationFailed(_) | LedgerError::MalformedSignals(_)
        ));
        assert!(!h.ledger.is_registered(&addr));
    }

    #[test]
    fn unswapped_calldata_is_rejected() {
        let mut h = harness();
        let kp = h.keys();
        let proven = h.prove_registration(&kp);
        let p = &proven.proof;
        let raw = ProofCalldata {
            a: p.pi_a.clone(),
            b: p.pi_b.clone(),
            c: p.pi_c.clone(),
        };
        let err = h
            .ledger
            .registration(Address::random(), &raw, &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::VerificationFailed(_)));
    }

    // ── Mint ────────────────────────────────────────────────────────

    #[test]
    fn mint_adds_to_balance() {
        let mut h = harness();
        let (addr, kp) = h.register();
        h.mint(addr, &kp, 1000);
        assert_eq!(h.balance(&addr, &kp), Amount::new(1000));
        h.mint(addr, &kp, 10);
        assert_eq!(h.balance(&addr, &kp), Amount::new(1010));
        assert_eq!(h.ledger.events().len(), 3);
    }

    #[test]
    fn mint_to_unregistered_account_is_rejected() {
        let mut h = harness();
        let kp = h.keys();
        let proven = h.prove_mint(&kp, 5);
        let to = Address::random();
        let err = h
            .ledger
            .mint(to, to, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotRegistered(a) if a == to));
    }

    #[test]
    fn mint_under_foreign_key_is_rejected() {
        let mut h = harness();
        let (addr, _) = h.register();
        let other = h.keys();
        let proven = h.prove_mint(&other, 5);
        let err = h
            .ledger
            .mint(addr, addr, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::PublicKeyMismatch(_)));
    }

    #[test]
    fn mint_replay_is_rejected() {
        let mut h = harness();
        let (addr, kp) = h.register();
        let proven = h.prove_mint(&kp, 100);
        h.ledger
            .mint(addr, addr, &proven.calldata(), &proven.signals)
            .unwrap();
        let err = h
            .ledger
            .mint(addr, addr, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProofReplayed(_)));
        assert_eq!(h.balance(&addr, &kp), Amount::new(100));
    }

    #[test]
    fn unauthorized_minter_is_rejected() {
        let minter = Address::random();
        let mut h = harness_with(LedgerConfig {
            mint_policy: MintPolicy::Authorized {
                minters: [minter].into_iter().collect(),
            },
            ..LedgerConfig::default()
        });
        let (addr, kp) = h.register();
        let proven = h.prove_mint(&kp, 5);
        let err = h
            .ledger
            .mint(addr, addr, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedMinter(_)));
        h.ledger
            .mint(minter, addr, &proven.calldata(), &proven.signals)
            .unwrap();
        assert_eq!(h.balance(&addr, &kp), Amount::new(5));
    }

    // ── Transfer ────────────────────────────────────────────────────

    #[test]
    fn transfer_moves_encrypted_amount() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        h.mint(a, &ka, 1000);

        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 50);
        let record = h
            .ledger
            .transfer(a, b, &proven.calldata(), &proven.signals)
            .unwrap();
        assert_eq!(record.event.name(), "Transfer");
        assert_eq!(h.balance(&a, &ka), Amount::new(950));
        assert_eq!(h.balance(&b, &kb), Amount::new(50));
    }

    #[test]
    fn stale_transfer_is_rejected_without_effect() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        h.mint(a, &ka, 1000);

        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 50);
        h.mint(a, &ka, 1);
        let before_a = h.ledger.balance_of(&a).unwrap();
        let before_b = h.ledger.balance_of(&b).unwrap();
        let events_before = h.ledger.events().len();

        let err = h
            .ledger
            .transfer(a, b, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::StaleBalance(addr) if addr == a));
        assert!(err.is_recoverable());
        assert_eq!(h.ledger.balance_of(&a).unwrap(), before_a);
        assert_eq!(h.ledger.balance_of(&b).unwrap(), before_b);
        assert_eq!(h.ledger.events().len(), events_before);
    }

    #[test]
    fn transfer_to_wrong_recipient_is_rejected() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        let (c, _) = h.register();
        h.mint(a, &ka, 100);
        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 10);
        let err = h
            .ledger
            .transfer(a, c, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::PublicKeyMismatch(addr) if addr == c));
    }

    #[test]
    fn transfer_by_non_sender_is_rejected() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        let (mallory, _) = h.register();
        h.mint(a, &ka, 100);
        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 10);
        let err = h
            .ledger
            .transfer(mallory, b, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::PublicKeyMismatch(addr) if addr == mallory));
    }

    #[test]
    fn self_transfer_is_rejected() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        h.mint(a, &ka, 100);
        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 10);
        let err = h
            .ledger
            .transfer(a, a, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SelfTransfer(_)));
    }

    #[test]
    fn transfer_with_wrong_signal_count_is_malformed() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, _) = h.register();
        let proven = h.prove_mint(&ka, 5);
        let err = h
            .ledger
            .transfer(a, b, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::MalformedSignals(_)));
    }

    #[test]
    fn verify_proof_is_pure_and_repeatable() {
        let mut h = harness();
        let kp = h.keys();
        let proven = h.prove_registration(&kp);
        let cd = proven.calldata();
        for _ in 0..3 {
            assert!(h
                .ledger
                .verify_proof(StatementKind::Registration, &cd, &proven.signals)
                .unwrap());
        }
        assert!(!h
            .ledger
            .verify_proof(StatementKind::Mint, &cd, &proven.signals)
            .unwrap());
        assert!(h.ledger.events().is_empty());
        assert_eq!(h.ledger.registered_count(), 0);
    }

    #[test]
    fn concurrent_transfers_against_same_snapshot_serialize() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        let (c, kc) = h.register();
        h.mint(a, &ka, 100);

        let to_b = h.prove_transfer((&a, &ka), (&b, &kb), 10);
        let to_c = h.prove_transfer((&a, &ka), (&c, &kc), 20);

        let ledger = &h.ledger;
        let (r1, r2) = std::thread::scope(|s| {
            let t1 = s.spawn(|| ledger.transfer(a, b, &to_b.calldata(), &to_b.signals));
            let t2 = s.spawn(|| ledger.transfer(a, c, &to_c.calldata(), &to_c.signals));
            (t1.join().unwrap(), t2.join().unwrap())
        });

        let outcomes = [r1.is_ok(), r2.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let err = if r1.is_err() { r1.unwrap_err() } else { r2.unwrap_err() };
        assert!(matches!(err, LedgerError::StaleBalance(_)));

        let remaining = h.balance(&a, &ka).get();
        assert!(remaining == 90 || remaining == 80);
    }

    #[test]
    fn metadata_accessors() {
        let h = harness();
        assert_eq!(h.ledger.name(), "zkToken");
        assert_eq!(h.ledger.symbol(), "ZKT");
        assert_eq!(h.ledger.decimals(), 0);
    }

    #[test]
    fn events_since_filters_by_sequence() {
        let mut h = harness();
        let (a, ka) = h.register();
        h.mint(a, &ka, 1);
        h.mint(a, &ka, 2);
        let later = h.ledger.events_since(1);
        assert_eq!(later.len(), 2);
        assert!(later.iter().all(|r| r.event.name() == "Mint"));
    }

    // ── Account map hygiene and key width ───────────────────────────

    #[test]
    fn rejected_registrations_leave_no_account_entries() {
        let mut h = harness();
        let kp = h.keys();
        let other = h.keys();
        let proven = h.prove_registration(&kp);
        let mut forged = proven.signals.as_slice().to_vec();
        forged[2] = FieldElement::new(other.public_key().n().clone()).unwrap();
        let forged = PublicSignals::new(forged);

        for _ in 0..16 {
            let addr = Address::random();
            assert!(h
                .ledger
                .registration(addr, &proven.calldata(), &forged)
                .is_err());
            assert!(h.ledger.account(&addr).is_none());
        }
        assert_eq!(h.ledger.accounts.len(), 0);
        assert!(h.ledger.events().is_empty());

        // The honest proof is still unconsumed.
        let addr = Address::random();
        h.ledger
            .registration(addr, &proven.calldata(), &proven.signals)
            .unwrap();
        assert_eq!(h.ledger.accounts.len(), 1);
    }

    /// Accepts every proof, so ledger-side checks are exercised on their own.
    struct AcceptAll;

    impl ProofSystem for AcceptAll {
        type ProvingKey = ();
        type VerifyingKey = ();

        fn prove(
            &self,
            _pk: &(),
            inputs: StatementInputs,
        ) -> Result<ProvenStatement, zkt_zkp::ProofError> {
            let one = FieldElement::from_u64(1);
            Ok(ProvenStatement {
                statement: inputs.kind(),
                signals: inputs.public_signals()?,
                proof: zkt_zkp::Proof {
                    pi_a: [one.clone(), one.clone()],
                    pi_b: [[one.clone(), one.clone()], [one.clone(), one.clone()]],
                    pi_c: [one.clone(), one],
                },
            })
        }

        fn verify(
            &self,
            _vk: &(),
            _signals: &PublicSignals,
            _proof: &zkt_zkp::Proof,
        ) -> Result<bool, VerifyError> {
            Ok(true)
        }
    }

    #[test]
    fn narrow_modulus_is_refused_even_with_a_verifying_proof() {
        let system = Arc::new(AcceptAll);
        let keys = zkt_zkp::StatementKeys {
            registration: (),
            mint: (),
            transfer: (),
        };
        let ledger = ConfidentialLedger::new(
            Verifier::new(Arc::clone(&system), keys),
            LedgerConfig::default(),
        );

        // 2^32 - 5 and 2^32 - 17.
        let narrow = KeyPair::from_primes(
            &BigUint::from(4_294_967_291u64),
            &BigUint::from(4_294_967_279u64),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let pk = narrow.public_key();
        let inputs = StatementInputs::registration(pk, pk.random_nonce(&mut rng)).unwrap();
        let proven = system.prove(&(), inputs).unwrap();

        let addr = Address::random();
        let err = ledger
            .registration(addr, &proven.calldata(), &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NarrowModulus { bits: 64, .. }));
        assert!(!ledger.is_registered(&addr));
        let digest = submission_digest(StatementKind::Registration, &proven.proof, &proven.signals);
        assert!(!ledger.is_consumed(&digest));
    }

    #[test]
    fn failed_transfer_verification_changes_nothing() {
        let mut h = harness();
        let (a, ka) = h.register();
        let (b, kb) = h.register();
        h.mint(a, &ka, 100);
        let proven = h.prove_transfer((&a, &ka), (&b, &kb), 30);

        let mut bad = proven.calldata();
        bad.c[0] = FieldElement::from_u64(3);
        let before = (h.ledger.account(&a).unwrap(), h.ledger.account(&b).unwrap());
        let err = h
            .ledger
            .transfer(a, b, &bad, &proven.signals)
            .unwrap_err();
        assert!(matches!(err, LedgerError::VerificationFailed(StatementKind::Transfer)));
        assert_eq!(h.ledger.balance_of(&a), before.0.encrypted_balance().cloned());
        assert_eq!(h.ledger.balance_of(&b), before.1.encrypted_balance().cloned());
        assert_eq!(h.ledger.account(&a).unwrap().updated_at, before.0.updated_at);

        h.ledger
            .transfer(a, b, &proven.calldata(), &proven.signals)
            .unwrap();
        assert_eq!(h.balance(&a, &ka), Amount::new(70));
        assert_eq!(h.balance(&b, &kb), Amount::new(30));
    }
}
