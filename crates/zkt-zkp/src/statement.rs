//! # Statements
//!
//! Each statement fixes an ordered public signal layout and a private
//! witness:
//!
//! | Statement    | Public signals                                                   | Witness                         |
//! |--------------|------------------------------------------------------------------|---------------------------------|
//! | Registration | `[encryptedBalance, g, n]`                                       | `balance = 0`, `r`              |
//! | Mint         | `[encryptedValue, g, n]`                                         | `value`, `r`                    |
//! | Transfer     | `[encSenderBalance, encSenderValue, encReceiverValue, gS, nS, gR, nR]` | `value`, `r_s`, `r_r`, `(lambda, mu, n)` |
//!
//! Builders take domain values (keys, amounts, randomness) and compute the
//! ciphertexts themselves, so the public part is always consistent with the
//! randomness the witness carries.
//!
//! ## Security Invariant
//!
//! Witness types never implement `Serialize`, their `Debug` output is
//! redacted, and they wipe their contents on drop. A [`StatementInputs`]
//! value is consumed by `prove`, so the witness (including a transfer
//! sender's private key) is gone as soon as proving returns.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;
use zkt_core::{Amount, FieldElement};
use zkt_crypto::arith::wipe;
use zkt_crypto::{Ciphertext, CryptoError, PrivateKey, PublicKey};

use crate::error::{CodecError, ProofError};
use crate::proof::PublicSignals;

/// The three statement types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Registration,
    Mint,
    Transfer,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [Self::Registration, Self::Mint, Self::Transfer];

    /// Circuit identifier used for artifact file names and digests.
    pub fn circuit_id(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Mint => "mint",
            Self::Transfer => "transfer",
        }
    }

    pub fn public_signal_count(self) -> usize {
        match self {
            Self::Registration | Self::Mint => 3,
            Self::Transfer => 7,
        }
    }

    fn expect_len(self, signals: &PublicSignals) -> Result<(), CodecError> {
        let expected = self.public_signal_count();
        if signals.len() != expected {
            return Err(CodecError::SignalCount {
                statement: self,
                expected,
                actual: signals.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.circuit_id())
    }
}

// ---------------------------------------------------------------------------
// Signal helpers
// ---------------------------------------------------------------------------

fn key_signals(pk: &PublicKey) -> Result<[FieldElement; 2], CodecError> {
    Ok([
        FieldElement::new(pk.g().clone())?,
        FieldElement::new(pk.n().clone())?,
    ])
}

fn key_from_signals(g: &FieldElement, n: &FieldElement) -> Result<PublicKey, CodecError> {
    PublicKey::new(g.as_biguint().clone(), n.as_biguint().clone())
        .map_err(|e| CodecError::InvalidKey(e.to_string()))
}

fn ciphertext_under(
    fe: &FieldElement,
    pk: &PublicKey,
    what: &str,
) -> Result<Ciphertext, CodecError> {
    if fe.as_biguint() >= &pk.n_squared() {
        return Err(CodecError::CiphertextOutOfRange(format!(
            "{what} is not below n^2"
        )));
    }
    Ok(Ciphertext::from(fe.clone()))
}

fn signal_at(signals: &PublicSignals, i: usize) -> &FieldElement {
    // Callers check the length against the layout first.
    &signals.as_slice()[i]
}

fn unsatisfied(msg: impl Into<String>) -> ProofError {
    ProofError::UnsatisfiedConstraint(msg.into())
}

fn crypto_unsatisfied(e: CryptoError) -> ProofError {
    ProofError::UnsatisfiedConstraint(e.to_string())
}

/// Every `u64` amount must be a canonical plaintext under `pk`.
fn require_amount_range(pk: &PublicKey, role: &str) -> Result<(), ProofError> {
    if !pk.covers_amounts() {
        return Err(unsatisfied(format!(
            "{role} modulus has {} bits and does not exceed the amount range",
            pk.bits()
        )));
    }
    Ok(())
}

fn require_below_modulus(value: Amount, pk: &PublicKey, role: &str) -> Result<(), ProofError> {
    if &BigUint::from(value.get()) >= pk.n() {
        return Err(unsatisfied(format!("value is not below the {role} modulus")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Public part of a registration: a zero-balance ciphertext and the key it is under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPublic {
    pub encrypted_balance: Ciphertext,
    pub public_key: PublicKey,
}

impl RegistrationPublic {
    pub fn to_signals(&self) -> Result<PublicSignals, CodecError> {
        let [g, n] = key_signals(&self.public_key)?;
        Ok(PublicSignals::new(vec![
            self.encrypted_balance.to_field_element()?,
            g,
            n,
        ]))
    }

    pub fn from_signals(signals: &PublicSignals) -> Result<Self, CodecError> {
        StatementKind::Registration.expect_len(signals)?;
        let public_key = key_from_signals(signal_at(signals, 1), signal_at(signals, 2))?;
        let encrypted_balance =
            ciphertext_under(signal_at(signals, 0), &public_key, "encryptedBalance")?;
        Ok(Self {
            encrypted_balance,
            public_key,
        })
    }
}

/// Registration witness: the zero balance and its randomness.
pub struct RegistrationWitness {
    pub balance: Amount,
    pub randomness: BigUint,
}

// ---------------------------------------------------------------------------
// Mint
// ---------------------------------------------------------------------------

/// Public part of a mint: the encrypted issuance and the recipient key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintPublic {
    pub encrypted_value: Ciphertext,
    pub receiver_key: PublicKey,
}

impl MintPublic {
    pub fn to_signals(&self) -> Result<PublicSignals, CodecError> {
        let [g, n] = key_signals(&self.receiver_key)?;
        Ok(PublicSignals::new(vec![
            self.encrypted_value.to_field_element()?,
            g,
            n,
        ]))
    }

    pub fn from_signals(signals: &PublicSignals) -> Result<Self, CodecError> {
        StatementKind::Mint.expect_len(signals)?;
        let receiver_key = key_from_signals(signal_at(signals, 1), signal_at(signals, 2))?;
        let encrypted_value =
            ciphertext_under(signal_at(signals, 0), &receiver_key, "encryptedValue")?;
        Ok(Self {
            encrypted_value,
            receiver_key,
        })
    }
}

/// Mint witness: the issued amount and its randomness.
pub struct MintWitness {
    pub value: Amount,
    pub randomness: BigUint,
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Public part of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPublic {
    /// Sender's balance ciphertext the proof was built against.
    pub encrypted_sender_balance: Ciphertext,
    /// `Enc(senderKey, n - value)`.
    pub encrypted_sender_value: Ciphertext,
    /// `Enc(receiverKey, value)`.
    pub encrypted_receiver_value: Ciphertext,
    pub sender_key: PublicKey,
    pub receiver_key: PublicKey,
}

impl TransferPublic {
    pub fn to_signals(&self) -> Result<PublicSignals, CodecError> {
        let [gs, ns] = key_signals(&self.sender_key)?;
        let [gr, nr] = key_signals(&self.receiver_key)?;
        Ok(PublicSignals::new(vec![
            self.encrypted_sender_balance.to_field_element()?,
            self.encrypted_sender_value.to_field_element()?,
            self.encrypted_receiver_value.to_field_element()?,
            gs,
            ns,
            gr,
            nr,
        ]))
    }

    pub fn from_signals(signals: &PublicSignals) -> Result<Self, CodecError> {
        StatementKind::Transfer.expect_len(signals)?;
        let sender_key = key_from_signals(signal_at(signals, 3), signal_at(signals, 4))?;
        let receiver_key = key_from_signals(signal_at(signals, 5), signal_at(signals, 6))?;
        Ok(Self {
            encrypted_sender_balance: ciphertext_under(
                signal_at(signals, 0),
                &sender_key,
                "encryptedSenderBalance",
            )?,
            encrypted_sender_value: ciphertext_under(
                signal_at(signals, 1),
                &sender_key,
                "encryptedSenderValue",
            )?,
            encrypted_receiver_value: ciphertext_under(
                signal_at(signals, 2),
                &receiver_key,
                "encryptedReceiverValue",
            )?,
            sender_key,
            receiver_key,
        })
    }
}

/// Transfer witness. Holds the sender's private key for the duration of proving.
pub struct TransferWitness {
    pub value: Amount,
    pub sender_randomness: BigUint,
    pub receiver_randomness: BigUint,
    pub sender_private_key: PrivateKey,
}

// ---------------------------------------------------------------------------
// Witness hygiene
// ---------------------------------------------------------------------------

impl Drop for RegistrationWitness {
    fn drop(&mut self) {
        self.balance.0.zeroize();
        wipe(&mut self.randomness);
    }
}

impl Drop for MintWitness {
    fn drop(&mut self) {
        self.value.0.zeroize();
        wipe(&mut self.randomness);
    }
}

impl Drop for TransferWitness {
    fn drop(&mut self) {
        self.value.0.zeroize();
        wipe(&mut self.sender_randomness);
        wipe(&mut self.receiver_randomness);
        // The private key wipes itself when dropped.
    }
}

macro_rules! redacted_debug {
    ($($ty:ident),*) => {$(
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!(stringify!($ty), "([REDACTED])"))
            }
        }
    )*};
}

redacted_debug!(RegistrationWitness, MintWitness, TransferWitness);

// ---------------------------------------------------------------------------
// Statement inputs
// ---------------------------------------------------------------------------

/// Public inputs and witness of one statement, ready for proving.
#[derive(Debug)]
pub enum StatementInputs {
    Registration {
        public: RegistrationPublic,
        witness: RegistrationWitness,
    },
    Mint {
        public: MintPublic,
        witness: MintWitness,
    },
    Transfer {
        public: TransferPublic,
        witness: TransferWitness,
    },
}

impl StatementInputs {
    /// Registration inputs: encrypts a zero balance under `public_key` with `r`.
    pub fn registration(public_key: &PublicKey, r: BigUint) -> Result<Self, CryptoError> {
        let encrypted_balance = public_key.encrypt_amount(Amount::ZERO, &r)?;
        Ok(Self::Registration {
            public: RegistrationPublic {
                encrypted_balance,
                public_key: public_key.clone(),
            },
            witness: RegistrationWitness {
                balance: Amount::ZERO,
                randomness: r,
            },
        })
    }

    /// Mint inputs: encrypts `value` under the recipient key with `r`.
    pub fn mint(receiver_key: &PublicKey, value: Amount, r: BigUint) -> Result<Self, CryptoError> {
        let encrypted_value = receiver_key.encrypt_amount(value, &r)?;
        Ok(Self::Mint {
            public: MintPublic {
                encrypted_value,
                receiver_key: receiver_key.clone(),
            },
            witness: MintWitness {
                value,
                randomness: r,
            },
        })
    }

    /// Transfer inputs against the sender's current balance ciphertext.
    ///
    /// Encrypts `n_s - value` under the sender key with `r_s` and `value`
    /// under the receiver key with `r_r`. The private key is cloned into
    /// the witness and wiped with it.
    pub fn transfer(
        sender_key: &PublicKey,
        sender_private_key: &PrivateKey,
        encrypted_sender_balance: Ciphertext,
        receiver_key: &PublicKey,
        value: Amount,
        r_s: BigUint,
        r_r: BigUint,
    ) -> Result<Self, CryptoError> {
        let encrypted_sender_value = sender_key.encrypt_negated(value, &r_s)?;
        let encrypted_receiver_value = receiver_key.encrypt_amount(value, &r_r)?;
        Ok(Self::Transfer {
            public: TransferPublic {
                encrypted_sender_balance,
                encrypted_sender_value,
                encrypted_receiver_value,
                sender_key: sender_key.clone(),
                receiver_key: receiver_key.clone(),
            },
            witness: TransferWitness {
                value,
                sender_randomness: r_s,
                receiver_randomness: r_r,
                sender_private_key: sender_private_key.clone(),
            },
        })
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Registration { .. } => StatementKind::Registration,
            Self::Mint { .. } => StatementKind::Mint,
            Self::Transfer { .. } => StatementKind::Transfer,
        }
    }

    pub fn public_signals(&self) -> Result<PublicSignals, CodecError> {
        match self {
            Self::Registration { public, .. } => public.to_signals(),
            Self::Mint { public, .. } => public.to_signals(),
            Self::Transfer { public, .. } => public.to_signals(),
        }
    }

    /// Evaluate the statement's relation on the witness.
    ///
    /// This is the relation a circuit for the statement enforces; backends
    /// run it before proving so a false statement never yields a proof.
    pub fn check_constraints(&self) -> Result<(), ProofError> {
        match self {
            Self::Registration { public, witness } => {
                if !witness.balance.is_zero() {
                    return Err(unsatisfied("registration balance must be zero"));
                }
                require_amount_range(&public.public_key, "pubKey")?;
                let expected = public
                    .public_key
                    .encrypt_amount(witness.balance, &witness.randomness)
                    .map_err(crypto_unsatisfied)?;
                if expected != public.encrypted_balance {
                    return Err(unsatisfied(
                        "encryptedBalance is not Enc(pubKey, 0; r)",
                    ));
                }
                Ok(())
            }
            Self::Mint { public, witness } => {
                if witness.value.is_zero() {
                    return Err(unsatisfied("mint value must be at least 1"));
                }
                require_amount_range(&public.receiver_key, "receiverPubKey")?;
                require_below_modulus(witness.value, &public.receiver_key, "receiverPubKey")?;
                let expected = public
                    .receiver_key
                    .encrypt_amount(witness.value, &witness.randomness)
                    .map_err(crypto_unsatisfied)?;
                if expected != public.encrypted_value {
                    return Err(unsatisfied(
                        "encryptedValue is not Enc(receiverPubKey, value; r)",
                    ));
                }
                Ok(())
            }
            Self::Transfer { public, witness } => {
                let sk = &witness.sender_private_key;
                if !sk.corresponds_to(&public.sender_key) {
                    return Err(unsatisfied("private key does not match senderPubKey"));
                }
                require_amount_range(&public.sender_key, "senderPubKey")?;
                require_amount_range(&public.receiver_key, "receiverPubKey")?;
                let balance = sk
                    .decrypt(&public.encrypted_sender_balance)
                    .map_err(crypto_unsatisfied)?
                    .to_u64()
                    .ok_or_else(|| unsatisfied("sender balance is not a canonical amount"))?;
                if witness.value.is_zero() {
                    return Err(unsatisfied("transfer value must be at least 1"));
                }
                if witness.value.get() > balance {
                    return Err(unsatisfied("transfer value exceeds sender balance"));
                }
                require_below_modulus(witness.value, &public.sender_key, "senderPubKey")?;
                require_below_modulus(witness.value, &public.receiver_key, "receiverPubKey")?;
                let sender_value = public
                    .sender_key
                    .encrypt_negated(witness.value, &witness.sender_randomness)
                    .map_err(crypto_unsatisfied)?;
                if sender_value != public.encrypted_sender_value {
                    return Err(unsatisfied(
                        "encryptedSenderValue is not Enc(senderPubKey, n - value; r_s)",
                    ));
                }
                let receiver_value = public
                    .receiver_key
                    .encrypt_amount(witness.value, &witness.receiver_randomness)
                    .map_err(crypto_unsatisfied)?;
                if receiver_value != public.encrypted_receiver_value {
                    return Err(unsatisfied(
                        "encryptedReceiverValue is not Enc(receiverPubKey, value; r_r)",
                    ));
                }
                Ok(())
            }
        }
    }
}
