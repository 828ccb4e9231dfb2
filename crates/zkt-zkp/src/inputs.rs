//! # Circuit Input Maps
//!
//! The named input object handed to the external prover (`input.json` for
//! `snarkjs groth16 fullprove`). Public keys appear as `[g, r, n]` triples,
//! carrying the encryption randomness next to the key it was used with, and
//! the transfer sender's private key as `[lambda, mu, n]`.
//!
//! The map holds witness material in decimal form. It is never logged and
//! wipes every string on drop; the serialized JSON is returned inside
//! [`Zeroizing`].

use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde::Serialize;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CodecError;
use crate::statement::StatementInputs;

#[derive(Serialize)]
#[serde(untagged)]
enum CircuitValue {
    Scalar(String),
    Vector(Vec<String>),
}

impl Zeroize for CircuitValue {
    fn zeroize(&mut self) {
        match self {
            Self::Scalar(s) => s.zeroize(),
            Self::Vector(v) => v.iter_mut().for_each(Zeroize::zeroize),
        }
    }
}

/// Named circuit inputs for one statement.
#[derive(Serialize)]
#[serde(transparent)]
pub struct CircuitInputs(BTreeMap<&'static str, CircuitValue>);

impl CircuitInputs {
    fn new() -> Self {
        Self(BTreeMap::new())
    }

    fn scalar(&mut self, name: &'static str, value: &BigUint) -> &mut Self {
        self.0.insert(name, CircuitValue::Scalar(value.to_str_radix(10)));
        self
    }

    fn vector(&mut self, name: &'static str, values: &[&BigUint]) -> &mut Self {
        let v = values.iter().map(|x| x.to_str_radix(10)).collect();
        self.0.insert(name, CircuitValue::Vector(v));
        self
    }

    /// Input names in canonical (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn to_json(&self) -> Result<Zeroizing<String>, CodecError> {
        serde_json::to_string(self)
            .map(Zeroizing::new)
            .map_err(|e| CodecError::Artifact(e.to_string()))
    }
}

impl Drop for CircuitInputs {
    fn drop(&mut self) {
        self.0.values_mut().for_each(Zeroize::zeroize);
    }
}

impl std::fmt::Debug for CircuitInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl StatementInputs {
    /// Render the named input map the external circuit expects.
    pub fn circuit_inputs(&self) -> CircuitInputs {
        let mut inputs = CircuitInputs::new();
        match self {
            Self::Registration { public, witness } => {
                let pk = &public.public_key;
                inputs
                    .scalar("encryptedBalance", public.encrypted_balance.as_biguint())
                    .scalar("balance", &BigUint::from(witness.balance.get()))
                    .vector("pubKey", &[pk.g(), &witness.randomness, pk.n()]);
            }
            Self::Mint { public, witness } => {
                let pk = &public.receiver_key;
                inputs
                    .scalar("encryptedValue", public.encrypted_value.as_biguint())
                    .scalar("value", &BigUint::from(witness.value.get()))
                    .vector("receiverPubKey", &[pk.g(), &witness.randomness, pk.n()]);
            }
            Self::Transfer { public, witness } => {
                let sk = &witness.sender_private_key;
                let (ps, pr) = (&public.sender_key, &public.receiver_key);
                inputs
                    .scalar(
                        "encryptedSenderBalance",
                        public.encrypted_sender_balance.as_biguint(),
                    )
                    .scalar(
                        "encryptedSenderValue",
                        public.encrypted_sender_value.as_biguint(),
                    )
                    .scalar(
                        "encryptedReceiverValue",
                        public.encrypted_receiver_value.as_biguint(),
                    )
                    .scalar("value", &BigUint::from(witness.value.get()))
                    .vector("senderPubKey", &[ps.g(), &witness.sender_randomness, ps.n()])
                    .vector(
                        "receiverPubKey",
                        &[pr.g(), &witness.receiver_randomness, pr.n()],
                    )
                    .vector("senderPrivKey", &[sk.lambda(), sk.mu(), sk.n()]);
            }
        }
        inputs
    }
}
