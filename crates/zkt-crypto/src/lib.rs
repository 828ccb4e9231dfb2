//! # zkt-crypto — Homomorphic Cryptosystem
//!
//! Paillier encryption over `Z_n` with ciphertexts in `Z*_{n^2}`:
//!
//! - **Keys** (`paillier.rs`): `KeyPair::generate(bits)` produces
//!   `n = p*q`, `g = n + 1`, `lambda = lcm(p-1, q-1)` and
//!   `mu = L(g^lambda mod n^2)^-1 mod n`.
//! - **Encryption** is deterministic given the caller's randomness `r`, so a
//!   proof circuit can bind the exact `r` used off-circuit.
//! - **Homomorphic operations** (`homomorphic.rs`): `add` multiplies
//!   ciphertexts, `negate` inverts, `scale` exponentiates.
//!
//! ## Plaintext Semantics
//!
//! Plaintexts live in `Z_n`. Encrypting `n - v` is how the protocol encrypts
//! `-v`; a balance that goes below zero wraps to a large residue. The
//! arithmetic provides no range safety on its own; overdraft checks belong to
//! the transfer statement.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkt-core` internally.
//! - Private key material is zeroized on drop and never implements `Serialize`.
//! - No `.unwrap()` outside tests.

pub mod arith;
pub mod ciphertext;
pub mod error;
pub mod homomorphic;
pub mod paillier;
pub mod primes;

pub use ciphertext::Ciphertext;
pub use error::CryptoError;
pub use homomorphic::homomorphic_add;
pub use paillier::{
    KeyPair, PrivateKey, PublicKey, MAX_KEYGEN_ATTEMPTS, MIN_ACCOUNT_KEY_BITS, MIN_KEY_BITS,
};
