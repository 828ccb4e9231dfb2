//! # zkt-core — Foundational Types for the Confidential Token Stack
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate shares:
//!
//! 1. **Newtype wrappers for domain primitives.** `Address` and `Amount` are
//!    newtypes with validated constructors. No bare strings for account
//!    identifiers, no bare integers for token amounts.
//!
//! 2. **`FieldElement`.** Every value that crosses the proof boundary is an
//!    element of the BN254 scalar field. Construction rejects anything at or
//!    above the field modulus, so an oversized ciphertext cannot silently wrap
//!    inside a circuit.
//!
//! 3. **`ContentDigest`.** SHA-256 digests used by the ledger replay guard and
//!    by the transparent proof backend.
//!
//! 4. **Decimal serde.** Big integers serialize as base-10 strings, matching the
//!    JSON form the external proving toolchain reads and writes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod amount;
pub mod decimal;
pub mod digest;
pub mod error;
pub mod field;

pub use address::Address;
pub use amount::Amount;
pub use digest::{ContentDigest, Sha256Accumulator};
pub use error::{AddressError, FieldError};
pub use field::{field_modulus, FieldElement};
