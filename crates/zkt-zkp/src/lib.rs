//! # zkt-zkp — Statements, Proofs and Proof Backends
//!
//! Everything between domain values and an accept/reject decision:
//!
//! - **Statements** (`statement.rs`): the registration, mint and transfer
//!   layouts, builders from keys and amounts, decoding of public signals
//!   back into ciphertexts and keys, and the relation each statement proves.
//! - **Circuit inputs** (`inputs.rs`): the named input map the external
//!   prover consumes.
//! - **Proofs** (`proof.rs`): `Proof`, the `piB`-swapped `ProofCalldata`,
//!   `PublicSignals`, snarkjs JSON parsing, submission digests.
//! - **Backends**: the [`ProofSystem`] trait, a transparent [`mock`]
//!   backend and a [`snarkjs`] adapter, each behind a feature flag.
//! - **Adapters** (`adapter.rs`): [`Prover`] and [`Verifier`] bind a backend
//!   to one key per statement.
//! - **Cancellation** (`cancel.rs`): [`CancelFlag`], raised by a caller that
//!   stops waiting for a proof.
//!
//! ## Crate Policy
//!
//! - Witnesses are consumed by `prove` and wiped on drop.
//! - `verify` is pure: no ledger state, no side effects beyond the backend's
//!   own scratch files.

pub mod adapter;
pub mod cancel;
pub mod error;
pub mod inputs;
pub mod proof;
pub mod statement;
pub mod traits;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "snarkjs")]
pub mod snarkjs;

pub use adapter::{Prover, Verifier};
pub use cancel::{CancelFlag, CancelOnDrop};
pub use error::{CodecError, ProofError, VerifyError};
pub use inputs::CircuitInputs;
pub use proof::{submission_digest, Proof, ProofCalldata, ProvenStatement, PublicSignals};
pub use statement::{
    MintPublic, MintWitness, RegistrationPublic, RegistrationWitness, StatementInputs,
    StatementKind, TransferPublic, TransferWitness,
};
pub use traits::{ProofSystem, StatementKeys};

#[cfg(feature = "mock")]
pub use mock::MockProofSystem;

#[cfg(feature = "snarkjs")]
pub use snarkjs::SnarkjsProofSystem;
