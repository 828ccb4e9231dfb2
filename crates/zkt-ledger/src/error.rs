//! # Ledger Error Types
//!
//! Every error leaves ledger state unchanged. [`LedgerError::is_recoverable`]
//! separates the expected rejection paths (a proof that does not verify, a
//! balance that moved since proving) from input and programmer errors.

use thiserror::Error;
use zkt_core::{Address, ContentDigest};
use zkt_crypto::CryptoError;
use zkt_zkp::{CodecError, StatementKind, VerifyError};

/// Errors from ledger entry points.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Registration is not re-enterable for an address.
    #[error("account {0} is already registered")]
    AlreadyRegistered(Address),

    /// Mint and transfer require registered accounts.
    #[error("account {0} is not registered")]
    NotRegistered(Address),

    /// The proof was built against a balance that is no longer current.
    #[error("stale balance for {0}: proof was built against an outdated ciphertext")]
    StaleBalance(Address),

    /// The proof did not verify. A normal rejection, not a crash.
    #[error("{0} proof failed verification")]
    VerificationFailed(StatementKind),

    /// The exact `(statement, proof, signals)` was already accepted once.
    #[error("proof already consumed ({0})")]
    ProofReplayed(ContentDigest),

    /// The signals name a different public key than the one registered.
    #[error("public key in proof does not match the key registered for {0}")]
    PublicKeyMismatch(Address),

    /// Every `u64` amount must be a canonical plaintext under a registered key.
    #[error("public key for {address} has a {bits}-bit modulus, which does not exceed the amount range")]
    NarrowModulus { address: Address, bits: u64 },

    /// Mint policy does not allow this caller to mint.
    #[error("{0} is not an authorized minter")]
    UnauthorizedMinter(Address),

    #[error("transfer from {0} to itself")]
    SelfTransfer(Address),

    /// Public signals do not decode under the statement's layout.
    #[error("malformed public signals: {0}")]
    MalformedSignals(#[from] CodecError),

    /// Homomorphic update failed.
    #[error("cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// The verification backend could not decide.
    #[error("verifier error: {0}")]
    Verifier(#[from] VerifyError),
}

impl LedgerError {
    /// `true` for outcomes a caller may retry with a freshly built proof.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::VerificationFailed(_) | Self::StaleBalance(_))
    }
}
