//! # zkt-ledger — Confidential Ledger
//!
//! The verifying authority. Per address it stores a Paillier public key and
//! an encrypted balance, and it changes them only through three proof-gated
//! entry points:
//!
//! | Entry point    | Precondition                               | Effect                                   |
//! |----------------|--------------------------------------------|------------------------------------------|
//! | `registration` | caller unregistered, proof verifies        | store key, balance := proven `Enc(0)`    |
//! | `mint`         | recipient registered, key matches, verifies | balance := balance * encryptedValue      |
//! | `transfer`     | both registered, keys match, balance fresh, verifies | sender *= encSenderValue, receiver *= encReceiverValue |
//!
//! Each accepted operation emits exactly one [`LedgerEvent`]. Every failure
//! leaves state unchanged.
//!
//! ## Crate Policy
//!
//! - The ledger never decrypts and never sees a private key.
//! - Accepted submissions are fingerprinted; a proof authorizes at most one
//!   state transition.

pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;

pub use account::{Account, AccountState};
pub use client::{LedgerClient, LedgerTransaction, StateQuery, StateView};
pub use config::{LedgerConfig, MintPolicy, TokenMetadata};
pub use error::LedgerError;
pub use events::{EventRecord, LedgerEvent};
pub use ledger::ConfidentialLedger;
