//! # Ledger Events
//!
//! Each accepted operation emits exactly one event. Events carry only
//! public data: addresses, public keys and ciphertexts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zkt_core::Address;
use zkt_crypto::{Ciphertext, PublicKey};
use zkt_zkp::StatementKind;

/// Event emitted by a successful ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    Registration {
        address: Address,
        public_key: PublicKey,
    },
    Mint {
        minter: Address,
        to: Address,
        encrypted_value: Ciphertext,
    },
    Transfer {
        from: Address,
        to: Address,
        encrypted_sender_value: Ciphertext,
        encrypted_receiver_value: Ciphertext,
    },
}

impl LedgerEvent {
    /// Event name: `Registration`, `Mint` or `Transfer`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registration { .. } => "Registration",
            Self::Mint { .. } => "Mint",
            Self::Transfer { .. } => "Transfer",
        }
    }

    pub fn statement(&self) -> StatementKind {
        match self {
            Self::Registration { .. } => StatementKind::Registration,
            Self::Mint { .. } => StatementKind::Mint,
            Self::Transfer { .. } => StatementKind::Transfer,
        }
    }

    /// Whether `address` is a party to the event.
    pub fn involves(&self, address: &Address) -> bool {
        match self {
            Self::Registration { address: a, .. } => a == address,
            Self::Mint { to, .. } => to == address,
            Self::Transfer { from, to, .. } => from == address || to == address,
        }
    }
}

/// An event with its position in the ledger's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Starts at 1 and increases by one per accepted operation.
    pub sequence: u64,
    pub event: LedgerEvent,
    pub timestamp: DateTime<Utc>,
}
