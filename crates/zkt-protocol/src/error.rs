//! # Protocol Error Types
//!
//! Cryptosystem, codec and proving errors pass through unchanged. Ledger
//! rejections keep their [`LedgerError`] so callers can tell a failed
//! verification from an input error.

use thiserror::Error;
use zkt_crypto::CryptoError;
use zkt_ledger::LedgerError;
use zkt_zkp::{ProofError, StatementKind};

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("cryptosystem error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("proving error: {0}")]
    Proving(#[from] ProofError),

    #[error("ledger rejected operation: {0}")]
    Ledger(#[from] LedgerError),

    /// Proof generation exceeded the configured bound. Nothing was submitted.
    #[error("{statement} proof generation timed out after {timeout_ms} ms")]
    ProvingTimeout {
        statement: StatementKind,
        timeout_ms: u64,
    },

    /// The proving task panicked or was cancelled. Nothing was submitted.
    #[error("{statement} proof generation aborted: {reason}")]
    ProvingAborted {
        statement: StatementKind,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The ledger answered a query with a view of the wrong shape.
    #[error("unexpected ledger response: {0}")]
    UnexpectedResponse(String),
}

impl ProtocolError {
    /// True when rebuilding a fresh proof may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Ledger(e) => e.is_recoverable(),
            Self::ProvingTimeout { .. } => true,
            _ => false,
        }
    }
}
