//! # zkt-protocol — Protocol Orchestration
//!
//! The only layer callers drive directly. For each operation it builds the
//! statement inputs, proves them off the async executor with a timeout,
//! and submits the resulting calldata through a [`LedgerClient`].
//!
//! ```text
//! AccountHolder ──► StatementInputs ──► Prover (blocking pool) ──► LedgerClient
//!                        ▲                                            │
//!                        └────────── fresh balance on StaleBalance ◄──┘
//! ```
//!
//! [`LedgerClient`]: zkt_ledger::LedgerClient

pub mod config;
pub mod error;
pub mod holder;
pub mod orchestrator;

pub use config::{ConfigError, ProtocolConfig, MAX_KEY_BITS};
pub use error::ProtocolError;
pub use holder::AccountHolder;
pub use orchestrator::ProtocolOrchestrator;
