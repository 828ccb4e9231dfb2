//! # Ledger Client Interface
//!
//! The seam between the orchestrator and whatever hosts the ledger. The
//! in-process [`ConfidentialLedger`] implements it directly; a networked
//! ledger would implement it over RPC.

use serde::{Deserialize, Serialize};
use zkt_core::Address;
use zkt_crypto::{Ciphertext, PublicKey};
use zkt_zkp::{ProofCalldata, ProofSystem, PublicSignals};

use crate::config::TokenMetadata;
use crate::error::LedgerError;
use crate::events::EventRecord;
use crate::ledger::ConfidentialLedger;

/// A state-changing ledger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerTransaction {
    Registration {
        caller: Address,
        calldata: ProofCalldata,
        signals: PublicSignals,
    },
    Mint {
        caller: Address,
        to: Address,
        calldata: ProofCalldata,
        signals: PublicSignals,
    },
    Transfer {
        caller: Address,
        to: Address,
        calldata: ProofCalldata,
        signals: PublicSignals,
    },
}

/// A read-only ledger query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum StateQuery {
    BalanceOf { address: Address },
    PublicKey { address: Address },
    Metadata,
}

/// Answer to a [`StateQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateView {
    Balance(Option<Ciphertext>),
    PublicKey(Option<PublicKey>),
    Metadata(TokenMetadata),
}

/// Submit transactions to and read state from a ledger.
pub trait LedgerClient: Send + Sync {
    fn submit_transaction(&self, tx: LedgerTransaction) -> Result<EventRecord, LedgerError>;

    fn read_state(&self, query: StateQuery) -> Result<StateView, LedgerError>;
}

impl<P: ProofSystem> LedgerClient for ConfidentialLedger<P> {
    fn submit_transaction(&self, tx: LedgerTransaction) -> Result<EventRecord, LedgerError> {
        match tx {
            LedgerTransaction::Registration {
                caller,
                calldata,
                signals,
            } => self.registration(caller, &calldata, &signals),
            LedgerTransaction::Mint {
                caller,
                to,
                calldata,
                signals,
            } => self.mint(caller, to, &calldata, &signals),
            LedgerTransaction::Transfer {
                caller,
                to,
                calldata,
                signals,
            } => self.transfer(caller, to, &calldata, &signals),
        }
    }

    fn read_state(&self, query: StateQuery) -> Result<StateView, LedgerError> {
        Ok(match query {
            StateQuery::BalanceOf { address } => StateView::Balance(self.balance_of(&address)),
            StateQuery::PublicKey { address } => StateView::PublicKey(self.public_key(&address)),
            StateQuery::Metadata => StateView::Metadata(self.metadata().clone()),
        })
    }
}

impl<C: LedgerClient + ?Sized> LedgerClient for std::sync::Arc<C> {
    fn submit_transaction(&self, tx: LedgerTransaction) -> Result<EventRecord, LedgerError> {
        (**self).submit_transaction(tx)
    }

    fn read_state(&self, query: StateQuery) -> Result<StateView, LedgerError> {
        (**self).read_state(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use std::sync::Arc;
    use zkt_zkp::{MockProofSystem, Verifier};

    fn ledger() -> ConfidentialLedger<MockProofSystem> {
        let system = Arc::new(MockProofSystem::new());
        let (_, vks) = system.setup_all("client-tests");
        ConfidentialLedger::new(Verifier::new(system, vks), LedgerConfig::default())
    }

    #[test]
    fn read_state_on_empty_ledger() {
        let l = ledger();
        let addr = Address::random();
        assert_eq!(
            l.read_state(StateQuery::BalanceOf { address: addr }).unwrap(),
            StateView::Balance(None)
        );
        assert_eq!(
            l.read_state(StateQuery::PublicKey { address: addr }).unwrap(),
            StateView::PublicKey(None)
        );
        match l.read_state(StateQuery::Metadata).unwrap() {
            StateView::Metadata(m) => assert_eq!(m.symbol, "ZKT"),
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn arc_forwards_to_inner_client() {
        let l: Arc<dyn LedgerClient> = Arc::new(ledger());
        assert!(matches!(
            l.read_state(StateQuery::Metadata).unwrap(),
            StateView::Metadata(_)
        ));
    }

    #[test]
    fn transaction_serializes_with_kind_tag() {
        let q = StateQuery::BalanceOf {
            address: Address::from_bytes([1; 20]),
        };
        let json = serde_json::to_value(q).unwrap();
        assert_eq!(json["query"], "balance_of");
    }
}
