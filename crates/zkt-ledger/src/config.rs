//! Ledger configuration: token metadata and mint policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use zkt_core::Address;

/// Token metadata exposed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "zkToken".to_string(),
            symbol: "ZKT".to_string(),
            decimals: 0,
        }
    }
}

/// Who may call `mint`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MintPolicy {
    /// Any caller may mint.
    #[default]
    Open,
    /// Only listed addresses may mint.
    Authorized { minters: BTreeSet<Address> },
}

impl MintPolicy {
    pub fn allows(&self, caller: &Address) -> bool {
        match self {
            Self::Open => true,
            Self::Authorized { minters } => minters.contains(caller),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub metadata: TokenMetadata,
    #[serde(default)]
    pub mint_policy: MintPolicy,
}
