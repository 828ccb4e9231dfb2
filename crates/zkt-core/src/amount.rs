//! # Token Amounts
//!
//! Plaintext token amounts. The token has zero decimals, so an amount is a
//! whole number of units. Amounts only exist in plaintext on the holder's
//! side and inside proof witnesses; the ledger never sees them.

use serde::{Deserialize, Serialize};

/// A whole number of token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    /// The zero amount, used as the registration balance.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw unit count.
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Raw unit count.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the zero amount.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
