//! # Account State Machine
//!
//! ```text
//! Unregistered ──Registration──▶ Registered ──Mint / Transfer──▶ Registered
//! ```
//!
//! `Unregistered` accepts only registration. `Registered` is terminal: a
//! second registration is rejected, and the balance changes only through
//! [`Account::apply_balance`]. The ledger applies transitions to a copy and
//! swaps the copy in once the proof has verified.

use chrono::{DateTime, Utc};
use serde::Serialize;
use zkt_core::Address;
use zkt_crypto::{Ciphertext, PublicKey};

use crate::error::LedgerError;

/// Lifecycle state of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccountState {
    Unregistered,
    Registered {
        public_key: PublicKey,
        encrypted_balance: Ciphertext,
    },
}

/// An account record.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub address: Address,
    state: AccountState,
    pub registered_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A fresh account, created at first reference.
    pub fn unregistered(address: Address) -> Self {
        Self {
            address,
            state: AccountState::Unregistered,
            registered_at: None,
            updated_at: None,
        }
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.state, AccountState::Registered { .. })
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        match &self.state {
            AccountState::Registered { public_key, .. } => Some(public_key),
            AccountState::Unregistered => None,
        }
    }

    pub fn encrypted_balance(&self) -> Option<&Ciphertext> {
        match &self.state {
            AccountState::Registered {
                encrypted_balance, ..
            } => Some(encrypted_balance),
            AccountState::Unregistered => None,
        }
    }

    /// Key and balance of a registered account.
    pub(crate) fn registered(&self) -> Result<(&PublicKey, &Ciphertext), LedgerError> {
        match &self.state {
            AccountState::Registered {
                public_key,
                encrypted_balance,
            } => Ok((public_key, encrypted_balance)),
            AccountState::Unregistered => Err(LedgerError::NotRegistered(self.address)),
        }
    }

    /// `Unregistered -> Registered`.
    pub(crate) fn register(
        &mut self,
        public_key: PublicKey,
        encrypted_balance: Ciphertext,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if self.is_registered() {
            return Err(LedgerError::AlreadyRegistered(self.address));
        }
        self.state = AccountState::Registered {
            public_key,
            encrypted_balance,
        };
        self.registered_at = Some(now);
        self.updated_at = Some(now);
        Ok(())
    }

    /// Replace the balance of a registered account.
    pub(crate) fn apply_balance(
        &mut self,
        new_balance: Ciphertext,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        match &mut self.state {
            AccountState::Registered {
                encrypted_balance, ..
            } => {
                *encrypted_balance = new_balance;
                self.updated_at = Some(now);
                Ok(())
            }
            AccountState::Unregistered => Err(LedgerError::NotRegistered(self.address)),
        }
    }
}
