//! Token Vault
//!
//! In-process stand-in for the token host. Balances are keyed by
//! `(token, holder)`; transfers either fully apply or leave balances as
//! they were.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vault errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Sender does not hold enough of the token.
    #[error("insufficient balance: {holder} holds {available} of {token}, needs {needed}")]
    InsufficientBalance {
        /// Token moved.
        token: Address,
        /// Debited holder.
        holder: Address,
        /// Requested amount.
        needed: U256,
        /// Current balance.
        available: U256,
    },
    /// Credit would overflow 256 bits.
    #[error("balance overflow for {holder} in {token}")]
    Overflow {
        /// Token moved.
        token: Address,
        /// Credited holder.
        holder: Address,
    },
}

/// Multi-token balance book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVault {
    balances: BTreeMap<(Address, Address), U256>,
}

impl TokenVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `holder` in `token`.
    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances.get(&(token, holder)).copied().unwrap_or(U256::ZERO)
    }

    /// Sum of all balances in `token`.
    pub fn total_supply(&self, token: Address) -> U256 {
        self.balances
            .range((token, Address::ZERO)..=(token, Address::repeat_byte(0xff)))
            .fold(U256::ZERO, |acc, (_, v)| acc.saturating_add(*v))
    }

    /// Issue new tokens to `to`.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), VaultError> {
        let balance = self.balance_of(token, to);
        let credited = balance
            .checked_add(amount)
            .ok_or(VaultError::Overflow { token, holder: to })?;
        self.set(token, to, credited);
        Ok(())
    }

    /// Move `amount` of `token` from `from` to `to`.
    pub fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<(), VaultError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(VaultError::InsufficientBalance {
                token,
                holder: from,
                needed: amount,
                available,
            });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }

        let credited = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(VaultError::Overflow { token, holder: to })?;
        self.set(token, from, available - amount);
        self.set(token, to, credited);
        Ok(())
    }

    fn set(&mut self, token: Address, holder: Address, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&(token, holder));
        } else {
            self.balances.insert((token, holder), amount);
        }
    }
}
