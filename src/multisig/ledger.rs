//! Vault balances
//!
//! The treasury is the vault's own entry. Deposits flow in, successful
//! external calls flow out, and recovery payouts move value from the
//! treasury to guardians. Nothing else creates or destroys value, so the sum
//! of all entries always equals `total_deposited - total_paid_out`.

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accrued value per address
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Balances {
    /// The vault's own address
    treasury: Address,
    /// Balances: address -> amount
    entries: BTreeMap<Address, u128>,
    /// Lifetime deposits
    total_deposited: u128,
    /// Lifetime value sent out by successful external calls
    total_paid_out: u128,
}

impl Balances {
    /// Create an empty ledger for a treasury address
    pub fn new(treasury: Address) -> Self {
        Self {
            treasury,
            entries: BTreeMap::new(),
            total_deposited: 0,
            total_paid_out: 0,
        }
    }

    /// Get the treasury address
    pub fn treasury(&self) -> &Address {
        &self.treasury
    }

    /// Get balance of an address
    pub fn balance_of(&self, address: &Address) -> u128 {
        self.entries.get(address).copied().unwrap_or(0)
    }

    /// Get the treasury balance
    pub fn treasury_balance(&self) -> u128 {
        self.balance_of(&self.treasury)
    }

    /// Lifetime deposits
    pub fn total_deposited(&self) -> u128 {
        self.total_deposited
    }

    /// Lifetime value paid out
    pub fn total_paid_out(&self) -> u128 {
        self.total_paid_out
    }

    /// Sum of all entries
    pub fn total_held(&self) -> u128 {
        self.entries.values().sum()
    }

    /// All non-zero entries
    pub fn holders(&self) -> Vec<(&Address, u128)> {
        self.entries
            .iter()
            .filter(|(_, &b)| b > 0)
            .map(|(a, &b)| (a, b))
            .collect()
    }

    /// Check that entries add up to lifetime deposits minus payouts
    pub fn verify(&self) -> Result<(), String> {
        let held = self
            .entries
            .values()
            .try_fold(0u128, |sum, &b| sum.checked_add(b))
            .ok_or_else(|| "Balances overflow".to_string())?;
        let expected = self
            .total_deposited
            .checked_sub(self.total_paid_out)
            .ok_or_else(|| "More paid out than deposited".to_string())?;

        if held != expected {
            return Err(format!(
                "Balances hold {} but deposits minus payouts is {}",
                held, expected
            ));
        }
        Ok(())
    }

    /// Credit a deposit to the treasury
    pub(crate) fn deposit(&mut self, value: u128) -> Result<u128, VaultError> {
        if value == 0 {
            return Err(VaultError::InvalidAmount);
        }

        let balance = self
            .treasury_balance()
            .checked_add(value)
            .ok_or(VaultError::Overflow)?;
        let total = self
            .total_deposited
            .checked_add(value)
            .ok_or(VaultError::Overflow)?;

        self.entries.insert(self.treasury.clone(), balance);
        self.total_deposited = total;

        Ok(balance)
    }

    /// Remove value from the treasury for an outgoing call
    pub(crate) fn pay_out(&mut self, amount: u128) -> Result<(), VaultError> {
        let have = self.treasury_balance();
        if have < amount {
            return Err(VaultError::InsufficientTreasury { have, need: amount });
        }

        self.entries.insert(self.treasury.clone(), have - amount);
        self.total_paid_out += amount;
        Ok(())
    }

    /// Return value removed by `pay_out` after the call failed
    pub(crate) fn refund(&mut self, amount: u128) {
        *self.entries.entry(self.treasury.clone()).or_insert(0) += amount;
        self.total_paid_out -= amount;
    }

    /// Move value from the treasury to another entry
    pub(crate) fn move_from_treasury(&mut self, to: &Address, amount: u128) -> Result<(), VaultError> {
        let have = self.treasury_balance();
        if have < amount {
            return Err(VaultError::InsufficientTreasury { have, need: amount });
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        self.entries.insert(self.treasury.clone(), have - amount);
        *self.entries.entry(to.clone()).or_insert(0) = credited;
        Ok(())
    }
}
