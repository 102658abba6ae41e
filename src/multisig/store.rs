//! Transaction store
//!
//! Owns every proposed transaction and its confirmation set, keyed by a
//! sequential ID.

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use crate::multisig::transaction::{ConfirmationSet, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proposed transactions and their confirmations
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionStore {
    /// Transactions by ID
    transactions: BTreeMap<u64, Transaction>,
    /// Confirmation sets by transaction ID
    confirmations: BTreeMap<u64, ConfirmationSet>,
    /// Next ID to assign
    next_id: u64,
}

impl TransactionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transaction and its empty confirmation set
    ///
    /// # Errors
    /// Returns `InvalidDestination` if the destination is the null address
    pub fn create(
        &mut self,
        destination: Address,
        value: u128,
        data: Vec<u8>,
        is_recovery: bool,
    ) -> Result<u64, VaultError> {
        if destination.is_null() {
            return Err(VaultError::InvalidDestination);
        }

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(VaultError::Overflow)?;

        self.transactions
            .insert(id, Transaction::new(id, destination, value, data, is_recovery));
        self.confirmations.insert(id, ConfirmationSet::new());
        self.next_id = next_id;

        Ok(id)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: u64) -> Result<&Transaction, VaultError> {
        self.transactions.get(&id).ok_or(VaultError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Transaction, VaultError> {
        self.transactions.get_mut(&id).ok_or(VaultError::NotFound(id))
    }

    /// Check if a transaction exists
    pub fn exists(&self, id: u64) -> bool {
        self.transactions.contains_key(&id)
    }

    /// Get the confirmation set of a transaction
    pub fn confirmations(&self, id: u64) -> Result<&ConfirmationSet, VaultError> {
        self.confirmations.get(&id).ok_or(VaultError::NotFound(id))
    }

    pub(crate) fn confirmations_mut(&mut self, id: u64) -> Result<&mut ConfirmationSet, VaultError> {
        self.confirmations
            .get_mut(&id)
            .ok_or(VaultError::NotFound(id))
    }

    /// Total transactions ever created
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if no transaction was ever created
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterate transactions in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// Check the store's structural invariants
    ///
    /// Every transaction is filed under its own ID, has exactly one
    /// confirmation set, and lies below `next_id` so no ID is handed out
    /// twice.
    pub fn verify(&self) -> Result<(), String> {
        for (key, tx) in &self.transactions {
            if tx.id != *key {
                return Err(format!("Transaction {} filed under ID {}", tx.id, key));
            }
            if *key >= self.next_id {
                return Err(format!(
                    "Transaction {} not below next ID {}",
                    key, self.next_id
                ));
            }
            if !self.confirmations.contains_key(key) {
                return Err(format!("Transaction {} has no confirmation set", key));
            }
        }

        if let Some(orphan) = self
            .confirmations
            .keys()
            .find(|id| !self.transactions.contains_key(id))
        {
            return Err(format!("Confirmation set {} has no transaction", orphan));
        }

        Ok(())
    }
}
