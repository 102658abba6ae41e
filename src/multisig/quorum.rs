//! Quorum evaluation
//!
//! Counts are always taken in registry order and only over current
//! guardians, so a confirmation left behind by an address that is no longer
//! a guardian never counts.

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use crate::multisig::registry::GuardianRegistry;
use crate::multisig::store::TransactionStore;

/// Read-only view combining a registry with a transaction store
pub struct QuorumEngine<'a, R: GuardianRegistry + ?Sized> {
    registry: &'a R,
    store: &'a TransactionStore,
}

impl<'a, R: GuardianRegistry + ?Sized> QuorumEngine<'a, R> {
    pub fn new(registry: &'a R, store: &'a TransactionStore) -> Self {
        Self { registry, store }
    }

    /// Number of guardians currently confirming a transaction
    ///
    /// Always a full count, never cut short at the quorum.
    pub fn confirmation_count(&self, id: u64) -> Result<usize, VaultError> {
        let confirmations = self.store.confirmations(id)?;
        Ok(self
            .registry
            .guardian_list()
            .iter()
            .filter(|g| confirmations.is_confirmed_by(g))
            .count())
    }

    /// Check if a transaction has reached the required quorum
    pub fn is_confirmed(&self, id: u64) -> Result<bool, VaultError> {
        let confirmations = self.store.confirmations(id)?;
        let required = self.registry.required_quorum();

        let mut count = 0;
        for guardian in self.registry.guardian_list() {
            if confirmations.is_confirmed_by(guardian) {
                count += 1;
            }
            if count >= required {
                return Ok(true);
            }
        }
        Ok(count >= required)
    }

    /// Number of recovery signatures collected
    pub fn signature_count(&self, id: u64) -> Result<usize, VaultError> {
        Ok(self.store.get(id)?.signature_count())
    }

    /// Guardians currently confirming, in registry order
    pub fn confirmers_of(&self, id: u64) -> Result<Vec<Address>, VaultError> {
        let confirmations = self.store.confirmations(id)?;
        Ok(self
            .registry
            .guardian_list()
            .iter()
            .filter(|g| confirmations.is_confirmed_by(g))
            .cloned()
            .collect())
    }
}
