//! Owned vault state
//!
//! Everything the controller mutates lives here and is passed explicitly to
//! each operation.

use crate::multisig::address::Address;
use crate::multisig::ledger::Balances;
use crate::multisig::store::TransactionStore;
use serde::{Deserialize, Serialize};

/// Transactions, confirmations, and balances of one vault
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultState {
    pub(crate) store: TransactionStore,
    pub(crate) balances: Balances,
}

impl VaultState {
    /// Create empty state whose treasury is the vault's own address
    pub fn new(treasury: Address) -> Self {
        Self {
            store: TransactionStore::new(),
            balances: Balances::new(treasury),
        }
    }

    /// Get the transaction store
    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    /// Get the balances
    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Check store and ledger invariants
    pub fn verify(&self) -> Result<(), String> {
        self.store.verify()?;
        self.balances.verify()
    }
}
