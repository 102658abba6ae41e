//! Read-only reporting over vault state

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use crate::multisig::quorum::QuorumEngine;
use crate::multisig::registry::GuardianRegistry;
use crate::multisig::state::VaultState;
use crate::multisig::transaction::{Transaction, TxStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only projection of a transaction
#[derive(Clone, Debug, Serialize)]
pub struct TransactionView {
    pub id: u64,
    pub destination: Address,
    pub value: u128,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    pub is_recovery: bool,
    pub signers: Vec<Address>,
    pub executed: bool,
    pub status: TxStatus,
    pub confirmations: usize,
    pub required: usize,
    pub confirmers: Vec<Address>,
    pub submitted_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub failed_attempts: u32,
}

/// Reporting queries for one vault
pub struct Report<'a, R: GuardianRegistry + ?Sized> {
    registry: &'a R,
    state: &'a VaultState,
}

impl<'a, R: GuardianRegistry + ?Sized> Report<'a, R> {
    pub fn new(registry: &'a R, state: &'a VaultState) -> Self {
        Self { registry, state }
    }

    fn quorum(&self) -> QuorumEngine<'a, R> {
        QuorumEngine::new(self.registry, &self.state.store)
    }

    /// Full count of current confirmations
    pub fn confirmation_count(&self, id: u64) -> Result<usize, VaultError> {
        self.quorum().confirmation_count(id)
    }

    /// Check if a transaction has reached quorum
    pub fn is_confirmed(&self, id: u64) -> Result<bool, VaultError> {
        self.quorum().is_confirmed(id)
    }

    /// Guardians currently confirming, in registry order
    pub fn confirmers_of(&self, id: u64) -> Result<Vec<Address>, VaultError> {
        self.quorum().confirmers_of(id)
    }

    /// Projection of one transaction
    pub fn transaction(&self, id: u64) -> Result<TransactionView, VaultError> {
        let tx = self.state.store.get(id)?;
        let confirmers = self.confirmers_of(id)?;
        Ok(self.view(tx, confirmers))
    }

    /// Count transactions matching the filters
    ///
    /// `pending` selects unexecuted transactions, `executed` executed ones;
    /// both together count everything.
    pub fn transaction_count(&self, pending: bool, executed: bool) -> usize {
        self.state
            .store
            .iter()
            .filter(|tx| Self::matches(tx, pending, executed))
            .count()
    }

    /// IDs of matching transactions within `from..to`, in ID order
    pub fn transaction_ids(&self, from: u64, to: u64, pending: bool, executed: bool) -> Vec<u64> {
        self.state
            .store
            .iter()
            .filter(|tx| tx.id >= from && tx.id < to)
            .filter(|tx| Self::matches(tx, pending, executed))
            .map(|tx| tx.id)
            .collect()
    }

    /// Projections of matching transactions, in ID order
    pub fn transactions(&self, pending: bool, executed: bool) -> Vec<TransactionView> {
        self.state
            .store
            .iter()
            .filter(|tx| Self::matches(tx, pending, executed))
            .map(|tx| {
                let confirmers = self.confirmers_of(tx.id).unwrap_or_default();
                self.view(tx, confirmers)
            })
            .collect()
    }

    fn matches(tx: &Transaction, pending: bool, executed: bool) -> bool {
        (pending && !tx.executed) || (executed && tx.executed)
    }

    fn view(&self, tx: &Transaction, confirmers: Vec<Address>) -> TransactionView {
        TransactionView {
            id: tx.id,
            destination: tx.destination.clone(),
            value: tx.value,
            data: tx.data.clone(),
            is_recovery: tx.is_recovery,
            signers: tx.signers.clone(),
            executed: tx.executed,
            status: tx.status(confirmers.len()),
            confirmations: confirmers.len(),
            required: self.registry.required_quorum(),
            confirmers,
            submitted_at: tx.submitted_at,
            executed_at: tx.executed_at,
            failed_attempts: tx.failed_attempts,
        }
    }
}
