//! Vault transactions awaiting guardian approval
//!
//! A [`Transaction`] is created together with its [`ConfirmationSet`] and is
//! read-only once executed, apart from the rollback of a failed attempt.

use crate::multisig::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a transaction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Created, nobody has confirmed yet
    Proposed,
    /// Collecting confirmations (or signatures)
    Confirming,
    /// Last execution attempt failed and was rolled back; awaiting retry
    ExecutionFailed,
    /// External action succeeded (terminal)
    Executed,
}

/// A proposed vault action
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequential ID, never reused
    pub id: u64,
    /// Target address (never null)
    pub destination: Address,
    /// Amount to transfer (for recovery transactions: the bounty pool)
    pub value: u128,
    /// Opaque payload forwarded on execution
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    /// Selects recovery-split semantics
    pub is_recovery: bool,
    /// Recovery signers in signing order
    pub signers: Vec<Address>,
    /// Whether the external action has been carried out
    pub executed: bool,
    /// Creation timestamp
    pub submitted_at: DateTime<Utc>,
    /// When execution succeeded
    pub executed_at: Option<DateTime<Utc>>,
    /// Number of rolled-back execution attempts
    pub failed_attempts: u32,
    /// Whether the most recent attempt failed
    pub last_attempt_failed: bool,
}

impl Transaction {
    pub(crate) fn new(
        id: u64,
        destination: Address,
        value: u128,
        data: Vec<u8>,
        is_recovery: bool,
    ) -> Self {
        Self {
            id,
            destination,
            value,
            data,
            is_recovery,
            signers: Vec::new(),
            executed: false,
            submitted_at: Utc::now(),
            executed_at: None,
            failed_attempts: 0,
            last_attempt_failed: false,
        }
    }

    /// Signing rank of an address (0 = first signer)
    pub fn signer_position(&self, address: &Address) -> Option<usize> {
        self.signers.iter().position(|s| s == address)
    }

    /// Check if an address has signed
    pub fn has_signed(&self, address: &Address) -> bool {
        self.signer_position(address).is_some()
    }

    /// Get number of recovery signatures collected
    pub fn signature_count(&self) -> usize {
        self.signers.len()
    }

    /// Derive the lifecycle state given the current confirmation count
    pub fn status(&self, confirmations: usize) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.last_attempt_failed {
            TxStatus::ExecutionFailed
        } else if confirmations == 0 && self.signers.is_empty() {
            TxStatus::Proposed
        } else {
            TxStatus::Confirming
        }
    }

    pub(crate) fn mark_executing(&mut self) {
        self.executed = true;
        self.last_attempt_failed = false;
    }

    pub(crate) fn mark_succeeded(&mut self) {
        self.executed_at = Some(Utc::now());
    }

    /// Forget the last failed attempt once confirmations change
    pub(crate) fn clear_failure(&mut self) {
        self.last_attempt_failed = false;
    }

    pub(crate) fn roll_back(&mut self) {
        self.executed = false;
        self.failed_attempts += 1;
        self.last_attempt_failed = true;
    }
}

/// Per-transaction guardian votes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfirmationSet {
    entries: BTreeMap<Address, bool>,
}

impl ConfirmationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an address currently confirms
    pub fn is_confirmed_by(&self, address: &Address) -> bool {
        self.entries.get(address).copied().unwrap_or(false)
    }

    pub(crate) fn set(&mut self, address: &Address, confirmed: bool) {
        self.entries.insert(address.clone(), confirmed);
    }

    /// Addresses with a true entry, in address order
    pub fn confirmed(&self) -> impl Iterator<Item = &Address> {
        self.entries
            .iter()
            .filter(|(_, &confirmed)| confirmed)
            .map(|(address, _)| address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(0, Address::from("dest"), 10, vec![0xde, 0xad], false)
    }

    #[test]
    fn test_transaction_creation() {
        let tx = sample();

        assert!(!tx.executed);
        assert!(tx.signers.is_empty());
        assert_eq!(tx.failed_attempts, 0);
        assert_eq!(tx.status(0), TxStatus::Proposed);
        assert_eq!(tx.status(1), TxStatus::Confirming);
    }

    #[test]
    fn test_status_through_rollback() {
        let mut tx = sample();

        tx.mark_executing();
        assert_eq!(tx.status(2), TxStatus::Executed);

        tx.roll_back();
        assert!(!tx.executed);
        assert_eq!(tx.failed_attempts, 1);
        assert_eq!(tx.status(2), TxStatus::ExecutionFailed);

        tx.mark_executing();
        tx.mark_succeeded();
        assert_eq!(tx.status(2), TxStatus::Executed);
        assert!(tx.executed_at.is_some());
        assert!(!tx.last_attempt_failed);
    }

    #[test]
    fn test_failure_cleared_by_new_attempt() {
        let mut tx = sample();

        tx.mark_executing();
        tx.roll_back();
        assert_eq!(tx.status(2), TxStatus::ExecutionFailed);

        tx.clear_failure();
        assert_eq!(tx.status(2), TxStatus::Confirming);
        assert_eq!(tx.failed_attempts, 1);

        tx.mark_executing();
        tx.roll_back();
        tx.mark_executing();
        assert!(!tx.last_attempt_failed);
    }

    #[test]
    fn test_signer_positions() {
        let mut tx = sample();
        tx.signers.push(Address::from("a"));
        tx.signers.push(Address::from("b"));

        assert_eq!(tx.signer_position(&Address::from("a")), Some(0));
        assert_eq!(tx.signer_position(&Address::from("b")), Some(1));
        assert!(!tx.has_signed(&Address::from("c")));
        assert_eq!(tx.signature_count(), 2);
    }

    #[test]
    fn test_confirmation_toggle() {
        let mut set = ConfirmationSet::new();
        let alice = Address::from("alice");

        assert!(!set.is_confirmed_by(&alice));
        set.set(&alice, true);
        assert!(set.is_confirmed_by(&alice));
        set.set(&alice, false);
        assert!(!set.is_confirmed_by(&alice));
        assert_eq!(set.confirmed().count(), 0);
    }

    #[test]
    fn test_payload_serializes_as_hex() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["data"], "dead");
    }
}
