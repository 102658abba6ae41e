//! Guardian registry
//!
//! The vault core only needs three questions answered about its guardians:
//! who they are, in what order, and how many must agree. Membership changes
//! live outside the core; [`GuardianSet`] is the fixed, validated
//! implementation used by the CLI host and the tests.

use crate::crypto::derive_vault_address;
use crate::multisig::address::Address;
use crate::multisig::error::RegistryError;
use serde::{Deserialize, Serialize};

/// Membership queries the vault core relies on
pub trait GuardianRegistry {
    /// Check if an address is an authorized guardian
    fn is_guardian(&self, address: &Address) -> bool;

    /// Minimum confirmations required before execution
    fn required_quorum(&self) -> usize;

    /// All guardians in registration order
    fn guardian_list(&self) -> &[Address];
}

/// A validated, ordered set of guardians with a quorum threshold
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuardianSet {
    /// Guardians in registration order
    guardians: Vec<Address>,
    /// Confirmations required (M in M-of-N)
    quorum: usize,
    /// Optional human-readable label
    pub label: Option<String>,
}

impl GuardianSet {
    /// Create a new guardian set
    ///
    /// # Arguments
    /// * `guardians` - Guardian addresses (N), order is preserved
    /// * `quorum` - Minimum confirmations required (M)
    /// * `label` - Optional label
    ///
    /// # Errors
    /// Returns error if the set is empty, holds duplicates or the null
    /// address, or the quorum is outside `1..=N`
    pub fn new(
        guardians: Vec<Address>,
        quorum: usize,
        label: Option<String>,
    ) -> Result<Self, RegistryError> {
        if guardians.is_empty() {
            return Err(RegistryError::EmptyGuardianSet);
        }

        if quorum == 0 || quorum > guardians.len() {
            return Err(RegistryError::InvalidQuorum {
                quorum,
                guardians: guardians.len(),
            });
        }

        if guardians.iter().any(Address::is_null) {
            return Err(RegistryError::NullGuardian);
        }

        let mut sorted = guardians.clone();
        sorted.sort();
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                return Err(RegistryError::DuplicateGuardian(pair[0].clone()));
            }
        }

        Ok(Self {
            guardians,
            quorum,
            label,
        })
    }

    /// Get the total guardian count (N)
    pub fn guardian_count(&self) -> usize {
        self.guardians.len()
    }

    /// Position of a guardian in registration order
    pub fn position(&self, address: &Address) -> Option<usize> {
        self.guardians.iter().position(|g| g == address)
    }

    /// The vault address owned by this guardian set
    pub fn vault_address(&self) -> Address {
        derive_vault_address(self.quorum, &self.guardians)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.quorum, self.guardians.len())
    }
}

impl GuardianRegistry for GuardianSet {
    fn is_guardian(&self, address: &Address) -> bool {
        self.guardians.iter().any(|g| g == address)
    }

    fn required_quorum(&self) -> usize {
        self.quorum
    }

    fn guardian_list(&self) -> &[Address] {
        &self.guardians
    }
}
