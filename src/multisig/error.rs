//! Vault error types

use crate::multisig::address::Address;
use thiserror::Error;

/// Errors from guardian-set configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Guardian set is empty")]
    EmptyGuardianSet,
    #[error("Invalid quorum: {quorum} of {guardians} guardians")]
    InvalidQuorum { quorum: usize, guardians: usize },
    #[error("Duplicate guardian: {0}")]
    DuplicateGuardian(Address),
    #[error("Null address cannot be a guardian")]
    NullGuardian,
}

/// Errors from vault operations
///
/// Every variant except `ExternalCallFailed` rejects the call before any
/// state is written. `ExternalCallFailed` is reported through
/// [`ExecutionOutcome::Failed`](crate::multisig::ExecutionOutcome) after the
/// execution attempt has been rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Invalid destination: null address")]
    InvalidDestination,
    #[error("Transaction not found: {0}")]
    NotFound(u64),
    #[error("Not a guardian: {0}")]
    NotGuardian(Address),
    #[error("Transaction {id} already confirmed by {guardian}")]
    AlreadyConfirmed { id: u64, guardian: Address },
    #[error("Transaction {id} not confirmed by {guardian}")]
    NotConfirmed { id: u64, guardian: Address },
    #[error("Transaction already executed: {0}")]
    AlreadyExecuted(u64),
    #[error("Insufficient treasury: have {have}, need {need}")]
    InsufficientTreasury { have: u128, need: u128 },
    #[error("External call failed: {0}")]
    ExternalCallFailed(String),
    #[error("Capability belongs to vault {0}")]
    NotWallet(Address),
    #[error("Transaction {0} is not a recovery transaction")]
    NotRecovery(u64),
    #[error("Transaction {id} already signed by {guardian}")]
    AlreadySigned { id: u64, guardian: Address },
    #[error("Transaction {id} has no signature from {guardian}")]
    NotSigner { id: u64, guardian: Address },
    #[error("Transaction {id} already has {count} of {required} signatures")]
    SignaturesComplete {
        id: u64,
        count: usize,
        required: usize,
    },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}
