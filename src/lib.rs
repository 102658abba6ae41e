//! Guardian Vault: a quorum-controlled multi-signature vault in Rust
//!
//! This crate provides:
//! - M-of-N guardian policies with validated configuration
//! - Transaction proposal, confirmation, and revocation
//! - Exactly-once execution with rollback on external call failure
//! - Recovery transactions that reward their first two signers
//! - An ordered event stream with pluggable listeners
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use guardian_vault::multisig::{
//!     Address, ExecutionController, ExecutionOutcome, GuardianSet, LoggingInvoker,
//! };
//!
//! let alice = Address::from("alice");
//! let bob = Address::from("bob");
//! let carol = Address::from("carol");
//!
//! // Create a 2-of-3 vault
//! let guardians = GuardianSet::new(vec![alice.clone(), bob.clone(), carol], 2, None).unwrap();
//! let (mut vault, authority) = ExecutionController::new(guardians.vault_address(), guardians);
//! let mut state = vault.new_state();
//! vault.deposit(&mut state, &Address::from("funder"), 100).unwrap();
//!
//! // Alice proposes, Bob confirms and executes
//! let id = vault
//!     .submit(&mut state, &authority.act_for(&alice), Address::from("shop"), 10, vec![], false)
//!     .unwrap();
//! vault.confirm(&mut state, id, &bob).unwrap();
//! let outcome = vault
//!     .execute(&mut state, id, &bob, &mut LoggingInvoker::new())
//!     .unwrap();
//!
//! assert_eq!(outcome, ExecutionOutcome::Executed);
//! assert_eq!(state.balances().treasury_balance(), 90);
//! ```

pub mod cli;
pub mod crypto;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use multisig::{
    Address, ExecutionController, ExecutionOutcome, GuardianRegistry, GuardianSet, VaultAuthority,
    VaultError, VaultEvent, VaultState,
};
pub use storage::{StorageConfig, VaultSnapshot, VaultStorage};
