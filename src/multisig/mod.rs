//! Guardian multi-signature vault
//!
//! A vault holds value in a treasury and moves it only when a quorum of
//! guardians has confirmed a transaction. Recovery transactions additionally
//! pay a bounty to the first two guardians who sign them.
//!
//! # Example
//!
//! ```ignore
//! use guardian_vault::multisig::{Address, ExecutionController, GuardianSet, LoggingInvoker};
//!
//! // Create a 2-of-3 vault
//! let guardians = GuardianSet::new(vec![alice, bob, carol], 2, None)?;
//! let (mut vault, authority) = ExecutionController::new(guardians.vault_address(), guardians);
//! let mut state = vault.new_state();
//!
//! vault.deposit(&mut state, &funder, 100)?;
//!
//! // Propose on behalf of alice, confirm as bob, then execute
//! let id = vault.submit(&mut state, &authority.act_for(&alice), dest, 10, vec![], false)?;
//! vault.confirm(&mut state, id, &bob)?;
//! vault.execute(&mut state, id, &bob, &mut LoggingInvoker::new())?;
//! ```

pub mod address;
pub mod controller;
pub mod error;
pub mod events;
pub mod invoker;
pub mod ledger;
pub mod quorum;
pub mod recovery;
pub mod registry;
pub mod report;
pub mod state;
pub mod store;
pub mod transaction;

pub use address::{Address, ZERO_ADDRESS};
pub use controller::{Capability, ExecutionController, ExecutionOutcome, SelfCall, VaultAuthority};
pub use error::{RegistryError, VaultError};
pub use events::{EventLog, LogListener, RecordedEvent, VaultEvent, VaultListener};
pub use invoker::{
    ExternalActionInvoker, InvocationError, LoggingInvoker, OutgoingCall, RecordingInvoker,
};
pub use ledger::Balances;
pub use quorum::QuorumEngine;
pub use recovery::{Payout, RecoveryFundSplitter};
pub use registry::{GuardianRegistry, GuardianSet};
pub use report::{Report, TransactionView};
pub use state::VaultState;
pub use store::TransactionStore;
pub use transaction::{ConfirmationSet, Transaction, TxStatus};
