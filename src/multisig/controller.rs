//! Execution controller
//!
//! Drives each transaction through its lifecycle:
//!
//! ```text
//! Proposed -> Confirming -> Executed
//!                ^   |
//!                |   v
//!          ExecutionFailed
//! ```
//!
//! Every operation validates all of its preconditions before writing
//! anything, so a rejected call leaves the state exactly as it was. The one
//! recoverable failure is the external call inside [`ExecutionController::execute`]:
//! the transaction is marked executed before the call and rolled back if the
//! call fails.

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use crate::multisig::events::{EventBus, EventLog, VaultEvent, VaultListener};
use crate::multisig::invoker::{ExternalActionInvoker, OutgoingCall};
use crate::multisig::quorum::QuorumEngine;
use crate::multisig::recovery::{Payout, RecoveryFundSplitter};
use crate::multisig::registry::GuardianRegistry;
use crate::multisig::report::Report;
use crate::multisig::state::VaultState;
use serde::{Deserialize, Serialize};

// =============================================================================
// Authorization
// =============================================================================

/// Root authority of a vault, handed to the host once at construction
///
/// Only the holder can mint [`Capability`] tokens for `submit`.
#[derive(Debug)]
pub struct VaultAuthority {
    vault: Address,
}

impl VaultAuthority {
    /// The vault this authority belongs to
    pub fn vault(&self) -> &Address {
        &self.vault
    }

    /// Mint a capability for the vault acting on behalf of `origin`
    pub fn act_for(&self, origin: &Address) -> Capability {
        Capability {
            vault: self.vault.clone(),
            origin: origin.clone(),
        }
    }
}

/// Proof that a call comes from the vault itself
///
/// Cannot be constructed outside this crate. `origin` is the guardian on
/// whose behalf the vault acts; the submitted transaction is confirmed for
/// them.
#[derive(Debug)]
pub struct Capability {
    vault: Address,
    origin: Address,
}

impl Capability {
    pub fn vault(&self) -> &Address {
        &self.vault
    }

    pub fn origin(&self) -> &Address {
        &self.origin
    }
}

/// Payload of a transaction addressed to the vault itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfCall {
    /// Submit a new transaction
    SubmitTransaction {
        destination: Address,
        value: u128,
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
        is_recovery: bool,
    },
    /// Execute another transaction
    ExecuteTransaction { id: u64 },
}

impl SelfCall {
    /// Encode as a transaction payload
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a transaction payload
    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// Result of an `execute` call that passed its preconditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Quorum not reached yet; nothing changed
    Pending { confirmations: usize, required: usize },
    /// External action succeeded
    Executed,
    /// External action failed and the attempt was rolled back
    Failed(VaultError),
}

impl ExecutionOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, ExecutionOutcome::Executed)
    }
}

// =============================================================================
// Controller
// =============================================================================

/// State machine for one vault
pub struct ExecutionController<R: GuardianRegistry> {
    /// The vault's own address (also the treasury entry)
    address: Address,
    registry: R,
    events: EventBus,
}

impl<R: GuardianRegistry> ExecutionController<R> {
    /// Create a controller and the authority for its host
    pub fn new(address: Address, registry: R) -> (Self, VaultAuthority) {
        Self::with_history(address, registry, EventLog::default())
    }

    /// Create a controller that continues an existing event history
    pub fn with_history(address: Address, registry: R, history: EventLog) -> (Self, VaultAuthority) {
        let authority = VaultAuthority {
            vault: address.clone(),
        };
        let controller = Self {
            address,
            registry,
            events: EventBus::new(history),
        };
        (controller, authority)
    }

    /// Get the vault address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the guardian registry
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Events emitted so far
    pub fn history(&self) -> &EventLog {
        self.events.history()
    }

    /// Add a listener called after every committed transition
    pub fn subscribe(&mut self, listener: Box<dyn VaultListener>) {
        self.events.subscribe(listener);
    }

    /// Empty state whose treasury is this vault
    pub fn new_state(&self) -> VaultState {
        VaultState::new(self.address.clone())
    }

    /// Quorum queries against `state`
    pub fn quorum<'a>(&'a self, state: &'a VaultState) -> QuorumEngine<'a, R> {
        QuorumEngine::new(&self.registry, &state.store)
    }

    /// Reporting queries against `state`
    pub fn report<'a>(&'a self, state: &'a VaultState) -> Report<'a, R> {
        Report::new(&self.registry, state)
    }

    fn require_guardian(&self, address: &Address) -> Result<(), VaultError> {
        if self.registry.is_guardian(address) {
            Ok(())
        } else {
            Err(VaultError::NotGuardian(address.clone()))
        }
    }

    /// Credit a deposit to the treasury
    ///
    /// Provenance is not checked; any sender may fund the vault.
    pub fn deposit(
        &mut self,
        state: &mut VaultState,
        sender: &Address,
        value: u128,
    ) -> Result<u128, VaultError> {
        let balance = state.balances.deposit(value)?;

        log::debug!(
            "Deposit of {} from {} (treasury now {})",
            value,
            sender,
            balance
        );
        self.events.emit(VaultEvent::Deposit {
            sender: sender.clone(),
            value,
        });

        Ok(balance)
    }

    /// Submit a new transaction on behalf of the vault
    ///
    /// The transaction is confirmed for the capability's origin guardian.
    ///
    /// # Errors
    /// - `NotWallet` if the capability belongs to another vault
    /// - `NotGuardian` if the origin is not a guardian
    /// - `InvalidDestination` if the destination is null
    pub fn submit(
        &mut self,
        state: &mut VaultState,
        capability: &Capability,
        destination: Address,
        value: u128,
        data: Vec<u8>,
        is_recovery: bool,
    ) -> Result<u64, VaultError> {
        if capability.vault != self.address {
            return Err(VaultError::NotWallet(capability.vault.clone()));
        }
        let origin = capability.origin.clone();
        self.require_guardian(&origin)?;

        let id = state
            .store
            .create(destination.clone(), value, data, is_recovery)?;

        log::debug!(
            "Transaction #{} submitted by {}: {} to {}{}",
            id,
            origin,
            value,
            destination,
            if is_recovery { " (recovery)" } else { "" }
        );
        self.events.emit(VaultEvent::Submission { id });

        self.record_confirmation(state, id, &origin)?;
        Ok(id)
    }

    /// Confirm a transaction
    ///
    /// # Errors
    /// `NotGuardian`, `NotFound`, `AlreadyConfirmed`, or `AlreadyExecuted`
    pub fn confirm(
        &mut self,
        state: &mut VaultState,
        id: u64,
        caller: &Address,
    ) -> Result<(), VaultError> {
        self.require_guardian(caller)?;
        let tx = state.store.get(id)?;

        if state.store.confirmations(id)?.is_confirmed_by(caller) {
            return Err(VaultError::AlreadyConfirmed {
                id,
                guardian: caller.clone(),
            });
        }
        if tx.executed {
            return Err(VaultError::AlreadyExecuted(id));
        }

        self.record_confirmation(state, id, caller)
    }

    fn record_confirmation(
        &mut self,
        state: &mut VaultState,
        id: u64,
        guardian: &Address,
    ) -> Result<(), VaultError> {
        state.store.confirmations_mut(id)?.set(guardian, true);
        state.store.get_mut(id)?.clear_failure();

        log::debug!("Transaction #{} confirmed by {}", id, guardian);
        self.events.emit(VaultEvent::Confirmation {
            signer: guardian.clone(),
            id,
        });
        Ok(())
    }

    /// Withdraw a confirmation
    ///
    /// # Errors
    /// `NotGuardian`, `NotFound`, `NotConfirmed`, or `AlreadyExecuted`
    pub fn revoke(
        &mut self,
        state: &mut VaultState,
        id: u64,
        caller: &Address,
    ) -> Result<(), VaultError> {
        self.require_guardian(caller)?;
        let tx = state.store.get(id)?;

        if !state.store.confirmations(id)?.is_confirmed_by(caller) {
            return Err(VaultError::NotConfirmed {
                id,
                guardian: caller.clone(),
            });
        }
        if tx.executed {
            return Err(VaultError::AlreadyExecuted(id));
        }

        state.store.confirmations_mut(id)?.set(caller, false);
        state.store.get_mut(id)?.clear_failure();

        log::debug!("Transaction #{} revoked by {}", id, caller);
        self.events.emit(VaultEvent::Revocation {
            signer: caller.clone(),
            id,
        });
        Ok(())
    }

    /// Execute a transaction once it has reached quorum
    ///
    /// Below quorum this is a no-op returning `Pending`. Otherwise the
    /// transaction is marked executed, the treasury pays out its value, and
    /// the invoker is called with the exact value and full payload. A failed
    /// call restores both and returns `Failed`; any confirmed guardian may
    /// retry later.
    ///
    /// Recovery transactions forward their payload with zero value: their
    /// value is the signer bounty, paid out by [`sign`](Self::sign).
    ///
    /// # Errors
    /// `NotGuardian`, `NotFound`, `AlreadyExecuted`, or `NotConfirmed`
    pub fn execute(
        &mut self,
        state: &mut VaultState,
        id: u64,
        caller: &Address,
        invoker: &mut dyn ExternalActionInvoker,
    ) -> Result<ExecutionOutcome, VaultError> {
        self.require_guardian(caller)?;
        let tx = state.store.get(id)?;

        if tx.executed {
            return Err(VaultError::AlreadyExecuted(id));
        }
        if !state.store.confirmations(id)?.is_confirmed_by(caller) {
            return Err(VaultError::NotConfirmed {
                id,
                guardian: caller.clone(),
            });
        }

        let destination = tx.destination.clone();
        let data = tx.data.clone();
        let value = if tx.is_recovery { 0 } else { tx.value };

        let quorum = self.quorum(state);
        if !quorum.is_confirmed(id)? {
            let confirmations = quorum.confirmation_count(id)?;
            let required = self.registry.required_quorum();
            log::debug!(
                "Transaction #{} not executed: {} of {} confirmations",
                id,
                confirmations,
                required
            );
            return Ok(ExecutionOutcome::Pending {
                confirmations,
                required,
            });
        }

        // Set before the call so a reentrant execute sees it as done
        state.store.get_mut(id)?.mark_executing();

        match self.perform(state, id, caller, &destination, value, &data, invoker) {
            Ok(()) => {
                state.store.get_mut(id)?.mark_succeeded();
                log::debug!("Transaction #{} executed by {}", id, caller);
                self.events.emit(VaultEvent::Execution { id });
                Ok(ExecutionOutcome::Executed)
            }
            Err(reason) => {
                state.store.get_mut(id)?.roll_back();
                log::debug!("Transaction #{} execution failed: {}", id, reason);
                self.events.emit(VaultEvent::ExecutionFailure { id });
                Ok(ExecutionOutcome::Failed(VaultError::ExternalCallFailed(
                    reason,
                )))
            }
        }
    }

    /// Carry out the external action, leaving the ledger untouched on failure
    #[allow(clippy::too_many_arguments)]
    fn perform(
        &mut self,
        state: &mut VaultState,
        id: u64,
        caller: &Address,
        destination: &Address,
        value: u128,
        data: &[u8],
        invoker: &mut dyn ExternalActionInvoker,
    ) -> Result<(), String> {
        if *destination == self.address {
            return self.dispatch_self_call(state, caller, data, invoker);
        }

        state.balances.pay_out(value).map_err(|e| e.to_string())?;

        let call = OutgoingCall {
            id,
            destination,
            value,
            data,
        };
        if let Err(e) = invoker.invoke(&call) {
            state.balances.refund(value);
            return Err(e.to_string());
        }
        Ok(())
    }

    /// Run a payload addressed to the vault itself
    ///
    /// The nested call acts for the executing guardian and succeeds when the
    /// nested operation returns `Ok`, whatever its outcome.
    fn dispatch_self_call(
        &mut self,
        state: &mut VaultState,
        caller: &Address,
        data: &[u8],
        invoker: &mut dyn ExternalActionInvoker,
    ) -> Result<(), String> {
        let call =
            SelfCall::decode(data).map_err(|e| format!("malformed self-call payload: {}", e))?;
        log::debug!("Dispatching self-call {:?} for {}", call, caller);

        let result = match call {
            SelfCall::SubmitTransaction {
                destination,
                value,
                data,
                is_recovery,
            } => {
                let capability = Capability {
                    vault: self.address.clone(),
                    origin: caller.clone(),
                };
                self.submit(state, &capability, destination, value, data, is_recovery)
                    .map(|_| ())
            }
            SelfCall::ExecuteTransaction { id } => {
                self.execute(state, id, caller, invoker).map(|_| ())
            }
        };

        result.map_err(|e| e.to_string())
    }

    /// Sign a recovery transaction and collect the signer's bounty share
    ///
    /// Appends the caller to the signers, confirms for them if they have not
    /// confirmed yet, and pays them from the treasury according to their
    /// signing rank. Returns the payout, if their rank earns one.
    ///
    /// # Errors
    /// - `NotGuardian`, `NotFound`
    /// - `NotRecovery` for ordinary transactions
    /// - `AlreadyExecuted`, `AlreadySigned`
    /// - `SignaturesComplete` once the signer count has reached quorum
    /// - `InsufficientTreasury` if the treasury cannot cover the share
    pub fn sign(
        &mut self,
        state: &mut VaultState,
        id: u64,
        caller: &Address,
    ) -> Result<Option<Payout>, VaultError> {
        self.require_guardian(caller)?;
        let tx = state.store.get(id)?;

        if !tx.is_recovery {
            return Err(VaultError::NotRecovery(id));
        }
        if tx.executed {
            return Err(VaultError::AlreadyExecuted(id));
        }
        if tx.has_signed(caller) {
            return Err(VaultError::AlreadySigned {
                id,
                guardian: caller.clone(),
            });
        }

        let required = self.registry.required_quorum();
        let count = tx.signature_count();
        if count >= required {
            return Err(VaultError::SignaturesComplete {
                id,
                count,
                required,
            });
        }

        let need = RecoveryFundSplitter::share_for(count, tx.value);
        let have = state.balances.treasury_balance();
        if have < need {
            return Err(VaultError::InsufficientTreasury { have, need });
        }
        let already_confirmed = state.store.confirmations(id)?.is_confirmed_by(caller);

        state.store.get_mut(id)?.signers.push(caller.clone());
        log::debug!(
            "Recovery #{} signed by {} ({} of {})",
            id,
            caller,
            count + 1,
            required
        );

        if !already_confirmed {
            self.record_confirmation(state, id, caller)?;
        }

        let payout = RecoveryFundSplitter::distribute(&mut state.balances, state.store.get(id)?, caller)?;
        if let Some(p) = &payout {
            if p.is_first() {
                self.events.emit(VaultEvent::FirstSignature {
                    signer: p.signer.clone(),
                });
            }
        }

        Ok(payout)
    }
}
