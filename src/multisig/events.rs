//! Vault events and listeners
//!
//! The controller emits one [`VaultEvent`] per committed transition and
//! hands it to every subscribed [`VaultListener`] synchronously, in
//! subscription order, before the call returns.

use crate::multisig::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of events kept by an [`EventLog`]
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Observable side effects of vault operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    /// A transaction was created
    Submission { id: u64 },
    /// A guardian confirmed a transaction
    Confirmation { signer: Address, id: u64 },
    /// A guardian withdrew their confirmation
    Revocation { signer: Address, id: u64 },
    /// The external action succeeded
    Execution { id: u64 },
    /// The external action failed and the attempt was rolled back
    ExecutionFailure { id: u64 },
    /// The first recovery signer was paid
    FirstSignature { signer: Address },
    /// Value was credited to the treasury
    Deposit { sender: Address, value: u128 },
}

impl fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultEvent::Submission { id } => write!(f, "Submission(#{})", id),
            VaultEvent::Confirmation { signer, id } => {
                write!(f, "Confirmation({}, #{})", signer, id)
            }
            VaultEvent::Revocation { signer, id } => write!(f, "Revocation({}, #{})", signer, id),
            VaultEvent::Execution { id } => write!(f, "Execution(#{})", id),
            VaultEvent::ExecutionFailure { id } => write!(f, "ExecutionFailure(#{})", id),
            VaultEvent::FirstSignature { signer } => write!(f, "FirstSignature({})", signer),
            VaultEvent::Deposit { sender, value } => write!(f, "Deposit({}, {})", sender, value),
        }
    }
}

/// Receives vault events after each committed transition
pub trait VaultListener {
    fn on_event(&mut self, event: &VaultEvent);
}

/// Writes every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl VaultListener for LogListener {
    fn on_event(&mut self, event: &VaultEvent) {
        match event {
            VaultEvent::ExecutionFailure { .. } => log::warn!("event: {}", event),
            _ => log::info!("event: {}", event),
        }
    }
}

/// An event with the time it was recorded
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub event: VaultEvent,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered event history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<RecordedEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EventLog {
    /// Create a log keeping at most `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append an event, dropping the oldest past capacity
    pub fn record(&mut self, event: VaultEvent) {
        self.entries.push(RecordedEvent {
            event,
            timestamp: Utc::now(),
        });
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }

    /// All recorded events, oldest first
    pub fn entries(&self) -> &[RecordedEvent] {
        &self.entries
    }

    /// The most recent `count` events, oldest first
    pub fn recent(&self, count: usize) -> &[RecordedEvent] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Recorded events without timestamps
    pub fn events(&self) -> Vec<VaultEvent> {
        self.entries.iter().map(|e| e.event.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VaultListener for EventLog {
    fn on_event(&mut self, event: &VaultEvent) {
        self.record(event.clone());
    }
}

/// Fan-out of events to the history and subscribed listeners
pub(crate) struct EventBus {
    history: EventLog,
    listeners: Vec<Box<dyn VaultListener>>,
}

impl EventBus {
    pub(crate) fn new(history: EventLog) -> Self {
        Self {
            history,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, listener: Box<dyn VaultListener>) {
        self.listeners.push(listener);
    }

    pub(crate) fn emit(&mut self, event: VaultEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        self.history.record(event);
    }

    pub(crate) fn history(&self) -> &EventLog {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Shared(Rc<RefCell<Vec<VaultEvent>>>);

    impl VaultListener for Shared {
        fn on_event(&mut self, event: &VaultEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_log_capacity() {
        let mut log = EventLog::with_capacity(2);

        log.record(VaultEvent::Submission { id: 0 });
        log.record(VaultEvent::Submission { id: 1 });
        log.record(VaultEvent::Submission { id: 2 });

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.events(),
            vec![
                VaultEvent::Submission { id: 1 },
                VaultEvent::Submission { id: 2 }
            ]
        );
        assert_eq!(log.recent(1)[0].event, VaultEvent::Submission { id: 2 });
        assert_eq!(log.recent(10).len(), 2);
    }

    #[test]
    fn test_bus_fans_out_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new(EventLog::default());
        bus.subscribe(Box::new(Shared(seen.clone())));
        bus.subscribe(Box::new(LogListener));

        bus.emit(VaultEvent::Execution { id: 3 });
        bus.emit(VaultEvent::ExecutionFailure { id: 4 });

        assert_eq!(
            *seen.borrow(),
            vec![
                VaultEvent::Execution { id: 3 },
                VaultEvent::ExecutionFailure { id: 4 }
            ]
        );
        assert_eq!(bus.history().len(), 2);
    }

    #[test]
    fn test_event_display() {
        let event = VaultEvent::Confirmation {
            signer: Address::from("alice"),
            id: 7,
        };
        assert_eq!(event.to_string(), "Confirmation(alice, #7)");
    }
}
