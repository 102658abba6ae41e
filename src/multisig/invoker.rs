//! External action invocation
//!
//! The invoker carries out an executed transaction's value transfer and
//! payload delivery outside the vault. It is untrusted: the vault marks the
//! transaction executed before calling it and rolls back if it fails.

use crate::multisig::address::Address;
use std::collections::VecDeque;
use thiserror::Error;

/// Failure reported by an invoker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("call reverted: {0}")]
    Reverted(String),
    #[error("destination unreachable: {0}")]
    Unreachable(Address),
}

/// The outgoing call for one execution attempt
#[derive(Debug, Clone, Copy)]
pub struct OutgoingCall<'a> {
    /// Transaction being executed
    pub id: u64,
    pub destination: &'a Address,
    /// Exact value to send
    pub value: u128,
    /// Full payload
    pub data: &'a [u8],
}

/// Performs the actual value/data transfer for an executed transaction
pub trait ExternalActionInvoker {
    fn invoke(&mut self, call: &OutgoingCall<'_>) -> Result<(), InvocationError>;
}

/// Invoker for hosts without a real downstream: logs the call and succeeds,
/// or fails every call when built with `failing()`
#[derive(Debug, Default)]
pub struct LoggingInvoker {
    fail: bool,
}

impl LoggingInvoker {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl ExternalActionInvoker for LoggingInvoker {
    fn invoke(&mut self, call: &OutgoingCall<'_>) -> Result<(), InvocationError> {
        log::info!(
            "Invoking {} with value {} and {} byte payload (tx #{})",
            call.destination,
            call.value,
            call.data.len(),
            call.id
        );

        if self.fail {
            return Err(InvocationError::Reverted("simulated failure".to_string()));
        }
        Ok(())
    }
}

/// A call captured by [`RecordingInvoker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub id: u64,
    pub destination: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

/// Records every call and answers from a script of outcomes
///
/// Once the script runs out every call succeeds.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    script: VecDeque<Result<(), InvocationError>>,
    calls: Vec<RecordedCall>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls fail
    pub fn fail_next(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.script
                .push_back(Err(InvocationError::Reverted("scripted failure".to_string())));
        }
        self
    }

    /// Calls seen so far, oldest first
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }
}

impl ExternalActionInvoker for RecordingInvoker {
    fn invoke(&mut self, call: &OutgoingCall<'_>) -> Result<(), InvocationError> {
        self.calls.push(RecordedCall {
            id: call.id,
            destination: call.destination.clone(),
            value: call.value,
            data: call.data.to_vec(),
        });
        self.script.pop_front().unwrap_or(Ok(()))
    }
}
