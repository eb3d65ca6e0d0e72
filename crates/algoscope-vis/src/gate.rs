//! Single-slot suspend point for step mode.
//!
//! A waiter parks on [`StepGate::wait`] until someone calls
//! [`StepGate::signal`]. Only one waiter can be pending; each signal resumes
//! it exactly once.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::oneshot;

/// The pending wait was dropped instead of signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("step gate cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
pub struct StepGate {
    pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl StepGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<oneshot::Sender<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park until signalled. A second waiter replaces the first, which then
    /// observes cancellation.
    pub async fn wait(&self) -> Result<(), Cancelled> {
        let (tx, rx) = oneshot::channel();
        let replaced = self.slot().replace(tx).is_some();
        if replaced {
            tracing::debug!("replaced a pending step waiter");
        }
        rx.await.map_err(|_| Cancelled)
    }

    /// Resume the pending waiter. Returns whether anyone was waiting.
    pub fn signal(&self) -> bool {
        match self.slot().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Drop the pending continuation without resuming it.
    pub fn cancel(&self) -> bool {
        self.slot().take().is_some()
    }

    pub fn is_waiting(&self) -> bool {
        self.slot().as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_err, assert_ready_ok, task};

    #[test]
    fn signal_resumes_exactly_once() {
        let gate = StepGate::new();
        let mut waiter = task::spawn(gate.wait());

        assert_pending!(waiter.poll());
        assert!(gate.is_waiting());

        assert!(gate.signal());
        assert!(waiter.is_woken());
        assert_ready_ok!(waiter.poll());

        assert!(!gate.signal());
        assert!(!gate.is_waiting());
    }

    #[test]
    fn signal_without_waiter_is_not_stored() {
        let gate = StepGate::new();
        assert!(!gate.signal());

        let mut waiter = task::spawn(gate.wait());
        assert_pending!(waiter.poll());
    }

    #[test]
    fn cancel_drops_the_waiter() {
        let gate = StepGate::new();
        let mut waiter = task::spawn(gate.wait());
        assert_pending!(waiter.poll());

        assert!(gate.cancel());
        assert_ready_err!(waiter.poll());
        assert!(!gate.cancel());
    }

    #[test]
    fn second_waiter_replaces_first() {
        let gate = StepGate::new();
        let mut first = task::spawn(gate.wait());
        let mut second = task::spawn(gate.wait());
        assert_pending!(first.poll());
        assert_pending!(second.poll());

        assert_ready_err!(first.poll());
        assert!(gate.signal());
        assert_ready_ok!(second.poll());
    }
}
