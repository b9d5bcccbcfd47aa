//! In-memory execution for demos, tests, and prototyping.

use crate::decider::Decider;
use crate::error::DomainError;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Runs a [`Decider`] against state held in process memory.
///
/// Each execution decides and folds under one lock, so concurrent
/// callers serialize and none of them observes a half-applied decision.
/// Nothing survives the process; reach for [`EventSourced`] or
/// [`StateStored`] when the outcome has to.
///
/// [`EventSourced`]: crate::event_store::EventSourced
/// [`StateStored`]: crate::state_store::StateStored
pub struct InMemory<C, S, E> {
    decider: Decider<C, S, E>,
    state: Mutex<S>,
}

impl<C, S, E> InMemory<C, S, E>
where
    S: Clone + Send + Sync + 'static,
{
    /// Starts an instance at the decider's initial state.
    #[must_use]
    pub fn new(decider: Decider<C, S, E>) -> Self {
        let state = Mutex::new(decider.initial_state().clone());
        Self { decider, state }
    }

    /// Handles one command against the live state and returns the
    /// events it produced.
    ///
    /// A panic in another caller poisons the lock but not the state;
    /// execution continues with whatever was last committed.
    ///
    /// # Errors
    ///
    /// Propagates the decider's rejection untouched.
    pub fn execute(&self, command: &C) -> Result<Vec<E>, DomainError> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let events = self.decider.decide(command, &guard)?;
        let current = guard.clone();
        *guard = self.decider.fold(current, &events);
        tracing::debug!(decided = events.len(), "command handled");
        Ok(events)
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> S {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<C, S, E> fmt::Debug for InMemory<C, S, E>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemory")
            .field("decider", &self.decider)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can unwrap

    use super::*;
    use crate::builder::DeciderBuilder;
    use std::sync::Arc;
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq)]
    enum TallyCommand {
        Add { amount: i64 },
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TallyEvent {
        Added { amount: i64 },
    }

    #[derive(Debug, Error)]
    #[error("tally is closed")]
    struct TallyClosed;

    fn tally() -> Decider<TallyCommand, i64, TallyEvent> {
        DeciderBuilder::new()
            .initial_state(0)
            .decide_any(
                |command: &TallyCommand, state: &i64| -> Result<Vec<TallyEvent>, DomainError> {
                    if *state >= 10 {
                        return Err(TallyClosed.into());
                    }
                    let TallyCommand::Add { amount } = command;
                    Ok(vec![TallyEvent::Added { amount: *amount }])
                },
            )
            .evolve_any(|state: &i64, event: &TallyEvent| {
                let TallyEvent::Added { amount } = event;
                state + amount
            })
            .build()
            .unwrap()
    }

    #[test]
    fn executions_advance_the_live_state() {
        let instance = InMemory::new(tally());

        let events = instance.execute(&TallyCommand::Add { amount: 3 }).unwrap();
        assert_eq!(events, vec![TallyEvent::Added { amount: 3 }]);

        instance.execute(&TallyCommand::Add { amount: 4 }).unwrap();
        assert_eq!(instance.state(), 7);
    }

    #[test]
    fn rejections_leave_the_state_alone() {
        let instance = InMemory::new(tally());
        instance.execute(&TallyCommand::Add { amount: 10 }).unwrap();

        let error = instance
            .execute(&TallyCommand::Add { amount: 1 })
            .unwrap_err();
        assert_eq!(error.to_string(), "tally is closed");
        assert_eq!(instance.state(), 10);
    }

    #[test]
    fn concurrent_executions_serialize() {
        let instance = Arc::new(InMemory::new(tally()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let instance = Arc::clone(&instance);
                std::thread::spawn(move || {
                    instance.execute(&TallyCommand::Add { amount: 1 }).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(instance.state(), 4);
    }
}
