//! Error taxonomy for building and running deciders.
//!
//! Three layers of failure exist and stay separate:
//!
//! - **Build-time** ([`BuildError`]): a builder was misused, the value is
//!   never produced.
//! - **Dispatch** ([`DecideError`], [`UnknownEvent`]): the strict entry
//!   points report inputs no rule claimed. The soft entry points never
//!   fail this way.
//! - **Domain** ([`DomainError`]): a matched decision handler rejected the
//!   command. Rejections propagate unchanged through every combinator and
//!   driver.

use std::error::Error;
use thiserror::Error as ThisError;

/// A rejection raised by a decision handler.
///
/// Handlers return whatever domain-specific error type they like, boxed so
/// that deciders over different domains compose without sharing an error
/// enum. The box satisfies `Send + Sync` and therefore travels across
/// threads together with the decider that produced it.
pub type DomainError = Box<dyn Error + Send + Sync>;

/// Errors reported by [`build`](crate::builder::DeciderBuilder::build).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The initial state was defined more than once.
    #[error("initial state defined more than once")]
    StateAlreadyDefined,

    /// The builder was finished without defining an initial state.
    #[error("initial state never defined")]
    StateNotDefined,
}

/// Errors reported by [`try_decide`](crate::decider::Decider::try_decide).
#[derive(ThisError, Debug)]
pub enum DecideError<C> {
    /// No decision rule matched the command. The unmatched command is
    /// handed back to the caller.
    #[error("no decision rule matches the command")]
    UnknownCommand {
        /// The command that no rule claimed.
        command: C,
    },

    /// A decision rule matched and its handler rejected the command.
    #[error("command rejected: {0}")]
    Rejected(DomainError),
}

/// Error reported by [`try_evolve`](crate::decider::Decider::try_evolve)
/// when no evolution rule matched the event.
#[derive(ThisError, Debug)]
#[error("no evolution rule matches the event")]
pub struct UnknownEvent<E> {
    /// The event that no rule claimed.
    pub event: E,
}

/// Failure of a stored decider execution.
///
/// Unions the two ways a driver run can go wrong: the domain said no, or
/// the collaborating store did. `B` is the store's own error type, either
/// [`EventStoreError`](crate::event_store::EventStoreError) or
/// [`StateStoreError`](crate::state_store::StateStoreError).
#[derive(ThisError, Debug)]
pub enum ExecuteError<B> {
    /// The decider rejected the command; nothing was persisted.
    #[error("command rejected: {0}")]
    Rejected(DomainError),

    /// The collaborating store failed or detected a concurrent writer.
    #[error("store operation failed: {0}")]
    Store(#[from] B),
}
