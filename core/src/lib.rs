//! # Decider Core
//!
//! Deciders as plain values: pure decision and evolution rules that can
//! be composed and transformed like data, then handed to a driver for
//! execution.
//!
//! ## Core Concepts
//!
//! - **Command**: a request to change something
//! - **Event**: a recorded fact about what happened
//! - **State**: what past events fold into
//! - **Decider**: pure rules `(Command, State) -> Events` plus
//!   `(State, Event) -> State`, with an optional terminal predicate
//! - **Reactor**: pure rules `Event -> Commands` for follow-up work
//! - **View**: an evolution-only read model
//!
//! Deciders compose before they execute: route two of them behind a
//! [`Sum`]/[`Pair`] split with [`Decider::compose`], run a keyed fleet
//! with [`Decider::many`], or close a workflow loop with
//! [`Reactor::combine_with_decider`]. Execution is a separate concern,
//! covered by [`EventSourced`], [`StateStored`], and [`InMemory`].
//!
//! ## Example
//!
//! ```
//! use decider_core::{DeciderBuilder, InMemory};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum CounterCommand {
//!     Increment,
//! }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum CounterEvent {
//!     Incremented,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let counter = DeciderBuilder::new()
//!     .initial_state(0_u32)
//!     .decide_on(&CounterCommand::Increment, |_, _| {
//!         Ok(vec![CounterEvent::Incremented])
//!     })
//!     .evolve_on(&CounterEvent::Incremented, |state, _| state + 1)
//!     .build()?;
//!
//! let instance = InMemory::new(counter);
//! instance.execute(&CounterCommand::Increment)?;
//! instance.execute(&CounterCommand::Increment)?;
//! assert_eq!(instance.state(), 2);
//! # Ok(())
//! # }
//! ```

/// Fluent construction of deciders.
pub mod builder;
/// Structural composition: pairing deciders and keyed fleets.
pub mod compose;
/// The decider value itself.
pub mod decider;
/// Error types shared across the crate.
pub mod error;
/// Event store collaborator and event-sourced execution.
pub mod event_store;
/// In-memory execution.
pub mod in_memory;
/// Reactors and the decide/react fixed point.
pub mod reactor;
/// Rule matching and handler signatures.
pub mod rule;
/// State repository collaborator and state-stored execution.
pub mod state_store;
/// Identifier newtypes for streams, versions, and etags.
pub mod stream;
mod transform;
/// Evolution-only read models.
pub mod view;

pub use builder::DeciderBuilder;
pub use compose::{Pair, Sum};
pub use decider::Decider;
pub use error::{BuildError, DecideError, DomainError, ExecuteError, UnknownEvent};
pub use event_store::{EventSourced, EventStore, EventStoreError};
pub use in_memory::InMemory;
pub use reactor::{Reactor, ReactorBuilder};
pub use rule::{DecideHandler, EvolveHandler, MatchSpec, ReactHandler, TerminalPredicate};
pub use state_store::{StateRepository, StateStoreError, StateStored};
pub use stream::{ETag, StreamName, Version};
pub use view::{View, ViewBuilder};
