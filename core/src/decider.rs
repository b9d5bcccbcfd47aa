//! The decider value: a pure decide/evolve state machine.
//!
//! A [`Decider`] bundles four things: an initial state, ordered decision
//! rules (command + state in, events out), ordered evolution rules
//! (state + event in, next state out) and a terminal predicate. It holds
//! no mutable state of its own. Deciding and evolving are pure reads, so
//! a single decider value can be shared freely across threads and reused
//! for any number of instances of the process it describes.
//!
//! # Dispatch
//!
//! Every entry point comes in two flavours:
//!
//! - **Soft** ([`decide`](Decider::decide), [`evolve`](Decider::evolve)):
//!   an unmatched input is absorbed. Deciding emits nothing, evolving
//!   returns the state unchanged.
//! - **Strict** ([`try_decide`](Decider::try_decide),
//!   [`try_evolve`](Decider::try_evolve)): an unmatched input is an
//!   error carrying the rejected input.
//!
//! Soft dispatch is what composition relies on: combined deciders route
//! every input to every part and the parts that do not care simply
//! contribute nothing.
//!
//! # Read state vs produced state
//!
//! `Decider<C, S, E, SIn>` reads `SIn` and produces `S`. Deciders built
//! with [`DeciderBuilder`](crate::builder::DeciderBuilder) sit on the
//! diagonal (`SIn = S`, the default) and that is where folding is
//! defined. State-mapping combinators move a decider off the diagonal;
//! applying [`map2`](Decider::map2) or [`apply`](Decider::apply) brings
//! it back.
//!
//! # Example
//!
//! ```
//! use decider_core::DeciderBuilder;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Command {
//!     Deposit { amount: i64 },
//! }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Event {
//!     Deposited { amount: i64 },
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let account = DeciderBuilder::new()
//!     .initial_state(0_i64)
//!     .decide_on(&Command::Deposit { amount: 0 }, |command, _balance| {
//!         let Command::Deposit { amount } = command;
//!         Ok(vec![Event::Deposited { amount: *amount }])
//!     })
//!     .evolve_on(&Event::Deposited { amount: 0 }, |balance, event| {
//!         let Event::Deposited { amount } = event;
//!         balance + amount
//!     })
//!     .build()?;
//!
//! let events = account.decide(&Command::Deposit { amount: 25 }, &0)?;
//! assert_eq!(account.fold(0, &events), 25);
//! # Ok(())
//! # }
//! ```

use crate::error::{DecideError, DomainError, UnknownEvent};
use crate::rule::{DecisionRule, EvolutionRule, StateFallback, TerminalPredicate};
use std::fmt;

/// A pure decide/evolve state machine over commands `C`, produced states
/// `S` and events `E`, reading states of type `SIn`.
///
/// See the [module docs](self) for the dispatch and state-typing rules.
pub struct Decider<C, S, E, SIn = S> {
    pub(crate) initial_state: S,
    pub(crate) decision_rules: Vec<DecisionRule<C, SIn, E>>,
    pub(crate) evolution_rules: Vec<EvolutionRule<SIn, E, S>>,
    pub(crate) terminal: TerminalPredicate<SIn>,
    pub(crate) evolve_fallback: StateFallback<SIn, S>,
}

impl<C, S, E, SIn> Decider<C, S, E, SIn> {
    /// The state an instance starts from before any event applied.
    #[must_use]
    pub const fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// Decides which events follow from a command in the given state.
    ///
    /// Rules are consulted in declaration order and the first match wins.
    /// When no rule matches, the command is absorbed and no events are
    /// emitted. Emission order within the returned vector is exactly the
    /// order the handler produced.
    ///
    /// # Errors
    ///
    /// Returns the handler's rejection when the matched rule turns the
    /// command down. An unmatched command is not an error here; use
    /// [`try_decide`](Self::try_decide) to treat it as one.
    pub fn decide(&self, command: &C, state: &SIn) -> Result<Vec<E>, DomainError> {
        for rule in &self.decision_rules {
            if rule.spec.matches(command, state) {
                return (rule.handler)(command, state);
            }
        }
        Ok(Vec::new())
    }

    /// Strict variant of [`decide`](Self::decide): an unmatched command
    /// is reported instead of absorbed.
    ///
    /// # Errors
    ///
    /// [`DecideError::UnknownCommand`] when no rule matches, carrying the
    /// command back to the caller. [`DecideError::Rejected`] when the
    /// matched handler rejects it.
    pub fn try_decide(&self, command: C, state: &SIn) -> Result<Vec<E>, DecideError<C>> {
        for rule in &self.decision_rules {
            if rule.spec.matches(&command, state) {
                return (rule.handler)(&command, state).map_err(DecideError::Rejected);
            }
        }
        Err(DecideError::UnknownCommand { command })
    }

    /// Applies one event to the state and returns the next state.
    ///
    /// When no evolution rule matches, the state passes through
    /// unchanged. Evolution is total and never fails; unknown events are
    /// simply ignored, which is what lets replays tolerate events a
    /// decider does not care about.
    #[must_use]
    pub fn evolve(&self, state: &SIn, event: &E) -> S {
        for rule in &self.evolution_rules {
            if rule.spec.matches(event, state) {
                return (rule.handler)(state, event);
            }
        }
        (self.evolve_fallback)(state)
    }

    /// Strict variant of [`evolve`](Self::evolve): an unmatched event is
    /// reported instead of ignored.
    ///
    /// # Errors
    ///
    /// [`UnknownEvent`] when no rule matches, carrying the event.
    pub fn try_evolve(&self, state: &SIn, event: E) -> Result<S, UnknownEvent<E>> {
        for rule in &self.evolution_rules {
            if rule.spec.matches(&event, state) {
                return Ok((rule.handler)(state, &event));
            }
        }
        Err(UnknownEvent { event })
    }

    /// Is the given state final for this decider?
    ///
    /// Defaults to `false` everywhere unless the decider declared a
    /// terminal predicate.
    #[must_use]
    pub fn is_terminal(&self, state: &SIn) -> bool {
        (self.terminal)(state)
    }

    /// The identity used when evolution falls through: rebuilds the
    /// produced state from the read state without applying anything.
    pub(crate) fn fallback_state(&self, state: &SIn) -> S {
        (self.evolve_fallback)(state)
    }
}

impl<C, S, E> Decider<C, S, E> {
    /// Folds a sequence of events over [`evolve`](Self::evolve), starting
    /// from `state`. Only defined on the diagonal, where read and
    /// produced state are the same type.
    ///
    /// This is the replay operation: `fold(initial_state, history)`
    /// rebuilds the current state of an instance from its recorded
    /// events.
    #[must_use]
    pub fn fold<'e, I>(&self, state: S, events: I) -> S
    where
        I: IntoIterator<Item = &'e E>,
        E: 'e,
    {
        events
            .into_iter()
            .fold(state, |current, event| self.evolve(&current, event))
    }
}

impl<C, S, E, SIn> fmt::Debug for Decider<C, S, E, SIn>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decider")
            .field("initial_state", &self.initial_state)
            .field("decision_rules", &self.decision_rules.len())
            .field("evolution_rules", &self.evolution_rules.len())
            .finish_non_exhaustive()
    }
}
