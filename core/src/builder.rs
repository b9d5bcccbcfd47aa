//! Fluent construction of deciders.
//!
//! [`DeciderBuilder`] collects an initial state, decision rules,
//! evolution rules and an optional terminal predicate, then produces an
//! immutable [`Decider`]. Rules fire in registration order, so put
//! specific rules (pair matches, guarded predicates) before general
//! ones.
//!
//! Registration methods come in four shapes per side, mirroring
//! [`MatchSpec`]:
//!
//! - `*_on(sample, handler)`: match the sample's enum variant.
//! - `*_on_pair(..)`: match both variants at once.
//! - `*_when(predicate, handler)`: match an arbitrary predicate.
//! - `*_any(handler)`: match everything.
//!
//! The raw `decide_rule`/`evolve_rule` escape hatches accept a
//! pre-built [`MatchSpec`] directly.

#![allow(clippy::module_name_repetitions)] // DeciderBuilder is the natural name

use crate::decider::Decider;
use crate::error::{BuildError, DomainError};
use crate::rule::{DecisionRule, EvolutionRule, MatchSpec, TerminalPredicate};

/// Accumulates the parts of a [`Decider`].
///
/// The builder is consumed by [`build`](Self::build); the produced
/// decider is immutable and shares nothing with the builder that made
/// it.
pub struct DeciderBuilder<C, S, E> {
    initial_state: Option<S>,
    initial_state_redefined: bool,
    decision_rules: Vec<DecisionRule<C, S, E>>,
    evolution_rules: Vec<EvolutionRule<S, E, S>>,
    terminal: Option<TerminalPredicate<S>>,
}

impl<C, S, E> DeciderBuilder<C, S, E> {
    /// Starts an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_state: None,
            initial_state_redefined: false,
            decision_rules: Vec::new(),
            evolution_rules: Vec::new(),
            terminal: None,
        }
    }

    /// Defines the state an instance starts from.
    ///
    /// The first call wins. A second call poisons the builder and
    /// [`build`](Self::build) reports
    /// [`BuildError::StateAlreadyDefined`].
    #[must_use]
    pub fn initial_state(mut self, state: S) -> Self {
        if self.initial_state.is_some() {
            self.initial_state_redefined = true;
        } else {
            self.initial_state = Some(state);
        }
        self
    }

    /// Registers a decision rule with an explicit match spec.
    #[must_use]
    pub fn decide_rule<H>(mut self, spec: MatchSpec<C, S>, handler: H) -> Self
    where
        H: Fn(&C, &S) -> Result<Vec<E>, DomainError> + Send + Sync + 'static,
    {
        self.decision_rules.push(DecisionRule {
            spec,
            handler: Box::new(handler),
        });
        self
    }

    /// Registers a decision rule matching the sample command's variant,
    /// regardless of state.
    #[must_use]
    pub fn decide_on<H>(self, command: &C, handler: H) -> Self
    where
        H: Fn(&C, &S) -> Result<Vec<E>, DomainError> + Send + Sync + 'static,
    {
        self.decide_rule(MatchSpec::variant(command), handler)
    }

    /// Registers a decision rule matching a command variant in a state
    /// variant.
    #[must_use]
    pub fn decide_on_pair<H>(self, command: &C, state: &S, handler: H) -> Self
    where
        H: Fn(&C, &S) -> Result<Vec<E>, DomainError> + Send + Sync + 'static,
    {
        self.decide_rule(MatchSpec::variant_pair(command, state), handler)
    }

    /// Registers a decision rule guarded by a predicate over
    /// (command, state).
    #[must_use]
    pub fn decide_when<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Fn(&C, &S) -> bool + Send + Sync + 'static,
        H: Fn(&C, &S) -> Result<Vec<E>, DomainError> + Send + Sync + 'static,
    {
        self.decide_rule(MatchSpec::predicate(predicate), handler)
    }

    /// Registers a decision rule that claims every command.
    #[must_use]
    pub fn decide_any<H>(self, handler: H) -> Self
    where
        H: Fn(&C, &S) -> Result<Vec<E>, DomainError> + Send + Sync + 'static,
    {
        self.decide_rule(MatchSpec::CatchAll, handler)
    }

    /// Registers an evolution rule with an explicit match spec. The
    /// spec's primary value is the event.
    #[must_use]
    pub fn evolve_rule<H>(mut self, spec: MatchSpec<E, S>, handler: H) -> Self
    where
        H: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        self.evolution_rules.push(EvolutionRule {
            spec,
            handler: Box::new(handler),
        });
        self
    }

    /// Registers an evolution rule matching the sample event's variant,
    /// regardless of state.
    #[must_use]
    pub fn evolve_on<H>(self, event: &E, handler: H) -> Self
    where
        H: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        self.evolve_rule(MatchSpec::variant(event), handler)
    }

    /// Registers an evolution rule matching an event variant landing on
    /// a state variant.
    #[must_use]
    pub fn evolve_on_pair<H>(self, state: &S, event: &E, handler: H) -> Self
    where
        H: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        self.evolve_rule(MatchSpec::variant_pair(event, state), handler)
    }

    /// Registers an evolution rule guarded by a predicate over
    /// (state, event).
    #[must_use]
    pub fn evolve_when<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Fn(&S, &E) -> bool + Send + Sync + 'static,
        H: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        self.evolve_rule(
            MatchSpec::predicate(move |event: &E, state: &S| predicate(state, event)),
            handler,
        )
    }

    /// Registers an evolution rule that claims every event.
    #[must_use]
    pub fn evolve_any<H>(self, handler: H) -> Self
    where
        H: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        self.evolve_rule(MatchSpec::CatchAll, handler)
    }

    /// Declares which states are final. Without this, no state is.
    #[must_use]
    pub fn terminal_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.terminal = Some(Box::new(predicate));
        self
    }

    /// Produces the decider.
    ///
    /// # Errors
    ///
    /// [`BuildError::StateNotDefined`] when no initial state was given,
    /// [`BuildError::StateAlreadyDefined`] when one was given twice.
    pub fn build(self) -> Result<Decider<C, S, E>, BuildError>
    where
        S: Clone + 'static,
    {
        if self.initial_state_redefined {
            return Err(BuildError::StateAlreadyDefined);
        }
        let initial_state = self.initial_state.ok_or(BuildError::StateNotDefined)?;
        Ok(Decider {
            initial_state,
            decision_rules: self.decision_rules,
            evolution_rules: self.evolution_rules,
            terminal: self.terminal.unwrap_or_else(|| Box::new(|_| false)),
            evolve_fallback: Box::new(Clone::clone),
        })
    }
}

impl<C, S, E> Default for DeciderBuilder<C, S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can unwrap
    #![allow(clippy::expect_used)] // Tests can expect

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Turn,
        Stop,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Turned,
        Stopped,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Gate {
        Open,
        Closed { turns: u32 },
    }

    #[test]
    fn build_without_initial_state_fails() {
        let result = DeciderBuilder::<Command, Gate, Event>::new().build();
        assert_eq!(result.unwrap_err(), BuildError::StateNotDefined);
    }

    #[test]
    fn redefining_initial_state_poisons_the_builder() {
        let result = DeciderBuilder::<Command, Gate, Event>::new()
            .initial_state(Gate::Open)
            .initial_state(Gate::Closed { turns: 0 })
            .build();
        assert_eq!(result.unwrap_err(), BuildError::StateAlreadyDefined);
    }

    #[test]
    fn pair_rules_require_both_variants() {
        let decider = DeciderBuilder::new()
            .initial_state(Gate::Closed { turns: 0 })
            .decide_on_pair(&Command::Turn, &Gate::Closed { turns: 0 }, |_, _| {
                Ok(vec![Event::Turned])
            })
            .build()
            .expect("decider builds");

        let events = decider
            .decide(&Command::Turn, &Gate::Closed { turns: 3 })
            .unwrap();
        assert_eq!(events, vec![Event::Turned]);

        let events = decider.decide(&Command::Turn, &Gate::Open).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn evolve_when_sees_state_then_event() {
        let decider: Decider<Command, Gate, Event> = DeciderBuilder::new()
            .initial_state(Gate::Closed { turns: 0 })
            .evolve_when(
                |state, event| {
                    matches!(state, Gate::Closed { turns } if *turns >= 2)
                        && matches!(event, Event::Turned)
                },
                |_, _| Gate::Open,
            )
            .evolve_on(&Event::Turned, |state, _| match state {
                Gate::Closed { turns } => Gate::Closed { turns: turns + 1 },
                Gate::Open => Gate::Open,
            })
            .build()
            .expect("decider builds");

        let opened = decider.fold(
            Gate::Closed { turns: 0 },
            &[Event::Turned, Event::Turned, Event::Turned],
        );
        assert_eq!(opened, Gate::Open);
    }

    #[test]
    fn evolve_on_pair_matches_state_and_event() {
        let decider: Decider<Command, Gate, Event> = DeciderBuilder::new()
            .initial_state(Gate::Open)
            .evolve_on_pair(&Gate::Open, &Event::Stopped, |_, _| {
                Gate::Closed { turns: 0 }
            })
            .build()
            .expect("decider builds");

        assert_eq!(
            decider.evolve(&Gate::Open, &Event::Stopped),
            Gate::Closed { turns: 0 }
        );
        // Wrong state variant: the rule does not claim it.
        assert_eq!(
            decider.evolve(&Gate::Closed { turns: 5 }, &Event::Stopped),
            Gate::Closed { turns: 5 }
        );
    }

    #[test]
    fn raw_rules_accept_prebuilt_specs() {
        let decider: Decider<Command, Gate, Event> = DeciderBuilder::new()
            .initial_state(Gate::Open)
            .decide_rule(MatchSpec::variant(&Command::Stop), |_, _| {
                Ok(vec![Event::Stopped])
            })
            .evolve_rule(MatchSpec::CatchAll, |state, _| state.clone())
            .build()
            .expect("decider builds");

        let events = decider.decide(&Command::Stop, &Gate::Open).unwrap();
        assert_eq!(events, vec![Event::Stopped]);
    }
}
