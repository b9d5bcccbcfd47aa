//! Reactions: follow-up work derived from things that happened.
//!
//! A [`Reactor`] maps an action result (typically an emitted event) to
//! the follow-up actions it calls for (typically commands), through the
//! same ordered first-match dispatch a decider uses. Reactors are pure
//! values: issuing an action means returning it, never performing it.
//!
//! [`combine_with_decider`](Reactor::combine_with_decider) closes the
//! loop: it folds a reactor into a decider so that deciding one command
//! also decides every command the reactor issues in response to the
//! emitted events, breadth-first, until the cascade settles.

use crate::decider::Decider;
use crate::error::DomainError;
use crate::rule::{DecisionRule, EvolutionRule, MatchSpec, ReactHandler};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// An ordered reaction rule: a match spec over the action result plus
/// the handler that issues actions.
struct ReactionRule<AR, A> {
    spec: MatchSpec<AR, ()>,
    handler: ReactHandler<AR, A>,
}

/// A pure mapping from action results to issued actions.
///
/// Rules are consulted in declaration order and the first match wins;
/// an unmatched action result issues nothing.
pub struct Reactor<AR, A> {
    reactions: Vec<ReactionRule<AR, A>>,
}

impl<AR, A> Reactor<AR, A> {
    /// Issues the actions called for by `action_result`.
    ///
    /// Dispatches to the first matching reaction rule; an unmatched
    /// action result issues nothing.
    #[must_use]
    pub fn react(&self, action_result: &AR) -> Vec<A> {
        for rule in &self.reactions {
            if rule.spec.matches(action_result, &()) {
                return (rule.handler)(action_result);
            }
        }
        Vec::new()
    }

    /// Adapts this reactor to a wider action-result type: incoming
    /// results pass through `f` before dispatch.
    #[must_use]
    pub fn lmap_on_action_result<AR2>(
        self,
        f: impl Fn(&AR2) -> AR + Send + Sync + 'static,
    ) -> Reactor<AR2, A>
    where
        AR: 'static,
        A: 'static,
        AR2: 'static,
    {
        Reactor {
            reactions: vec![ReactionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |outer: &AR2| self.react(&f(outer))),
            }],
        }
    }

    /// Maps every issued action through `f`.
    #[must_use]
    pub fn rmap_on_action<A2>(
        self,
        f: impl Fn(A) -> A2 + Send + Sync + 'static,
    ) -> Reactor<AR, A2>
    where
        AR: 'static,
        A: 'static,
        A2: 'static,
    {
        Reactor {
            reactions: vec![ReactionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |result: &AR| {
                    self.react(result).into_iter().map(&f).collect()
                }),
            }],
        }
    }

    /// Alias for [`rmap_on_action`](Self::rmap_on_action).
    #[must_use]
    pub fn map_on_action<A2>(
        self,
        f: impl Fn(A) -> A2 + Send + Sync + 'static,
    ) -> Reactor<AR, A2>
    where
        AR: 'static,
        A: 'static,
        A2: 'static,
    {
        self.rmap_on_action(f)
    }
}

impl<E, C> Reactor<E, C> {
    /// Folds this reactor into `decider`, producing a decider whose
    /// decide runs the full reaction cascade.
    ///
    /// Deciding a command seeds a FIFO worklist. Each popped command is
    /// decided against the running state; its events are appended to the
    /// accumulated list, the running state advances over each of them,
    /// and every command the reactor issues for them joins the tail of
    /// the worklist. The accumulated events are returned once the
    /// worklist drains, so commands are processed breadth-first in
    /// emission order. A rejection anywhere in the cascade aborts it and
    /// propagates.
    ///
    /// The combined decider shares `decider`'s initial state and
    /// terminal predicate, and evolves exactly as `decider` does.
    ///
    /// Termination is the caller's responsibility: a reactor that
    /// answers an event with a command that always reproduces that same
    /// event cascades forever.
    #[must_use]
    pub fn combine_with_decider<S>(self, decider: Decider<C, S, E>) -> Decider<C, S, E>
    where
        C: Clone + 'static,
        E: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let initial_state = decider.initial_state().clone();
        let decider = Arc::new(decider);
        let reactor = self;

        let decide = {
            let decider = Arc::clone(&decider);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &S| -> Result<Vec<E>, DomainError> {
                        let mut worklist = VecDeque::new();
                        worklist.push_back(command.clone());
                        let mut accumulated = Vec::new();
                        let mut current = state.clone();

                        while let Some(next) = worklist.pop_front() {
                            let events = decider.decide(&next, &current)?;
                            for event in &events {
                                current = decider.evolve(&current, event);
                                worklist.extend(reactor.react(event));
                            }
                            accumulated.extend(events);
                        }

                        Ok(accumulated)
                    },
                ),
            }
        };

        let evolve = {
            let decider = Arc::clone(&decider);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &S, event: &E| decider.evolve(state, event)),
            }
        };

        let terminal = {
            let decider = Arc::clone(&decider);
            Box::new(move |state: &S| decider.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &S| decider.fallback_state(state));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }
}

impl<AR, A> fmt::Debug for Reactor<AR, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("reactions", &self.reactions.len())
            .finish_non_exhaustive()
    }
}

/// Accumulates reaction rules in declaration order and assembles the
/// immutable [`Reactor`].
pub struct ReactorBuilder<AR, A> {
    reactions: Vec<ReactionRule<AR, A>>,
}

impl<AR, A> ReactorBuilder<AR, A> {
    /// Starts an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reactions: Vec::new(),
        }
    }

    /// Registers a reaction rule with an explicit match spec. Reaction
    /// specs have no companion value; the unit slot fills in.
    #[must_use]
    pub fn react_rule<H>(mut self, spec: MatchSpec<AR, ()>, handler: H) -> Self
    where
        H: Fn(&AR) -> Vec<A> + Send + Sync + 'static,
    {
        self.reactions.push(ReactionRule {
            spec,
            handler: Box::new(handler),
        });
        self
    }

    /// Registers a reaction rule matching the sample action result's
    /// variant, whatever its payload.
    #[must_use]
    pub fn react_on<H>(self, sample: &AR, handler: H) -> Self
    where
        H: Fn(&AR) -> Vec<A> + Send + Sync + 'static,
    {
        self.react_rule(MatchSpec::variant(sample), handler)
    }

    /// Registers a reaction rule guarded by a predicate over the action
    /// result.
    #[must_use]
    pub fn react_when<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Fn(&AR) -> bool + Send + Sync + 'static,
        H: Fn(&AR) -> Vec<A> + Send + Sync + 'static,
    {
        self.react_rule(
            MatchSpec::predicate(move |result: &AR, _: &()| predicate(result)),
            handler,
        )
    }

    /// Registers a reaction rule that claims every action result.
    #[must_use]
    pub fn react_any<H>(self, handler: H) -> Self
    where
        H: Fn(&AR) -> Vec<A> + Send + Sync + 'static,
    {
        self.react_rule(MatchSpec::CatchAll, handler)
    }

    /// Assembles the reactor. A reactor with no rules is valid: it
    /// issues nothing for every input.
    #[must_use]
    pub fn build(self) -> Reactor<AR, A> {
        Reactor {
            reactions: self.reactions,
        }
    }
}

impl<AR, A> Default for ReactorBuilder<AR, A> {
    fn default() -> Self {
        Self::new()
    }
}
