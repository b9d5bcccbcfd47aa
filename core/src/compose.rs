//! Structural composition: run independent deciders as one.
//!
//! [`compose`](Decider::compose) pairs two deciders into a single value
//! over tagged commands and events: the state is a [`Pair`] of both
//! states, inputs arrive wrapped in [`Sum`] and are routed to the side
//! the tag names, and outputs come back wrapped in the same tag. The
//! halves stay fully independent; neither sees the other's inputs.
//!
//! [`many`](Decider::many) lifts one decider over a keyed fleet of
//! instances: commands and events carry an id, state becomes a map from
//! id to instance state, and ids that have never been seen behave as the
//! inner initial state.

use crate::decider::Decider;
use crate::error::DomainError;
use crate::rule::{DecisionRule, EvolutionRule, MatchSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Product of two states. The state type of a composed decider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair<L, R> {
    /// State of the left half.
    pub left: L,
    /// State of the right half.
    pub right: R,
}

impl<L, R> Pair<L, R> {
    /// Pairs two states.
    #[must_use]
    pub const fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// A copy of the pair with the left half replaced.
    #[must_use]
    pub fn with_left(&self, left: L) -> Self
    where
        R: Clone,
    {
        Self {
            left,
            right: self.right.clone(),
        }
    }

    /// A copy of the pair with the right half replaced.
    #[must_use]
    pub fn with_right(&self, right: R) -> Self
    where
        L: Clone,
    {
        Self {
            left: self.left.clone(),
            right,
        }
    }
}

/// Tagged choice of two types. The command and event type of a composed
/// decider: the tag names the half an input belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sum<L, R> {
    /// Belongs to the left half.
    Left(L),
    /// Belongs to the right half.
    Right(R),
}

impl<CL, SL, EL> Decider<CL, SL, EL>
where
    CL: 'static,
    SL: Clone + Send + Sync + 'static,
    EL: 'static,
{
    /// Combines two deciders into one over tagged inputs.
    ///
    /// The composed decider starts from the pair of both initial states,
    /// routes `Sum::Left`/`Sum::Right` inputs to the matching half and
    /// re-tags emitted events the same way. A state is terminal only
    /// when both halves say so.
    #[must_use]
    pub fn compose<CR, SR, ER>(
        self,
        other: Decider<CR, SR, ER>,
    ) -> Decider<Sum<CL, CR>, Pair<SL, SR>, Sum<EL, ER>>
    where
        CR: 'static,
        SR: Clone + Send + Sync + 'static,
        ER: 'static,
    {
        let initial_state = Pair::new(
            self.initial_state().clone(),
            other.initial_state().clone(),
        );
        let left = Arc::new(self);
        let right = Arc::new(other);

        let decide_left = {
            let left = Arc::clone(&left);
            DecisionRule {
                spec: MatchSpec::predicate(|command: &Sum<CL, CR>, _: &Pair<SL, SR>| {
                    matches!(command, Sum::Left(_))
                }),
                handler: Box::new(
                    move |command: &Sum<CL, CR>,
                          state: &Pair<SL, SR>|
                          -> Result<Vec<Sum<EL, ER>>, DomainError> {
                        match command {
                            Sum::Left(command) => Ok(left
                                .decide(command, &state.left)?
                                .into_iter()
                                .map(Sum::Left)
                                .collect()),
                            Sum::Right(_) => Ok(Vec::new()),
                        }
                    },
                ),
            }
        };

        let decide_right = {
            let right = Arc::clone(&right);
            DecisionRule {
                spec: MatchSpec::predicate(|command: &Sum<CL, CR>, _: &Pair<SL, SR>| {
                    matches!(command, Sum::Right(_))
                }),
                handler: Box::new(
                    move |command: &Sum<CL, CR>,
                          state: &Pair<SL, SR>|
                          -> Result<Vec<Sum<EL, ER>>, DomainError> {
                        match command {
                            Sum::Right(command) => Ok(right
                                .decide(command, &state.right)?
                                .into_iter()
                                .map(Sum::Right)
                                .collect()),
                            Sum::Left(_) => Ok(Vec::new()),
                        }
                    },
                ),
            }
        };

        let evolve_left = {
            let left = Arc::clone(&left);
            EvolutionRule {
                spec: MatchSpec::predicate(|event: &Sum<EL, ER>, _: &Pair<SL, SR>| {
                    matches!(event, Sum::Left(_))
                }),
                handler: Box::new(move |state: &Pair<SL, SR>, event: &Sum<EL, ER>| {
                    match event {
                        Sum::Left(event) => state.with_left(left.evolve(&state.left, event)),
                        Sum::Right(_) => state.clone(),
                    }
                }),
            }
        };

        let evolve_right = {
            let right = Arc::clone(&right);
            EvolutionRule {
                spec: MatchSpec::predicate(|event: &Sum<EL, ER>, _: &Pair<SL, SR>| {
                    matches!(event, Sum::Right(_))
                }),
                handler: Box::new(move |state: &Pair<SL, SR>, event: &Sum<EL, ER>| {
                    match event {
                        Sum::Right(event) => state.with_right(right.evolve(&state.right, event)),
                        Sum::Left(_) => state.clone(),
                    }
                }),
            }
        };

        let terminal = Box::new(move |state: &Pair<SL, SR>| {
            left.is_terminal(&state.left) && right.is_terminal(&state.right)
        });

        Decider {
            initial_state,
            decision_rules: vec![decide_left, decide_right],
            evolution_rules: vec![evolve_left, evolve_right],
            terminal,
            evolve_fallback: Box::new(Clone::clone),
        }
    }
}

impl<C, S, E> Decider<C, S, E>
where
    C: 'static,
    S: Clone + Send + Sync + 'static,
    E: 'static,
{
    /// Lifts this decider over a fleet of keyed instances.
    ///
    /// Commands and events become `(id, inner)` pairs and the state a
    /// map from id to instance state. An id with no entry reads as the
    /// inner initial state, so the first command addressed to a fresh id
    /// just works. Evolving touches only the addressed entry.
    ///
    /// The empty fleet is never terminal; a non-empty fleet is terminal
    /// when every instance is.
    #[must_use]
    pub fn many<K>(self) -> Decider<(K, C), HashMap<K, S>, (K, E)>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
    {
        let inner = Arc::new(self);

        let decide = {
            let inner = Arc::clone(&inner);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |addressed: &(K, C),
                          states: &HashMap<K, S>|
                          -> Result<Vec<(K, E)>, DomainError> {
                        let (id, command) = addressed;
                        let state = states.get(id).unwrap_or_else(|| inner.initial_state());
                        Ok(inner
                            .decide(command, state)?
                            .into_iter()
                            .map(|event| (id.clone(), event))
                            .collect())
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |states: &HashMap<K, S>, addressed: &(K, E)| {
                    let (id, event) = addressed;
                    let state = states.get(id).unwrap_or_else(|| inner.initial_state());
                    let mut next = states.clone();
                    next.insert(id.clone(), inner.evolve(state, event));
                    next
                }),
            }
        };

        let terminal = Box::new(move |states: &HashMap<K, S>| {
            !states.is_empty() && states.values().all(|state| inner.is_terminal(state))
        });

        Decider {
            initial_state: HashMap::new(),
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback: Box::new(Clone::clone),
        }
    }
}
