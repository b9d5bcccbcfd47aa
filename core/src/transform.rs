//! Profunctor-style maps over a decider's three type positions.
//!
//! State maps move a decider off the diagonal and back: `lmap_on_state`
//! changes what a decider reads, `rmap_on_state`/`map` change what it
//! produces, `dimap_on_state` does both at once. Event and command maps
//! re-express a decider's vocabulary without touching its logic. `map2`
//! and `apply` merge deciders that read the same state into one that
//! produces a combined state, which together with `lmap_on_state`
//! projections builds a product-state decider one field at a time.
//!
//! Every map returns a fresh decider whose rules delegate to the
//! original, so the result always routes its inputs; strict dispatch
//! reports unmatched inputs only on the decider that declared the rules.

use crate::decider::Decider;
use crate::error::DomainError;
use crate::rule::{DecisionRule, EvolutionRule, MatchSpec};
use std::sync::Arc;

impl<C, S, E, SIn> Decider<C, S, E, SIn>
where
    C: 'static,
    S: Clone + Send + Sync + 'static,
    E: 'static,
    SIn: 'static,
{
    /// Maps both state positions: `fl` adapts the state this decider
    /// reads, `fr` adapts the state it produces.
    ///
    /// The initial state becomes `fr(initial)`; decide and terminal see
    /// `fl(state)`; evolve sees `fl(state)` and returns through `fr`.
    #[must_use]
    pub fn dimap_on_state<SIn2, S2>(
        self,
        fl: impl Fn(&SIn2) -> SIn + Send + Sync + 'static,
        fr: impl Fn(S) -> S2 + Send + Sync + 'static,
    ) -> Decider<C, S2, E, SIn2>
    where
        SIn2: 'static,
        S2: 'static,
    {
        let initial_state = fr(self.initial_state.clone());
        let inner = Arc::new(self);
        let fl = Arc::new(fl);
        let fr = Arc::new(fr);

        let decide = {
            let inner = Arc::clone(&inner);
            let fl = Arc::clone(&fl);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &SIn2| -> Result<Vec<E>, DomainError> {
                        inner.decide(command, &fl(state))
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            let fl = Arc::clone(&fl);
            let fr = Arc::clone(&fr);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn2, event: &E| {
                    fr(inner.evolve(&fl(state), event))
                }),
            }
        };

        let terminal = {
            let inner = Arc::clone(&inner);
            let fl = Arc::clone(&fl);
            Box::new(move |state: &SIn2| inner.is_terminal(&fl(state)))
        };

        let evolve_fallback =
            Box::new(move |state: &SIn2| fr(inner.fallback_state(&fl(state))));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Maps only the state this decider reads, leaving what it produces
    /// alone. Moves a diagonal decider off the diagonal.
    #[must_use]
    pub fn lmap_on_state<SIn2>(
        self,
        fl: impl Fn(&SIn2) -> SIn + Send + Sync + 'static,
    ) -> Decider<C, S, E, SIn2>
    where
        SIn2: 'static,
    {
        self.dimap_on_state(fl, |state| state)
    }

    /// Maps only the state this decider produces, leaving what it reads
    /// alone.
    #[must_use]
    pub fn rmap_on_state<S2>(
        self,
        fr: impl Fn(S) -> S2 + Send + Sync + 'static,
    ) -> Decider<C, S2, E, SIn>
    where
        S2: 'static,
    {
        let fr = Arc::new(fr);
        let initial_state = fr(self.initial_state.clone());
        let inner = Arc::new(self);

        let decide = {
            let inner = Arc::clone(&inner);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &SIn| -> Result<Vec<E>, DomainError> {
                        inner.decide(command, state)
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            let fr = Arc::clone(&fr);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E| fr(inner.evolve(state, event))),
            }
        };

        let terminal = {
            let inner = Arc::clone(&inner);
            Box::new(move |state: &SIn| inner.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &SIn| fr(inner.fallback_state(state)));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Alias for [`rmap_on_state`](Self::rmap_on_state): the covariant
    /// map over produced state.
    #[must_use]
    pub fn map<S2>(self, f: impl Fn(S) -> S2 + Send + Sync + 'static) -> Decider<C, S2, E, SIn>
    where
        S2: 'static,
    {
        self.rmap_on_state(f)
    }

    /// Maps the event vocabulary: incoming events pass through `fl`
    /// before evolving, emitted events pass through `fr` on the way out.
    #[must_use]
    pub fn dimap_on_event<E2>(
        self,
        fl: impl Fn(&E2) -> E + Send + Sync + 'static,
        fr: impl Fn(E) -> E2 + Send + Sync + 'static,
    ) -> Decider<C, S, E2, SIn>
    where
        E2: 'static,
    {
        let initial_state = self.initial_state.clone();
        let inner = Arc::new(self);

        let decide = {
            let inner = Arc::clone(&inner);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &SIn| -> Result<Vec<E2>, DomainError> {
                        Ok(inner.decide(command, state)?.into_iter().map(&fr).collect())
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E2| inner.evolve(state, &fl(event))),
            }
        };

        let terminal = {
            let inner = Arc::clone(&inner);
            Box::new(move |state: &SIn| inner.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &SIn| inner.fallback_state(state));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Rewrites incoming events before they evolve state. One event type
    /// flows in and out of a decider, so the one-sided form is an
    /// endomorphism: use it to normalize events ahead of evolution.
    #[must_use]
    pub fn lmap_on_event(self, f: impl Fn(&E) -> E + Send + Sync + 'static) -> Self {
        self.dimap_on_event(f, |event| event)
    }

    /// Rewrites emitted events on their way out of decide. Evolution is
    /// untouched.
    #[must_use]
    pub fn rmap_on_event(self, f: impl Fn(E) -> E + Send + Sync + 'static) -> Self {
        let initial_state = self.initial_state.clone();
        let inner = Arc::new(self);

        let decide = {
            let inner = Arc::clone(&inner);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &SIn| -> Result<Vec<E>, DomainError> {
                        Ok(inner.decide(command, state)?.into_iter().map(&f).collect())
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E| inner.evolve(state, event)),
            }
        };

        let terminal = {
            let inner = Arc::clone(&inner);
            Box::new(move |state: &SIn| inner.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &SIn| inner.fallback_state(state));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Adapts this decider to a wider command type: incoming commands
    /// pass through `f` before dispatch, everything else is untouched.
    #[must_use]
    pub fn lmap_on_command<C2>(
        self,
        f: impl Fn(&C2) -> C + Send + Sync + 'static,
    ) -> Decider<C2, S, E, SIn>
    where
        C2: 'static,
    {
        let initial_state = self.initial_state.clone();
        let inner = Arc::new(self);

        let decide = {
            let inner = Arc::clone(&inner);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C2, state: &SIn| -> Result<Vec<E>, DomainError> {
                        inner.decide(&f(command), state)
                    },
                ),
            }
        };

        let evolve = {
            let inner = Arc::clone(&inner);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E| inner.evolve(state, event)),
            }
        };

        let terminal = {
            let inner = Arc::clone(&inner);
            Box::new(move |state: &SIn| inner.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &SIn| inner.fallback_state(state));

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Merges two deciders that read the same state into one producing a
    /// combined state.
    ///
    /// Both operands see the identical incoming state. The merged
    /// decider's initial state is `merge` of both initials; decide
    /// concatenates this decider's emissions then the other's; evolve
    /// evolves both sides from the shared state and merges the results;
    /// a state is terminal when both operands say so.
    #[must_use]
    pub fn map2<SY, S3>(
        self,
        other: Decider<C, SY, E, SIn>,
        merge: impl Fn(S, SY) -> S3 + Send + Sync + 'static,
    ) -> Decider<C, S3, E, SIn>
    where
        SY: Clone + Send + Sync + 'static,
        S3: 'static,
    {
        let merge = Arc::new(merge);
        let initial_state = merge(self.initial_state.clone(), other.initial_state.clone());
        let x = Arc::new(self);
        let y = Arc::new(other);

        let decide = {
            let x = Arc::clone(&x);
            let y = Arc::clone(&y);
            DecisionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(
                    move |command: &C, state: &SIn| -> Result<Vec<E>, DomainError> {
                        let mut events = x.decide(command, state)?;
                        events.extend(y.decide(command, state)?);
                        Ok(events)
                    },
                ),
            }
        };

        let evolve = {
            let x = Arc::clone(&x);
            let y = Arc::clone(&y);
            let merge = Arc::clone(&merge);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E| {
                    merge(x.evolve(state, event), y.evolve(state, event))
                }),
            }
        };

        let terminal = {
            let x = Arc::clone(&x);
            let y = Arc::clone(&y);
            Box::new(move |state: &SIn| x.is_terminal(state) && y.is_terminal(state))
        };

        let evolve_fallback = Box::new(move |state: &SIn| {
            merge(x.fallback_state(state), y.fallback_state(state))
        });

        Decider {
            initial_state,
            decision_rules: vec![decide],
            evolution_rules: vec![evolve],
            terminal,
            evolve_fallback,
        }
    }

    /// Applicative application: this decider produces a function state,
    /// `other` produces its argument, the result produces the function
    /// applied to the argument.
    ///
    /// [`map2`](Self::map2) with function application as the merge. The
    /// function state must be a plain cloneable closure.
    #[must_use]
    pub fn apply<SA, S3>(self, other: Decider<C, SA, E, SIn>) -> Decider<C, S3, E, SIn>
    where
        S: Fn(SA) -> S3,
        SA: Clone + Send + Sync + 'static,
        S3: 'static,
    {
        self.map2(other, |function, value| function(value))
    }
}
