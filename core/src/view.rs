//! Read models: state folded from events, with no command side.
//!
//! A [`View`] is the evolve half of a decider on its own: an initial
//! state plus ordered evolution rules, dispatched exactly like a
//! decider's. Views exist to serve queries, so they only consume
//! events; that one-sidedness is what lets [`lmap_on_event`]
//! (View::lmap_on_event) change the event type freely where a decider
//! can only rename within one type.

#![allow(clippy::module_name_repetitions)] // ViewBuilder is the natural name

use crate::error::BuildError;
use crate::rule::{EvolutionRule, MatchSpec, StateFallback};
use std::fmt;
use std::sync::Arc;

/// A pure read model: evolves a query-facing state from events.
///
/// `S` is the state the view produces, `SIn` the state it reads; views
/// built with [`ViewBuilder`] are diagonal (`SIn = S`) and the state
/// maps move them off the diagonal the same way decider maps do.
pub struct View<S, E, SIn = S> {
    pub(crate) initial_state: S,
    pub(crate) evolution_rules: Vec<EvolutionRule<SIn, E, S>>,
    pub(crate) evolve_fallback: StateFallback<SIn, S>,
}

impl<S, E, SIn> View<S, E, SIn> {
    /// The state of a view that has seen no events.
    pub const fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// Advances the view state by one event.
    ///
    /// Dispatches to the first matching evolution rule; an unmatched
    /// event leaves the state untouched.
    #[must_use]
    pub fn evolve(&self, state: &SIn, event: &E) -> S {
        for rule in &self.evolution_rules {
            if rule.spec.matches(event, state) {
                return (rule.handler)(state, event);
            }
        }
        (self.evolve_fallback)(state)
    }

    pub(crate) fn fallback_state(&self, state: &SIn) -> S {
        (self.evolve_fallback)(state)
    }
}

impl<S, E> View<S, E> {
    /// Replays a sequence of events over a starting state.
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

impl<S, E, SIn> View<S, E, SIn>
where
    S: Clone + Send + Sync + 'static,
    E: 'static,
    SIn: 'static,
{
    /// Maps both state positions: `fl` adapts the state the view reads,
    /// `fr` adapts the state it produces.
    #[must_use]
    pub fn dimap_on_state<SIn2, S2>(
        self,
        fl: impl Fn(&SIn2) -> SIn + Send + Sync + 'static,
        fr: impl Fn(S) -> S2 + Send + Sync + 'static,
    ) -> View<S2, E, SIn2>
    where
        SIn2: 'static,
        S2: 'static,
    {
        let initial_state = fr(self.initial_state.clone());
        let inner = Arc::new(self);
        let fl = Arc::new(fl);
        let fr = Arc::new(fr);

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

        let evolve_fallback =
            Box::new(move |state: &SIn2| fr(inner.fallback_state(&fl(state))));

        View {
            initial_state,
            evolution_rules: vec![evolve],
            evolve_fallback,
        }
    }

    /// Maps only the state the view reads.
    #[must_use]
    pub fn lmap_on_state<SIn2>(
        self,
        fl: impl Fn(&SIn2) -> SIn + Send + Sync + 'static,
    ) -> View<S, E, SIn2>
    where
        SIn2: 'static,
    {
        self.dimap_on_state(fl, |state| state)
    }

    /// Maps only the state the view produces.
    #[must_use]
    pub fn rmap_on_state<S2>(
        self,
        fr: impl Fn(S) -> S2 + Send + Sync + 'static,
    ) -> View<S2, E, SIn>
    where
        S2: 'static,
    {
        let fr = Arc::new(fr);
        let initial_state = fr(self.initial_state.clone());
        let inner = Arc::new(self);

        let evolve = {
            let inner = Arc::clone(&inner);
            let fr = Arc::clone(&fr);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &E| fr(inner.evolve(state, event))),
            }
        };

        let evolve_fallback = Box::new(move |state: &SIn| fr(inner.fallback_state(state)));

        View {
            initial_state,
            evolution_rules: vec![evolve],
            evolve_fallback,
        }
    }

    /// Adapts this view to a different event type: incoming events pass
    /// through `f` before evolving. Views only consume events, so unlike
    /// a decider's event maps this changes the event type freely.
    #[must_use]
    pub fn lmap_on_event<EO>(
        self,
        f: impl Fn(&EO) -> E + Send + Sync + 'static,
    ) -> View<S, EO, SIn>
    where
        EO: 'static,
    {
        let initial_state = self.initial_state.clone();
        let inner = Arc::new(self);

        let evolve = {
            let inner = Arc::clone(&inner);
            EvolutionRule {
                spec: MatchSpec::CatchAll,
                handler: Box::new(move |state: &SIn, event: &EO| inner.evolve(state, &f(event))),
            }
        };

        let evolve_fallback = Box::new(move |state: &SIn| inner.fallback_state(state));

        View {
            initial_state,
            evolution_rules: vec![evolve],
            evolve_fallback,
        }
    }
}

impl<S, E, SIn> fmt::Debug for View<S, E, SIn>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("initial_state", &self.initial_state)
            .field("evolution_rules", &self.evolution_rules.len())
            .finish_non_exhaustive()
    }
}

/// Accumulates evolution rules in declaration order and assembles the
/// immutable [`View`]. Views built here are diagonal.
pub struct ViewBuilder<S, E> {
    initial_state: Option<S>,
    initial_state_redefined: bool,
    evolution_rules: Vec<EvolutionRule<S, E, S>>,
}

impl<S, E> ViewBuilder<S, E> {
    /// Starts an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_state: None,
            initial_state_redefined: false,
            evolution_rules: Vec::new(),
        }
    }

    /// Declares the state of a view that has seen no events. Declaring
    /// it twice poisons the builder and surfaces at [`build`](Self::build).
    #[must_use]
    pub fn initial_state(mut self, state: S) -> Self {
        if self.initial_state.is_some() {
            self.initial_state_redefined = true;
        } else {
            self.initial_state = Some(state);
        }
        self
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

    /// Produces the view.
    ///
    /// # Errors
    ///
    /// [`BuildError::StateNotDefined`] when no initial state was given,
    /// [`BuildError::StateAlreadyDefined`] when one was given twice.
    pub fn build(self) -> Result<View<S, E>, BuildError>
    where
        S: Clone + 'static,
    {
        if self.initial_state_redefined {
            return Err(BuildError::StateAlreadyDefined);
        }
        let initial_state = self.initial_state.ok_or(BuildError::StateNotDefined)?;

        Ok(View {
            initial_state,
            evolution_rules: self.evolution_rules,
            evolve_fallback: Box::new(Clone::clone),
        })
    }
}

impl<S, E> Default for ViewBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
