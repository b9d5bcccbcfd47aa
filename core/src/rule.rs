//! Rule dispatch: match specifications paired with handlers.
//!
//! A decider is driven by ordered rule lists. Each rule pairs a
//! [`MatchSpec`] with a handler; dispatch walks the list in declaration
//! order and the first matching rule wins. Later rules are never
//! consulted, so specific rules belong before general ones.
//!
//! A spec always inspects two values: the *primary* value being
//! dispatched (a command for decision rules, an event for evolution
//! rules, an action result for reactions) and a *companion* that rides
//! along (the current state for deciders, `()` for reactors).

use crate::error::DomainError;
use std::fmt;
use std::mem::{self, Discriminant};

/// Boxed decision handler: inspects a command against the read state and
/// emits events, or rejects the command with a domain error.
pub type DecideHandler<C, SIn, E> =
    Box<dyn Fn(&C, &SIn) -> Result<Vec<E>, DomainError> + Send + Sync>;

/// Boxed evolution handler: folds one event into the read state and
/// returns the next produced state. Evolution never fails.
pub type EvolveHandler<SIn, E, S> = Box<dyn Fn(&SIn, &E) -> S + Send + Sync>;

/// Boxed terminal predicate over the read state.
pub type TerminalPredicate<SIn> = Box<dyn Fn(&SIn) -> bool + Send + Sync>;

/// Boxed reaction handler: turns one action result into follow-up actions.
pub type ReactHandler<AR, A> = Box<dyn Fn(&AR) -> Vec<A> + Send + Sync>;

/// Identity used when no evolution rule matches: rebuilds the produced
/// state from the read state alone. On plain deciders this is a clone;
/// combinators compose it alongside their state mappings.
pub(crate) type StateFallback<SIn, S> = Box<dyn Fn(&SIn) -> S + Send + Sync>;

/// What a rule matches on.
///
/// Variant matching compares [`std::mem::Discriminant`] values, so it
/// selects on an enum's variant while ignoring its payload. Predicate
/// matching runs an arbitrary closure over both values.
pub enum MatchSpec<P, X> {
    /// Matches when the closure returns `true` for (primary, companion).
    Predicate(Box<dyn Fn(&P, &X) -> bool + Send + Sync>),

    /// Matches any primary value of the given enum variant.
    Variant(Discriminant<P>),

    /// Matches when both the primary and the companion carry the given
    /// variants.
    VariantPair(Discriminant<P>, Discriminant<X>),

    /// Matches everything.
    CatchAll,
}

impl<P, X> MatchSpec<P, X> {
    /// Builds a predicate spec from a closure over (primary, companion).
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&P, &X) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Box::new(predicate))
    }

    /// Builds a variant spec from a sample primary value. Only the
    /// sample's variant matters; its payload is discarded.
    pub fn variant(sample: &P) -> Self {
        Self::Variant(mem::discriminant(sample))
    }

    /// Builds a pair spec from sample primary and companion values.
    pub fn variant_pair(primary: &P, companion: &X) -> Self {
        Self::VariantPair(mem::discriminant(primary), mem::discriminant(companion))
    }

    /// Does this spec claim the given pair?
    #[must_use]
    pub fn matches(&self, primary: &P, companion: &X) -> bool {
        match self {
            Self::Predicate(predicate) => predicate(primary, companion),
            Self::Variant(tag) => mem::discriminant(primary) == *tag,
            Self::VariantPair(primary_tag, companion_tag) => {
                mem::discriminant(primary) == *primary_tag
                    && mem::discriminant(companion) == *companion_tag
            }
            Self::CatchAll => true,
        }
    }
}

impl<P, X> fmt::Debug for MatchSpec<P, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Variant(tag) => f.debug_tuple("Variant").field(tag).finish(),
            Self::VariantPair(primary, companion) => f
                .debug_tuple("VariantPair")
                .field(primary)
                .field(companion)
                .finish(),
            Self::CatchAll => f.write_str("CatchAll"),
        }
    }
}

/// One decision rule: a spec over (command, read state) plus its handler.
pub(crate) struct DecisionRule<C, SIn, E> {
    pub(crate) spec: MatchSpec<C, SIn>,
    pub(crate) handler: DecideHandler<C, SIn, E>,
}

/// One evolution rule: a spec over (event, read state) plus its handler.
///
/// The spec's primary value is the event. Handlers receive the state
/// first, matching the shape of a fold.
pub(crate) struct EvolutionRule<SIn, E, S> {
    pub(crate) spec: MatchSpec<E, SIn>,
    pub(crate) handler: EvolveHandler<SIn, E, S>,
}
