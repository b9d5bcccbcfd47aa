//! State repository collaborator and the state-stored execution driver.
//!
//! Where event sourcing persists what happened, [`StateStored`] persists
//! only the latest folded state, guarded by an [`ETag`] so stale writers
//! lose. Events still flow out of each execution; they are just not the
//! record of truth.

use crate::decider::Decider;
use crate::error::ExecuteError;
use crate::stream::ETag;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by state repository implementations.
#[derive(Error, Debug)]
pub enum StateStoreError {
    /// The held etag no longer matches the stored record.
    #[error("etag conflict on {key}")]
    Conflict {
        /// The record the stale operation touched.
        key: String,
    },

    /// The backing store failed for reasons unrelated to concurrency.
    #[error("state store backend error: {0}")]
    Backend(String),
}

/// Keyed storage for folded decider state with etag guards.
///
/// A load hands back the record's current etag; the matching save must
/// present it again, which is how two writers racing on the same key
/// are detected. Saving without an etag claims a key that must not
/// exist yet.
///
/// Methods return boxed futures rather than `async fn` so the trait
/// stays dyn compatible.
pub trait StateRepository<S>: Send + Sync {
    /// Loads the record under `key`, or `None` when nothing was saved
    /// there yet.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Conflict`] when `etag` is given and
    /// no longer matches the stored record, and
    /// [`StateStoreError::Backend`] for storage failures.
    fn try_load<'a>(
        &'a self,
        key: &'a str,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<(S, ETag)>, StateStoreError>> + Send + 'a>>;

    /// Saves `state` under `key` and returns the record's new etag.
    ///
    /// With an etag this is a guarded update of an existing record;
    /// without one it claims a key nobody has written to.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Conflict`] when the guard fails
    /// either way, and [`StateStoreError::Backend`] for storage
    /// failures.
    fn save<'a>(
        &'a self,
        key: &'a str,
        state: S,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<ETag, StateStoreError>> + Send + 'a>>;
}

impl<S, R> StateRepository<S> for Arc<R>
where
    R: StateRepository<S> + ?Sized,
{
    fn try_load<'a>(
        &'a self,
        key: &'a str,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<(S, ETag)>, StateStoreError>> + Send + 'a>>
    {
        (**self).try_load(key, etag)
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        state: S,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<ETag, StateStoreError>> + Send + 'a>> {
        (**self).save(key, state, etag)
    }
}

/// Runs a [`Decider`] over a [`StateRepository`], one command at a time.
pub struct StateStored<C, S, E, R> {
    decider: Decider<C, S, E>,
    repository: R,
}

impl<C, S, E, R> StateStored<C, S, E, R>
where
    S: Clone + Send + Sync + 'static,
    R: StateRepository<S>,
{
    /// Pairs a decider with its state repository.
    pub const fn new(decider: Decider<C, S, E>, repository: R) -> Self {
        Self { decider, repository }
    }

    /// Handles one command against the record under `key`.
    ///
    /// Loads the current state (or the decider's initial state when the
    /// key is fresh), decides, folds the new events into the state, and
    /// saves the result guarded by the etag the load produced. Passing
    /// the etag from a previous execution rejects the command when
    /// someone else has written in between; passing `None` accepts
    /// whatever is stored now. Returns the new events together with the
    /// record's new etag.
    ///
    /// # Errors
    ///
    /// [`ExecuteError::Rejected`] when the decider rejects the command,
    /// [`ExecuteError::Store`] when loading or saving fails.
    #[tracing::instrument(skip(self, command), name = "state_stored_execute")]
    pub async fn execute(
        &self,
        command: &C,
        key: &str,
        etag: Option<&ETag>,
    ) -> Result<(Vec<E>, ETag), ExecuteError<StateStoreError>> {
        let loaded = self.repository.try_load(key, etag).await?;
        let (state, current_etag) = match loaded {
            Some((state, etag)) => (state, Some(etag)),
            None => (self.decider.initial_state().clone(), None),
        };

        let events = self
            .decider
            .decide(command, &state)
            .map_err(ExecuteError::Rejected)?;
        let next = self.decider.fold(state, &events);

        let new_etag = match self.repository.save(key, next, current_etag.as_ref()).await {
            Ok(etag) => etag,
            Err(error) => {
                tracing::warn!(%error, "save failed");
                return Err(error.into());
            }
        };
        tracing::debug!(decided = events.len(), etag = %new_etag, "command handled");
        Ok((events, new_etag))
    }
}
