//! Event store collaborator and the event-sourced execution driver.
//!
//! [`EventStore`] is the persistence seam for event sourcing: an
//! append-only log of event streams guarded by optimistic concurrency.
//! [`EventSourced`] pairs a store with a [`Decider`] and runs the
//! replay, decide, append cycle for each command.

use crate::decider::Decider;
use crate::error::ExecuteError;
use crate::stream::{StreamName, Version};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by event store implementations.
#[derive(Error, Debug)]
pub enum EventStoreError {
    /// An append asserted a version other than the stream's actual one,
    /// meaning another writer got there first.
    #[error("version conflict on {stream}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The stream that was appended to.
        stream: StreamName,
        /// The version the append asserted.
        expected: Version,
        /// The version the stream actually holds.
        actual: Version,
    },

    /// The backing store failed for reasons unrelated to concurrency.
    #[error("event store backend error: {0}")]
    Backend(String),
}

/// Append-only storage for event streams.
///
/// Reading an unknown stream yields an empty history, so a decider
/// executed against a stream nobody has written to starts from its
/// initial state. Appends assert the version the writer last observed;
/// a mismatch means a concurrent writer advanced the stream first.
///
/// Methods return boxed futures rather than `async fn` so the trait
/// stays dyn compatible and a store can travel as
/// `Arc<dyn EventStore<E>>`.
pub trait EventStore<E>: Send + Sync {
    /// Reads the full event stream, oldest first. Unknown streams read
    /// as empty.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Backend`] when the store cannot be
    /// reached or the stream cannot be decoded.
    fn read_stream<'a>(
        &'a self,
        stream: &'a StreamName,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<E>, EventStoreError>> + Send + 'a>>;

    /// Appends `events` to the stream, asserting that the stream is
    /// currently at `expected_version`. Returns the version after the
    /// append.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::VersionConflict`] when the stream is
    /// not at `expected_version`, and [`EventStoreError::Backend`] for
    /// storage failures.
    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: Version,
        events: Vec<E>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + 'a>>;
}

impl<E, ES> EventStore<E> for Arc<ES>
where
    ES: EventStore<E> + ?Sized,
{
    fn read_stream<'a>(
        &'a self,
        stream: &'a StreamName,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<E>, EventStoreError>> + Send + 'a>> {
        (**self).read_stream(stream)
    }

    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: Version,
        events: Vec<E>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + 'a>> {
        (**self).append(stream, expected_version, events)
    }
}

/// Runs a [`Decider`] over an [`EventStore`], one command at a time.
///
/// The driver owns no state of its own. Every execution replays the
/// stream from scratch, so the decider sees exactly the state its
/// recorded events produce.
pub struct EventSourced<C, S, E, ES> {
    decider: Decider<C, S, E>,
    store: ES,
}

impl<C, S, E, ES> EventSourced<C, S, E, ES>
where
    S: Clone + Send + Sync + 'static,
    E: Clone,
    ES: EventStore<E>,
{
    /// Pairs a decider with its event store.
    pub const fn new(decider: Decider<C, S, E>, store: ES) -> Self {
        Self { decider, store }
    }

    /// Handles one command against the given stream.
    ///
    /// Replays the stream into the decider's current state, decides,
    /// then appends the resulting events while asserting the version
    /// the replay observed. A concurrent writer in between surfaces as
    /// [`EventStoreError::VersionConflict`]; whether to retry is the
    /// caller's decision. Returns the new events together with the
    /// stream's version after the append.
    ///
    /// # Errors
    ///
    /// [`ExecuteError::Rejected`] when the decider rejects the command,
    /// [`ExecuteError::Store`] when reading or appending fails.
    #[tracing::instrument(skip(self, command), name = "event_sourced_execute")]
    pub async fn execute(
        &self,
        command: &C,
        stream: &StreamName,
    ) -> Result<(Vec<E>, Version), ExecuteError<EventStoreError>> {
        let history = self.store.read_stream(stream).await?;
        let state = self
            .decider
            .fold(self.decider.initial_state().clone(), &history);
        let events = self
            .decider
            .decide(command, &state)
            .map_err(ExecuteError::Rejected)?;

        let expected = Version::new(history.len() as u64);
        let version = match self.store.append(stream, expected, events.clone()).await {
            Ok(version) => version,
            Err(error) => {
                tracing::warn!(%error, "append failed");
                return Err(error.into());
            }
        };
        tracing::debug!(appended = events.len(), %version, "command handled");
        Ok((events, version))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can unwrap
    #![allow(clippy::panic)] // Tests can panic on unexpected variants

    use super::*;
    use crate::builder::DeciderBuilder;
    use crate::error::DomainError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq)]
    enum TallyCommand {
        Add { amount: i64 },
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TallyEvent {
        Added { amount: i64 },
    }

    #[derive(Debug, Error)]
    #[error("tally is closed")]
    struct TallyClosed;

    // Adds amounts until the tally reaches 10, then rejects.
    fn tally() -> Decider<TallyCommand, i64, TallyEvent> {
        DeciderBuilder::new()
            .initial_state(0)
            .decide_any(
                |command: &TallyCommand, state: &i64| -> Result<Vec<TallyEvent>, DomainError> {
                    if *state >= 10 {
                        return Err(TallyClosed.into());
                    }
                    let TallyCommand::Add { amount } = command;
                    Ok(vec![TallyEvent::Added { amount: *amount }])
                },
            )
            .evolve_any(|state: &i64, event: &TallyEvent| {
                let TallyEvent::Added { amount } = event;
                state + amount
            })
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct FakeStore {
        streams: Mutex<HashMap<StreamName, Vec<TallyEvent>>>,
    }

    impl EventStore<TallyEvent> for FakeStore {
        fn read_stream<'a>(
            &'a self,
            stream: &'a StreamName,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<TallyEvent>, EventStoreError>> + Send + 'a>>
        {
            Box::pin(async move {
                let streams = self.streams.lock().unwrap();
                Ok(streams.get(stream).cloned().unwrap_or_default())
            })
        }

        fn append<'a>(
            &'a self,
            stream: &'a StreamName,
            expected_version: Version,
            events: Vec<TallyEvent>,
        ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + 'a>> {
            Box::pin(async move {
                let mut streams = self.streams.lock().unwrap();
                let entries = streams.entry(stream.clone()).or_default();
                let actual = Version::new(entries.len() as u64);
                if actual != expected_version {
                    return Err(EventStoreError::VersionConflict {
                        stream: stream.clone(),
                        expected: expected_version,
                        actual,
                    });
                }
                entries.extend(events);
                Ok(Version::new(entries.len() as u64))
            })
        }
    }

    // Reads hide the most recent event, as if another writer appended
    // after this reader's replay.
    struct StaleStore {
        inner: FakeStore,
    }

    impl EventStore<TallyEvent> for StaleStore {
        fn read_stream<'a>(
            &'a self,
            stream: &'a StreamName,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<TallyEvent>, EventStoreError>> + Send + 'a>>
        {
            Box::pin(async move {
                let mut events = self.inner.read_stream(stream).await?;
                events.pop();
                Ok(events)
            })
        }

        fn append<'a>(
            &'a self,
            stream: &'a StreamName,
            expected_version: Version,
            events: Vec<TallyEvent>,
        ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + 'a>> {
            self.inner.append(stream, expected_version, events)
        }
    }

    fn seed(store: &FakeStore, stream: &StreamName, events: Vec<TallyEvent>) {
        store.streams.lock().unwrap().insert(stream.clone(), events);
    }

    #[tokio::test]
    async fn unknown_streams_execute_from_initial_state() {
        let driver = EventSourced::new(tally(), FakeStore::default());
        let stream = StreamName::new("tally-1");

        let (events, version) = driver
            .execute(&TallyCommand::Add { amount: 3 }, &stream)
            .await
            .unwrap();

        assert_eq!(events, vec![TallyEvent::Added { amount: 3 }]);
        assert_eq!(version, Version::new(1));
    }

    #[tokio::test]
    async fn each_execution_replays_the_recorded_history() {
        let driver = EventSourced::new(tally(), FakeStore::default());
        let stream = StreamName::new("tally-1");

        driver
            .execute(&TallyCommand::Add { amount: 4 }, &stream)
            .await
            .unwrap();
        let (_, version) = driver
            .execute(&TallyCommand::Add { amount: 6 }, &stream)
            .await
            .unwrap();
        assert_eq!(version, Version::new(2));

        // The replayed tally now sits at 10, so the decider rejects.
        let error = driver
            .execute(&TallyCommand::Add { amount: 1 }, &stream)
            .await
            .unwrap_err();
        assert!(matches!(error, ExecuteError::Rejected(_)));
        assert_eq!(error.to_string(), "command rejected: tally is closed");
    }

    #[tokio::test]
    async fn rejected_commands_leave_the_stream_untouched() {
        let store = Arc::new(FakeStore::default());
        let stream = StreamName::new("tally-1");
        seed(&store, &stream, vec![TallyEvent::Added { amount: 10 }]);

        let driver = EventSourced::new(tally(), Arc::clone(&store));
        let result = driver
            .execute(&TallyCommand::Add { amount: 1 }, &stream)
            .await;

        assert!(result.is_err());
        assert_eq!(store.read_stream(&stream).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn appends_assert_the_version_the_replay_observed() {
        let store = StaleStore {
            inner: FakeStore::default(),
        };
        let stream = StreamName::new("tally-1");
        seed(&store.inner, &stream, vec![TallyEvent::Added { amount: 4 }]);

        let driver = EventSourced::new(tally(), store);
        let error = driver
            .execute(&TallyCommand::Add { amount: 1 }, &stream)
            .await
            .unwrap_err();

        match error {
            ExecuteError::Store(EventStoreError::VersionConflict { expected, actual, .. }) => {
                assert_eq!(expected, Version::new(0));
                assert_eq!(actual, Version::new(1));
            }
            other => panic!("expected a version conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn conflict_errors_name_the_stream_and_versions() {
        let store = FakeStore::default();
        let stream = StreamName::new("tally-1");
        seed(&store, &stream, vec![TallyEvent::Added { amount: 4 }]);

        let error = store
            .append(&stream, Version::INITIAL, vec![TallyEvent::Added { amount: 1 }])
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "version conflict on tally-1: expected 0, found 1"
        );
    }

    #[tokio::test]
    async fn a_store_can_be_shared_through_arc() {
        let store: Arc<FakeStore> = Arc::new(FakeStore::default());
        let driver = EventSourced::new(tally(), Arc::clone(&store));
        let stream = StreamName::new("tally-1");

        driver
            .execute(&TallyCommand::Add { amount: 2 }, &stream)
            .await
            .unwrap();
        driver
            .execute(&TallyCommand::Add { amount: 5 }, &stream)
            .await
            .unwrap();

        let history = store.read_stream(&stream).await.unwrap();
        assert_eq!(
            history,
            vec![
                TallyEvent::Added { amount: 2 },
                TallyEvent::Added { amount: 5 },
            ]
        );
    }
}
