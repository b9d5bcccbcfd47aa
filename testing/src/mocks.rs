//! In-memory implementations of the persistence collaborators.
//!
//! Both mocks behave like their production counterparts would: the
//! event store enforces version asserts and the repository enforces
//! etag guards, so concurrency bugs show up in tests instead of hiding
//! behind a permissive fake.

use decider_core::event_store::{EventStore, EventStoreError};
use decider_core::state_store::{StateRepository, StateStoreError};
use decider_core::stream::{ETag, StreamName, Version};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Event store backed by a hash map, with faithful version checks.
#[derive(Debug)]
pub struct InMemoryEventStore<E> {
    streams: Mutex<HashMap<StreamName, Vec<E>>>,
}

impl<E> InMemoryEventStore<E> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
        }
    }
}

impl<E: Clone> InMemoryEventStore<E> {
    /// Every event recorded under `stream`, oldest first.
    #[must_use]
    pub fn events(&self, stream: &StreamName) -> Vec<E> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stream)
            .cloned()
            .unwrap_or_default()
    }
}

impl<E> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventStore<E> for InMemoryEventStore<E>
where
    E: Clone + Send,
{
    fn read_stream<'a>(
        &'a self,
        stream: &'a StreamName,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<E>, EventStoreError>> + Send + 'a>> {
        Box::pin(async move {
            let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(streams.get(stream).cloned().unwrap_or_default())
        })
    }

    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: Version,
        events: Vec<E>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + 'a>> {
        Box::pin(async move {
            let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
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

/// State repository backed by a hash map, minting etags from a counter.
#[derive(Debug)]
pub struct InMemoryStateRepository<S> {
    records: Mutex<HashMap<String, (S, ETag)>>,
    next_etag: AtomicU64,
}

impl<S> InMemoryStateRepository<S> {
    /// An empty repository. The first save mints `etag-1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_etag: AtomicU64::new(1),
        }
    }

    fn mint_etag(&self) -> ETag {
        let n = self.next_etag.fetch_add(1, Ordering::SeqCst);
        ETag::new(format!("etag-{n}"))
    }
}

impl<S: Clone> InMemoryStateRepository<S> {
    /// The record stored under `key`, if any.
    #[must_use]
    pub fn record(&self, key: &str) -> Option<(S, ETag)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl<S> Default for InMemoryStateRepository<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateRepository<S> for InMemoryStateRepository<S>
where
    S: Clone + Send,
{
    fn try_load<'a>(
        &'a self,
        key: &'a str,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<(S, ETag)>, StateStoreError>> + Send + 'a>>
    {
        Box::pin(async move {
            let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            let Some((state, stored)) = records.get(key) else {
                return Ok(None);
            };
            match etag {
                Some(held) if held != stored => Err(StateStoreError::Conflict {
                    key: key.to_string(),
                }),
                _ => Ok(Some((state.clone(), stored.clone()))),
            }
        })
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        state: S,
        etag: Option<&'a ETag>,
    ) -> Pin<Box<dyn Future<Output = Result<ETag, StateStoreError>> + Send + 'a>> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            match (records.get(key), etag) {
                (None, None) => {}
                (Some((_, stored)), Some(held)) if stored == held => {}
                _ => {
                    return Err(StateStoreError::Conflict {
                        key: key.to_string(),
                    })
                }
            }
            let fresh = self.mint_etag();
            records.insert(key.to_string(), (state, fresh.clone()));
            Ok(fresh)
        })
    }
}
