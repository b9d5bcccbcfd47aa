//! Round-trips of the execution drivers against the in-memory stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use decider_core::error::ExecuteError;
use decider_core::event_store::{EventSourced, EventStore, EventStoreError};
use decider_core::state_store::{StateStoreError, StateStored};
use decider_core::stream::{ETag, StreamName, Version};
use decider_core::{Decider, DeciderBuilder, DomainError};
use decider_testing::{InMemoryEventStore, InMemoryStateRepository};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
enum MeterCommand {
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
enum MeterEvent {
    Ticked { reading: u32 },
}

#[derive(Debug, Error)]
#[error("meter is exhausted")]
struct MeterExhausted;

// Counts ticks and rejects once three have been recorded.
fn meter() -> Decider<MeterCommand, u32, MeterEvent> {
    DeciderBuilder::new()
        .initial_state(0_u32)
        .decide_on(
            &MeterCommand::Tick,
            |_, reading: &u32| -> Result<Vec<MeterEvent>, DomainError> {
                if *reading >= 3 {
                    return Err(MeterExhausted.into());
                }
                Ok(vec![MeterEvent::Ticked {
                    reading: reading + 1,
                }])
            },
        )
        .evolve_on(&MeterEvent::Ticked { reading: 0 }, |_, event| {
            let MeterEvent::Ticked { reading } = event;
            *reading
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_event_sourced_round_trip() {
    let store = Arc::new(InMemoryEventStore::new());
    let driver = EventSourced::new(meter(), Arc::clone(&store));
    let stream = StreamName::new("meter-1");

    let (events, version) = driver.execute(&MeterCommand::Tick, &stream).await.unwrap();
    assert_eq!(events, vec![MeterEvent::Ticked { reading: 1 }]);
    assert_eq!(version, Version::new(1));

    let (events, version) = driver.execute(&MeterCommand::Tick, &stream).await.unwrap();
    assert_eq!(events, vec![MeterEvent::Ticked { reading: 2 }]);
    assert_eq!(version, Version::new(2));

    assert_eq!(
        store.events(&stream),
        vec![
            MeterEvent::Ticked { reading: 1 },
            MeterEvent::Ticked { reading: 2 },
        ]
    );
}

#[tokio::test]
async fn test_event_sourced_replays_before_rejecting() {
    let store = Arc::new(InMemoryEventStore::new());
    let stream = StreamName::new("meter-1");
    store
        .append(
            &stream,
            Version::INITIAL,
            vec![
                MeterEvent::Ticked { reading: 1 },
                MeterEvent::Ticked { reading: 2 },
                MeterEvent::Ticked { reading: 3 },
            ],
        )
        .await
        .unwrap();

    let driver = EventSourced::new(meter(), Arc::clone(&store));
    let error = driver
        .execute(&MeterCommand::Tick, &stream)
        .await
        .unwrap_err();

    assert!(matches!(error, ExecuteError::Rejected(_)));
    assert_eq!(error.to_string(), "command rejected: meter is exhausted");
    assert_eq!(store.events(&stream).len(), 3);
}

#[tokio::test]
async fn test_event_sourced_surfaces_version_conflicts() {
    let store = Arc::new(InMemoryEventStore::new());
    let driver = EventSourced::new(meter(), Arc::clone(&store));
    let stream = StreamName::new("meter-1");

    driver.execute(&MeterCommand::Tick, &stream).await.unwrap();

    // A writer the driver never saw appends directly.
    let error = store
        .append(
            &stream,
            Version::INITIAL,
            vec![MeterEvent::Ticked { reading: 9 }],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        EventStoreError::VersionConflict {
            expected: Version::INITIAL,
            ..
        }
    ));
}

#[tokio::test]
async fn test_event_sourced_drivers_sharing_a_store_serialize() {
    let store = Arc::new(InMemoryEventStore::new());
    let driver_a = EventSourced::new(meter(), Arc::clone(&store));
    let driver_b = EventSourced::new(meter(), Arc::clone(&store));
    let stream = StreamName::new("meter-1");

    // Each execution replays before deciding, so a second driver picks
    // up where the first left off.
    driver_a
        .execute(&MeterCommand::Tick, &stream)
        .await
        .unwrap();
    driver_b
        .execute(&MeterCommand::Tick, &stream)
        .await
        .unwrap();

    assert_eq!(
        store.events(&stream),
        vec![
            MeterEvent::Ticked { reading: 1 },
            MeterEvent::Ticked { reading: 2 },
        ]
    );
}

#[tokio::test]
async fn test_state_stored_round_trip() {
    let repo = Arc::new(InMemoryStateRepository::new());
    let driver = StateStored::new(meter(), Arc::clone(&repo));

    let (events, etag) = driver
        .execute(&MeterCommand::Tick, "meter-1", None)
        .await
        .unwrap();
    assert_eq!(events, vec![MeterEvent::Ticked { reading: 1 }]);
    assert_eq!(etag, ETag::new("etag-1"));

    let (events, etag) = driver
        .execute(&MeterCommand::Tick, "meter-1", Some(&etag))
        .await
        .unwrap();
    assert_eq!(events, vec![MeterEvent::Ticked { reading: 2 }]);
    assert_eq!(repo.record("meter-1"), Some((2, etag)));
}

#[tokio::test]
async fn test_state_stored_rejects_stale_etags() {
    let repo = Arc::new(InMemoryStateRepository::new());
    let driver = StateStored::new(meter(), Arc::clone(&repo));

    let (_, first) = driver
        .execute(&MeterCommand::Tick, "meter-1", None)
        .await
        .unwrap();
    driver
        .execute(&MeterCommand::Tick, "meter-1", Some(&first))
        .await
        .unwrap();

    let error = driver
        .execute(&MeterCommand::Tick, "meter-1", Some(&first))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ExecuteError::Store(StateStoreError::Conflict { .. })
    ));
}

#[tokio::test]
async fn test_state_stored_without_etag_takes_the_current_record() {
    let repo = Arc::new(InMemoryStateRepository::new());
    let driver = StateStored::new(meter(), Arc::clone(&repo));

    driver
        .execute(&MeterCommand::Tick, "meter-1", None)
        .await
        .unwrap();
    driver
        .execute(&MeterCommand::Tick, "meter-1", None)
        .await
        .unwrap();

    let (reading, _) = repo.record("meter-1").unwrap();
    assert_eq!(reading, 2);
}
