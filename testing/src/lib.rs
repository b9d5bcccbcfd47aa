//! # Decider Testing
//!
//! Test support for decider-based systems.
//!
//! This crate provides:
//! - [`DeciderTest`]: a given/when/then harness for pure decider logic
//! - [`mocks`]: in-memory stores with real concurrency semantics for
//!   exercising the execution drivers
//!
//! ## Example
//!
//! ```ignore
//! use decider_testing::DeciderTest;
//!
//! #[test]
//! fn worn_out_bulbs_blow() {
//!     let bulb = bulb::decider();
//!
//!     DeciderTest::new(&bulb)
//!         .given([Fitted { max_uses: 1 }, SwitchedOn, SwitchedOff])
//!         .when(SwitchOn)
//!         .then([Blew]);
//! }
//! ```

/// In-memory persistence collaborators.
pub mod mocks;

// Re-export commonly used items
pub use decider_test::{CommandOutcome, DeciderTest};
pub use mocks::{InMemoryEventStore, InMemoryStateRepository};
