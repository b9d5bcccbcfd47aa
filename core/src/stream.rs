//! Identifier newtypes shared by the persistence collaborators.
//!
//! `StreamName` addresses one decider instance's event stream, `Version`
//! counts how many events that stream holds, and `ETag` is the opaque
//! token a state repository hands out for optimistic concurrency. All
//! three exist so the collaborator signatures say what they mean instead
//! of trafficking in bare strings and integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing a [`StreamName`] from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid stream name: {0}")]
pub struct ParseStreamNameError(String);

/// Names the event stream belonging to one decider instance, such as
/// `"bulb-42"` or `"sku-coffee-beans"`.
///
/// Construct with [`new`](Self::new) (or `From`) for application-chosen
/// names; parse with `FromStr` when the name arrives from outside, which
/// rejects the empty string.
///
/// # Examples
///
/// ```
/// use decider_core::stream::StreamName;
///
/// let stream = StreamName::new("bulb-42");
/// assert_eq!(stream.as_str(), "bulb-42");
///
/// let parsed: StreamName = "bulb-42".parse().unwrap();
/// assert_eq!(parsed, stream);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamName(String);

impl StreamName {
    /// Wraps an application-chosen stream name without validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamName {
    type Err = ParseStreamNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseStreamNameError(
                "stream name cannot be empty".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for StreamName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for StreamName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for StreamName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of an event stream: how many events it holds.
///
/// A fresh stream is at [`Version::INITIAL`]; each appended event moves
/// the stream to [`next`](Self::next). Appends assert the version they
/// expect, which is how concurrent writers are detected.
///
/// # Examples
///
/// ```
/// use decider_core::stream::Version;
///
/// assert!(Version::INITIAL.is_initial());
/// assert_eq!(Version::INITIAL.next(), Version::new(1));
/// assert_eq!(Version::new(5).value(), 5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The version of a stream that holds no events.
    pub const INITIAL: Self = Self(0);

    /// Wraps a version number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The version after one more event.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this is the version of an empty stream.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Opaque optimistic-concurrency token issued by a state repository.
///
/// Only the repository that issued an etag can interpret it; callers
/// hold it and hand it back with the next load or save so stale writes
/// are detected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ETag(String);

impl ETag {
    /// Wraps a repository-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stream_name_tests {
        use super::*;

        #[test]
        fn new_wraps_the_name() {
            let stream = StreamName::new("bulb-42");
            assert_eq!(stream.as_str(), "bulb-42");
        }

        #[test]
        fn from_string_and_str() {
            assert_eq!(StreamName::from("bulb-1").as_str(), "bulb-1");
            assert_eq!(StreamName::from("bulb-2".to_string()).as_str(), "bulb-2");
        }

        #[test]
        #[allow(clippy::expect_used)] // Panics: test fails if parse fails
        fn parses_from_external_input() {
            let stream: StreamName = "bulb-42".parse().expect("parse succeeds");
            assert_eq!(stream, StreamName::new("bulb-42"));
        }

        #[test]
        fn rejects_the_empty_name() {
            assert!("".parse::<StreamName>().is_err());
        }

        #[test]
        fn displays_as_the_bare_name() {
            assert_eq!(format!("{}", StreamName::new("bulb-42")), "bulb-42");
        }

        #[test]
        fn into_inner_returns_the_string() {
            assert_eq!(StreamName::new("bulb-42").into_inner(), "bulb-42");
        }
    }

    mod version_tests {
        use super::*;

        #[test]
        fn initial_is_zero() {
            assert_eq!(Version::INITIAL, Version::new(0));
            assert!(Version::INITIAL.is_initial());
            assert!(!Version::new(1).is_initial());
        }

        #[test]
        fn next_advances_by_one() {
            assert_eq!(Version::new(4).next(), Version::new(5));
        }

        #[test]
        fn value_unwraps() {
            assert_eq!(Version::new(7).value(), 7);
        }

        #[test]
        fn orders_numerically() {
            assert!(Version::new(2) < Version::new(10));
        }

        #[test]
        fn displays_as_the_number() {
            assert_eq!(format!("{}", Version::new(3)), "3");
        }
    }

    mod etag_tests {
        use super::*;

        #[test]
        fn wraps_an_opaque_token() {
            let etag = ETag::new("etag-7");
            assert_eq!(etag.as_str(), "etag-7");
            assert_eq!(format!("{etag}"), "etag-7");
        }

        #[test]
        fn compares_by_token() {
            assert_eq!(ETag::new("a"), ETag::new("a"));
            assert_ne!(ETag::new("a"), ETag::new("b"));
        }
    }

    mod serde_tests {
        use super::*;

        // Stores persist the bare value, not a wrapper object.
        #[test]
        #[allow(clippy::unwrap_used)] // Panics: test fails if serialization fails
        fn identifiers_serialize_as_their_bare_values() {
            assert_eq!(
                serde_json::to_string(&StreamName::new("bulb-1")).unwrap(),
                "\"bulb-1\""
            );
            assert_eq!(serde_json::to_string(&Version::new(3)).unwrap(), "3");
            assert_eq!(
                serde_json::to_string(&ETag::new("etag-9")).unwrap(),
                "\"etag-9\""
            );
        }
    }
}
