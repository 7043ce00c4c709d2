//! Event-sourced aggregates.
//!
//! An aggregate's current state is never written directly. It is the
//! left-fold of an append-only log of typed events over the state the
//! aggregate was created with:
//!
//! ```text
//! state == fold(initial, log)
//! ```
//!
//! # Architecture
//!
//! - [`fold`] -- The [`Fold`] trait (how one event changes state) and the
//!   free [`fold()`] function.
//! - [`log`] -- [`EventLog`]: append-only, 1-based sequence numbers.
//! - [`aggregate`] -- [`Aggregate`]: identity + initial state + current
//!   state + log, with `apply`, `replay`, and `rebuild`.
//! - [`user`] -- The user aggregate: the rich-model `change` operation.
//! - [`validation`] -- [`ValidationRules`] checked before a change becomes
//!   an event.
//! - [`decode`] -- Raw (`type` + `payload`) history and the
//!   unknown-event policy.
//! - [`handle`] -- [`AggregateHandle`]: shared, mutex-guarded access.
//! - [`repository`] -- [`Repository`]: an explicitly passed in-memory store.
//!
//! # Usage
//!
//! ```
//! use sourced_aggregate::User;
//! use sourced_types::{EventType, UserField, UserId, UserProfile};
//!
//! let mut user = User::create(
//!     UserId::from_u128(1),
//!     UserProfile::new("Alice", "alice@example.com"),
//! );
//!
//! // Valid change: one event appended, one field updated.
//! assert!(user.change(UserField::Email, "alice.smith@example.com").is_ok());
//! assert_eq!(user.version(), 1);
//! assert_eq!(user.state().email, "alice.smith@example.com");
//!
//! // Invalid change: nothing happens.
//! assert!(user.change(UserField::Email, "").is_err());
//! assert_eq!(user.version(), 1);
//!
//! // A fresh aggregate replaying the log reaches the same state.
//! let replayed = User::rebuild(
//!     user.id(),
//!     user.initial().clone(),
//!     user.log().events().cloned(),
//! );
//! assert_eq!(replayed.state(), user.state());
//! assert_eq!(
//!     replayed.log().last().map(|r| r.event.event_type()),
//!     Some(EventType::EmailChanged),
//! );
//! ```

pub mod aggregate;
pub mod decode;
pub mod fold;
pub mod handle;
pub mod log;
pub mod repository;
pub mod user;
pub mod validation;

// Re-export primary types at crate root.
pub use aggregate::Aggregate;
pub use decode::{DecodedLog, TypedEvent, decode_event, decode_log, encode_log};
pub use fold::{Fold, fold};
pub use handle::AggregateHandle;
pub use log::{EventLog, EventRecord};
pub use repository::Repository;
pub use user::{User, UserHandle, UserRepository};
pub use validation::ValidationRules;

use sourced_types::UserField;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A business rule rejected a proposed change.
///
/// The aggregate is left exactly as it was: no field changes, no log append.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The value was empty or blank.
    #[error("{field} must not be empty")]
    Empty {
        /// The field being changed.
        field: UserField,
    },

    /// The value has leading or trailing whitespace.
    #[error("{field} must not start or end with whitespace")]
    Untrimmed {
        /// The field being changed.
        field: UserField,
    },

    /// The value is shorter than the configured minimum.
    #[error("{field} must be at least {min} characters, got {actual}")]
    TooShort {
        /// The field being changed.
        field: UserField,
        /// Minimum allowed length.
        min: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The value is longer than the configured maximum.
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        /// The field being changed.
        field: UserField,
        /// Maximum allowed length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The value is not a well-formed email address.
    #[error("invalid email address {value:?}: {reason}")]
    InvalidEmail {
        /// The rejected value.
        value: String,
        /// Which check failed.
        reason: &'static str,
    },
}

/// A [`ValidationRules`] value contradicts itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid validation rules: {reason}")]
pub struct RulesError {
    /// Which bound is wrong.
    pub reason: String,
}

/// Errors raised by aggregate, decoding, and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A proposed change failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A raw event carried a type tag no event variant matches.
    #[error("unknown event type: {event_type:?}")]
    UnknownEventType {
        /// The unrecognised tag.
        event_type: String,
    },

    /// A raw event of a known type had a payload of the wrong shape.
    #[error("malformed payload for {event_type}: {source}")]
    MalformedPayload {
        /// The event type being decoded.
        event_type: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// An aggregate with this identity is already registered.
    #[error("aggregate already registered: {id}")]
    DuplicateAggregate {
        /// The conflicting identity.
        id: String,
    },

    /// No aggregate with this identity is registered.
    #[error("aggregate not found: {id}")]
    AggregateNotFound {
        /// The missing identity.
        id: String,
    },
}
