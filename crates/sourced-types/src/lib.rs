//! Shared type definitions for event-sourced aggregates.
//!
//! This crate holds plain data: identifiers, event tags, the typed user
//! event, the user's fields, and the raw envelope used for history that
//! crosses a process boundary. Behavior (folding, validation, replay) lives
//! in `sourced-aggregate`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for aggregate and event identifiers
//! - [`enums`] -- Event tags, field selectors, unknown-event policy
//! - [`structs`] -- `UserProfile`, `UserEvent`, `RawEvent`

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EventType, UnknownEventPolicy, UserField};
pub use ids::{EventId, UserId};
pub use structs::{RawEvent, UserEvent, UserProfile};
