//! Enumeration types shared by the aggregate crate and its callers.
//!
//! - [`EventType`] -- the tag naming what happened.
//! - [`UserField`] -- which mutable field of a user a change targets.
//! - [`UnknownEventPolicy`] -- how raw logs with unrecognised tags are handled.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// The tag identifying what occurred.
///
/// Serialized as the bare variant name (`"EmailChanged"`), which is also the
/// `type` field of a [`RawEvent`](crate::RawEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A user's email address was replaced.
    EmailChanged,
    /// A user's display name was replaced.
    NameChanged,
}

impl EventType {
    /// Every known event type, in declaration order.
    pub const ALL: [Self; 2] = [Self::EmailChanged, Self::NameChanged];

    /// The wire name of this event type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailChanged => "EmailChanged",
            Self::NameChanged => "NameChanged",
        }
    }

    /// Look up an event type by its wire name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A mutable field of a user aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    /// The display name.
    Name,
    /// The email address.
    Email,
}

impl UserField {
    /// The event type produced when this field changes.
    pub const fn event_type(self) -> EventType {
        match self {
            Self::Name => EventType::NameChanged,
            Self::Email => EventType::EmailChanged,
        }
    }

    /// Lowercase field name, as used in validation messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
        }
    }
}

impl core::fmt::Display for UserField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Unknown event policy
// ---------------------------------------------------------------------------

/// What to do when a raw event carries a type tag that no variant matches.
///
/// `Reject` fails the whole operation and leaves the aggregate untouched.
/// `Skip` logs a warning and continues with the remaining events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEventPolicy {
    /// Fail closed with an `UnknownEventType` error.
    #[default]
    Reject,
    /// Fail open: ignore the event and keep going.
    Skip,
}

impl UnknownEventPolicy {
    /// Parse a policy name (`"reject"` or `"skip"`, case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// The config name of this policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Skip => "skip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names_round_trip() {
        for t in EventType::ALL {
            assert_eq!(EventType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EventType::parse("emailchanged"), None);
        assert_eq!(EventType::parse("PasswordReset"), None);
    }

    #[test]
    fn fields_map_to_their_events() {
        assert_eq!(UserField::Email.event_type(), EventType::EmailChanged);
        assert_eq!(UserField::Name.event_type(), EventType::NameChanged);
    }

    #[test]
    fn policy_defaults_to_reject() {
        assert_eq!(UnknownEventPolicy::default(), UnknownEventPolicy::Reject);
        assert_eq!(UnknownEventPolicy::parse(" Skip "), Some(UnknownEventPolicy::Skip));
        assert_eq!(UnknownEventPolicy::parse("ignore"), None);
        assert_eq!(UnknownEventPolicy::Skip.as_str(), "skip");
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let policy: Result<UnknownEventPolicy, _> = serde_json::from_str("\"skip\"");
        assert!(matches!(policy, Ok(UnknownEventPolicy::Skip)));
    }
}
