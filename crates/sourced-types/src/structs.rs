//! Core data structs: the user's derived fields, the typed user event, and
//! the untyped envelope events travel in outside the aggregate.

use serde::{Deserialize, Serialize};

use crate::enums::{EventType, UserField};

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// The current fields of a user aggregate.
///
/// Values are derived: the aggregate only ever changes them by folding a
/// [`UserEvent`] into them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl UserProfile {
    /// Build a profile from its initial field values.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Read a field by selector.
    pub fn field(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Email => &self.email,
        }
    }
}

// ---------------------------------------------------------------------------
// UserEvent
// ---------------------------------------------------------------------------

/// Something that happened to a user.
///
/// Each variant carries its own typed payload, so interpreting an event never
/// needs a runtime cast. Serialized adjacently tagged:
/// `{"type": "EmailChanged", "payload": "alice@example.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum UserEvent {
    /// The email address was replaced with the payload.
    EmailChanged(String),
    /// The display name was replaced with the payload.
    NameChanged(String),
}

impl UserEvent {
    /// Build the event that sets `field` to `value`.
    pub fn for_field(field: UserField, value: impl Into<String>) -> Self {
        match field {
            UserField::Name => Self::NameChanged(value.into()),
            UserField::Email => Self::EmailChanged(value.into()),
        }
    }

    /// The tag of this event.
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::EmailChanged(_) => EventType::EmailChanged,
            Self::NameChanged(_) => EventType::NameChanged,
        }
    }

    /// The field this event rewrites.
    pub const fn field(&self) -> UserField {
        match self {
            Self::EmailChanged(_) => UserField::Email,
            Self::NameChanged(_) => UserField::Name,
        }
    }

    /// The new value carried by the event.
    pub fn payload(&self) -> &str {
        match self {
            Self::EmailChanged(value) | Self::NameChanged(value) => value,
        }
    }

    /// Convert into the untyped envelope.
    pub fn to_raw(&self) -> RawEvent {
        RawEvent {
            event_type: self.event_type().as_str().to_owned(),
            payload: serde_json::Value::String(self.payload().to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawEvent
// ---------------------------------------------------------------------------

/// An event as it looks outside the type system: a free-form tag plus a JSON
/// payload.
///
/// This is the shape of exported or externally supplied history. It is the
/// only place an unrecognised event type can appear; decoding it into a typed
/// event decides what happens to such tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event type tag, e.g. `"EmailChanged"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Type-specific payload.
    pub payload: serde_json::Value,
}

impl RawEvent {
    /// Build a raw event from a tag and payload.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}
