//! Decoding raw history into typed events.
//!
//! Raw events (`type` tag + JSON payload) come from outside the type system:
//! an exported log, a file, another process. Decoding is the boundary where
//! an unrecognised tag can show up, and [`UnknownEventPolicy`] decides what
//! happens to it. Payloads of known types that fail to parse are always an
//! error, whatever the policy.

use sourced_types::{RawEvent, UnknownEventPolicy};

use crate::EventError;

/// An event type that can cross the raw boundary in both directions.
pub trait TypedEvent: Sized {
    /// Decode one raw event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEventType`] if the tag matches no variant,
    /// or [`EventError::MalformedPayload`] if the payload has the wrong shape.
    fn decode(raw: &RawEvent) -> Result<Self, EventError>;

    /// Encode into the raw envelope.
    fn encode(&self) -> RawEvent;
}

/// The typed result of decoding a raw log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog<E> {
    /// Decoded events, in the order they appeared.
    pub events: Vec<E>,
    /// Number of events dropped because their type was unknown.
    pub skipped: usize,
}

/// Decode a single raw event, honouring `policy`.
///
/// Returns `Ok(None)` when the tag is unknown and `policy` is
/// [`UnknownEventPolicy::Skip`].
pub fn decode_event<E: TypedEvent>(
    raw: &RawEvent,
    policy: UnknownEventPolicy,
) -> Result<Option<E>, EventError> {
    match E::decode(raw) {
        Ok(event) => Ok(Some(event)),
        Err(EventError::UnknownEventType { event_type })
            if policy == UnknownEventPolicy::Skip =>
        {
            tracing::warn!(%event_type, "Skipping event of unknown type");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Decode a whole raw log, preserving order.
///
/// Either every event is accounted for (decoded or, under `Skip`, counted as
/// skipped) or an error is returned and nothing is produced.
pub fn decode_log<E: TypedEvent>(
    raw: &[RawEvent],
    policy: UnknownEventPolicy,
) -> Result<DecodedLog<E>, EventError> {
    let mut events = Vec::with_capacity(raw.len());
    let mut skipped: usize = 0;

    for (position, item) in raw.iter().enumerate() {
        match decode_event(item, policy) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => skipped = skipped.saturating_add(1),
            Err(e) => {
                tracing::debug!(position, error = %e, "Raw log rejected");
                return Err(e);
            }
        }
    }

    Ok(DecodedLog { events, skipped })
}

/// Encode typed events into raw envelopes.
pub fn encode_log<'a, E, I>(events: I) -> Vec<RawEvent>
where
    E: TypedEvent + 'a,
    I: IntoIterator<Item = &'a E>,
{
    events.into_iter().map(TypedEvent::encode).collect()
}
