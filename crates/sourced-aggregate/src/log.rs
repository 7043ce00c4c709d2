//! The event log: an append-only sequence of applied events.
//!
//! # Design
//!
//! - **Append-only**: records are never modified or removed. There is no
//!   public way to push a record; only [`Aggregate`](crate::Aggregate) appends,
//!   in the same step that folds the event into state.
//! - **Ordered**: insertion order is application order. Sequence numbers start
//!   at 1 and equal the record's position in the log.

use chrono::{DateTime, Utc};

use sourced_types::EventId;

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// One applied event plus the metadata the log assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord<E> {
    /// Unique record identifier (UUID v7).
    pub id: EventId,
    /// 1-based position in the log.
    pub sequence: u64,
    /// The event itself.
    pub event: E,
    /// Wall-clock time the event was applied.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Ordered, append-only history of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog<E> {
    /// All records, in insertion order.
    records: Vec<EventRecord<E>>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventLog<E> {
    /// Create a new empty log.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Return the number of records in the log.
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Return whether the log has no records.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequence number of the most recent record, or 0 for an empty log.
    pub fn last_sequence(&self) -> u64 {
        u64::try_from(self.records.len()).unwrap_or(u64::MAX)
    }

    /// Append an event and return the sequence number it was given.
    pub(crate) fn append(&mut self, event: E) -> u64 {
        let sequence = self.last_sequence().saturating_add(1);
        self.records.push(EventRecord {
            id: EventId::new(),
            sequence,
            event,
            recorded_at: Utc::now(),
        });
        sequence
    }

    /// Return all records, in insertion order.
    pub fn records(&self) -> &[EventRecord<E>] {
        &self.records
    }

    /// Iterate over the bare events, in insertion order.
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &E> + ExactSizeIterator {
        self.records.iter().map(|r| &r.event)
    }

    /// Look up a record by its 1-based sequence number.
    pub fn get(&self, sequence: u64) -> Option<&EventRecord<E>> {
        let index = usize::try_from(sequence.checked_sub(1)?).ok()?;
        self.records.get(index)
    }

    /// The most recent record, if any.
    pub fn last(&self) -> Option<&EventRecord<E>> {
        self.records.last()
    }
}

impl<'a, E> IntoIterator for &'a EventLog<E> {
    type Item = &'a EventRecord<E>;
    type IntoIter = core::slice::Iter<'a, EventRecord<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
