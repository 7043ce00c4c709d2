//! The generic event-sourced aggregate.
//!
//! An [`Aggregate`] owns an identity, the state it was created with, its
//! current state, and its [`EventLog`]. The only way to change current state
//! is [`Aggregate::apply`], which folds the event and appends it in one step,
//! so the log and the state can never disagree.

use sourced_types::{RawEvent, UnknownEventPolicy};

use crate::decode::{TypedEvent, decode_event, decode_log, encode_log};
use crate::fold::{Fold, fold};
use crate::log::EventLog;
use crate::EventError;

/// An aggregate whose state is the fold of its event log.
#[derive(Debug, Clone)]
pub struct Aggregate<S: Fold> {
    /// Stable identity, assigned at creation.
    id: S::Id,
    /// State at creation; the origin every replay folds from.
    initial: S,
    /// Current state, always `fold(initial, log)`.
    state: S,
    /// Every event applied so far, in order.
    log: EventLog<S::Event>,
}

impl<S: Fold> Aggregate<S> {
    /// Create an aggregate with the given identity and initial fields.
    ///
    /// The log starts empty, so current state equals `initial`.
    pub fn create(id: S::Id, initial: S) -> Self {
        tracing::debug!(aggregate = %id, "Aggregate created");
        Self {
            id,
            state: initial.clone(),
            initial,
            log: EventLog::new(),
        }
    }

    /// Create an aggregate and replay `events` onto it.
    ///
    /// This is how an aggregate is reconstructed from persisted history.
    pub fn rebuild<I>(id: S::Id, initial: S, events: I) -> Self
    where
        I: IntoIterator<Item = S::Event>,
    {
        let mut aggregate = Self::create(id, initial);
        aggregate.replay(events);
        aggregate
    }

    /// Return the aggregate's identity.
    pub const fn id(&self) -> S::Id {
        self.id
    }

    /// Return the state the aggregate was created with.
    pub const fn initial(&self) -> &S {
        &self.initial
    }

    /// Return the current state.
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Return the event log.
    pub const fn log(&self) -> &EventLog<S::Event> {
        &self.log
    }

    /// Number of events applied so far (the sequence of the last event).
    pub fn version(&self) -> u64 {
        self.log.last_sequence()
    }

    /// Apply one event: fold it into current state and append it to the log.
    ///
    /// Returns the sequence number the event was recorded under. Typed events
    /// always apply; there is no partial outcome.
    pub fn apply(&mut self, event: S::Event) -> u64 {
        self.state.apply(&event);
        let sequence = self.log.append(event);
        tracing::debug!(aggregate = %self.id, sequence, "Event applied");
        sequence
    }

    /// Apply `events` in the order given. Returns how many were applied.
    ///
    /// Replaying the same events from the same initial state always yields
    /// the same state. Ordering is the caller's responsibility.
    pub fn replay<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = S::Event>,
    {
        let mut applied: usize = 0;
        for event in events {
            self.apply(event);
            applied = applied.saturating_add(1);
        }
        tracing::debug!(aggregate = %self.id, applied, version = self.version(), "Replay finished");
        applied
    }

    /// Check the fold invariant: current state equals the fold of the whole
    /// log over the initial state.
    pub fn verify(&self) -> bool {
        fold(self.initial.clone(), self.log.events()) == self.state
    }

    /// Consume the aggregate and return its current state.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> Aggregate<S>
where
    S: Fold,
    S::Event: TypedEvent,
{
    /// Decode and apply one raw event.
    ///
    /// Returns `Ok(None)` if the event was skipped under
    /// [`UnknownEventPolicy::Skip`]. On error the aggregate is unchanged.
    pub fn apply_raw(
        &mut self,
        raw: &RawEvent,
        policy: UnknownEventPolicy,
    ) -> Result<Option<u64>, EventError> {
        Ok(decode_event(raw, policy)?.map(|event| self.apply(event)))
    }

    /// Decode a whole raw log, then replay it.
    ///
    /// All-or-nothing: every event is decoded before the first one is
    /// applied, so a rejected log leaves state and log untouched. Returns the
    /// number of events skipped under [`UnknownEventPolicy::Skip`].
    pub fn replay_raw(
        &mut self,
        raw: &[RawEvent],
        policy: UnknownEventPolicy,
    ) -> Result<usize, EventError> {
        let decoded = decode_log(raw, policy)?;
        self.replay(decoded.events);
        Ok(decoded.skipped)
    }

    /// Rebuild an aggregate from raw history.
    pub fn rebuild_raw(
        id: S::Id,
        initial: S,
        raw: &[RawEvent],
        policy: UnknownEventPolicy,
    ) -> Result<Self, EventError> {
        let decoded = decode_log(raw, policy)?;
        Ok(Self::rebuild(id, initial, decoded.events))
    }

    /// Export the log as raw envelopes, in order.
    pub fn export(&self) -> Vec<RawEvent> {
        encode_log(self.log.events())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sourced_types::{UserEvent, UserId, UserProfile};

    use super::*;

    fn alice() -> Aggregate<UserProfile> {
        Aggregate::create(
            UserId::from_u128(1),
            UserProfile::new("Alice", "alice@example.com"),
        )
    }

    fn email(value: &str) -> UserEvent {
        UserEvent::EmailChanged(value.to_owned())
    }

    #[test]
    fn create_starts_with_empty_log() {
        let user = alice();
        assert_eq!(user.id(), UserId::from_u128(1));
        assert!(user.log().is_empty());
        assert_eq!(user.version(), 0);
        assert_eq!(user.state(), user.initial());
        assert!(user.verify());
    }

    #[test]
    fn apply_updates_state_and_appends_once() {
        let mut user = alice();
        let sequence = user.apply(email("a2@example.com"));
        assert_eq!(sequence, 1);
        assert_eq!(user.log().len(), 1);
        assert_eq!(user.state().email, "a2@example.com");
        assert_eq!(user.state().name, "Alice");
        assert_eq!(user.initial().email, "alice@example.com");
        assert!(user.verify());
    }

    #[test]
    fn replay_is_idempotent_for_a_fixed_log() {
        let events = vec![
            email("one@example.com"),
            UserEvent::NameChanged("Alicia".to_owned()),
            email("two@example.com"),
        ];
        let initial = UserProfile::new("Alice", "alice@example.com");
        let first = Aggregate::rebuild(UserId::from_u128(1), initial.clone(), events.clone());
        let second = Aggregate::rebuild(UserId::from_u128(1), initial, events);
        assert_eq!(first.state(), second.state());
        assert_eq!(first.version(), second.version());
    }

    #[test]
    fn replay_order_matters() {
        let initial = UserProfile::new("Alice", "alice@example.com");
        let forward = vec![email("x@example.com"), email("y@example.com")];
        let backward = vec![email("y@example.com"), email("x@example.com")];
        let a = Aggregate::rebuild(UserId::from_u128(1), initial.clone(), forward);
        let b = Aggregate::rebuild(UserId::from_u128(1), initial, backward);
        assert_ne!(a.state(), b.state());
        assert_eq!(a.state().email, "y@example.com");
        assert_eq!(b.state().email, "x@example.com");
    }

    #[test]
    fn replay_raw_rejects_unknown_type_without_mutation() {
        let mut user = alice();
        user.apply(email("before@example.com"));

        let raw = vec![
            RawEvent::new("NameChanged", json!("Alicia")),
            RawEvent::new("AccountLocked", json!(null)),
        ];
        let result = user.replay_raw(&raw, UnknownEventPolicy::Reject);

        assert!(matches!(result, Err(EventError::UnknownEventType { .. })));
        assert_eq!(user.version(), 1);
        assert_eq!(user.state().name, "Alice");
        assert_eq!(user.state().email, "before@example.com");
    }

    #[test]
    fn replay_raw_skips_unknown_type_when_allowed() {
        let mut user = alice();
        let raw = vec![
            RawEvent::new("AccountLocked", json!(null)),
            RawEvent::new("NameChanged", json!("Alicia")),
        ];
        let result = user.replay_raw(&raw, UnknownEventPolicy::Skip);
        assert!(matches!(result, Ok(1)));
        assert_eq!(user.version(), 1);
        assert_eq!(user.state().name, "Alicia");
    }

    #[test]
    fn apply_raw_reports_skip_as_none() {
        let mut user = alice();
        let skipped = user.apply_raw(
            &RawEvent::new("AccountLocked", json!(null)),
            UnknownEventPolicy::Skip,
        );
        assert!(matches!(skipped, Ok(None)));
        let applied = user.apply_raw(
            &RawEvent::new("EmailChanged", json!("new@example.com")),
            UnknownEventPolicy::Reject,
        );
        assert!(matches!(applied, Ok(Some(1))));
    }

    #[test]
    fn export_and_rebuild_raw_reach_same_state() {
        let mut user = alice();
        user.apply(email("b@example.com"));
        user.apply(UserEvent::NameChanged("Bea".to_owned()));

        let rebuilt = Aggregate::rebuild_raw(
            user.id(),
            user.initial().clone(),
            &user.export(),
            UnknownEventPolicy::Reject,
        );
        assert!(matches!(rebuilt, Ok(ref r) if r.state() == user.state() && r.version() == 2));
    }

    #[test]
    fn into_state_returns_current_fields() {
        let mut user = alice();
        user.apply(email("c@example.com"));
        assert_eq!(user.into_state().email, "c@example.com");
    }
}
