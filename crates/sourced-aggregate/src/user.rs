//! The user aggregate.
//!
//! Two styles sit side by side here. [`Aggregate::apply`] is the anemic path:
//! any typed event is folded in as-is. [`User::change`] is the rich path: the
//! aggregate checks its own rules and only then emits the event.

use sourced_types::{EventType, RawEvent, UserEvent, UserField, UserId, UserProfile};

use crate::aggregate::Aggregate;
use crate::decode::TypedEvent;
use crate::fold::Fold;
use crate::handle::AggregateHandle;
use crate::repository::Repository;
use crate::validation::ValidationRules;
use crate::{EventError, ValidationError};

/// A user: [`UserProfile`] fields derived from [`UserEvent`] history.
pub type User = Aggregate<UserProfile>;

/// Shared handle to a user.
pub type UserHandle = AggregateHandle<UserProfile>;

/// In-memory store of users.
pub type UserRepository = Repository<UserProfile>;

impl Fold for UserProfile {
    type Id = UserId;
    type Event = UserEvent;

    fn apply(&mut self, event: &UserEvent) {
        match event {
            UserEvent::EmailChanged(email) => self.email.clone_from(email),
            UserEvent::NameChanged(name) => self.name.clone_from(name),
        }
    }
}

impl TypedEvent for UserEvent {
    fn decode(raw: &RawEvent) -> Result<Self, EventError> {
        let Some(event_type) = EventType::parse(&raw.event_type) else {
            return Err(EventError::UnknownEventType {
                event_type: raw.event_type.clone(),
            });
        };

        let value = serde_json::from_value::<String>(raw.payload.clone()).map_err(|source| {
            EventError::MalformedPayload {
                event_type: event_type.as_str().to_owned(),
                source,
            }
        })?;

        Ok(match event_type {
            EventType::EmailChanged => Self::EmailChanged(value),
            EventType::NameChanged => Self::NameChanged(value),
        })
    }

    fn encode(&self) -> RawEvent {
        self.to_raw()
    }
}

impl Aggregate<UserProfile> {
    /// Change `field` to `value` under the default [`ValidationRules`].
    ///
    /// See [`change_with`](Self::change_with).
    pub fn change(&mut self, field: UserField, value: &str) -> Result<u64, ValidationError> {
        self.change_with(field, value, &ValidationRules::default())
    }

    /// Validate `value`, then record the matching event.
    ///
    /// On success exactly one event is appended and only `field` changes;
    /// the new sequence number is returned. On failure nothing changes.
    pub fn change_with(
        &mut self,
        field: UserField,
        value: &str,
        rules: &ValidationRules,
    ) -> Result<u64, ValidationError> {
        if let Err(e) = rules.validate(field, value) {
            tracing::warn!(user = %self.id(), %field, error = %e, "Change rejected");
            return Err(e);
        }
        let sequence = self.apply(UserEvent::for_field(field, value));
        tracing::info!(user = %self.id(), %field, sequence, "User changed");
        Ok(sequence)
    }

    /// Shorthand for `change(UserField::Email, email)`.
    pub fn change_email(&mut self, email: &str) -> Result<u64, ValidationError> {
        self.change(UserField::Email, email)
    }

    /// Shorthand for `change(UserField::Name, name)`.
    pub fn change_name(&mut self, name: &str) -> Result<u64, ValidationError> {
        self.change(UserField::Name, name)
    }

    /// Current display name.
    pub fn name(&self) -> &str {
        &self.state().name
    }

    /// Current email address.
    pub fn email(&self) -> &str {
        &self.state().email
    }
}
