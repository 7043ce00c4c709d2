//! An in-memory store of aggregates, keyed by identity.
//!
//! The repository is a plain value: the caller creates it, owns it, and
//! passes it (or a reference) to whatever needs it. Nothing is global.
//! Each entry is an [`AggregateHandle`], so individual aggregates can be
//! shared across tasks while the map itself stays with its owner.
//!
//! Aggregates are never removed; they live as long as the repository.

use std::collections::BTreeMap;

use sourced_types::{RawEvent, UnknownEventPolicy};

use crate::aggregate::Aggregate;
use crate::decode::TypedEvent;
use crate::fold::Fold;
use crate::handle::AggregateHandle;
use crate::EventError;

/// Identity-keyed map of aggregate handles.
#[derive(Debug)]
pub struct Repository<S: Fold> {
    aggregates: BTreeMap<S::Id, AggregateHandle<S>>,
}

impl<S: Fold> Default for Repository<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Fold> Repository<S> {
    /// Create an empty repository.
    pub const fn new() -> Self {
        Self {
            aggregates: BTreeMap::new(),
        }
    }

    /// Number of registered aggregates.
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Whether no aggregates are registered.
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Register an aggregate and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateAggregate`] if the identity is taken;
    /// the existing aggregate is left as is.
    pub fn insert(&mut self, aggregate: Aggregate<S>) -> Result<AggregateHandle<S>, EventError> {
        let id = aggregate.id();
        if self.aggregates.contains_key(&id) {
            return Err(EventError::DuplicateAggregate { id: id.to_string() });
        }
        let handle = AggregateHandle::new(aggregate);
        self.aggregates.insert(id, handle.clone());
        tracing::debug!(aggregate = %id, count = self.aggregates.len(), "Aggregate registered");
        Ok(handle)
    }

    /// Handle to the aggregate with this identity, if registered.
    pub fn get(&self, id: S::Id) -> Option<AggregateHandle<S>> {
        self.aggregates.get(&id).cloned()
    }

    /// Handle to the aggregate with this identity.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::AggregateNotFound`] if nothing is registered
    /// under `id`.
    pub fn require(&self, id: S::Id) -> Result<AggregateHandle<S>, EventError> {
        self.get(id)
            .ok_or_else(|| EventError::AggregateNotFound { id: id.to_string() })
    }

    /// All registered identities, in order.
    pub fn ids(&self) -> Vec<S::Id> {
        self.aggregates.keys().copied().collect()
    }
}

impl<S> Repository<S>
where
    S: Fold,
    S::Event: TypedEvent,
{
    /// Export the raw history of one aggregate.
    pub async fn history(&self, id: S::Id) -> Result<Vec<RawEvent>, EventError> {
        let handle = self.require(id)?;
        Ok(handle.read(Aggregate::export).await)
    }

    /// Rebuild an aggregate from raw history and register it.
    ///
    /// Nothing is registered if the identity is taken or the history fails
    /// to decode under `policy`.
    pub fn restore(
        &mut self,
        id: S::Id,
        initial: S,
        raw: &[RawEvent],
        policy: UnknownEventPolicy,
    ) -> Result<AggregateHandle<S>, EventError> {
        if self.aggregates.contains_key(&id) {
            return Err(EventError::DuplicateAggregate { id: id.to_string() });
        }
        let aggregate = Aggregate::rebuild_raw(id, initial, raw, policy)?;
        self.insert(aggregate)
    }
}
