//! Shared access to a single aggregate.
//!
//! An [`Aggregate`] is owned by exactly one caller. When several tasks need
//! the same aggregate, they share an [`AggregateHandle`] instead: an
//! [`Arc`]-wrapped [`tokio::sync::Mutex`] that lets one mutation run at a
//! time, so the fold invariant and sequence numbering survive concurrent use.

use std::sync::Arc;

use tokio::sync::Mutex;

use sourced_types::{UserField, UserProfile};

use crate::aggregate::Aggregate;
use crate::fold::Fold;
use crate::validation::ValidationRules;
use crate::ValidationError;

/// A cloneable, mutex-guarded reference to one aggregate.
#[derive(Debug)]
pub struct AggregateHandle<S: Fold> {
    /// Copied out so callers can read identity without locking.
    id: S::Id,
    inner: Arc<Mutex<Aggregate<S>>>,
}

impl<S: Fold> Clone for AggregateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Fold> AggregateHandle<S> {
    /// Take ownership of `aggregate` and share it behind a lock.
    pub fn new(aggregate: Aggregate<S>) -> Self {
        Self {
            id: aggregate.id(),
            inner: Arc::new(Mutex::new(aggregate)),
        }
    }

    /// The aggregate's identity.
    pub const fn id(&self) -> S::Id {
        self.id
    }

    /// Run `f` with exclusive access to the aggregate.
    ///
    /// This is the only way to mutate through a handle; at most one closure
    /// runs per aggregate at any moment.
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Aggregate<S>) -> R,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// Run `f` with read access to the aggregate.
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Aggregate<S>) -> R,
    {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    /// Apply a typed event. Returns its sequence number.
    pub async fn apply(&self, event: S::Event) -> u64 {
        self.update(|aggregate| aggregate.apply(event)).await
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> S {
        self.read(|aggregate| aggregate.state().clone()).await
    }

    /// Current version (number of applied events).
    pub async fn version(&self) -> u64 {
        self.read(Aggregate::version).await
    }

    /// Clone of the whole aggregate, log included.
    pub async fn to_aggregate(&self) -> Aggregate<S> {
        self.read(Clone::clone).await
    }
}

impl AggregateHandle<UserProfile> {
    /// Validated change through the lock. See [`Aggregate::change_with`].
    pub async fn change(
        &self,
        field: UserField,
        value: &str,
        rules: &ValidationRules,
    ) -> Result<u64, ValidationError> {
        self.update(|user| user.change_with(field, value, rules)).await
    }
}
