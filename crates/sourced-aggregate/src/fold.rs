//! The fold: how an event changes state.
//!
//! State is never assigned directly. A state type implements [`Fold`] to say
//! how each event transforms it, and current state is always the left-fold of
//! the event log over the initial state.

use core::fmt::{Debug, Display};
use core::hash::Hash;

/// A state type that can be rebuilt from its event history.
///
/// `apply` must be deterministic and infallible: given the same state and the
/// same event it always produces the same result. Anything that can fail
/// (validation, decoding) happens before an event reaches `apply`.
pub trait Fold: Clone + PartialEq + Debug {
    /// Identity of the aggregate owning this state.
    type Id: Copy + Eq + Ord + Hash + Debug + Display;

    /// The events this state understands.
    type Event: Clone + PartialEq + Debug;

    /// Transform `self` by one event.
    fn apply(&mut self, event: &Self::Event);
}

/// Fold `events`, in order, over `initial`.
///
/// The caller owns ordering: events are folded exactly as yielded, never
/// sorted or de-duplicated.
pub fn fold<'a, S, I>(initial: S, events: I) -> S
where
    S: Fold,
    S::Event: 'a,
    I: IntoIterator<Item = &'a S::Event>,
{
    events.into_iter().fold(initial, |mut state, event| {
        state.apply(event);
        state
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A counter that understands increments and resets.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Counter(i64);

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum CounterEvent {
        Add(i64),
        Reset,
    }

    impl Fold for Counter {
        type Id = u32;
        type Event = CounterEvent;

        fn apply(&mut self, event: &CounterEvent) {
            match event {
                CounterEvent::Add(n) => self.0 = self.0.saturating_add(*n),
                CounterEvent::Reset => self.0 = 0,
            }
        }
    }

    #[test]
    fn empty_history_is_initial_state() {
        assert_eq!(fold(Counter(5), &Vec::<CounterEvent>::new()), Counter(5));
    }

    #[test]
    fn folds_left_to_right() {
        let events = [CounterEvent::Add(2), CounterEvent::Reset, CounterEvent::Add(3)];
        assert_eq!(fold(Counter(10), &events), Counter(3));
    }

    #[test]
    fn order_is_not_normalised() {
        let forward = [CounterEvent::Add(2), CounterEvent::Reset];
        let backward = [CounterEvent::Reset, CounterEvent::Add(2)];
        assert_ne!(fold(Counter(0), &forward), fold(Counter(0), &backward));
    }
}
