//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for aggregate roots that record the events their mutations produce.
///
/// Unlike a pure event-sourced aggregate, a cart applies each event as it is
/// recorded and is persisted as a snapshot. The uncommitted events are kept so
/// callers can report what changed.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate records.
    type Event: DomainEvent;

    /// Returns the current version (number of state-changing events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last call to
    /// [`clear_uncommitted_events`](Self::clear_uncommitted_events).
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drains recorded events once they have been reported.
    fn clear_uncommitted_events(&mut self);
}
