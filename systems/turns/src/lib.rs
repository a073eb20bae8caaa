#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler that broadcasts one tick per accepted player action.
//!
//! Subscribers are dispatched synchronously in registration order. Enemy
//! registration follows the board's lifecycle events: an enemy is
//! subscribed when it spawns and unsubscribed when it is destroyed, so no
//! entity variant subscribes or unsubscribes on its own.

use delve_core::{EntityKind, Event, Subscriber};

/// Broadcaster with a single event, the tick.
#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    subscribers: Vec<Subscriber>,
    turn: u64,
}

impl TurnScheduler {
    /// Creates a scheduler with no subscribers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            turn: 0,
        }
    }

    /// Registers a subscriber at the end of the dispatch order.
    ///
    /// Returns `false` when it was already registered.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> bool {
        if self.is_subscribed(subscriber) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    /// Removes a subscriber, keeping the order of the rest.
    ///
    /// Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, subscriber: Subscriber) -> bool {
        let Some(position) = self.subscribers.iter().position(|s| *s == subscriber) else {
            return false;
        };
        let _ = self.subscribers.remove(position);
        true
    }

    /// Reports whether the subscriber is registered.
    #[must_use]
    pub fn is_subscribed(&self, subscriber: Subscriber) -> bool {
        self.subscribers.contains(&subscriber)
    }

    /// Registered subscribers in dispatch order.
    #[must_use]
    pub fn subscribers(&self) -> &[Subscriber] {
        &self.subscribers
    }

    /// Number of ticks dispatched so far.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Drops every entity subscriber, keeping collaborator registrations.
    ///
    /// Used when the board that owned those entities is discarded.
    pub fn clear_entities(&mut self) {
        self.subscribers
            .retain(|subscriber| !matches!(subscriber, Subscriber::Entity(_)));
    }

    /// Applies board lifecycle events to the registration list.
    pub fn sync_lifecycle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EntitySpawned {
                    id,
                    kind: EntityKind::Enemy,
                    ..
                } => {
                    let _ = self.subscribe(Subscriber::Entity(*id));
                }
                Event::EntityDestroyed {
                    id,
                    kind: EntityKind::Enemy,
                    ..
                } => {
                    let _ = self.unsubscribe(Subscriber::Entity(*id));
                }
                _ => {}
            }
        }
    }

    /// Dispatches one tick to every subscriber in registration order.
    ///
    /// The dispatch list is fixed when the tick starts. The scheduler is
    /// borrowed mutably for the whole dispatch, so a subscriber cannot
    /// start another tick. Returns the event describing the tick.
    pub fn tick<F>(&mut self, mut dispatch: F) -> Event
    where
        F: FnMut(Subscriber),
    {
        self.turn = self.turn.saturating_add(1);
        log::trace!(
            "turn {} dispatching to {} subscribers",
            self.turn,
            self.subscribers.len()
        );
        for subscriber in &self.subscribers {
            dispatch(*subscriber);
        }
        Event::TurnAdvanced { turn: self.turn }
    }
}
