//! Publish/subscribe channel for session changes.
//!
//! There is exactly one channel per engine. Every mutation publishes one
//! [`GameEvent`]; resets are an event kind like any other.
//!
//! Observers only receive `&GameEvent`, so they cannot reach the engine that
//! is notifying them. An observer may subscribe or unsubscribe others while
//! being notified; such changes take effect from the next event.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::session::GameSession;

/// What kind of mutation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A fresh session was derived for a mode.
    Initialized,
    /// A persisted session was restored for a mode.
    Restored,
    /// The first answer started the clock.
    Started,
    /// A correct answer was recorded.
    Answered,
    /// A correct answer completed the target set.
    Completed,
    /// A new question was chosen.
    Advanced,
    /// The session was discarded and re-derived.
    Reset,
}

/// Snapshot published after a mutation.
#[derive(Debug, Clone, Serialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub snapshot: Arc<GameSession>,
}

type ObserverCell = Rc<RefCell<dyn FnMut(&GameEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, ObserverCell)>,
}

/// Observer list owned by an engine.
#[derive(Default)]
pub struct Observers {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl Observers {
    /// Registers `observer` and returns the handle that removes it.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let cell: ObserverCell = Rc::new(RefCell::new(observer));
        registry.observers.push((id, cell));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Calls every registered observer once with `event`.
    pub fn notify(&self, event: &GameEvent) {
        let observers: Vec<ObserverCell> = self
            .registry
            .borrow()
            .observers
            .iter()
            .map(|(_, cell)| Rc::clone(cell))
            .collect();
        for observer in observers {
            match observer.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(event),
                Err(_) => log::warn!("skipping observer already running for {:?}", event.kind),
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the observer registered.
#[derive(Debug)]
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Removes the observer. A no-op if the engine is already gone.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .observers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PrefectureId;
    use crate::selector::full_targets;

    fn event(kind: EventKind) -> GameEvent {
        GameEvent {
            kind,
            snapshot: Arc::new(GameSession::new(
                full_targets(),
                PrefectureId::new(1).unwrap(),
            )),
        }
    }

    #[test]
    fn every_observer_sees_every_event() {
        let observers = Observers::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&seen);
        let b = Rc::clone(&seen);
        let _first = observers.subscribe(move |e| a.borrow_mut().push(("a", e.kind)));
        let _second = observers.subscribe(move |e| b.borrow_mut().push(("b", e.kind)));

        observers.notify(&event(EventKind::Started));
        observers.notify(&event(EventKind::Reset));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&("a", EventKind::Reset)));
        assert!(seen.contains(&("b", EventKind::Started)));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let observers = Observers::default();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let sub = observers.subscribe(move |_| *counter.borrow_mut() += 1);
        observers.notify(&event(EventKind::Advanced));
        sub.unsubscribe();
        observers.notify(&event(EventKind::Advanced));
        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn unsubscribe_after_owner_dropped_is_harmless() {
        let observers = Observers::default();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        sub.unsubscribe();
    }
}
