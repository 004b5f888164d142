//! Notification bus - ordered, fault-isolated multi-listener dispatch

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Receiver of bus notifications
pub trait Listener<E> {
    /// Name used in logs when this listener misbehaves
    fn name(&self) -> &str;

    fn on_event(&mut self, event: &E);

    /// Lets hosts reach a listener's state after registration
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Adapter turning a closure into a [`Listener`]
pub struct FnListener<F> {
    name: String,
    f: F,
}

impl<E, F> Listener<E> for FnListener<F>
where
    F: FnMut(&E) + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, event: &E) {
        (self.f)(event)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Synchronous dispatcher delivering each event to every listener in
/// registration order
///
/// A listener that panics is logged and skipped; the remaining listeners
/// still receive the event. Listeners can't reach the bus while it
/// dispatches, so the listener list never changes mid-delivery.
pub struct NotificationBus<E> {
    listeners: Vec<(SubscriptionId, Box<dyn Listener<E>>)>,
    next_id: u64,
}

impl<E> Default for NotificationBus<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> NotificationBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Listener<E> + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn subscribe_fn(&mut self, name: impl Into<String>, f: impl FnMut(&E) + 'static) -> SubscriptionId
    where
        E: 'static,
    {
        self.subscribe(FnListener { name: name.into(), f })
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Drop every listener (owner shutdown)
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Borrow a registered listener as its concrete type
    pub fn listener<T: 'static>(&self, id: SubscriptionId) -> Option<&T> {
        self.listeners
            .iter()
            .find(|(sid, _)| *sid == id)
            .and_then(|(_, l)| l.as_any().downcast_ref::<T>())
    }

    pub fn listener_mut<T: 'static>(&mut self, id: SubscriptionId) -> Option<&mut T> {
        self.listeners
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .and_then(|(_, l)| l.as_any_mut().downcast_mut::<T>())
    }

    /// Deliver one event; returns how many listeners panicked
    pub fn publish(&mut self, event: &E) -> usize {
        let mut faults = 0;
        for (id, listener) in self.listeners.iter_mut() {
            let delivered = catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if delivered.is_err() {
                faults += 1;
                tracing::error!(
                    listener = listener.name(),
                    subscription = id.0,
                    "Listener panicked during dispatch; continuing with remaining listeners"
                );
            }
        }
        faults
    }

    /// Deliver events in order
    pub fn publish_all<'a>(&mut self, events: impl IntoIterator<Item = &'a E>) -> usize
    where
        E: 'a,
    {
        events.into_iter().map(|e| self.publish(e)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter {
        seen: u32,
    }

    impl Listener<u32> for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn on_event(&mut self, event: &u32) {
            self.seen += event;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();
        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe_fn(tag, move |e: &u32| log.borrow_mut().push((tag, *e)));
        }

        bus.publish(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7), ("third", 7)]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();
        bus.subscribe_fn("faulty", |_: &u32| panic!("listener bug"));
        let sink = Rc::clone(&log);
        bus.subscribe_fn("healthy", move |e: &u32| sink.borrow_mut().push(*e));

        assert_eq!(bus.publish(&1), 1);
        assert_eq!(bus.publish(&2), 1);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = NotificationBus::new();
        let id = bus.subscribe(Counter { seen: 0 });
        bus.publish(&3);
        assert_eq!(bus.listener::<Counter>(id).map(|c| c.seen), Some(3));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
        assert!(bus.listener::<Counter>(id).is_none());
    }

    #[test]
    fn test_listener_downcast_wrong_type() {
        let mut bus = NotificationBus::new();
        let id = bus.subscribe(Counter { seen: 0 });
        assert!(bus.listener::<String>(id).is_none());
    }

    #[test]
    fn test_publish_all_and_clear() {
        let mut bus = NotificationBus::new();
        let id = bus.subscribe(Counter { seen: 0 });
        bus.publish_all(&[1, 2, 3]);
        assert_eq!(bus.listener::<Counter>(id).map(|c| c.seen), Some(6));

        bus.clear();
        assert_eq!(bus.len(), 0);
    }
}
