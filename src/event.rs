//! Typed single-parameter events with subscription tokens.
//!
//! An [`Event`] is a publisher with zero or more handlers. Subscribing
//! returns a [`Subscription`] token; dropping the token removes the handler,
//! and that is the only legitimate teardown. `fire` invokes handlers in
//! subscription order against a snapshot of the handler list, so handlers may
//! subscribe or unsubscribe during a dispatch without invalidating it:
//! subscriptions made during a fire take effect on the next fire, and a
//! handler removed mid-fire is not invoked afterwards within the same fire.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type HandlerFn<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct HandlerEntry<T> {
    id: u64,
    handler: HandlerFn<T>,
}

struct EventInner<T> {
    handlers: Vec<HandlerEntry<T>>,
    next_id: u64,
}

/// A typed publisher. Handlers receive the payload by reference; handles
/// and small enums are the intended payloads.
pub struct Event<T> {
    inner: Rc<RefCell<EventInner<T>>>,
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Event::new()
    }
}

impl<T: 'static> Event<T> {
    pub fn new() -> Self {
        Event {
            inner: Rc::new(RefCell::new(EventInner {
                handlers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a handler. The handler stays attached until the returned
    /// token is dropped.
    #[must_use = "dropping the token unsubscribes the handler"]
    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.handlers.push(HandlerEntry {
                id,
                handler: Rc::new(RefCell::new(handler)),
            });
            id
        };

        let weak: Weak<RefCell<EventInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().handlers.retain(|e| e.id != id);
                }
            })),
        }
    }

    /// Invoke all handlers in subscription order.
    ///
    /// The handler list is snapshotted first: the dispatch tolerates
    /// subscriptions and unsubscriptions made by handlers, and reentrant
    /// fires. A handler must not recursively fire into itself.
    pub fn fire(&self, payload: &T) {
        let snapshot: Vec<(u64, HandlerFn<T>)> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|e| (e.id, Rc::clone(&e.handler)))
            .collect();

        for (id, handler) in snapshot {
            // Skip handlers unsubscribed earlier in this dispatch.
            let still_subscribed = self.inner.borrow().handlers.iter().any(|e| e.id == id);
            if still_subscribed {
                (handler.borrow_mut())(payload);
            }
        }
    }

    /// True iff no handler is attached.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().handlers.is_empty()
    }

    /// Number of attached handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Opaque subscription token. Dropping it detaches the handler; a handler
/// never outlives its subscriber.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Detach eagerly instead of waiting for drop.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_fire_in_subscription_order() {
        let event: Event<u32> = Event::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s1 = seen.clone();
        let _t1 = event.subscribe(move |x| s1.borrow_mut().push(("a", *x)));
        let s2 = seen.clone();
        let _t2 = event.subscribe(move |x| s2.borrow_mut().push(("b", *x)));

        event.fire(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_token_drop_detaches() {
        let event: Event<u32> = Event::new();
        let count = Rc::new(RefCell::new(0));

        let c = count.clone();
        let token = event.subscribe(move |_| *c.borrow_mut() += 1);
        assert_eq!(event.handler_count(), 1);

        event.fire(&0);
        drop(token);

        // Bit-identical to before subscribing: no handlers left, fire is a no-op.
        assert!(event.is_empty());
        event.fire(&0);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_subscribe_during_fire_takes_effect_next_fire() {
        let event: Rc<Event<u32>> = Rc::new(Event::new());
        let count = Rc::new(RefCell::new(0));
        let late_token: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let ev = event.clone();
        let c = count.clone();
        let slot = late_token.clone();
        let _t = event.subscribe(move |_| {
            if slot.borrow().is_none() {
                let c2 = c.clone();
                let token = ev.subscribe(move |_| *c2.borrow_mut() += 1);
                *slot.borrow_mut() = Some(token);
            }
        });

        event.fire(&0);
        assert_eq!(*count.borrow(), 0, "new handler must not run in the same fire");
        event.fire(&0);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe_during_own_invocation() {
        let event: Event<u32> = Event::new();
        let count = Rc::new(RefCell::new(0));
        let token: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let c = count.clone();
        let slot = token.clone();
        let t = event.subscribe(move |_| {
            *c.borrow_mut() += 1;
            // Drop own token mid-invocation.
            slot.borrow_mut().take();
        });
        *token.borrow_mut() = Some(t);

        let c2 = count.clone();
        let _t2 = event.subscribe(move |_| *c2.borrow_mut() += 10);

        event.fire(&0);
        // First handler ran once and removed itself; second handler unaffected.
        assert_eq!(*count.borrow(), 11);
        assert_eq!(event.handler_count(), 1);

        event.fire(&0);
        assert_eq!(*count.borrow(), 21);
    }

    #[test]
    fn test_unsubscribed_peer_skipped_within_fire() {
        let event: Event<u32> = Event::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let peer: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let s1 = seen.clone();
        let p = peer.clone();
        let _t1 = event.subscribe(move |_| {
            s1.borrow_mut().push("first");
            p.borrow_mut().take();
        });

        let s2 = seen.clone();
        let t2 = event.subscribe(move |_| s2.borrow_mut().push("second"));
        *peer.borrow_mut() = Some(t2);

        event.fire(&0);
        assert_eq!(*seen.borrow(), vec!["first"]);
    }

    #[test]
    fn test_eager_unsubscribe() {
        let event: Event<u32> = Event::new();
        let token = event.subscribe(|_| {});
        token.unsubscribe();
        assert!(event.is_empty());
    }
}
