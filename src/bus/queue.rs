//! Per-component mailboxes.
//!
//! An [`Eventqueue`] is owned by exactly one component and is never cloned. It
//! supports enqueueing, cross-queue import (a transfer that drains the sources),
//! environment polling and routed broadcast.
//!
//! Background workers never touch the queue itself. They hold a [`QueueHandle`],
//! a producer-only handle that may append from any thread while the loop thread
//! drains the same queue:
//!
//! ```text
//! worker thread ──push──► QueueHandle ─┐
//!                                      ├─► pending (Mutex<Vec<Event>>) ──import──► main queue
//! loop thread ───emit──► Eventqueue ───┘
//! ```
//!
//! Events appended by a producer while a drain is in progress land in the next
//! drain; ordering across producers is only guaranteed per batch.

use super::event::{Event, Payload};
use super::listener::EventHandler;
use crate::domain::ComponentId;
use crate::input::{Environment, PollOutcome};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock(pending: &Mutex<Vec<Event>>) -> MutexGuard<'_, Vec<Event>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An ordered mailbox owned by one component.
///
/// # Example
///
/// ```
/// use tickbus::bus::{Eventqueue, HandlerCore, EventHandler, EventListener};
/// use tickbus::domain::ComponentId;
///
/// let mut app = HandlerCore::new(ComponentId::app("Home"));
/// app.on("time", |_, outbox| outbox.emit("redraw", serde_json::Value::Null));
///
/// let mut main = Eventqueue::new(ComponentId::main());
/// main.emit("time", serde_json::Value::Null);
/// main.broadcast(&mut [&mut app], true);
///
/// assert!(main.is_empty());
/// assert_eq!(app.queue().events()[0].tag(), "redraw");
/// ```
#[derive(Debug)]
pub struct Eventqueue {
    owner: ComponentId,
    pending: Arc<Mutex<Vec<Event>>>,
}

impl Eventqueue {
    /// Creates an empty queue owned by `owner`.
    #[must_use]
    pub fn new(owner: ComponentId) -> Self {
        Self {
            owner,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The owning component.
    #[must_use]
    pub const fn owner(&self) -> &ComponentId {
        &self.owner
    }

    /// A producer handle for worker threads.
    #[must_use]
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            owner: self.owner.clone(),
            pending: Arc::clone(&self.pending),
        }
    }

    /// Enqueues a new event built from a tag and payload.
    pub fn emit(&mut self, tag: impl Into<String>, payload: impl Into<Payload>) {
        self.push(Event::new(tag).with_payload(payload));
    }

    /// Enqueues an event, stamping the owner as source if none is set.
    pub fn push(&mut self, event: impl Into<Event>) {
        let event = event.into().stamped(&self.owner);
        lock(&self.pending).push(event);
    }

    /// Enqueues several events as one group; no other producer interleaves.
    pub fn extend<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        let stamped: Vec<Event> = events
            .into_iter()
            .map(|event| event.stamped(&self.owner))
            .collect();
        lock(&self.pending).extend(stamped);
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.pending).is_empty()
    }

    /// A copy of the pending events, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        lock(&self.pending).clone()
    }

    /// Whether any pending event carries `tag`.
    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        lock(&self.pending).iter().any(|event| event.tag() == tag)
    }

    /// Discards all pending events.
    pub fn clear(&mut self) {
        lock(&self.pending).clear();
    }

    /// Appends every source queue's pending events, in the order the sources are
    /// given and preserving each source's own order.
    ///
    /// With `clear` the sources are drained in the same call, so an event is
    /// never imported twice. Without it the sources are left untouched.
    pub fn import_from(&mut self, sources: &mut [&mut Eventqueue], clear: bool) -> usize {
        let mut imported = Vec::new();
        for source in sources.iter_mut() {
            let mut pending = lock(&source.pending);
            if clear {
                imported.append(&mut pending);
            } else {
                imported.extend(pending.iter().cloned());
            }
        }
        let count = imported.len();
        lock(&self.pending).append(&mut imported);
        count
    }

    /// Removes and returns the pending events matching `predicate`, keeping the
    /// rest in order.
    pub fn partition<F>(&mut self, mut predicate: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let mut pending = lock(&self.pending);
        let (matching, rest): (Vec<Event>, Vec<Event>) =
            pending.drain(..).partition(|event| predicate(event));
        *pending = rest;
        matching
    }

    /// Translates this tick's outside-world input into events.
    ///
    /// Returns [`PollOutcome::Quit`] without enqueueing anything when the input
    /// asks the process to stop.
    pub fn poll_environment(&mut self, environment: &mut Environment) -> PollOutcome {
        match environment.collect() {
            Some(events) => {
                let count = events.len();
                self.extend(events);
                PollOutcome::Continue(count)
            }
            None => PollOutcome::Quit,
        }
    }

    /// Delivers every pending event to a fixed list of handlers, in arrival order.
    ///
    /// The list is the whole set of reachable receivers: an untargeted event goes
    /// to every handler whose effective map contains the tag, in list order, and a
    /// targeted event reaches its receiver only if the list holds it. With `clear`
    /// the delivered events are removed.
    ///
    /// Returns the number of handler invocations.
    pub fn broadcast(&mut self, targets: &mut [&mut dyn EventHandler], clear: bool) -> usize {
        self.route(targets, clear)
    }

    /// Delivers every pending event, in arrival order.
    ///
    /// Untargeted events fan out over [`Receivers::fan_out`]. A targeted event
    /// goes only to the target's effective handlers for its tag, wherever
    /// [`Receivers::resolve`] finds it, whether or not it is part of the fan-out.
    /// Handlers run synchronously; events they enqueue are not seen by this call.
    pub fn route<R>(&mut self, receivers: &mut R, clear: bool) -> usize
    where
        R: Receivers + ?Sized,
    {
        let events = if clear {
            std::mem::take(&mut *lock(&self.pending))
        } else {
            self.events()
        };

        let mut invoked = 0;
        for event in &events {
            if let Some(target_id) = event.target() {
                match receivers.resolve(target_id) {
                    Some(target) => {
                        if target.listens_to(event.tag()) {
                            invoked += target.deliver(event);
                        }
                    }
                    None => {
                        tracing::debug!(
                            tag = %event.tag(),
                            target = %target_id,
                            "targeted event has no receiver, dropping"
                        );
                    }
                }
                continue;
            }

            for target in receivers.fan_out() {
                if target.listens_to(event.tag()) {
                    tracing::trace!(tag = %event.tag(), target = %target.id(), "delivering");
                    invoked += target.deliver(event);
                }
            }
        }
        invoked
    }
}

/// The handlers an [`Eventqueue::route`] call can reach.
pub trait Receivers {
    /// Handlers offered every untargeted event, in delivery order.
    fn fan_out(&mut self) -> Vec<&mut dyn EventHandler>;

    /// The handler a targeted event names, if it exists.
    fn resolve(&mut self, id: &ComponentId) -> Option<&mut dyn EventHandler>;
}

impl<'h> Receivers for [&'h mut dyn EventHandler] {
    fn fan_out(&mut self) -> Vec<&mut dyn EventHandler> {
        self.iter_mut()
            .map(|target| &mut **target as &mut dyn EventHandler)
            .collect()
    }

    fn resolve(&mut self, id: &ComponentId) -> Option<&mut dyn EventHandler> {
        self.iter_mut()
            .find(|target| target.id() == id)
            .map(|target| &mut **target as &mut dyn EventHandler)
    }
}

/// Cross-thread producer handle onto an [`Eventqueue`].
///
/// Cheap to clone; stamps the owning component as source like the queue does.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    owner: ComponentId,
    pending: Arc<Mutex<Vec<Event>>>,
}

impl QueueHandle {
    /// The component whose queue this feeds.
    #[must_use]
    pub const fn owner(&self) -> &ComponentId {
        &self.owner
    }

    /// Appends one event.
    pub fn push(&self, event: impl Into<Event>) {
        let event = event.into().stamped(&self.owner);
        lock(&self.pending).push(event);
    }

    /// Appends an event built from a tag and payload.
    pub fn emit(&self, tag: impl Into<String>, payload: impl Into<Payload>) {
        self.push(Event::new(tag).with_payload(payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{EventListener, HandlerCore};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tags(queue: &Eventqueue) -> Vec<String> {
        queue.events().iter().map(|e| e.tag().to_string()).collect()
    }

    #[test]
    fn push_stamps_the_owner() {
        let mut queue = Eventqueue::new(ComponentId::app("Home"));
        queue.emit("hello", Value::Null);
        assert_eq!(queue.events()[0].source(), Some(&ComponentId::app("Home")));
    }

    #[test]
    fn import_with_clear_transfers() {
        let mut a = Eventqueue::new(ComponentId::app("a"));
        let mut b = Eventqueue::new(ComponentId::service("b"));
        a.emit("a1", Value::Null);
        a.emit("a2", Value::Null);
        b.emit("b1", Value::Null);

        let mut main = Eventqueue::new(ComponentId::main());
        main.emit("m0", Value::Null);
        let count = main.import_from(&mut [&mut a, &mut b], true);

        assert_eq!(count, 3);
        assert_eq!(tags(&main), vec!["m0", "a1", "a2", "b1"]);
        assert!(a.is_empty());
        assert!(b.is_empty());
    }

    #[test]
    fn import_without_clear_copies() {
        let mut a = Eventqueue::new(ComponentId::app("a"));
        a.emit("a1", Value::Null);

        let mut main = Eventqueue::new(ComponentId::main());
        main.import_from(&mut [&mut a], false);

        assert_eq!(tags(&main), vec!["a1"]);
        assert_eq!(tags(&a), vec!["a1"]);
    }

    #[test]
    fn partition_keeps_the_remainder_in_order() {
        let mut queue = Eventqueue::new(ComponentId::main());
        for tag in ["x", "main sleep", "y", "main exit", "z"] {
            queue.emit(tag, Value::Null);
        }
        let reserved = queue.partition(Event::is_reserved);

        let reserved_tags: Vec<&str> = reserved.iter().map(Event::tag).collect();
        assert_eq!(reserved_tags, vec!["main sleep", "main exit"]);
        assert_eq!(tags(&queue), vec!["x", "y", "z"]);
    }

    #[test]
    fn broadcast_without_clear_keeps_pending() {
        let hits = Rc::new(RefCell::new(0));
        let mut app = HandlerCore::new(ComponentId::app("a"));
        let h = Rc::clone(&hits);
        app.on("t", move |_, _| *h.borrow_mut() += 1);

        let mut main = Eventqueue::new(ComponentId::main());
        main.emit("t", Value::Null);
        main.broadcast(&mut [&mut app], false);
        main.broadcast(&mut [&mut app], true);

        assert_eq!(*hits.borrow(), 2);
        assert!(main.is_empty());
    }

    #[test]
    fn targeted_event_to_unknown_receiver_is_dropped() {
        let hits = Rc::new(RefCell::new(0));
        let mut app = HandlerCore::new(ComponentId::app("a"));
        let h = Rc::clone(&hits);
        app.on("t", move |_, _| *h.borrow_mut() += 1);

        let mut main = Eventqueue::new(ComponentId::main());
        main.push(Event::new("t").to(ComponentId::app("elsewhere")));
        let invoked = main.broadcast(&mut [&mut app], true);

        assert_eq!(invoked, 0);
        assert_eq!(*hits.borrow(), 0);
        assert!(main.is_empty());
    }

    struct Directory {
        fan_out: HandlerCore,
        parked: HandlerCore,
    }

    impl Receivers for Directory {
        fn fan_out(&mut self) -> Vec<&mut dyn EventHandler> {
            vec![&mut self.fan_out as &mut dyn EventHandler]
        }

        fn resolve(&mut self, id: &ComponentId) -> Option<&mut dyn EventHandler> {
            if self.fan_out.id() == id {
                Some(&mut self.fan_out as &mut dyn EventHandler)
            } else if self.parked.id() == id {
                Some(&mut self.parked as &mut dyn EventHandler)
            } else {
                None
            }
        }
    }

    #[test]
    fn targeted_event_reaches_a_receiver_outside_the_fan_out() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut directory = Directory {
            fan_out: HandlerCore::new(ComponentId::app("shown")),
            parked: HandlerCore::new(ComponentId::app("parked")),
        };
        for core in [&mut directory.fan_out, &mut directory.parked] {
            let hits = Rc::clone(&hits);
            let name = core.id().name.clone();
            core.on("t", move |_, _| hits.borrow_mut().push(name.clone()));
        }

        let mut main = Eventqueue::new(ComponentId::main());
        main.emit("t", Value::Null);
        main.push(Event::new("t").to(ComponentId::app("parked")));
        let invoked = main.route(&mut directory, true);

        assert_eq!(invoked, 2);
        assert_eq!(*hits.borrow(), vec!["shown", "parked"]);
    }

    #[test]
    fn handle_appends_from_another_thread() {
        let mut queue = Eventqueue::new(ComponentId::service("bt"));
        let handle = queue.handle();

        let worker = std::thread::spawn(move || {
            for i in 0..100 {
                handle.emit("sample", json!(i));
            }
        });

        let mut main = Eventqueue::new(ComponentId::main());
        while !worker.is_finished() {
            main.import_from(&mut [&mut queue], true);
        }
        let _ = worker.join();
        main.import_from(&mut [&mut queue], true);

        let values: Vec<i64> = main
            .events()
            .iter()
            .filter_map(|e| e.payload().as_i64())
            .collect();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
        assert!(main
            .events()
            .iter()
            .all(|e| e.source() == Some(&ComponentId::service("bt"))));
    }
}
