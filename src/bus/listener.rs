//! Handler registration and the listener/handler capabilities.
//!
//! - [`Listeners`] is the tag → ordered handler list map.
//! - [`EventListener`] is implemented by anything that owns a `Listeners` map
//!   (activities, apps, services, overlays).
//! - [`EventHandler`] is an `EventListener` that also exclusively owns one
//!   [`Eventqueue`]; only event handlers can be broadcast targets.
//!
//! Handlers run synchronously on the loop thread. They receive the event and the
//! outbound queue of the component that owns them, which is where any follow-up
//! events go.

use super::event::Event;
use super::queue::Eventqueue;
use crate::domain::ComponentId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A registered event callback.
pub type Handler = Box<dyn FnMut(&Event, &mut Eventqueue)>;

/// Tag-keyed, ordered handler lists.
///
/// Registration is additive: registering twice for the same tag (even the same
/// logic) yields two invocations per event. There is no deregistration.
#[derive(Default)]
pub struct Listeners {
    handlers: HashMap<String, Vec<Handler>>,
}

impl Listeners {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `tag`, creating the list if absent.
    pub fn register<F>(&mut self, tag: impl Into<String>, handler: F)
    where
        F: FnMut(&Event, &mut Eventqueue) + 'static,
    {
        self.handlers
            .entry(tag.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Whether at least one handler is registered for `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.get(tag).is_some_and(|list| !list.is_empty())
    }

    /// Number of handlers registered for `tag`.
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        self.handlers.get(tag).map_or(0, Vec::len)
    }

    /// Handler counts per tag.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        self.handlers
            .iter()
            .map(|(tag, list)| (tag.as_str(), list.len()))
            .collect()
    }

    /// Runs every handler for the event's tag in registration order.
    ///
    /// Returns how many handlers ran; an unknown tag is a silent no-op.
    pub fn dispatch(&mut self, event: &Event, outbox: &mut Eventqueue) -> usize {
        let Some(list) = self.handlers.get_mut(event.tag()) else {
            return 0;
        };
        for handler in list.iter_mut() {
            handler(event, outbox);
        }
        list.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts()).finish()
    }
}

/// Capability of owning tag-keyed handlers.
pub trait EventListener {
    /// The component's own handlers.
    fn listeners(&self) -> &Listeners;

    /// Mutable access for registration.
    fn listeners_mut(&mut self) -> &mut Listeners;

    /// Registers `handler` for `tag`.
    fn on<F>(&mut self, tag: impl Into<String>, handler: F)
    where
        F: FnMut(&Event, &mut Eventqueue) + 'static,
        Self: Sized,
    {
        self.listeners_mut().register(tag, handler);
    }

    /// Handler counts per tag, including any composed child's handlers.
    ///
    /// Plain components return their own map unmodified.
    fn effective_listeners(&self) -> BTreeMap<&str, usize> {
        self.listeners().counts()
    }

    /// Whether the effective handler map contains `tag`.
    fn listens_to(&self, tag: &str) -> bool {
        self.listeners().contains(tag)
    }
}

/// The identity, handlers and queue every event handler carries.
///
/// Components embed one and implement [`EventHandler::core`] to expose it.
#[derive(Debug)]
pub struct HandlerCore {
    id: ComponentId,
    listeners: Listeners,
    queue: Eventqueue,
}

impl HandlerCore {
    /// Creates the core, together with the component's one and only queue.
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        let queue = Eventqueue::new(id.clone());
        Self {
            id,
            listeners: Listeners::new(),
            queue,
        }
    }

    /// Delivers an event to the own handlers, with the own queue as outbox.
    pub fn deliver(&mut self, event: &Event) -> usize {
        self.listeners.dispatch(event, &mut self.queue)
    }

    /// Splits the core for callers that dispatch to additional listeners.
    pub fn parts_mut(&mut self) -> (&mut Listeners, &mut Eventqueue) {
        (&mut self.listeners, &mut self.queue)
    }
}

impl EventListener for HandlerCore {
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }
}

/// An [`EventListener`] that exclusively owns one [`Eventqueue`].
///
/// The queue is created with the component and never replaced.
pub trait EventHandler: EventListener {
    /// The embedded identity/handlers/queue.
    fn core(&self) -> &HandlerCore;

    /// Mutable access to the embedded core.
    fn core_mut(&mut self) -> &mut HandlerCore;

    /// The component's identity.
    fn id(&self) -> &ComponentId {
        &self.core().id
    }

    /// The component's outbound queue.
    fn queue(&self) -> &Eventqueue {
        &self.core().queue
    }

    /// Mutable access to the outbound queue.
    fn queue_mut(&mut self) -> &mut Eventqueue {
        &mut self.core_mut().queue
    }

    /// Runs the effective handlers for the event's tag; returns how many ran.
    fn deliver(&mut self, event: &Event) -> usize {
        self.core_mut().deliver(event)
    }
}

impl EventHandler for HandlerCore {
    fn core(&self) -> &HandlerCore {
        self
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        self
    }
}
