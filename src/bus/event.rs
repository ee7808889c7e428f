//! The event record carried by the bus.
//!
//! An [`Event`] is an immutable message: a string tag, an optional sender and
//! receiver, an opaque payload and the wall-clock time it was created. Events are
//! built with consuming builder methods and never change once enqueued.
//!
//! Tags beginning with [`RESERVED_PREFIX`] are addressed to the orchestrator; see
//! [`crate::bus::system`] for their typed form. Every other tag is application
//! defined and opaque to the bus.

use crate::domain::ComponentId;
use chrono::{DateTime, Local};

/// Prefix of tags recognized only by the orchestrator.
pub const RESERVED_PREFIX: &str = "main ";

/// Opaque event payload. `Payload::Null` means "no payload".
pub type Payload = serde_json::Value;

/// An immutable tagged message.
///
/// # Example
///
/// ```
/// use tickbus::bus::Event;
/// use tickbus::domain::ComponentId;
///
/// let event = Event::new("bl discover")
///     .with_payload("hci0")
///     .to(ComponentId::service("bluetooth service"));
///
/// assert_eq!(event.tag(), "bl discover");
/// assert!(event.source().is_none());
/// assert_eq!(event.payload().as_str(), Some("hci0"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    tag: String,
    source: Option<ComponentId>,
    target: Option<ComponentId>,
    payload: Payload,
    timestamp: DateTime<Local>,
}

impl Event {
    /// Creates an untargeted event with no source and no payload.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            source: None,
            target: None,
            payload: Payload::Null,
            timestamp: Local::now(),
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Restricts delivery to exactly one component.
    #[must_use]
    pub fn to(mut self, target: ComponentId) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the sender explicitly.
    ///
    /// Queues stamp their owner as the source of any event enqueued without one.
    #[must_use]
    pub fn from(mut self, source: ComponentId) -> Self {
        self.source = Some(source);
        self
    }

    /// Fills in `source` if it is still unset.
    pub(crate) fn stamped(mut self, owner: &ComponentId) -> Self {
        if self.source.is_none() {
            self.source = Some(owner.clone());
        }
        self
    }

    /// The event's tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The sending component, if known.
    #[must_use]
    pub const fn source(&self) -> Option<&ComponentId> {
        self.source.as_ref()
    }

    /// The single receiving component of a targeted event.
    #[must_use]
    pub const fn target(&self) -> Option<&ComponentId> {
        self.target.as_ref()
    }

    /// The payload (`Payload::Null` if none was attached).
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// When the event was constructed.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Whether the tag is addressed to the orchestrator.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.tag.starts_with(RESERVED_PREFIX)
    }
}
