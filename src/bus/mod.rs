//! The event bus: events, queues, listeners and the reserved system vocabulary.
//!
//! # Architecture
//!
//! ```text
//!  component handlers ──emit──► component queue ──import──► main queue
//!                                                              │
//!                                         partition("main …")  │
//!                                    ┌─────────────────────────┤
//!                                    ▼                         ▼
//!                              SystemEvent            broadcast(app, services, overlays)
//!                           (orchestrator)                     │
//!                                                              ▼
//!                                                   component handlers …
//! ```
//!
//! Every component owns exactly one [`Eventqueue`]. Events never travel
//! directly between components: they are imported into the orchestrator's
//! queue and routed from there on the next broadcast.
//!
//! # Modules
//!
//! - [`event`]: the [`Event`] value
//! - [`queue`]: [`Eventqueue`] and the cross-thread [`QueueHandle`]
//! - [`listener`]: [`Listeners`], [`EventListener`] and [`EventHandler`]
//! - [`system`]: reserved `main …` tags and their typed form, [`SystemEvent`]

pub mod event;
pub mod listener;
pub mod queue;
pub mod system;

pub use event::{Event, Payload, RESERVED_PREFIX};
pub use listener::{EventHandler, EventListener, Handler, HandlerCore, Listeners};
pub use queue::{Eventqueue, QueueHandle, Receivers};
pub use system::SystemEvent;
