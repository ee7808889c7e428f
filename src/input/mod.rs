//! Environment input: the only place events are synthesized from the outside world.
//!
//! Each tick the orchestrator's queue calls
//! [`Eventqueue::poll_environment`](crate::bus::Eventqueue::poll_environment),
//! which asks the [`Environment`] to translate whatever happened since the last
//! tick into events:
//!
//! | Occurrence | Event |
//! |---|---|
//! | wall-clock second changed | `time` (payload: unix seconds) |
//! | pointer pressed / released | `mouse down` / `mouse up` (payload: `[x, y]`) |
//! | bound key or pin | the binding's event (e.g. `main sleep`) |
//! | unbound key | `key down` (payload: key name) |
//! | unbound pin | `pin edge` (payload: pin number) |
//! | quit signal or quit binding | nothing; the poll reports [`PollOutcome::Quit`] |
//!
//! # Modules
//!
//! - [`bindings`]: configurable key/pin meanings
//! - [`source`]: the [`InputSource`] trait and the shipped sources

pub mod bindings;
pub mod source;

pub use bindings::{Binding, Bindings};
pub use source::{parse_command, ChannelInput, InputSender, InputSignal, InputSource, ScriptedInput};

use crate::bus::Event;
use serde_json::json;

pub const TIME: &str = "time";
pub const MOUSE_DOWN: &str = "mouse down";
pub const MOUSE_UP: &str = "mouse up";
pub const KEY_DOWN: &str = "key down";
pub const PIN_EDGE: &str = "pin edge";

/// Result of one environment poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Keep ticking; carries the number of events appended.
    Continue(usize),
    /// Input asked the process to stop.
    Quit,
}

/// The input sources, bindings and clock consulted once per tick.
pub struct Environment {
    sources: Vec<Box<dyn InputSource>>,
    bindings: Bindings,
    clock: Box<dyn FnMut() -> i64>,
    last_second: Option<i64>,
}

impl Environment {
    /// Creates an environment with no sources, reading the local wall clock.
    #[must_use]
    pub fn new(bindings: Bindings) -> Self {
        Self {
            sources: Vec::new(),
            bindings,
            clock: Box::new(|| chrono::Local::now().timestamp()),
            last_second: None,
        }
    }

    /// Adds an input source; sources are polled in the order added.
    #[must_use]
    pub fn with_source(mut self, source: impl InputSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Replaces the clock (unix seconds) used for `time` events.
    #[must_use]
    pub fn with_clock(mut self, clock: impl FnMut() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Active bindings.
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Translates pending input into events, or `None` if input asked to quit.
    pub fn collect(&mut self) -> Option<Vec<Event>> {
        let mut events = Vec::new();

        let now = (self.clock)();
        if self.last_second != Some(now) {
            self.last_second = Some(now);
            events.push(Event::new(TIME).with_payload(now));
        }

        for source in &mut self.sources {
            for signal in source.poll() {
                match translate(&self.bindings, signal) {
                    Some(event) => events.push(event),
                    None => {
                        tracing::info!("quit requested by input");
                        return None;
                    }
                }
            }
        }
        Some(events)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("sources", &self.sources.len())
            .field("bindings", &self.bindings)
            .field("last_second", &self.last_second)
            .finish_non_exhaustive()
    }
}

fn translate(bindings: &Bindings, signal: InputSignal) -> Option<Event> {
    match signal {
        InputSignal::PointerDown { x, y } => Some(Event::new(MOUSE_DOWN).with_payload(json!([x, y]))),
        InputSignal::PointerUp { x, y } => Some(Event::new(MOUSE_UP).with_payload(json!([x, y]))),
        InputSignal::Key(key) => match bindings.key(&key) {
            Some(binding) => binding.to_event(),
            None => Some(Event::new(KEY_DOWN).with_payload(key)),
        },
        InputSignal::Edge(pin) => match bindings.pin(pin) {
            Some(binding) => binding.to_event(),
            None => Some(Event::new(PIN_EDGE).with_payload(pin)),
        },
        InputSignal::Quit => None,
    }
}
