//! The notification overlay.
//!
//! Started on demand by the orchestrator when a `main notification` arrives.
//! Shows the latest message for a fixed number of frames, then asks to be
//! closed.

use crate::bus::{EventListener, Payload, SystemEvent};
use crate::components::{ComponentModule, Overlay};
use crate::runtime::{NEW_FRAME, NOTIFICATION, NOTIFICATION_OVERLAY};
use crate::ui::{Anchor, Label, Point};
use std::cell::Cell;
use std::rc::Rc;

/// Frames a message stays on screen (three seconds at the default rate).
pub const DISPLAY_FRAMES: u32 = 45;

/// Contributes the `notification` overlay.
#[derive(Debug, Clone, Copy)]
pub struct NotificationModule {
    pub frames: u32,
}

impl Default for NotificationModule {
    fn default() -> Self {
        Self {
            frames: DISPLAY_FRAMES,
        }
    }
}

impl ComponentModule for NotificationModule {
    fn name(&self) -> &str {
        "notification"
    }

    fn define_overlay(&self) -> Option<Overlay> {
        Some(notification_overlay(self.frames))
    }
}

/// Builds the overlay; `frames` is how long each message stays visible.
#[must_use]
pub fn notification_overlay(frames: u32) -> Overlay {
    let mut overlay = Overlay::new_overlay(NOTIFICATION_OVERLAY);
    let label = Label::new("", Anchor::TopLeft, Point::new(8, 212));
    let text = label.text_cell();
    overlay.main_activity_mut().add(label);

    let remaining = Rc::new(Cell::new(0_u32));

    let shown = Rc::clone(&text);
    let countdown = Rc::clone(&remaining);
    overlay.on(NOTIFICATION, move |event, _| {
        *shown.borrow_mut() = message_text(event.payload());
        countdown.set(frames.max(1));
    });

    overlay.on(NEW_FRAME, move |_, outbox| match remaining.get() {
        0 => {}
        1 => {
            remaining.set(0);
            text.borrow_mut().clear();
            outbox.push(SystemEvent::CloseOverlay(NOTIFICATION_OVERLAY.to_string()));
        }
        n => remaining.set(n - 1),
    });

    overlay
}

fn message_text(payload: &Payload) -> String {
    match payload {
        Payload::String(message) => message.clone(),
        Payload::Null => String::new(),
        other => other.to_string(),
    }
}
