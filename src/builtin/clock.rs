//! The clock overlay: local time in the top-right corner.

use crate::bus::{EventListener, Payload};
use crate::components::{ComponentModule, Overlay};
use crate::input::TIME;
use crate::ui::{Anchor, Label, Point};
use chrono::{DateTime, Local, Utc};

/// Name of the clock overlay.
pub const CLOCK_OVERLAY: &str = "clock";

/// Formats a `time` payload (unix seconds) in local time.
#[must_use]
pub fn format_time(payload: &Payload, format: &str) -> Option<String> {
    let seconds = payload.as_i64()?;
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    Some(utc.with_timezone(&Local).format(format).to_string())
}

/// Contributes the `clock` overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockModule;

impl ComponentModule for ClockModule {
    fn name(&self) -> &str {
        CLOCK_OVERLAY
    }

    fn define_overlay(&self) -> Option<Overlay> {
        let mut overlay = Overlay::new_overlay(CLOCK_OVERLAY);
        let label = Label::new("--:--", Anchor::TopRight, Point::new(-4, 4));
        let text = label.text_cell();
        overlay.main_activity_mut().add(label);

        overlay.on(TIME, move |event, _| {
            if let Some(now) = format_time(event.payload(), "%H:%M") {
                *text.borrow_mut() = now;
            }
        });
        Some(overlay)
    }
}
