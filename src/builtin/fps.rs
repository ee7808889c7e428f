//! The frame-rate overlay.

use crate::bus::EventListener;
use crate::components::{ComponentModule, Overlay};
use crate::runtime::NEW_FRAME;
use crate::ui::{Anchor, Label, Point};

/// Name of the frame-rate overlay.
pub const FPS_OVERLAY: &str = "fps counter";

/// Contributes the `fps counter` overlay, fed by every `new frame` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsModule;

impl ComponentModule for FpsModule {
    fn name(&self) -> &str {
        FPS_OVERLAY
    }

    fn define_overlay(&self) -> Option<Overlay> {
        let mut overlay = Overlay::new_overlay(FPS_OVERLAY);
        let label = Label::new("0 fps", Anchor::TopLeft, Point::new(4, 4));
        let text = label.text_cell();
        overlay.main_activity_mut().add(label);

        overlay.on(NEW_FRAME, move |event, _| {
            let fps = event.payload().as_u64().unwrap_or(0);
            *text.borrow_mut() = format!("{fps} fps");
        });
        Some(overlay)
    }
}
