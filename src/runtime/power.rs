//! The loop-wide sleep state machine.
//!
//! ```text
//!            toggle (tick completes)
//!   Awake ─────────────────────────► Dormant
//!     ▲                                 │ no toggle: tick skipped,
//!     └─────────────────────────────────┘ pending events discarded
//!            toggle (tick completes)
//! ```

use serde::Serialize;

/// Whether the loop is running normally or paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    #[default]
    Awake,
    Dormant,
}

/// What the rest of the tick should do after the sleep gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Broadcast, apply reserved events and render as usual.
    Proceed,
    /// Discard everything and render a blank frame.
    Skip,
}

impl PowerState {
    /// Applies one tick's worth of input to the state machine.
    ///
    /// `toggle` is whether this tick's pending events contain the sleep tag. A
    /// dormant loop only wakes on the toggle; an awake loop that sees the toggle
    /// still completes the current tick.
    pub fn gate(&mut self, toggle: bool) -> Gate {
        match (*self, toggle) {
            (Self::Awake, false) => Gate::Proceed,
            (Self::Awake, true) => {
                *self = Self::Dormant;
                tracing::info!("going dormant");
                Gate::Proceed
            }
            (Self::Dormant, true) => {
                *self = Self::Awake;
                tracing::info!("waking up");
                Gate::Proceed
            }
            (Self::Dormant, false) => Gate::Skip,
        }
    }

    #[must_use]
    pub const fn is_dormant(self) -> bool {
        matches!(self, Self::Dormant)
    }
}
