//! The tick loop and its state.
//!
//! # Modules
//!
//! - [`orchestrator`]: [`Orchestrator`], the top-level event handler
//! - [`state`]: [`RuntimeState`], the explicit loop context
//! - [`power`]: [`PowerState`], the dormant/awake machine
//! - [`clock`]: [`TickClock`], frame pacing and rate measurement

pub mod clock;
pub mod orchestrator;
pub mod power;
pub mod state;

pub use clock::TickClock;
pub use orchestrator::{
    Orchestrator, RuntimeSettings, TickOutcome, BOOT, LOOKUP_FAILED, NEW_FRAME, NOTIFICATION,
    NOTIFICATION_OVERLAY, SERVICE_FAILED,
};
pub use power::{Gate, PowerState};
pub use state::RuntimeState;
