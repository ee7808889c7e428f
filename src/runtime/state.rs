//! The orchestrator's explicit context.
//!
//! Everything the loop needs to remember between ticks lives here, in one value
//! owned by the [`Orchestrator`](super::Orchestrator): which app is current,
//! what is running, the shared variables, and the power state.

use super::power::PowerState;
use crate::bus::Payload;
use std::collections::BTreeMap;

/// Loop-wide state carried from tick to tick.
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    pub(crate) current_app: Option<String>,
    pub(crate) running_services: Vec<String>,
    pub(crate) running_overlays: Vec<String>,
    pub(crate) variables: BTreeMap<String, Payload>,
    pub(crate) power: PowerState,
}

impl RuntimeState {
    /// Name of the current app.
    #[must_use]
    pub fn current_app(&self) -> Option<&str> {
        self.current_app.as_deref()
    }

    /// Running services, in start order. No name appears twice.
    #[must_use]
    pub fn running_services(&self) -> &[String] {
        &self.running_services
    }

    /// Running overlays, in draw order. No name appears twice.
    #[must_use]
    pub fn running_overlays(&self) -> &[String] {
        &self.running_overlays
    }

    #[must_use]
    pub fn is_service_running(&self, name: &str) -> bool {
        self.running_services.iter().any(|running| running == name)
    }

    #[must_use]
    pub fn is_overlay_running(&self, name: &str) -> bool {
        self.running_overlays.iter().any(|running| running == name)
    }

    /// A shared variable; `null` when unset.
    #[must_use]
    pub fn variable(&self, key: &str) -> Payload {
        self.variables.get(key).cloned().unwrap_or(Payload::Null)
    }

    /// All shared variables.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, Payload> {
        &self.variables
    }

    #[must_use]
    pub const fn power(&self) -> PowerState {
        self.power
    }

    pub(crate) fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Payload>) {
        self.variables.insert(key.into(), value.into());
    }
}
