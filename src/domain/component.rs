//! Component identity.
//!
//! Events refer to their sender and receiver by [`ComponentId`] rather than by
//! reference: the orchestrator owns every component, and ids are how a targeted
//! event finds its way back to one of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a component, which decides the registry it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// The orchestrator itself.
    Main,
    /// A screen-filling application.
    App,
    /// A component drawn additively over the current app.
    Overlay,
    /// A headless background component.
    Service,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Main => "main",
            Self::App => "app",
            Self::Overlay => "overlay",
            Self::Service => "service",
        };
        f.write_str(name)
    }
}

/// Identity of an event-handling component: its kind plus its registered name.
///
/// Names are unique within a kind, so an app and a service may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    /// Registry the component belongs to.
    pub kind: ComponentKind,
    /// Registered name.
    pub name: String,
}

impl ComponentId {
    /// Creates an id of the given kind.
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Id of the orchestrator's own queue.
    #[must_use]
    pub fn main() -> Self {
        Self::new(ComponentKind::Main, "main")
    }

    /// Shorthand for an app id.
    pub fn app(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::App, name)
    }

    /// Shorthand for an overlay id.
    pub fn overlay(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Overlay, name)
    }

    /// Shorthand for a service id.
    pub fn service(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Service, name)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
