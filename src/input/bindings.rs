//! Key and pin bindings.
//!
//! Bindings decide what a key press or a digital input edge means. They are part
//! of the configuration file:
//!
//! ```toml
//! [bindings.keys]
//! q = { action = "sleep" }
//! a = { action = "start-app", app = "Home" }
//! escape = { action = "quit" }
//!
//! [bindings.pins]
//! 12 = { action = "sleep" }
//! 20 = { action = "emit", tag = "main notification" }
//! ```
//!
//! Pins are keyed by their number written as a string, since TOML table keys are
//! always strings.

use crate::bus::{Event, SystemEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a bound input does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Binding {
    /// Toggle dormant/awake.
    Sleep,
    /// Stop the loop without producing an event.
    Quit,
    /// Make an app current.
    StartApp {
        /// Name of the app.
        app: String,
    },
    /// Emit an arbitrary tag with no payload.
    Emit {
        /// Tag to emit.
        tag: String,
    },
}

impl Binding {
    /// The event this binding produces, or `None` for [`Binding::Quit`].
    #[must_use]
    pub fn to_event(&self) -> Option<Event> {
        match self {
            Self::Sleep => Some(SystemEvent::Sleep.into_event()),
            Self::Quit => None,
            Self::StartApp { app } => Some(SystemEvent::StartApp(app.clone()).into_event()),
            Self::Emit { tag } => Some(Event::new(tag.clone())),
        }
    }
}

/// Key-name and pin-number binding tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    /// Lowercase key name → binding.
    pub keys: BTreeMap<String, Binding>,
    /// Pin number (as a string) → binding.
    pub pins: BTreeMap<String, Binding>,
}

impl Bindings {
    /// Binding for a key, matched case-insensitively.
    #[must_use]
    pub fn key(&self, key: &str) -> Option<&Binding> {
        self.keys.get(&key.to_lowercase())
    }

    /// Binding for a digital input pin.
    #[must_use]
    pub fn pin(&self, pin: u8) -> Option<&Binding> {
        self.pins.get(&pin.to_string())
    }
}

impl Default for Bindings {
    fn default() -> Self {
        let start = |app: &str| Binding::StartApp {
            app: app.to_string(),
        };
        let keys = BTreeMap::from([
            ("escape".to_string(), Binding::Quit),
            ("q".to_string(), Binding::Sleep),
            ("a".to_string(), start("Home")),
            ("z".to_string(), start("appdrawer")),
        ]);
        let pins = BTreeMap::from([
            ("12".to_string(), Binding::Sleep),
            ("16".to_string(), start("Home")),
            ("18".to_string(), start("appdrawer")),
        ]);
        Self { keys, pins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_sleep_and_quit() {
        let bindings = Bindings::default();
        assert_eq!(bindings.key("Q"), Some(&Binding::Sleep));
        assert_eq!(bindings.key("escape"), Some(&Binding::Quit));
        assert_eq!(bindings.pin(12), Some(&Binding::Sleep));
        assert_eq!(bindings.pin(99), None);
    }

    #[test]
    fn quit_produces_no_event() {
        assert!(Binding::Quit.to_event().is_none());
        let event = Binding::StartApp { app: "Home".into() }.to_event();
        assert_eq!(event.map(|e| e.payload().clone()), Some("Home".into()));
    }

    #[test]
    fn parses_from_toml() {
        let bindings: Bindings = toml::from_str(
            r#"
            [keys]
            x = { action = "emit", tag = "main exit" }

            [pins]
            20 = { action = "start-app", app = "clockface" }
            "#,
        )
        .unwrap();

        assert_eq!(
            bindings.key("x"),
            Some(&Binding::Emit { tag: "main exit".into() })
        );
        assert_eq!(
            bindings.pin(20),
            Some(&Binding::StartApp { app: "clockface".into() })
        );
        assert!(bindings.key("q").is_none());
    }
}
