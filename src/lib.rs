//! Tickbus: a tick-driven application runtime for small screen devices.
//!
//! Tickbus hosts three kinds of components on one thread:
//! - **Apps**: full-screen, one current at a time, with switchable activities
//! - **Overlays**: drawn on top of the app, in start order
//! - **Services**: invisible, optionally backed by worker threads
//!
//! They never call each other. Each owns an event queue; once per tick the
//! orchestrator gathers every queue, polls the environment, and delivers the
//! batch to whatever is running.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host binary (main.rs)                              │  ← CLI, stdin input
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (runtime/)                                 │  ← Tick loop
//! │  - Orchestrator: import, poll, gate, broadcast      │
//! │  - Sleep state machine, frame pacing                │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Components    │   │ Input         │   │ Worker        │
//! │ (components/) │   │ (input/)      │   │ (worker/)     │
//! │ - App/Overlay │   │ - Sources     │   │ - Threads     │
//! │ - Service     │   │ - Bindings    │   │ - Mailboxes   │
//! │ - Catalog     │   │ - Clock       │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Bus & Domain Layers                                │
//! │  - Event, Eventqueue, listeners (bus/)              │
//! │  - Reserved "main …" requests (bus/system)          │
//! │  - Error types, component identity (domain/)        │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← tracing setup
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`bus`]: events, queues, listeners and the reserved request vocabulary
//! - [`components`]: apps, activities, overlays, services and the catalog
//! - [`runtime`]: the orchestrator and its loop state
//! - [`input`]: environment polling, input sources and bindings
//! - [`ui`]: drawing surface and drawable objects
//! - [`worker`]: background threads that report back through the bus
//! - [`builtin`]: the components shipped with the runtime
//! - [`domain`]: errors and component identity
//! - [`observability`]: tracing subscriber setup
//!
//! # Configuration
//!
//! ```toml
//! tick_rate = 15
//! dormant_idle_ms = 300
//! trace_level = "info"
//!
//! [screen]
//! width = 320
//! height = 240
//!
//! [boot]
//! app = "appdrawer"
//! overlays = ["fps counter", "clock"]
//! services = ["bluetooth service"]
//!
//! [bindings.keys]
//! q = { action = "sleep" }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tickbus::input::{Environment, ScriptedInput, InputSignal};
//! use tickbus::ui::HeadlessSurface;
//! use tickbus::{builtin, initialize, Config};
//!
//! let config = Config { tick_rate: 0, ..Default::default() };
//! let environment = Environment::new(config.bindings.clone())
//!     .with_source(ScriptedInput::new([vec![], vec![InputSignal::Quit]]));
//! let surface = HeadlessSurface::new(config.screen);
//!
//! let mut runtime = initialize(&config, &builtin::modules(), environment, surface)?;
//! assert_eq!(runtime.run(None), 2);
//! assert_eq!(runtime.state().current_app(), Some("appdrawer"));
//! # Ok::<(), tickbus::RuntimeError>(())
//! ```

pub mod builtin;
pub mod bus;
pub mod components;
pub mod domain;
pub mod input;
pub mod runtime;
pub mod ui;
pub mod worker;

pub mod observability;

pub use bus::{Event, EventHandler, EventListener, Eventqueue, Payload, SystemEvent};
pub use components::{Activity, App, Catalog, ComponentModule, Overlay, Service};
pub use domain::{ComponentId, ComponentKind, Result, RuntimeError};
pub use runtime::{Orchestrator, RuntimeSettings, TickOutcome};

use input::{Bindings, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ui::{Surface, Viewport};

/// Components started before the first tick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// The first current app.
    pub app: String,
    /// Overlays to start, drawn in this order.
    pub overlays: Vec<String>,
    /// Services to start.
    pub services: Vec<String>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            app: "appdrawer".to_string(),
            overlays: vec!["fps counter".to_string(), "clock".to_string()],
            services: vec!["bluetooth service".to_string()],
        }
    }
}

/// Runtime configuration, usually read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target ticks per second; `0` runs unpaced. Default: 15
    pub tick_rate: u32,

    /// How long a tick idles while the device is dormant. Default: 300
    pub dormant_idle_ms: u64,

    /// Size of the drawable area. Default: 320x240
    pub screen: Viewport,

    /// What runs at startup.
    pub boot: BootConfig,

    /// Key and pin meanings.
    pub bindings: Bindings,

    /// Tracing filter directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Log to this file (rotated) instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: 15,
            dormant_idle_ms: 300,
            screen: Viewport::default(),
            boot: BootConfig::default(),
            bindings: Bindings::default(),
            trace_level: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Toml`] for malformed TOML, [`RuntimeError::Config`] for
    /// values that parse but cannot work (an empty screen, no boot app).
    ///
    /// # Example
    ///
    /// ```rust
    /// use tickbus::Config;
    ///
    /// let config = Config::from_toml_str("tick_rate = 30\n[boot]\napp = \"Home\"")?;
    /// assert_eq!(config.tick_rate, 30);
    /// assert_eq!(config.boot.app, "Home");
    /// assert_eq!(config.boot.overlays, vec!["fps counter", "clock"]);
    /// # Ok::<(), tickbus::RuntimeError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Loop timing derived from this configuration.
    #[must_use]
    pub const fn settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            tick_rate: self.tick_rate,
            dormant_idle: Duration::from_millis(self.dormant_idle_ms),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(RuntimeError::Config(format!(
                "screen must not be empty, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        if self.boot.app.trim().is_empty() {
            return Err(RuntimeError::Config("boot.app must name an app".to_string()));
        }
        Ok(())
    }
}

/// Builds a booted orchestrator from configuration and component modules.
///
/// Registers every module's components, then starts the configured boot app,
/// overlays and services. The first tick has not run yet.
///
/// # Errors
///
/// [`RuntimeError::NotFound`] if a boot component is not provided by any module,
/// or the boot app's own start error.
pub fn initialize<S: Surface>(
    config: &Config,
    modules: &[Box<dyn ComponentModule>],
    environment: Environment,
    surface: S,
) -> Result<Orchestrator<S>> {
    tracing::debug!(modules = modules.len(), tick_rate = config.tick_rate, "initializing runtime");

    let catalog = Catalog::from_modules(modules);
    let mut orchestrator = Orchestrator::new(catalog, environment, surface, config.settings());
    orchestrator.boot(&config.boot)?;
    Ok(orchestrator)
}
