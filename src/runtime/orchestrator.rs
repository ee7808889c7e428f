//! The main loop: one top-level event handler that drives every component.
//!
//! # Tick
//!
//! ```text
//! import (app, services, overlays)
//!   → "new frame" with the measured rate
//!   → poll environment            (quit input ends the loop)
//!   → split off "main …" events
//!   → sleep gate                  (dormant: discard, idle, blank frame)
//!   → broadcast the rest to app, services, overlays
//!     (targeted events reach their component even when it is not running)
//!   → apply the reserved events   (lifecycle, variables, notification, exit)
//!   → pace, refresh "fps"
//!   → render: background, app, overlays in start order
//! ```
//!
//! Component handlers never reach the orchestrator directly. Everything they
//! want from it goes through their own queue as a `main …` event, which is
//! imported and applied here on the following tick.

use super::clock::TickClock;
use super::power::Gate;
use super::state::RuntimeState;
use crate::bus::system::{self, SystemEvent};
use crate::bus::{Event, EventHandler, Eventqueue, Payload};
use crate::components::{Catalog, Service};
use crate::domain::{ComponentId, Result, RuntimeError};
use crate::input::{Environment, PollOutcome};
use crate::ui::{Color, Surface};
use crate::BootConfig;
use serde_json::json;
use std::time::Duration;

/// Tag of the per-tick event carrying the measured frame rate.
pub const NEW_FRAME: &str = "new frame";
/// Tag of the first event the orchestrator's queue ever holds.
pub const BOOT: &str = "boot";
/// Tag reporting a start/stop request for an unregistered component.
pub const LOOKUP_FAILED: &str = "lookup failed";
/// Tag reporting a service whose `start` failed.
pub const SERVICE_FAILED: &str = "service failed";
/// Name of the built-in overlay that shows notifications.
pub const NOTIFICATION_OVERLAY: &str = "notification";
/// Tag under which notification messages are forwarded to the overlay.
pub const NOTIFICATION: &str = "notification";

/// How a tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick ran to completion.
    Continue,
    /// The loop is dormant; the tick was skipped.
    Dormant,
    /// Input or a `main exit` event asked the loop to stop.
    Exit,
}

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Target ticks per second; `0` runs unpaced.
    pub tick_rate: u32,
    /// How long a dormant tick idles.
    pub dormant_idle: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate: 15,
            dormant_idle: Duration::from_millis(300),
        }
    }
}

/// The top-level event handler and owner of the loop state.
pub struct Orchestrator<S: Surface> {
    queue: Eventqueue,
    catalog: Catalog,
    state: RuntimeState,
    environment: Environment,
    surface: S,
    clock: TickClock,
    settings: RuntimeSettings,
    ticks: u64,
}

impl<S: Surface> Orchestrator<S> {
    /// Creates the orchestrator with its queue holding a single `boot` event.
    ///
    /// Nothing is started yet; see [`Orchestrator::boot`].
    #[must_use]
    pub fn new(catalog: Catalog, environment: Environment, surface: S, settings: RuntimeSettings) -> Self {
        let mut state = RuntimeState::default();
        state.set_variable("apps", catalog.app_names());
        state.set_variable("overlays", catalog.overlay_names());
        state.set_variable("services", catalog.service_names());
        state.set_variable("bt_connected", false);
        state.set_variable("fps", 0);

        let mut queue = Eventqueue::new(ComponentId::main());
        queue.emit(BOOT, Payload::Null);

        Self {
            queue,
            catalog,
            state,
            environment,
            surface,
            clock: TickClock::new(settings.tick_rate),
            settings,
            ticks: 0,
        }
    }

    /// Starts the boot app, then the boot overlays in order, then the boot services.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] if any boot component is not registered.
    pub fn boot(&mut self, boot: &BootConfig) -> Result<()> {
        tracing::info!(app = %boot.app, overlays = ?boot.overlays, services = ?boot.services, "booting");
        self.start_app(&boot.app)?;
        for overlay in &boot.overlays {
            self.start_overlay(overlay)?;
        }
        for service in &boot.services {
            self.start_service(service)?;
        }
        Ok(())
    }

    /// Loop state.
    #[must_use]
    pub const fn state(&self) -> &RuntimeState {
        &self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// The orchestrator's own queue.
    #[must_use]
    pub const fn queue(&self) -> &Eventqueue {
        &self.queue
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Enqueues an event on the orchestrator's queue for the next tick.
    pub fn post(&mut self, event: impl Into<Event>) {
        self.queue.push(event);
    }

    /// Runs ticks until exit, or until `max_ticks` have run, then shuts down.
    ///
    /// Returns the number of ticks run.
    pub fn run(&mut self, max_ticks: Option<u64>) -> u64 {
        let start = self.ticks;
        loop {
            if max_ticks.is_some_and(|max| self.ticks - start >= max) {
                tracing::info!(ticks = self.ticks, "tick limit reached");
                break;
            }
            if self.tick() == TickOutcome::Exit {
                break;
            }
        }
        self.shutdown();
        self.ticks - start
    }

    /// Runs one iteration of the loop.
    pub fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        let span = tracing::debug_span!("tick", n = self.ticks);
        let _guard = span.enter();

        self.import_component_queues();

        self.queue.emit(NEW_FRAME, self.clock.fps());

        if self.queue.poll_environment(&mut self.environment) == PollOutcome::Quit {
            return TickOutcome::Exit;
        }

        let reserved = self.queue.partition(Event::is_reserved);

        let toggle = reserved.iter().any(|event| event.tag() == system::SLEEP);
        if self.state.power.gate(toggle) == Gate::Skip {
            self.queue.clear();
            std::thread::sleep(self.settings.dormant_idle);
            self.surface.fill(Color::BLACK);
            self.surface.present();
            return TickOutcome::Dormant;
        }

        self.broadcast();

        for event in &reserved {
            match SystemEvent::from_event(event) {
                Ok(request) => {
                    if self.apply(request, event.source()) == TickOutcome::Exit {
                        return TickOutcome::Exit;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "dropping reserved event"),
            }
        }

        self.clock.tick();
        self.state.set_variable("fps", self.clock.fps());

        self.render();
        TickOutcome::Continue
    }

    /// Stops every running service. Services without a `stop` are just removed.
    pub fn shutdown(&mut self) {
        for name in std::mem::take(&mut self.state.running_services) {
            if let Ok(service) = self.catalog.service_mut(&name) {
                stop_service(&mut **service);
            }
        }
        tracing::info!(ticks = self.ticks, "runtime shut down");
    }

    /// Makes `name` the current app, starting it on first activation.
    ///
    /// Emits `closed app <previous>`, then `started app <name>` or
    /// `resumed app <name>`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered app, or the app's own
    /// start error.
    pub fn start_app(&mut self, name: &str) -> Result<()> {
        let viewport = self.surface.viewport();
        let app = self.catalog.app_mut(name)?;
        let resumed = app.is_started();
        if !resumed {
            app.start(viewport)?;
        }

        if let Some(previous) = self.state.current_app.replace(name.to_string()) {
            self.queue.emit(format!("closed app {previous}"), Payload::Null);
        }
        if resumed {
            self.queue.emit(format!("resumed app {name}"), Payload::Null);
            tracing::info!(app = %name, "resumed app");
        } else {
            self.queue.emit(format!("started app {name}"), Payload::Null);
            tracing::info!(app = %name, "started app");
        }
        Ok(())
    }

    /// Adds a service to the running set, calling its `start`.
    ///
    /// A service without a `start` still joins the set. Any other start error
    /// keeps it out and is reported as a `service failed` event.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered service.
    pub fn start_service(&mut self, name: &str) -> Result<()> {
        let service = self.catalog.service_mut(name)?;
        if self.state.is_service_running(name) {
            tracing::debug!(service = %name, "service already running");
            return Ok(());
        }

        match service.start() {
            Ok(()) => {}
            Err(e) if e.is_not_implemented() => {
                tracing::trace!(service = %name, "service has no start hook");
            }
            Err(e) => {
                tracing::warn!(service = %name, error = %e, "service failed to start");
                self.queue
                    .emit(SERVICE_FAILED, json!({ "name": name, "error": e.to_string() }));
                return Ok(());
            }
        }

        self.state.running_services.push(name.to_string());
        self.queue.emit(format!("started service {name}"), Payload::Null);
        tracing::info!(service = %name, "started service");
        Ok(())
    }

    /// Removes a service from the running set, calling its `stop`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered service.
    pub fn close_service(&mut self, name: &str) -> Result<()> {
        let service = self.catalog.service_mut(name)?;
        let Some(index) = self.state.running_services.iter().position(|s| s == name) else {
            tracing::debug!(service = %name, "service not running");
            return Ok(());
        };

        stop_service(&mut **service);
        self.state.running_services.remove(index);
        self.queue.emit(format!("closed service {name}"), Payload::Null);
        tracing::info!(service = %name, "closed service");
        Ok(())
    }

    /// Binds an overlay and appends it to the running sequence.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered overlay, or the overlay's
    /// own start error.
    pub fn start_overlay(&mut self, name: &str) -> Result<()> {
        let viewport = self.surface.viewport();
        let overlay = self.catalog.overlay_mut(name)?;
        if self.state.is_overlay_running(name) {
            tracing::debug!(overlay = %name, "overlay already running");
            return Ok(());
        }

        overlay.start(viewport)?;
        self.state.running_overlays.push(name.to_string());
        self.queue.emit(format!("started overlay {name}"), Payload::Null);
        tracing::info!(overlay = %name, "started overlay");
        Ok(())
    }

    /// Removes an overlay from the running sequence.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered overlay.
    pub fn close_overlay(&mut self, name: &str) -> Result<()> {
        self.catalog.overlay_mut(name)?;
        let Some(index) = self.state.running_overlays.iter().position(|o| o == name) else {
            tracing::debug!(overlay = %name, "overlay not running");
            return Ok(());
        };

        self.state.running_overlays.remove(index);
        self.queue.emit(format!("closed overlay {name}"), Payload::Null);
        tracing::info!(overlay = %name, "closed overlay");
        Ok(())
    }

    fn apply(&mut self, request: SystemEvent, source: Option<&ComponentId>) -> TickOutcome {
        tracing::debug!(tag = request.tag(), source = ?source, "applying");
        let result = match request {
            SystemEvent::StartApp(name) => self.start_app(&name),
            SystemEvent::StartService(name) => self.start_service(&name),
            SystemEvent::CloseService(name) => self.close_service(&name),
            SystemEvent::StartOverlay(name) => self.start_overlay(&name),
            SystemEvent::CloseOverlay(name) => self.close_overlay(&name),
            SystemEvent::Notification(message) => self.notify(message),
            SystemEvent::GetVariable(key) => {
                let value = self.state.variable(&key);
                let reply = Event::new(system::VARIABLE_RETURN).with_payload(json!([key, value]));
                self.queue.push(match source {
                    Some(requester) => reply.to(requester.clone()),
                    None => reply,
                });
                Ok(())
            }
            SystemEvent::SetVariable(key, value) => {
                tracing::debug!(key = %key, "variable set");
                self.state.set_variable(key, value);
                Ok(())
            }
            SystemEvent::Sleep => Ok(()),
            SystemEvent::Exit => {
                tracing::info!("exit requested");
                return TickOutcome::Exit;
            }
        };

        if let Err(e) = result {
            self.report(&e, source);
        }
        TickOutcome::Continue
    }

    fn notify(&mut self, message: Payload) -> Result<()> {
        if !self.state.is_overlay_running(NOTIFICATION_OVERLAY) {
            self.start_overlay(NOTIFICATION_OVERLAY)?;
        }
        self.queue.emit(NOTIFICATION, message);
        Ok(())
    }

    fn report(&mut self, error: &RuntimeError, requester: Option<&ComponentId>) {
        tracing::warn!(error = %error, requester = ?requester, "request failed");
        if let RuntimeError::NotFound { kind, name } = error {
            let event = Event::new(LOOKUP_FAILED).with_payload(json!({ "kind": kind, "name": name }));
            self.queue.push(match requester {
                Some(requester) if requester != &ComponentId::main() => event.to(requester.clone()),
                _ => event,
            });
        }
    }

    fn import_component_queues(&mut self) {
        let running = self.catalog.running_mut(
            self.state.current_app.as_deref(),
            &self.state.running_services,
            &self.state.running_overlays,
        );

        let mut sources: Vec<&mut Eventqueue> = Vec::new();
        if let Some(app) = running.app {
            sources.push(app.queue_mut());
        }
        for service in running.services {
            sources.push(service.queue_mut());
        }
        for overlay in running.overlays {
            sources.push(overlay.queue_mut());
        }

        let imported = self.queue.import_from(&mut sources, true);
        tracing::trace!(imported, "imported component queues");
    }

    fn broadcast(&mut self) {
        let mut routes = self.catalog.routes(
            self.state.current_app.as_deref(),
            &self.state.running_services,
            &self.state.running_overlays,
        );
        let invoked = self.queue.route(&mut routes, true);
        tracing::trace!(invoked, "broadcast complete");
    }

    fn render(&mut self) {
        let app = self
            .state
            .current_app
            .as_deref()
            .and_then(|name| self.catalog.app(name));

        self.surface.fill(app.map_or(Color::BLACK, |app| app.background()));
        if let Some(app) = app {
            app.draw(&mut self.surface);
        }
        for name in &self.state.running_overlays {
            if let Some(overlay) = self.catalog.overlay(name) {
                overlay.draw(&mut self.surface);
            }
        }
        self.surface.present();
    }
}

fn stop_service(service: &mut dyn Service) {
    match service.stop() {
        Ok(()) => {}
        Err(e) if e.is_not_implemented() => {
            tracing::trace!(service = %service.name(), "service has no stop hook");
        }
        Err(e) => tracing::warn!(service = %service.name(), error = %e, "service failed to stop"),
    }
}

impl<S: Surface> std::fmt::Debug for Orchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("ticks", &self.ticks)
            .field("state", &self.state)
            .field("catalog", &self.catalog)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}
