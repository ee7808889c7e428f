//! Bluetooth device discovery: a service with a worker thread, and an app to drive it.
//!
//! ```text
//! bluetooth app ── "bl discover" ──► bluetooth service ──post──► discovery worker
//!       ▲                                                              │
//!       └──────────── "bl devices discovered" ◄── service queue ◄──────┘
//! ```
//!
//! The radio itself sits behind [`Scanner`]. Scans block, so they run on the
//! service's [`Worker`]; a failed scan reaches the app as a
//! `"bluetooth discovery failed"` event.

use super::pointer;
use crate::bus::{EventHandler, EventListener, HandlerCore, Listeners, Payload, QueueHandle, SystemEvent};
use crate::components::{App, ComponentModule, Service};
use crate::domain::{ComponentId, Result};
use crate::input::MOUSE_DOWN;
use crate::ui::{Anchor, Color, Label, Point, TextCell};
use crate::worker::{failure_tag, Job, Mailbox, Worker};

/// Name of the discovery service.
pub const BLUETOOTH_SERVICE: &str = "bluetooth service";
/// Name of the discovery app.
pub const BLUETOOTH_APP: &str = "bluetooth app";
/// Name of the discovery worker thread.
pub const DISCOVERY_WORKER: &str = "bluetooth discovery";
/// Request a scan.
pub const DISCOVER: &str = "bl discover";
/// Scan result; payload is the list of device names.
pub const DISCOVERED: &str = "bl devices discovered";

const BUTTON_HEIGHT: i64 = 40;
const LIST_ROWS: usize = 6;

/// A blocking device scan.
pub trait Scanner: Clone + Send + 'static {
    /// Scans for nearby devices and returns their names.
    ///
    /// # Errors
    ///
    /// Any radio failure; it is reported on the bus, not propagated.
    fn discover(&mut self) -> Result<Vec<String>>;
}

/// A scanner that always finds the same devices.
#[derive(Debug, Clone)]
pub struct FixedScanner {
    devices: Vec<String>,
}

impl FixedScanner {
    #[must_use]
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for FixedScanner {
    fn default() -> Self {
        Self::new(["Moto X Play"])
    }
}

impl Scanner for FixedScanner {
    fn discover(&mut self) -> Result<Vec<String>> {
        Ok(self.devices.clone())
    }
}

struct Discovery<S> {
    scanner: S,
}

impl<S: Scanner> Job for Discovery<S> {
    type Message = ();

    fn name(&self) -> &str {
        DISCOVERY_WORKER
    }

    fn handle(&mut self, (): (), out: &QueueHandle) -> Result<()> {
        let devices = self.scanner.discover()?;
        tracing::debug!(devices = devices.len(), "discovery finished");
        out.emit(DISCOVERED, devices);
        Ok(())
    }
}

/// Runs scans on a worker while it is running.
pub struct BluetoothService<S: Scanner> {
    core: HandlerCore,
    scanner: S,
    mailbox: Mailbox<()>,
    worker: Option<Worker<()>>,
}

impl<S: Scanner> BluetoothService<S> {
    #[must_use]
    pub fn new(scanner: S) -> Self {
        let mut core = HandlerCore::new(ComponentId::service(BLUETOOTH_SERVICE));
        let mailbox = Mailbox::new();

        core.on(crate::runtime::BOOT, |_, outbox| {
            outbox.push(SystemEvent::SetVariable("bt_connected".to_string(), Payload::Bool(false)));
        });

        let inbox = mailbox.clone();
        core.on(DISCOVER, move |_, outbox| {
            if let Err(e) = inbox.post(()) {
                tracing::warn!(error = %e, "discovery request not delivered");
                outbox.emit(failure_tag(DISCOVERY_WORKER), e.to_string());
            }
        });

        Self {
            core,
            scanner,
            mailbox,
            worker: None,
        }
    }

    /// Whether the discovery worker is running.
    #[must_use]
    pub const fn is_scanning_enabled(&self) -> bool {
        self.worker.is_some()
    }
}

impl<S: Scanner> EventListener for BluetoothService<S> {
    fn listeners(&self) -> &Listeners {
        self.core.listeners()
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        self.core.listeners_mut()
    }
}

impl<S: Scanner> EventHandler for BluetoothService<S> {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }
}

impl<S: Scanner> Service for BluetoothService<S> {
    fn start(&mut self) -> Result<()> {
        if self.worker.is_none() {
            let job = Discovery {
                scanner: self.scanner.clone(),
            };
            self.worker = Some(Worker::spawn(job, &self.mailbox, self.core.queue().handle())?);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        Ok(())
    }
}

/// Contributes the bluetooth service and its app.
#[derive(Debug, Clone, Default)]
pub struct BluetoothModule<S: Scanner = FixedScanner> {
    scanner: S,
}

impl<S: Scanner> BluetoothModule<S> {
    #[must_use]
    pub const fn new(scanner: S) -> Self {
        Self { scanner }
    }
}

impl<S: Scanner> ComponentModule for BluetoothModule<S> {
    fn name(&self) -> &str {
        "bluetooth"
    }

    fn define_services(&self) -> Vec<Box<dyn Service>> {
        vec![Box::new(BluetoothService::new(self.scanner.clone()))]
    }

    fn define_app(&self) -> Option<App> {
        Some(bluetooth_app())
    }
}

fn bluetooth_app() -> App {
    let mut app = App::new(BLUETOOTH_APP);
    let main = app.main_activity_mut();
    main.add(Label::new("Discover Devices", Anchor::MidTop, Point::new(0, 10)));

    let mut rows: Vec<TextCell> = Vec::with_capacity(LIST_ROWS);
    for row in 0..LIST_ROWS {
        let y = 45 + 20 * i32::try_from(row).unwrap_or(0);
        let label = Label::new("", Anchor::TopLeft, Point::new(16, y)).with_color(Color::GREY);
        rows.push(label.text_cell());
        main.add(label);
    }
    *rows[0].borrow_mut() = "No Discovered Devices".to_string();

    app.on(MOUSE_DOWN, |event, outbox| {
        if pointer(event.payload()).is_some_and(|(_, y)| y < BUTTON_HEIGHT) {
            tracing::debug!("discovery requested");
            outbox.emit(DISCOVER, Payload::Null);
        }
    });

    let listed = rows.clone();
    app.on(DISCOVERED, move |event, _| {
        let devices: Vec<&str> = event
            .payload()
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Payload::as_str)
            .collect();
        for (row, text) in listed.iter().enumerate() {
            *text.borrow_mut() = devices.get(row).map_or_else(String::new, |name| (*name).to_string());
        }
        if devices.is_empty() {
            *listed[0].borrow_mut() = "No Discovered Devices".to_string();
        }
    });

    let failure = failure_tag(DISCOVERY_WORKER);
    app.on(failure, move |event, _| {
        *rows[0].borrow_mut() = format!("Discovery failed: {}", event.payload().as_str().unwrap_or("unknown"));
    });

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Event;
    use crate::domain::RuntimeError;
    use crate::ui::{HeadlessSurface, Surface, Viewport};
    use serde_json::json;

    #[derive(Clone)]
    struct BrokenRadio;

    impl Scanner for BrokenRadio {
        fn discover(&mut self) -> Result<Vec<String>> {
            Err(RuntimeError::Worker("radio off".to_string()))
        }
    }

    #[test]
    fn discovery_round_trip_through_the_worker() {
        let mut service = BluetoothService::new(FixedScanner::new(["watch", "phone"]));
        service.start().unwrap();
        assert!(service.is_scanning_enabled());

        service.deliver(&Event::new(DISCOVER));
        service.stop().unwrap();

        let pending = service.queue().events();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tag(), DISCOVERED);
        assert_eq!(pending[0].payload(), &json!(["watch", "phone"]));
    }

    #[test]
    fn scan_failure_is_an_event() {
        let mut service = BluetoothService::new(BrokenRadio);
        service.start().unwrap();
        service.deliver(&Event::new(DISCOVER));
        service.stop().unwrap();

        let pending = service.queue().events();
        assert_eq!(pending[0].tag(), "bluetooth discovery failed");
    }

    #[test]
    fn request_while_stopped_is_reported() {
        let mut service = BluetoothService::new(FixedScanner::default());
        service.deliver(&Event::new(DISCOVER));
        assert!(service.queue().contains_tag("bluetooth discovery failed"));
    }

    #[test]
    fn app_lists_discovered_devices() {
        let mut app = bluetooth_app();
        app.start(Viewport::default()).unwrap();

        app.deliver(&Event::new(MOUSE_DOWN).with_payload(json!([160, 20])));
        assert!(app.queue().contains_tag(DISCOVER));

        app.deliver(&Event::new(DISCOVERED).with_payload(json!(["Moto X Play"])));
        let mut surface = HeadlessSurface::default();
        app.draw(&mut surface);
        surface.present();
        assert_eq!(surface.last_texts(), vec!["Discover Devices", "Moto X Play"]);
    }
}
