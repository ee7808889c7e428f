//! Shared fixtures: a module whose components record every delivery.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tickbus::bus::system::VARIABLE_RETURN;
use tickbus::components::HandlerService;
use tickbus::input::{Bindings, Environment, InputSignal, ScriptedInput};
use tickbus::runtime::LOOKUP_FAILED;
use tickbus::ui::HeadlessSurface;
use tickbus::{
    App, BootConfig, Catalog, ComponentModule, EventListener, Orchestrator, Overlay, RuntimeSettings, Service,
    SystemEvent,
};

pub type Log = Rc<RefCell<Vec<String>>>;

pub const PROBE_APP: &str = "probe";
pub const OTHER_APP: &str = "other";
pub const RECORDER: &str = "recorder";
pub const BADGE: &str = "badge";

/// Contributes `probe` and `other` apps, the `recorder` service and the `badge` overlay.
pub struct ProbeModule {
    pub log: Log,
}

impl ProbeModule {
    pub fn new() -> (Self, Log) {
        let log = Log::default();
        (Self { log: Rc::clone(&log) }, log)
    }
}

fn record(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

impl ComponentModule for ProbeModule {
    fn name(&self) -> &str {
        "probe"
    }

    fn define_services(&self) -> Vec<Box<dyn Service>> {
        let mut service = HandlerService::new(RECORDER);
        for tag in ["ping", "pong", VARIABLE_RETURN] {
            let log = Rc::clone(&self.log);
            service.on(tag, move |event, _| record(&log, format!("service:{}", event.tag())));
        }
        vec![Box::new(service)]
    }

    fn define_app(&self) -> Option<App> {
        let mut app = App::new(PROBE_APP);

        let log = Rc::clone(&self.log);
        app.on("ping", move |_, outbox| {
            record(&log, "app:ping");
            outbox.emit("pong", serde_json::Value::Null);
        });

        app.on("ask", |event, outbox| {
            let key = event.payload().as_str().unwrap_or("fps").to_string();
            outbox.push(SystemEvent::GetVariable(key));
        });
        app.on("store", |event, outbox| {
            outbox.push(SystemEvent::SetVariable("volume".to_string(), event.payload().clone()));
        });
        app.on("bad", |_, outbox| outbox.push(SystemEvent::StartApp("nope".to_string())));
        app.on("quit now", |_, outbox| outbox.push(SystemEvent::Exit));

        let log = Rc::clone(&self.log);
        app.on(VARIABLE_RETURN, move |event, _| {
            record(&log, format!("app:variable return:{}", event.payload()));
        });

        let log = Rc::clone(&self.log);
        app.on(LOOKUP_FAILED, move |event, _| {
            let name = event.payload()["name"].as_str().unwrap_or_default().to_string();
            record(&log, format!("app:lookup failed:{name}"));
        });

        let log = Rc::clone(&self.log);
        app.on("key down", move |event, _| {
            record(&log, format!("app:key:{}", event.payload().as_str().unwrap_or_default()));
        });

        Some(app)
    }

    fn define_overlay(&self) -> Option<Overlay> {
        let mut overlay = Overlay::new_overlay(BADGE);
        let log = Rc::clone(&self.log);
        overlay.on("ping", move |_, _| record(&log, "overlay:ping"));
        Some(overlay)
    }
}

/// Contributes a second app only; lets a catalog hold two apps from one module list.
pub struct OtherAppModule;

impl ComponentModule for OtherAppModule {
    fn name(&self) -> &str {
        OTHER_APP
    }

    fn define_app(&self) -> Option<App> {
        Some(App::new(OTHER_APP))
    }
}

pub fn unpaced() -> RuntimeSettings {
    RuntimeSettings {
        tick_rate: 0,
        dormant_idle: Duration::ZERO,
    }
}

pub fn boot_probe() -> BootConfig {
    BootConfig {
        app: PROBE_APP.to_string(),
        overlays: vec![BADGE.to_string()],
        services: vec![RECORDER.to_string()],
    }
}

/// A booted orchestrator over the given modules, fed by scripted input and a frozen clock.
pub fn runtime_with(
    modules: Vec<Box<dyn ComponentModule>>,
    boot: &BootConfig,
    input: Vec<Vec<InputSignal>>,
) -> Orchestrator<HeadlessSurface> {
    let environment = Environment::new(Bindings::default())
        .with_source(ScriptedInput::new(input))
        .with_clock(|| 1_700_000_000);
    let mut runtime = Orchestrator::new(
        Catalog::from_modules(&modules),
        environment,
        HeadlessSurface::default(),
        unpaced(),
    );
    runtime.boot(boot).unwrap();
    runtime
}

/// The probe runtime, already past its first tick, with the log cleared.
pub fn probe_runtime() -> (Orchestrator<HeadlessSurface>, Log) {
    let (module, log) = ProbeModule::new();
    let mut runtime = runtime_with(vec![Box::new(module), Box::new(OtherAppModule)], &boot_probe(), vec![]);
    runtime.tick();
    log.borrow_mut().clear();
    (runtime, log)
}

pub fn queued_tags(runtime: &Orchestrator<HeadlessSurface>) -> Vec<String> {
    runtime.queue().events().iter().map(|e| e.tag().to_string()).collect()
}
