//! Whole-loop scenarios: routing, import, sleep, variables, lifecycle and exit.

mod common;

use common::{
    boot_probe, probe_runtime, queued_tags, runtime_with, Log, OtherAppModule, ProbeModule, BADGE, OTHER_APP,
    PROBE_APP, RECORDER,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tickbus::builtin::NotificationModule;
use tickbus::bus::{HandlerCore, Listeners};
use tickbus::components::SET_ACTIVITY;
use tickbus::domain::ComponentId;
use tickbus::input::InputSignal;
use tickbus::runtime::{PowerState, NOTIFICATION_OVERLAY, SERVICE_FAILED};
use tickbus::ui::{Color, DrawOp, Viewport};
use tickbus::{
    Activity, App, BootConfig, ComponentModule, Event, EventHandler, EventListener, Eventqueue, Payload, Result,
    RuntimeError, Service, SystemEvent, TickOutcome,
};

#[test]
fn untargeted_events_reach_app_then_services_then_overlays() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("ping"));

    assert_eq!(runtime.tick(), TickOutcome::Continue);
    assert_eq!(*log.borrow(), vec!["app:ping", "service:ping", "overlay:ping"]);
}

#[test]
fn targeted_events_reach_only_their_receiver() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("ping").to(ComponentId::service(RECORDER)));
    runtime.post(Event::new("ping").to(ComponentId::overlay("not running")));
    runtime.tick();

    assert_eq!(*log.borrow(), vec!["service:ping"]);
}

#[test]
fn targeted_events_reach_stopped_components() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(SystemEvent::CloseService(RECORDER.to_string()));
    runtime.tick();
    assert!(!runtime.state().is_service_running(RECORDER));

    runtime.post(Event::new("ping").to(ComponentId::service(RECORDER)));
    runtime.tick();
    assert_eq!(*log.borrow(), vec!["service:ping"]);
}

#[test]
fn variable_reply_reaches_an_app_switched_away_in_the_same_tick() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("ask"));
    runtime.tick();

    runtime.post(SystemEvent::StartApp(OTHER_APP.to_string()));
    runtime.tick();
    assert_eq!(runtime.state().current_app(), Some(OTHER_APP));

    runtime.tick();
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("app:variable return:[\"fps\","));
}

#[test]
fn component_queues_are_drained_into_the_next_tick() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("ping"));
    runtime.tick();

    let app = runtime.catalog().app(PROBE_APP).unwrap();
    assert!(app.queue().contains_tag("pong"));

    runtime.tick();
    let app = runtime.catalog().app(PROBE_APP).unwrap();
    assert!(app.queue().is_empty());
    assert!(log.borrow().contains(&"service:pong".to_string()));
}

#[test]
fn sleep_toggles_and_discards_while_dormant() {
    let (mut runtime, log) = probe_runtime();

    runtime.post(SystemEvent::Sleep);
    runtime.post(Event::new("ping"));
    assert_eq!(runtime.tick(), TickOutcome::Continue);
    assert_eq!(runtime.state().power(), PowerState::Dormant);
    assert_eq!(log.borrow().len(), 3);

    runtime.post(Event::new("ping"));
    assert_eq!(runtime.tick(), TickOutcome::Dormant);
    assert_eq!(runtime.surface().last_frame(), [DrawOp::Fill(Color::BLACK)]);
    assert!(runtime.queue().is_empty());

    runtime.post(SystemEvent::Sleep);
    assert_eq!(runtime.tick(), TickOutcome::Continue);
    assert_eq!(runtime.state().power(), PowerState::Awake);
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn sleep_binding_from_input() {
    let (module, _log) = ProbeModule::new();
    let mut runtime = runtime_with(
        vec![Box::new(module)],
        &boot_probe(),
        vec![vec![InputSignal::Key("q".to_string())], vec![]],
    );

    assert_eq!(runtime.tick(), TickOutcome::Continue);
    assert!(runtime.state().power().is_dormant());
    assert_eq!(runtime.tick(), TickOutcome::Dormant);
}

#[test]
fn variable_requests_are_answered_to_the_requester() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("ask"));
    runtime.tick();
    runtime.tick();
    assert!(runtime
        .queue()
        .events()
        .iter()
        .any(|e| e.target() == Some(&ComponentId::app(PROBE_APP))));

    runtime.tick();
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("app:variable return:[\"fps\","));
}

#[test]
fn variables_can_be_set_and_missing_ones_read_as_null() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("store").with_payload(7));
    runtime.tick();
    runtime.tick();

    assert_eq!(runtime.state().variable("volume"), json!(7));
    assert!(runtime.state().variable("nothing here").is_null());
    assert_eq!(runtime.state().variable("bt_connected"), json!(false));

    runtime.post(Event::new("ask").with_payload("volume"));
    runtime.tick();
    runtime.tick();
    runtime.tick();
    assert_eq!(*log.borrow(), vec![r#"app:variable return:["volume",7]"#]);
}

#[test]
fn starting_apps_reports_start_resume_and_close() {
    let (mut runtime, _log) = probe_runtime();

    runtime.post(SystemEvent::StartApp(OTHER_APP.to_string()));
    runtime.tick();
    assert_eq!(runtime.state().current_app(), Some(OTHER_APP));
    assert_eq!(queued_tags(&runtime)[..2], ["closed app probe", "started app other"]);

    runtime.post(SystemEvent::StartApp(PROBE_APP.to_string()));
    runtime.tick();
    assert_eq!(runtime.state().current_app(), Some(PROBE_APP));
    assert_eq!(queued_tags(&runtime)[..2], ["closed app other", "resumed app probe"]);
}

#[test]
fn unknown_component_is_reported_back_to_the_requester() {
    let (mut runtime, log) = probe_runtime();
    runtime.post(Event::new("bad"));
    runtime.tick();
    runtime.tick();
    runtime.tick();

    assert_eq!(runtime.state().current_app(), Some(PROBE_APP));
    assert_eq!(*log.borrow(), vec!["app:lookup failed:nope"]);
}

#[test]
fn services_and_overlays_open_and_close() {
    let (mut runtime, log) = probe_runtime();

    runtime.post(SystemEvent::CloseOverlay(BADGE.to_string()));
    runtime.post(SystemEvent::CloseService(RECORDER.to_string()));
    runtime.tick();
    assert!(runtime.state().running_overlays().is_empty());
    assert!(runtime.state().running_services().is_empty());
    assert!(queued_tags(&runtime).contains(&"closed service recorder".to_string()));

    runtime.post(Event::new("ping"));
    runtime.tick();
    assert_eq!(*log.borrow(), vec!["app:ping"]);

    runtime.post(SystemEvent::StartService(RECORDER.to_string()));
    runtime.post(SystemEvent::StartService(RECORDER.to_string()));
    runtime.tick();
    assert_eq!(runtime.state().running_services(), [RECORDER]);
}

struct Flaky {
    core: HandlerCore,
}

impl EventListener for Flaky {
    fn listeners(&self) -> &Listeners {
        self.core.listeners()
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        self.core.listeners_mut()
    }
}

impl EventHandler for Flaky {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }
}

impl Service for Flaky {
    fn start(&mut self) -> Result<()> {
        Err(RuntimeError::Worker("no radio".to_string()))
    }
}

struct FlakyModule;

impl ComponentModule for FlakyModule {
    fn name(&self) -> &str {
        "flaky"
    }

    fn define_services(&self) -> Vec<Box<dyn Service>> {
        vec![Box::new(Flaky {
            core: HandlerCore::new(ComponentId::service("flaky")),
        })]
    }
}

#[test]
fn failing_service_start_stays_out_of_the_running_set() {
    let (module, _log) = ProbeModule::new();
    let boot = BootConfig {
        services: vec!["flaky".to_string()],
        ..boot_probe()
    };
    let runtime = runtime_with(vec![Box::new(module), Box::new(FlakyModule)], &boot, vec![]);

    assert!(!runtime.state().is_service_running("flaky"));
    let failure = runtime
        .queue()
        .events()
        .into_iter()
        .find(|e| e.tag() == SERVICE_FAILED)
        .unwrap();
    assert_eq!(failure.payload()["name"], json!("flaky"));
}

#[test]
fn notification_starts_its_overlay_and_closes_it_after_timeout() {
    let (module, _log) = ProbeModule::new();
    let mut runtime = runtime_with(
        vec![Box::new(module), Box::new(NotificationModule { frames: 2 })],
        &boot_probe(),
        vec![],
    );

    runtime.post(SystemEvent::Notification(json!("battery low")));
    runtime.tick();
    assert!(runtime.state().is_overlay_running(NOTIFICATION_OVERLAY));

    runtime.tick();
    assert!(runtime.surface().last_texts().contains(&"battery low"));

    runtime.tick();
    assert!(!runtime.surface().last_texts().contains(&"battery low"));

    runtime.tick();
    assert!(!runtime.state().is_overlay_running(NOTIFICATION_OVERLAY));
}

#[test]
fn unbound_keys_arrive_as_key_down() {
    let (module, log) = ProbeModule::new();
    let mut runtime = runtime_with(
        vec![Box::new(module)],
        &boot_probe(),
        vec![vec![InputSignal::Key("x".to_string())]],
    );
    runtime.tick();
    assert_eq!(*log.borrow(), vec!["app:key:x"]);
}

#[test]
fn exit_request_ends_the_loop() {
    let (mut runtime, _log) = probe_runtime();
    runtime.post(Event::new("quit now"));
    let ticks = runtime.run(Some(10));
    assert_eq!(ticks, 2);
    assert!(runtime.state().running_services().is_empty());
}

#[test]
fn quit_input_ends_the_loop_without_an_event() {
    let (module, _log) = ProbeModule::new();
    let mut runtime = runtime_with(
        vec![Box::new(module), Box::new(OtherAppModule)],
        &boot_probe(),
        vec![vec![], vec![InputSignal::Key("escape".to_string())]],
    );
    assert_eq!(runtime.run(None), 2);
}

#[test]
fn tick_limit_bounds_a_run() {
    let (mut runtime, _log) = probe_runtime();
    assert_eq!(runtime.run(Some(3)), 3);
    assert_eq!(runtime.ticks(), 4);
}

#[test]
fn broadcast_runs_app_handlers_before_current_activity_handlers() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut app = App::new("pages");
    let o = Rc::clone(&order);
    app.on("T", move |_, _| o.borrow_mut().push("app"));
    let o = Rc::clone(&order);
    app.main_activity_mut().on("T", move |_, _| o.borrow_mut().push("activity"));
    app.start(Viewport::default()).unwrap();

    let mut main = Eventqueue::new(ComponentId::main());
    main.emit("T", Payload::Null);
    assert_eq!(main.broadcast(&mut [&mut app], true), 2);
    assert_eq!(*order.borrow(), vec!["app", "activity"]);
}

#[test]
fn broadcast_reaches_a_tag_registered_only_on_the_current_activity() {
    let hits = Rc::new(RefCell::new(0));
    let mut app = App::new("pages").with_activity(Activity::new("second"));
    let h = Rc::clone(&hits);
    app.activity_mut("second")
        .unwrap()
        .on("T", move |_, _| *h.borrow_mut() += 1);
    app.start(Viewport::default()).unwrap();

    let mut main = Eventqueue::new(ComponentId::main());
    main.emit("T", Payload::Null);
    assert!(!app.listens_to("T"));
    assert_eq!(main.broadcast(&mut [&mut app], true), 0);

    app.set_activity("second").unwrap();
    main.emit("T", Payload::Null);
    assert!(app.listens_to("T"));
    assert_eq!(main.broadcast(&mut [&mut app], true), 1);
    assert_eq!(*hits.borrow(), 1);
}

/// A two-page app whose main page flips to the second one on request.
struct PagesModule {
    log: Log,
}

impl ComponentModule for PagesModule {
    fn name(&self) -> &str {
        "pages"
    }

    fn define_app(&self) -> Option<App> {
        let mut app = App::new("pages").with_activity(Activity::new("second"));
        app.main_activity_mut()
            .on("flip", |_, outbox| outbox.emit(SET_ACTIVITY, "second"));
        let log = Rc::clone(&self.log);
        app.activity_mut("second")?
            .on("ping", move |_, _| log.borrow_mut().push("pages:second:ping".to_string()));
        Some(app)
    }
}

#[test]
fn a_handler_switches_its_app_to_another_activity() {
    let (module, log) = ProbeModule::new();
    let pages = PagesModule { log: Rc::clone(&log) };
    let boot = BootConfig {
        app: "pages".to_string(),
        ..boot_probe()
    };
    let mut runtime = runtime_with(vec![Box::new(module), Box::new(pages)], &boot, vec![]);
    runtime.tick();

    runtime.post(Event::new("ping"));
    runtime.tick();
    assert_eq!(*log.borrow(), vec!["service:ping", "overlay:ping"]);

    runtime.post(Event::new("flip"));
    runtime.tick();
    let app = runtime.catalog().app("pages").unwrap();
    assert_eq!(app.current_activity().map(Activity::name), Some("second"));
    assert!(app.queue().is_empty());

    runtime.post(Event::new("ping"));
    runtime.tick();
    assert_eq!(log.borrow()[2..], ["pages:second:ping", "service:ping", "overlay:ping"]);
}
