//! Apps, their activities, and overlays.
//!
//! An [`App`] owns a set of named [`Activity`] pages and shows one of them at a
//! time. An overlay is the same structure, drawn on top of the current app
//! instead of replacing it, so [`Overlay`] is an alias built with
//! [`App::new_overlay`].
//!
//! # Listener composition
//!
//! An app's effective handlers for a tag are its own handlers followed by the
//! current activity's handlers for the same tag. Composition is one level deep:
//! activities do not compose further children.
//!
//! ```text
//! App "Home"       on("time")  ─┐
//!                               ├─► deliver("time") runs App handler, then Activity handler
//! Activity "main"  on("time")  ─┘
//! ```
//!
//! # Switching activities
//!
//! Handlers only see their app's outbox. To change page, a handler enqueues a
//! [`SET_ACTIVITY`] event naming the target activity; the app takes it back
//! out of its own queue right after dispatch and switches. The request never
//! reaches the orchestrator.
//!
//! ```
//! use tickbus::components::{Activity, App, SET_ACTIVITY};
//! use tickbus::bus::{Event, EventHandler, EventListener};
//! use tickbus::ui::Viewport;
//!
//! let mut app = App::new("Settings").with_activity(Activity::new("about"));
//! app.on("open about", |_, outbox| outbox.emit(SET_ACTIVITY, "about"));
//! app.start(Viewport::default()).unwrap();
//!
//! app.deliver(&Event::new("open about"));
//! assert_eq!(app.current_activity().map(Activity::name), Some("about"));
//! assert!(app.queue().is_empty());
//! ```

use crate::bus::{Event, EventHandler, EventListener, Eventqueue, HandlerCore, Listeners};
use crate::domain::{ComponentId, Result, RuntimeError};
use crate::ui::{Color, Drawable, Surface, Viewport};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Name of the activity an app shows when it starts.
pub const MAIN_ACTIVITY: &str = "main";
/// App-local request to show another activity; payload is the activity name.
pub const SET_ACTIVITY: &str = "set activity";

/// One page of an app: drawable objects plus its own event handlers.
///
/// Later objects are drawn over earlier ones.
pub struct Activity {
    name: String,
    listeners: Listeners,
    objects: Vec<Box<dyn Drawable>>,
}

impl Activity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Listeners::new(),
            objects: Vec::new(),
        }
    }

    /// Appends a drawable object.
    pub fn add(&mut self, object: impl Drawable + 'static) -> &mut Self {
        self.objects.push(Box::new(object));
        self
    }

    /// Builder form of [`Activity::add`].
    #[must_use]
    pub fn with(mut self, object: impl Drawable + 'static) -> Self {
        self.add(object);
        self
    }

    /// Removes every drawable object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of drawable objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Lays out every object against the viewport.
    pub fn setup(&mut self, viewport: Viewport) {
        for object in &mut self.objects {
            object.setup(viewport);
        }
    }

    /// Draws the visible objects in order.
    pub fn draw(&self, surface: &mut dyn Surface) {
        for object in self.objects.iter().filter(|object| object.visible()) {
            object.draw(surface);
        }
    }
}

impl EventListener for Activity {
    fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("name", &self.name)
            .field("listeners", &self.listeners)
            .field("objects", &self.objects.len())
            .finish()
    }
}

type StartHook = Box<dyn FnOnce(&mut Eventqueue)>;

/// A screen-filling application.
///
/// Apps are constructed once, at process start. The first activation binds the
/// app to the render surface, shows its main activity and runs the one-time
/// start hook; later activations only resume it.
pub struct App {
    core: HandlerCore,
    activities: HashMap<String, Activity>,
    current: Option<String>,
    started: bool,
    background: Color,
    viewport: Option<Viewport>,
    on_start: Option<StartHook>,
}

/// An overlay is an app that is drawn additively on top of the current app.
pub type Overlay = App;

impl App {
    /// Creates an app with an empty main activity and a black background.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ComponentId::app(name))
    }

    /// Creates an overlay with an empty main activity.
    #[must_use]
    pub fn new_overlay(name: impl Into<String>) -> Overlay {
        Self::with_id(ComponentId::overlay(name))
    }

    fn with_id(id: ComponentId) -> Self {
        let mut activities = HashMap::new();
        activities.insert(MAIN_ACTIVITY.to_string(), Activity::new(MAIN_ACTIVITY));
        Self {
            core: HandlerCore::new(id),
            activities,
            current: None,
            started: false,
            background: Color::BLACK,
            viewport: None,
            on_start: None,
        }
    }

    #[must_use]
    pub const fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Builder form of [`App::add`].
    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.add(activity);
        self
    }

    /// Adds an activity, replacing any activity with the same name.
    pub fn add(&mut self, activity: Activity) {
        self.activities.insert(activity.name.clone(), activity);
    }

    /// Sets the hook run exactly once, on the first start.
    ///
    /// The hook receives the app's own queue, so it can announce itself or
    /// request variables.
    pub fn on_start<F>(&mut self, hook: F)
    where
        F: FnOnce(&mut Eventqueue) + 'static,
    {
        self.on_start = Some(Box::new(hook));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.id().name
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// The viewport bound by the first start.
    #[must_use]
    pub const fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn activity(&self, name: &str) -> Option<&Activity> {
        self.activities.get(name)
    }

    #[must_use]
    pub fn activity_mut(&mut self, name: &str) -> Option<&mut Activity> {
        self.activities.get_mut(name)
    }

    /// The always-present main activity.
    pub fn main_activity_mut(&mut self) -> &mut Activity {
        self.activities
            .entry(MAIN_ACTIVITY.to_string())
            .or_insert_with(|| Activity::new(MAIN_ACTIVITY))
    }

    /// The activity currently shown, if the app has been started.
    #[must_use]
    pub fn current_activity(&self) -> Option<&Activity> {
        self.current.as_ref().and_then(|name| self.activities.get(name))
    }

    /// Binds the app to a surface of the given size and shows the main activity.
    ///
    /// Only the first call does any work; the caller decides between "started"
    /// and "resumed" by checking [`App::is_started`] first.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::UnknownActivity`] if the main activity was removed.
    pub fn start(&mut self, viewport: Viewport) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.viewport = Some(viewport);
        self.set_activity(MAIN_ACTIVITY)?;
        if let Some(hook) = self.on_start.take() {
            hook(self.core.queue_mut());
        }
        self.apply_activity_requests();
        self.started = true;
        tracing::debug!(component = %self.core.id(), "bound to surface");
        Ok(())
    }

    /// Switches the shown activity and lays it out against the bound viewport.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::UnknownActivity`] if no activity has that name.
    pub fn set_activity(&mut self, name: &str) -> Result<()> {
        let Some(activity) = self.activities.get_mut(name) else {
            return Err(RuntimeError::UnknownActivity {
                app: self.core.id().name.clone(),
                activity: name.to_string(),
            });
        };
        if let Some(viewport) = self.viewport {
            activity.setup(viewport);
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Applies and removes every [`SET_ACTIVITY`] request in the own queue.
    fn apply_activity_requests(&mut self) {
        let requests = self
            .core
            .queue_mut()
            .partition(|event| event.tag() == SET_ACTIVITY);
        for request in requests {
            let Some(name) = request.payload().as_str() else {
                tracing::warn!(component = %self.core.id(), "activity request without a name");
                continue;
            };
            match self.set_activity(name) {
                Ok(()) => tracing::debug!(component = %self.core.id(), activity = %name, "switched activity"),
                Err(e) => tracing::warn!(error = %e, "activity switch failed"),
            }
        }
    }

    /// Draws the current activity; nothing before the first start.
    pub fn draw(&self, surface: &mut dyn Surface) {
        if let Some(activity) = self.current_activity() {
            activity.draw(surface);
        }
    }
}

impl EventListener for App {
    fn listeners(&self) -> &Listeners {
        self.core.listeners()
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        self.core.listeners_mut()
    }

    fn effective_listeners(&self) -> BTreeMap<&str, usize> {
        let mut merged = self.core.listeners().counts();
        if let Some(activity) = self.current_activity() {
            for (tag, count) in activity.listeners.counts() {
                *merged.entry(tag).or_default() += count;
            }
        }
        merged
    }

    fn listens_to(&self, tag: &str) -> bool {
        self.core.listeners().contains(tag)
            || self
                .current_activity()
                .is_some_and(|activity| activity.listeners.contains(tag))
    }
}

impl EventHandler for App {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn deliver(&mut self, event: &Event) -> usize {
        let (listeners, queue) = self.core.parts_mut();
        let mut ran = listeners.dispatch(event, queue);
        if let Some(activity) = self
            .current
            .as_ref()
            .and_then(|name| self.activities.get_mut(name))
        {
            ran += activity.listeners.dispatch(event, queue);
        }
        self.apply_activity_requests();
        ran
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", self.core.id())
            .field("current", &self.current)
            .field("started", &self.started)
            .field("activities", &self.activities.len())
            .finish_non_exhaustive()
    }
}
