//! Static component registration.
//!
//! Components are not discovered at runtime. The host hands a list of
//! [`ComponentModule`]s to [`Catalog::from_modules`], which calls each module's
//! factory hooks once and keeps every app, overlay and service by name.
//!
//! The catalog owns the components for the life of the process; the
//! orchestrator's running sets only hold names and borrow from here.
//!
//! [`Routes`] is the catalog as seen by a broadcast: untargeted events fan out
//! over the running components only, while a targeted event reaches any
//! registered component by id, running or not.

use super::app::{App, Overlay};
use super::service::{AsHandler, Service};
use crate::bus::{EventHandler, Receivers};
use crate::domain::{ComponentId, ComponentKind, Result, RuntimeError};
use std::collections::HashMap;
use std::fmt;

/// A bundle of components contributed by one module.
///
/// All hooks are optional; a module may provide any combination.
pub trait ComponentModule {
    /// Module name, for logging.
    fn name(&self) -> &str;

    /// Zero or more background services.
    fn define_services(&self) -> Vec<Box<dyn Service>> {
        Vec::new()
    }

    /// A screen-filling app.
    fn define_app(&self) -> Option<App> {
        None
    }

    /// An overlay drawn over the current app.
    fn define_overlay(&self) -> Option<Overlay> {
        None
    }
}

/// Every registered component, keyed by name.
#[derive(Default)]
pub struct Catalog {
    apps: HashMap<String, App>,
    overlays: HashMap<String, Overlay>,
    services: HashMap<String, Box<dyn Service>>,
}

/// Mutable borrows of the components that are currently running, in running order.
pub struct Running<'a> {
    pub app: Option<&'a mut App>,
    pub services: Vec<&'a mut Box<dyn Service>>,
    pub overlays: Vec<&'a mut Overlay>,
}

/// Broadcast receivers over a catalog and the names that are running.
pub struct Routes<'a> {
    catalog: &'a mut Catalog,
    app: Option<&'a str>,
    services: &'a [String],
    overlays: &'a [String],
}

impl Receivers for Routes<'_> {
    fn fan_out(&mut self) -> Vec<&mut dyn EventHandler> {
        let running = self.catalog.running_mut(self.app, self.services, self.overlays);

        let mut targets: Vec<&mut dyn EventHandler> = Vec::new();
        if let Some(app) = running.app {
            targets.push(app);
        }
        for service in running.services {
            targets.push(service.as_handler_mut());
        }
        for overlay in running.overlays {
            targets.push(overlay);
        }
        targets
    }

    fn resolve(&mut self, id: &ComponentId) -> Option<&mut dyn EventHandler> {
        self.catalog.handler_mut(id)
    }
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the catalog from each module's factory hooks, in module order.
    pub fn from_modules(modules: &[Box<dyn ComponentModule>]) -> Self {
        let mut catalog = Self::new();
        for module in modules {
            tracing::debug!(module = %module.name(), "loading module");
            if let Some(app) = module.define_app() {
                catalog.register_app(app);
            }
            if let Some(overlay) = module.define_overlay() {
                catalog.register_overlay(overlay);
            }
            for service in module.define_services() {
                catalog.register_service(service);
            }
        }
        tracing::info!(
            apps = catalog.apps.len(),
            overlays = catalog.overlays.len(),
            services = catalog.services.len(),
            "components loaded"
        );
        catalog
    }

    /// Registers an app; a later app with the same name replaces the earlier.
    pub fn register_app(&mut self, app: App) {
        let name = app.name().to_string();
        if self.apps.insert(name.clone(), app).is_some() {
            tracing::warn!(app = %name, "app registered twice, keeping the last");
        }
    }

    /// Registers an overlay; a later overlay with the same name replaces the earlier.
    pub fn register_overlay(&mut self, overlay: Overlay) {
        let name = overlay.name().to_string();
        if self.overlays.insert(name.clone(), overlay).is_some() {
            tracing::warn!(overlay = %name, "overlay registered twice, keeping the last");
        }
    }

    /// Registers a service; a later service with the same name replaces the earlier.
    pub fn register_service(&mut self, service: Box<dyn Service>) {
        let name = service.name().to_string();
        if self.services.insert(name.clone(), service).is_some() {
            tracing::warn!(service = %name, "service registered twice, keeping the last");
        }
    }

    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered name.
    pub fn app_mut(&mut self, name: &str) -> Result<&mut App> {
        self.apps.get_mut(name).ok_or_else(|| not_found(ComponentKind::App, name))
    }

    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered name.
    pub fn overlay_mut(&mut self, name: &str) -> Result<&mut Overlay> {
        self.overlays
            .get_mut(name)
            .ok_or_else(|| not_found(ComponentKind::Overlay, name))
    }

    /// # Errors
    ///
    /// [`RuntimeError::NotFound`] for an unregistered name.
    pub fn service_mut(&mut self, name: &str) -> Result<&mut Box<dyn Service>> {
        self.services
            .get_mut(name)
            .ok_or_else(|| not_found(ComponentKind::Service, name))
    }

    #[must_use]
    pub fn app(&self, name: &str) -> Option<&App> {
        self.apps.get(name)
    }

    #[must_use]
    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.get(name)
    }

    #[must_use]
    pub fn has_app(&self, name: &str) -> bool {
        self.apps.contains_key(name)
    }

    #[must_use]
    pub fn has_overlay(&self, name: &str) -> bool {
        self.overlays.contains_key(name)
    }

    #[must_use]
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered app names, sorted.
    #[must_use]
    pub fn app_names(&self) -> Vec<String> {
        sorted(self.apps.keys())
    }

    /// Registered overlay names, sorted.
    #[must_use]
    pub fn overlay_names(&self) -> Vec<String> {
        sorted(self.overlays.keys())
    }

    /// Registered service names, sorted.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        sorted(self.services.keys())
    }

    /// The registered component with this id, whether or not it is running.
    pub fn handler_mut(&mut self, id: &ComponentId) -> Option<&mut dyn EventHandler> {
        match id.kind {
            ComponentKind::App => self
                .apps
                .get_mut(&id.name)
                .map(|app| app as &mut dyn EventHandler),
            ComponentKind::Overlay => self
                .overlays
                .get_mut(&id.name)
                .map(|overlay| overlay as &mut dyn EventHandler),
            ComponentKind::Service => self
                .services
                .get_mut(&id.name)
                .map(|service| service.as_handler_mut()),
            ComponentKind::Main => None,
        }
    }

    /// Receivers for one broadcast: the named components fan out, every
    /// registered component can be targeted.
    pub fn routes<'a>(
        &'a mut self,
        app: Option<&'a str>,
        services: &'a [String],
        overlays: &'a [String],
    ) -> Routes<'a> {
        Routes {
            catalog: self,
            app,
            services,
            overlays,
        }
    }

    /// Borrows the named components at once, preserving the order of the
    /// `services` and `overlays` lists. Unknown names are skipped.
    pub fn running_mut<'a>(
        &'a mut self,
        app: Option<&str>,
        services: &[String],
        overlays: &[String],
    ) -> Running<'a> {
        let app = app.and_then(|name| self.apps.get_mut(name));

        let mut by_name: HashMap<&str, &mut Box<dyn Service>> = self
            .services
            .iter_mut()
            .map(|(name, service)| (name.as_str(), service))
            .collect();
        let services = services
            .iter()
            .filter_map(|name| by_name.remove(name.as_str()))
            .collect();

        let mut by_name: HashMap<&str, &mut Overlay> = self
            .overlays
            .iter_mut()
            .map(|(name, overlay)| (name.as_str(), overlay))
            .collect();
        let overlays = overlays
            .iter()
            .filter_map(|name| by_name.remove(name.as_str()))
            .collect();

        Running {
            app,
            services,
            overlays,
        }
    }
}

fn not_found(kind: ComponentKind, name: &str) -> RuntimeError {
    RuntimeError::NotFound {
        kind,
        name: name.to_string(),
    }
}

fn sorted<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut names: Vec<String> = names.cloned().collect();
    names.sort();
    names
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("apps", &self.app_names())
            .field("overlays", &self.overlay_names())
            .field("services", &self.service_names())
            .finish()
    }
}
