//! Headless background components.
//!
//! A [`Service`] is an [`EventHandler`] with a start/stop/pause lifecycle
//! contract. The orchestrator calls [`Service::start`] when the service joins
//! the running set and [`Service::stop`] when it leaves; a service that owns a
//! worker thread arranges for it to exit in `stop`.
//!
//! None of the lifecycle methods have a meaningful default: invoking one that a
//! service did not implement fails with [`RuntimeError::NotImplemented`].

use crate::bus::{EventHandler, EventListener, HandlerCore, Listeners};
use crate::domain::{ComponentId, Result, RuntimeError};

/// Upcast to `&mut dyn EventHandler`, so services can be broadcast targets.
///
/// Implemented for every sized event handler.
pub trait AsHandler {
    fn as_handler_mut(&mut self) -> &mut dyn EventHandler;
}

impl<T: EventHandler> AsHandler for T {
    fn as_handler_mut(&mut self) -> &mut dyn EventHandler {
        self
    }
}

/// A background component with a lifecycle.
pub trait Service: EventHandler + AsHandler {
    /// The service's registered name.
    fn name(&self) -> &str {
        &self.id().name
    }

    /// Brings the service up, e.g. spawns its worker.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotImplemented`] unless overridden.
    fn start(&mut self) -> Result<()> {
        Err(not_implemented(self.name(), "start"))
    }

    /// Shuts the service down; must make any worker observe a stop signal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotImplemented`] unless overridden.
    fn stop(&mut self) -> Result<()> {
        Err(not_implemented(self.name(), "stop"))
    }

    /// Temporarily suspends the service's work.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotImplemented`] unless overridden.
    fn pause(&mut self) -> Result<()> {
        Err(not_implemented(self.name(), "pause"))
    }
}

fn not_implemented(service: &str, method: &'static str) -> RuntimeError {
    RuntimeError::NotImplemented {
        service: service.to_string(),
        method,
    }
}

/// A service that is nothing but handlers.
///
/// Useful for modules whose background behavior is purely event driven. Its
/// lifecycle methods are left unimplemented.
#[derive(Debug)]
pub struct HandlerService {
    core: HandlerCore,
}

impl HandlerService {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: HandlerCore::new(ComponentId::service(name)),
        }
    }
}

impl EventListener for HandlerService {
    fn listeners(&self) -> &Listeners {
        self.core.listeners()
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        self.core.listeners_mut()
    }
}

impl EventHandler for HandlerService {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }
}

impl Service for HandlerService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Event;

    #[test]
    fn lifecycle_defaults_to_not_implemented() {
        let mut service = HandlerService::new("logger");
        for result in [service.start(), service.stop(), service.pause()] {
            let err = result.unwrap_err();
            assert!(err.is_not_implemented());
        }
        assert_eq!(
            service.stop().unwrap_err().to_string(),
            "service logger does not implement stop"
        );
    }

    #[test]
    fn boxed_service_is_a_broadcast_target() {
        let mut service: Box<dyn Service> = Box::new(HandlerService::new("echo"));
        service
            .as_handler_mut()
            .listeners_mut()
            .register("ping", |_, outbox| outbox.emit("pong", serde_json::Value::Null));

        let mut main = crate::bus::Eventqueue::new(ComponentId::main());
        main.push(Event::new("ping"));
        let invoked = main.broadcast(&mut [service.as_handler_mut()], true);

        assert_eq!(invoked, 1);
        assert_eq!(service.queue().events()[0].tag(), "pong");
        assert_eq!(service.name(), "echo");
    }
}
