//! Error types for the tickbus runtime.
//!
//! This module defines the centralized error type [`RuntimeError`] and a type alias
//! [`Result`] used throughout the crate. Errors are implemented with `thiserror`.
//!
//! Most runtime errors are *reported*, not fatal: the orchestrator logs them and
//! turns them into bus events so the loop keeps ticking. Only boot-time failures
//! (an unknown boot component, an unreadable config file) stop the process.

use super::component::ComponentKind;
use thiserror::Error;

/// The main error type for runtime operations.
///
/// # Examples
///
/// ```
/// use tickbus::domain::{ComponentKind, RuntimeError};
///
/// let err = RuntimeError::NotFound { kind: ComponentKind::App, name: "Home".into() };
/// assert_eq!(err.to_string(), "app not found: Home");
/// ```
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A start/stop request named a component that was never registered.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Which registry was searched.
        kind: ComponentKind,
        /// The requested name.
        name: String,
    },

    /// A service lifecycle method was invoked but the service never implemented it.
    #[error("service {service} does not implement {method}")]
    NotImplemented {
        /// Name of the service.
        service: String,
        /// The lifecycle method (`start`, `stop` or `pause`).
        method: &'static str,
    },

    /// An app was asked to switch to an activity it does not own.
    #[error("app {app} has no activity named {activity}")]
    UnknownActivity {
        /// Name of the app.
        app: String,
        /// The requested activity.
        activity: String,
    },

    /// A tag carried the reserved prefix but names no orchestrator operation.
    #[error("reserved tag not recognised: {0}")]
    UnknownTag(String),

    /// A reserved event carried a payload of the wrong shape.
    #[error("invalid payload for '{tag}': {reason}")]
    InvalidPayload {
        /// Tag of the offending event.
        tag: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A background worker could not be spawned or reached.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RuntimeError {
    /// Returns `true` for the Not-Implemented lifecycle condition.
    ///
    /// The orchestrator treats it as "this service has no lifecycle work to do".
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

/// A specialized `Result` type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
