//! Domain layer for the tickbus runtime.
//!
//! Core types shared by every other layer, independent of the bus mechanics,
//! rendering or input hardware.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`component`]: Component identity used for routing
//!
//! # Examples
//!
//! ```
//! use tickbus::domain::{ComponentId, ComponentKind};
//!
//! let id = ComponentId::app("Home");
//! assert_eq!(id.kind, ComponentKind::App);
//! assert_eq!(id.to_string(), "app:Home");
//! ```

pub mod component;
pub mod error;

pub use component::{ComponentId, ComponentKind};
pub use error::{Result, RuntimeError};
