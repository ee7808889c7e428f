//! Component kinds built on the bus.
//!
//! | Kind | Drawn | Exclusive | Lifecycle |
//! |---|---|---|---|
//! | [`App`] | yes | one current at a time | unstarted → started, then resumed on re-activation |
//! | [`Overlay`] | yes, on top | no | stopped ↔ running |
//! | [`Service`] | no | no | stopped ↔ running, via `start`/`stop` |
//!
//! # Modules
//!
//! - [`app`]: [`App`], [`Activity`] and the [`Overlay`] alias
//! - [`service`]: the [`Service`] lifecycle trait and [`HandlerService`]
//! - [`catalog`]: [`ComponentModule`] factory hooks and the [`Catalog`] registry

pub mod app;
pub mod catalog;
pub mod service;

pub use app::{Activity, App, Overlay, MAIN_ACTIVITY, SET_ACTIVITY};
pub use catalog::{Catalog, ComponentModule, Routes, Running};
pub use service::{AsHandler, HandlerService, Service};
