//! Rendering boundary.
//!
//! Drawing mechanics are outside the runtime's responsibility. This layer only
//! fixes the contract the orchestrator relies on:
//!
//! 1. clear the surface with the current app's background color
//! 2. draw the current app (its current activity's visible objects, in order)
//! 3. draw every running overlay in the order it was started
//! 4. present
//!
//! # Modules
//!
//! - [`surface`]: the [`Surface`] trait, colors, and the recording [`HeadlessSurface`]
//! - [`drawable`]: the [`Drawable`] trait and [`Label`]

pub mod drawable;
pub mod surface;

pub use drawable::{Anchor, Drawable, Label, TextCell};
pub use surface::{Color, DrawOp, HeadlessSurface, Point, Surface, Viewport};
