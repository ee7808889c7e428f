//! Render surface boundary.
//!
//! The runtime only needs three things from a display: fill it, put text on it,
//! and present the finished frame. Real back ends (framebuffer, SDL window)
//! implement [`Surface`]; [`HeadlessSurface`] records frames in memory.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    pub const GREY: Self = Self(50, 50, 50);
}

/// A pixel position, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of the drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

/// A display the orchestrator renders into once per tick.
pub trait Surface {
    /// Size of the display.
    fn viewport(&self) -> Viewport;

    /// Clears the whole frame with one color.
    fn fill(&mut self, color: Color);

    /// Draws a line of text with its top-left corner at `at`.
    fn text(&mut self, at: Point, text: &str, color: Color);

    /// Shows the finished frame.
    fn present(&mut self);
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Fill(Color),
    Text {
        at: Point,
        text: String,
        color: Color,
    },
}

/// In-memory surface that keeps the last presented frame.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    viewport: Viewport,
    current: Vec<DrawOp>,
    last_frame: Vec<DrawOp>,
    presented: u64,
}

impl HeadlessSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Operations of the most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> &[DrawOp] {
        &self.last_frame
    }

    /// Texts of the most recently presented frame, in draw order.
    #[must_use]
    pub fn last_texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Fill(_) => None,
            })
            .collect()
    }

    /// How many frames have been presented.
    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.presented
    }
}

impl Surface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn fill(&mut self, color: Color) {
        self.current.push(DrawOp::Fill(color));
    }

    fn text(&mut self, at: Point, text: &str, color: Color) {
        self.current.push(DrawOp::Text {
            at,
            text: text.to_string(),
            color,
        });
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.presented += 1;
        tracing::trace!(frame = self.presented, ops = self.last_frame.len(), "frame presented");
    }
}
