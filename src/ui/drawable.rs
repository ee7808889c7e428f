//! Drawable objects placed on activities.
//!
//! Layout and widget rendering live outside the runtime; the runtime only calls
//! [`Drawable::setup`] when an activity becomes current and [`Drawable::draw`]
//! every frame. [`Label`] is the one widget shipped with the crate.

use super::surface::{Color, Point, Surface, Viewport};
use std::cell::RefCell;
use std::rc::Rc;

/// Something an activity can draw.
pub trait Drawable {
    /// Lays the object out against the viewport the app was bound to.
    fn setup(&mut self, viewport: Viewport) {
        let _ = viewport;
    }

    /// Hidden objects are skipped when drawing.
    fn visible(&self) -> bool {
        true
    }

    /// Draws the object.
    fn draw(&self, surface: &mut dyn Surface);
}

/// Shared, mutable label text. Handlers keep a clone to update what is shown.
pub type TextCell = Rc<RefCell<String>>;

/// Where a label is anchored on the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    MidTop,
    Center,
    TopRight,
}

/// A single line of text.
#[derive(Debug, Clone)]
pub struct Label {
    text: TextCell,
    anchor: Anchor,
    offset: Point,
    color: Color,
    position: Point,
}

/// Width of one character cell, used to center and right-align text.
const CHAR_WIDTH: i32 = 8;

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>, anchor: Anchor, offset: Point) -> Self {
        Self {
            text: Rc::new(RefCell::new(text.into())),
            anchor,
            offset,
            color: Color::WHITE,
            position: offset,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Handle for changing the text later.
    #[must_use]
    pub fn text_cell(&self) -> TextCell {
        Rc::clone(&self.text)
    }

    /// Position resolved by the last `setup`.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    fn text_width(&self) -> i32 {
        let chars = i32::try_from(self.text.borrow().chars().count()).unwrap_or(i32::MAX);
        chars.saturating_mul(CHAR_WIDTH)
    }
}

impl Drawable for Label {
    fn setup(&mut self, viewport: Viewport) {
        let width = i32::try_from(viewport.width).unwrap_or(i32::MAX);
        let height = i32::try_from(viewport.height).unwrap_or(i32::MAX);
        let base = match self.anchor {
            Anchor::TopLeft => Point::new(0, 0),
            Anchor::MidTop => Point::new((width - self.text_width()) / 2, 0),
            Anchor::Center => Point::new((width - self.text_width()) / 2, height / 2),
            Anchor::TopRight => Point::new(width - self.text_width(), 0),
        };
        self.position = Point::new(base.x + self.offset.x, base.y + self.offset.y);
    }

    fn visible(&self) -> bool {
        !self.text.borrow().is_empty()
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.text(self.position, &self.text.borrow(), self.color);
    }
}
