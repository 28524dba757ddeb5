use crate::{Point, Size};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    /// X coordinate of the top-left corner.
    pub x: i32,

    /// Y coordinate of the top-left corner.
    pub y: i32,

    /// Width of the rectangle.
    pub width: i32,

    /// Height of the rectangle.
    pub height: i32,
}

impl Rectangle {
    /// Creates a new [`Rectangle`].
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a new [`Rectangle`] with its top-left corner at `position`.
    pub const fn with_size(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    /// Returns the top-left corner.
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the size.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the X coordinate one past the right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Returns the Y coordinate one past the bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns true if the rectangle covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns true if the given [`Point`] lies inside the rectangle.
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Computes the intersection with another [`Rectangle`].
    ///
    /// Returns `None` when they do not overlap.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        let intersection = Rectangle::new(x, y, right - x, bottom - y);

        (!intersection.is_empty()).then_some(intersection)
    }

    /// Moves the rectangle by the given offset.
    pub fn translate(self, offset: Point) -> Rectangle {
        Rectangle::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Scales position and size, rounding outwards to whole pixels.
    pub fn scale(self, factor: f32) -> Rectangle {
        if factor == 1.0 {
            return self;
        }

        let x = (self.x as f32 * factor).floor() as i32;
        let y = (self.y as f32 * factor).floor() as i32;
        let right = (self.right() as f32 * factor).ceil() as i32;
        let bottom = (self.bottom() as f32 * factor).ceil() as i32;

        Rectangle::new(x, y, right - x, bottom - y)
    }
}
