/// An amount of space in 2 dimensions.
///
/// Sizes may be zero or negative; consumers treat those as degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// The width.
    pub width: i32,
    /// The height.
    pub height: i32,
}

impl Size {
    /// A [`Size`] with zero width and height.
    pub const ZERO: Size = Size::new(0, 0);

    /// Creates a new [`Size`] with the given width and height.
    pub const fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    /// Returns true if either dimension is zero or negative.
    pub const fn is_degenerate(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self::new(width, height)
    }
}
