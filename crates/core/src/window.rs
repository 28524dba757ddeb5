//! Describe toolkit windows.
mod id;

pub use id::Id;

use crate::{Point, Rectangle, Size};

/// The role of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// A regular, decorated window.
    #[default]
    Normal,
    /// A popup menu level: undecorated, never takes the keyboard focus.
    Menu,
    /// A tooltip: undecorated, never takes the keyboard focus.
    Tooltip,
}

impl Kind {
    /// Returns true if showing a window of this kind gives it focus.
    pub fn takes_focus(self) -> bool {
        self == Kind::Normal
    }

    /// Returns true if the native window has a title bar and borders.
    pub fn is_decorated(self) -> bool {
        self == Kind::Normal
    }
}

/// The settings of a toolkit window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// The title.
    pub label: String,
    /// The position; relative to the screen for a top-level window and to
    /// its parent for a child window.
    pub position: Point,
    /// The size in logical pixels.
    pub size: Size,
    /// The role of the window.
    pub kind: Kind,
    /// The window this one is embedded in, if it is a child window.
    ///
    /// Child windows are composited into the native window of their
    /// top-level ancestor.
    pub parent: Option<Id>,
    /// Whether the user may resize the window.
    pub resizable: bool,
}

impl Settings {
    /// Creates the settings of a top-level window.
    pub fn new(label: impl Into<String>, size: Size) -> Self {
        Self {
            label: label.into(),
            size,
            ..Self::default()
        }
    }

    /// Places the window at `position`.
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Sets the role of the window.
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Embeds the window into `parent`.
    pub fn child_of(mut self, parent: Id) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the bounds of the window.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::with_size(self.position, self.size)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            label: String::new(),
            position: Point::ORIGIN,
            size: Size::new(320, 240),
            kind: Kind::Normal,
            parent: None,
            resizable: true,
        }
    }
}
