//! The events reported by native windowing systems.
//!
//! Backends translate whatever their platform produces into these events.
//! The [`Decoder`](crate::Decoder) turns them into toolkit events.
use crate::core::keyboard::{Key, State};
use crate::core::{Point, Size};

use smol_str::SmolStr;
use std::fmt;

/// The opaque handle of a native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u64);

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native#{}", self.0)
    }
}

/// An event of a native window.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The native window the event belongs to.
    pub window: NativeId,
    /// What happened.
    pub kind: Kind,
}

impl Event {
    /// Creates a new [`Event`].
    pub fn new(window: NativeId, kind: Kind) -> Self {
        Self { window, kind }
    }
}

/// What happened to a native window.
///
/// Positions are in logical pixels relative to the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// A mouse button was pressed.
    ButtonPressed {
        /// The button number (1 = left, 2 = middle, 3 = right).
        button: u8,
        /// The pointer position.
        position: Point,
        /// The multi-click count reported by the platform, if it tracks one.
        clicks: Option<u32>,
    },
    /// A mouse button was released.
    ButtonReleased {
        /// The button number.
        button: u8,
        /// The pointer position.
        position: Point,
    },
    /// The pointer moved.
    CursorMoved {
        /// The pointer position.
        position: Point,
    },
    /// The pointer entered the window.
    CursorEntered {
        /// The pointer position.
        position: Point,
    },
    /// The pointer left the window.
    CursorLeft,
    /// The wheel turned, in steps; positive `dy` scrolls down.
    Wheel {
        /// Horizontal steps.
        dx: i32,
        /// Vertical steps.
        dy: i32,
    },
    /// A key was pressed.
    KeyPressed {
        /// The key symbol.
        key: Key,
        /// The key before keypad translation.
        original_key: Key,
        /// The text produced by the key.
        text: SmolStr,
    },
    /// A key was released.
    KeyReleased {
        /// The key symbol.
        key: Key,
    },
    /// The platform reported the full modifier state.
    ModifiersChanged(State),
    /// A touch gesture.
    Gesture(Gesture),
    /// The window gained or lost the keyboard focus.
    Focused(bool),
    /// The user asked to close the window.
    CloseRequested,
    /// The window was resized.
    Resized(Size),
    /// The window was moved on the screen.
    Moved(Point),
    /// Part of the window must be redrawn.
    Exposed,
    /// Something the toolkit does not understand.
    Unknown,
}

/// A touch gesture, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A gesture started.
    Begin,
    /// A gesture ended.
    End,
    /// A pinch.
    Zoom(Pinch),
    /// A two-finger pan.
    Pan(Pan),
    /// A rotation.
    Rotate(Angle),
}

/// How a platform reports a pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pinch {
    /// The current distance between the fingers.
    Distance(f64),
    /// The change of magnification since the previous sample (0 = none).
    Delta(f64),
}

/// How a platform reports a pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pan {
    /// The current position of the gesture and the distance between the
    /// fingers (0 for a single finger).
    Position {
        /// The position of the gesture.
        position: Point,
        /// The distance between the fingers.
        distance: i32,
    },
    /// The movement since the previous sample.
    Delta {
        /// Horizontal movement.
        dx: i32,
        /// Vertical movement.
        dy: i32,
    },
}

/// How a platform reports a rotation, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    /// The first sample after [`Gesture::Begin`] is the absolute angle; the
    /// following ones are relative to it.
    FromStart(f64),
    /// The rotation since the previous sample.
    Delta(f64),
}
