//! Event kinds and the event record.
//!
//! Dispatch writes every decoded native event into a [`Record`] before a
//! widget sees it. Widgets read the record during their
//! [`handle`](crate::Widget::handle) call; it is never mutated while a
//! widget is reading it.
use crate::keyboard::{Key, State};
use crate::{Point, Rectangle};

use smol_str::SmolStr;
use std::fmt;

/// The kind of an event.
///
/// This is an open enumeration: the named constants cover every event the
/// toolkit produces, and applications may define their own kinds starting
/// at [`Kind::USER`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Kind(pub u16);

impl Kind {
    /// No event.
    pub const NONE: Kind = Kind(0);
    /// A mouse button was pushed down.
    pub const PUSH: Kind = Kind(1);
    /// A mouse button was released.
    pub const RELEASE: Kind = Kind(2);
    /// The pointer entered a widget.
    pub const ENTER: Kind = Kind(3);
    /// The pointer left a widget.
    pub const LEAVE: Kind = Kind(4);
    /// The pointer moved with a button held.
    pub const DRAG: Kind = Kind(5);
    /// Keyboard focus is offered to a widget.
    pub const FOCUS: Kind = Kind(6);
    /// Keyboard focus was taken away.
    pub const UNFOCUS: Kind = Kind(7);
    /// A key was pressed.
    pub const KEYDOWN: Kind = Kind(8);
    /// A key was released.
    pub const KEYUP: Kind = Kind(9);
    /// The user asked for the window to close.
    pub const CLOSE: Kind = Kind(10);
    /// The pointer moved without a button held.
    pub const MOVE: Kind = Kind(11);
    /// An unconsumed key press, offered to every widget.
    pub const SHORTCUT: Kind = Kind(12);
    /// A widget became inactive.
    pub const DEACTIVATE: Kind = Kind(13);
    /// A widget became active.
    pub const ACTIVATE: Kind = Kind(14);
    /// A window was hidden.
    pub const HIDE: Kind = Kind(15);
    /// A window was shown.
    pub const SHOW: Kind = Kind(16);
    /// Text was pasted.
    pub const PASTE: Kind = Kind(17);
    /// The mouse wheel moved; see [`Record::dx`]/[`Record::dy`].
    pub const MOUSEWHEEL: Kind = Kind(19);
    /// The monitor configuration changed.
    pub const SCREEN_CONFIGURATION_CHANGED: Kind = Kind(24);
    /// A pinch gesture; the relative factor is in [`slot::ZOOM_FACTOR`].
    pub const ZOOM_GESTURE: Kind = Kind(26);
    /// A two-finger scroll; deltas are in [`slot::SCROLL_X`]/[`slot::SCROLL_Y`].
    pub const SCROLL_GESTURE: Kind = Kind(30);
    /// A rotation; degrees since the previous rotate event are in [`slot::ROTATION`].
    pub const ROTATE_GESTURE: Kind = Kind(31);
    /// The first kind available to applications.
    pub const USER: Kind = Kind(1000);

    /// Returns the name of a built-in kind.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Kind::NONE => "NONE",
            Kind::PUSH => "PUSH",
            Kind::RELEASE => "RELEASE",
            Kind::ENTER => "ENTER",
            Kind::LEAVE => "LEAVE",
            Kind::DRAG => "DRAG",
            Kind::FOCUS => "FOCUS",
            Kind::UNFOCUS => "UNFOCUS",
            Kind::KEYDOWN => "KEYDOWN",
            Kind::KEYUP => "KEYUP",
            Kind::CLOSE => "CLOSE",
            Kind::MOVE => "MOVE",
            Kind::SHORTCUT => "SHORTCUT",
            Kind::DEACTIVATE => "DEACTIVATE",
            Kind::ACTIVATE => "ACTIVATE",
            Kind::HIDE => "HIDE",
            Kind::SHOW => "SHOW",
            Kind::PASTE => "PASTE",
            Kind::MOUSEWHEEL => "MOUSEWHEEL",
            Kind::SCREEN_CONFIGURATION_CHANGED => "SCREEN_CONFIGURATION_CHANGED",
            Kind::ZOOM_GESTURE => "ZOOM_GESTURE",
            Kind::SCROLL_GESTURE => "SCROLL_GESTURE",
            Kind::ROTATE_GESTURE => "ROTATE_GESTURE",
            _ => return None,
        })
    }

    /// Returns true for kinds routed by pointer position.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            Kind::PUSH
                | Kind::RELEASE
                | Kind::DRAG
                | Kind::MOVE
                | Kind::MOUSEWHEEL
                | Kind::ZOOM_GESTURE
                | Kind::SCROLL_GESTURE
                | Kind::ROTATE_GESTURE
        )
    }

    /// Returns true for kinds routed to the keyboard focus.
    pub fn is_keyboard(self) -> bool {
        matches!(self, Kind::KEYDOWN | Kind::KEYUP)
    }

    /// Returns true for kinds that carry user input and are subject to a grab.
    pub fn is_input(self) -> bool {
        self.is_pointer() || self.is_keyboard() || self == Kind::SHORTCUT
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Kind({})", self.0),
        }
    }
}

/// Number of auxiliary values carried by a [`Record`].
pub const VALUE_SLOTS: usize = 4;

/// Slot indices of gesture payloads in [`Record::values`].
pub mod slot {
    /// Relative zoom factor of a [`ZOOM_GESTURE`](super::Kind::ZOOM_GESTURE).
    pub const ZOOM_FACTOR: usize = 0;
    /// Horizontal delta of a [`SCROLL_GESTURE`](super::Kind::SCROLL_GESTURE).
    pub const SCROLL_X: usize = 0;
    /// Vertical delta of a [`SCROLL_GESTURE`](super::Kind::SCROLL_GESTURE).
    pub const SCROLL_Y: usize = 1;
    /// Rotation in degrees of a [`ROTATE_GESTURE`](super::Kind::ROTATE_GESTURE).
    pub const ROTATION: usize = 0;
}

/// The snapshot of the event being dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The kind of the event.
    pub kind: Kind,
    /// Pointer X, relative to the window receiving the event.
    pub x: i32,
    /// Pointer Y, relative to the window receiving the event.
    pub y: i32,
    /// Pointer X, relative to the screen.
    pub x_root: i32,
    /// Pointer Y, relative to the screen.
    pub y_root: i32,
    /// Horizontal wheel steps.
    pub dx: i32,
    /// Vertical wheel steps; positive scrolls down.
    pub dy: i32,
    /// Modifiers and held buttons.
    pub state: State,
    /// The key or mouse button of the last key/button event.
    pub key: Key,
    /// The key before keypad translation.
    pub original_key: Key,
    /// The text produced by the last key press.
    pub text: SmolStr,
    /// Number of extra clicks (0 for a single click).
    pub clicks: u32,
    /// Whether the current push/release is still a click (no drag).
    pub is_click: bool,
    /// Auxiliary values, see [`slot`].
    pub values: [f64; VALUE_SLOTS],
}

impl Record {
    /// Returns the pointer position relative to the window.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the pointer position relative to the screen.
    pub fn root_position(&self) -> Point {
        Point::new(self.x_root, self.y_root)
    }

    /// Returns true if the pointer is inside the given window-relative rectangle.
    pub fn inside(&self, bounds: &Rectangle) -> bool {
        bounds.contains(self.position())
    }

    /// Returns the auxiliary value in `slot`, or `0.0` if out of range.
    pub fn value(&self, slot: usize) -> f64 {
        self.values.get(slot).copied().unwrap_or(0.0)
    }

    /// Returns the mouse button number of the last button event, if any.
    pub fn button(&self) -> Option<u8> {
        let offset = self.key.0.checked_sub(Key::BUTTON.0)?;

        u8::try_from(offset).ok().filter(|n| (1..=5).contains(n))
    }

    /// Returns true if shift is held.
    pub fn shift(&self) -> bool {
        self.state.contains(State::SHIFT)
    }

    /// Returns true if ctrl is held.
    pub fn ctrl(&self) -> bool {
        self.state.contains(State::CTRL)
    }

    /// Returns true if alt is held.
    pub fn alt(&self) -> bool {
        self.state.contains(State::ALT)
    }

    /// Returns the held mouse buttons.
    pub fn buttons(&self) -> State {
        self.state & State::BUTTONS
    }

    /// Resets every auxiliary value to `0.0`.
    pub fn clear_values(&mut self) {
        self.values = [0.0; VALUE_SLOTS];
    }
}

impl Default for Record {
    fn default() -> Self {
        Self {
            kind: Kind::NONE,
            x: 0,
            y: 0,
            x_root: 0,
            y_root: 0,
            dx: 0,
            dy: 0,
            state: State::empty(),
            key: Key::NONE,
            original_key: Key::NONE,
            text: SmolStr::default(),
            clicks: 0,
            is_click: false,
            values: [0.0; VALUE_SLOTS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_is_decoded_from_key() {
        let mut record = Record::default();
        assert_eq!(record.button(), None);

        record.key = Key::button(3);
        assert_eq!(record.button(), Some(3));

        record.key = Key::ESCAPE;
        assert_eq!(record.button(), None);
    }

    #[test]
    fn unknown_kinds_are_still_printable() {
        assert_eq!(format!("{:?}", Kind::PUSH), "PUSH");
        assert_eq!(format!("{:?}", Kind(1234)), "Kind(1234)");
    }
}
