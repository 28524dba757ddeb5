//! Keyboard symbols and the modifier/button state mask.
use bitflags::bitflags;

bitflags! {
    /// The state mask of an event: keyboard modifiers and held mouse buttons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct State: u32 {
        /// One of the shift keys is down.
        const SHIFT = 0x0001_0000;
        /// The caps lock is on.
        const CAPS_LOCK = 0x0002_0000;
        /// One of the ctrl keys is down.
        const CTRL = 0x0004_0000;
        /// One of the alt keys is down.
        const ALT = 0x0008_0000;
        /// The num lock is on.
        const NUM_LOCK = 0x0010_0000;
        /// One of the meta/"Windows"/command keys is down.
        const META = 0x0040_0000;
        /// The scroll lock is on.
        const SCROLL_LOCK = 0x0080_0000;
        /// Mouse button 1 (left) is pushed.
        const BUTTON1 = 0x0100_0000;
        /// Mouse button 2 (middle) is pushed.
        const BUTTON2 = 0x0200_0000;
        /// Mouse button 3 (right) is pushed.
        const BUTTON3 = 0x0400_0000;
        /// Mouse button 4 (back) is pushed.
        const BUTTON4 = 0x0800_0000;
        /// Mouse button 5 (forward) is pushed.
        const BUTTON5 = 0x1000_0000;

        /// Any mouse button is pushed.
        const BUTTONS = Self::BUTTON1.bits()
            | Self::BUTTON2.bits()
            | Self::BUTTON3.bits()
            | Self::BUTTON4.bits()
            | Self::BUTTON5.bits();

        /// The modifiers held down (excluding the lock keys).
        const MODIFIERS = Self::SHIFT.bits()
            | Self::CTRL.bits()
            | Self::ALT.bits()
            | Self::META.bits();
    }
}

impl State {
    /// Returns the state bit of a mouse button (1-based).
    pub fn button(number: u8) -> State {
        match number {
            1 => State::BUTTON1,
            2 => State::BUTTON2,
            3 => State::BUTTON3,
            4 => State::BUTTON4,
            5 => State::BUTTON5,
            _ => State::empty(),
        }
    }
}

/// A key symbol.
///
/// Printable keys use the Unicode code point of their unshifted,
/// lowercase character. Other keys use the X11 keysym range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key(pub u32);

#[allow(missing_docs)]
impl Key {
    pub const NONE: Key = Key(0);
    /// Mouse button keys are `BUTTON + n`.
    pub const BUTTON: Key = Key(0xfee8);
    pub const BACKSPACE: Key = Key(0xff08);
    pub const TAB: Key = Key(0xff09);
    pub const ENTER: Key = Key(0xff0d);
    pub const PAUSE: Key = Key(0xff13);
    pub const SCROLL_LOCK: Key = Key(0xff14);
    pub const ESCAPE: Key = Key(0xff1b);
    pub const HOME: Key = Key(0xff50);
    pub const LEFT: Key = Key(0xff51);
    pub const UP: Key = Key(0xff52);
    pub const RIGHT: Key = Key(0xff53);
    pub const DOWN: Key = Key(0xff54);
    pub const PAGE_UP: Key = Key(0xff55);
    pub const PAGE_DOWN: Key = Key(0xff56);
    pub const END: Key = Key(0xff57);
    pub const PRINT: Key = Key(0xff61);
    pub const INSERT: Key = Key(0xff63);
    pub const MENU: Key = Key(0xff67);
    pub const HELP: Key = Key(0xff68);
    pub const NUM_LOCK: Key = Key(0xff7f);
    /// Keypad keys are `KP + ascii`.
    pub const KP: Key = Key(0xff80);
    pub const KP_ENTER: Key = Key(0xff8d);
    /// Function keys are `F + n`.
    pub const F: Key = Key(0xffbd);
    pub const SHIFT_L: Key = Key(0xffe1);
    pub const SHIFT_R: Key = Key(0xffe2);
    pub const CONTROL_L: Key = Key(0xffe3);
    pub const CONTROL_R: Key = Key(0xffe4);
    pub const CAPS_LOCK: Key = Key(0xffe5);
    pub const META_L: Key = Key(0xffe7);
    pub const META_R: Key = Key(0xffe8);
    pub const ALT_L: Key = Key(0xffe9);
    pub const ALT_R: Key = Key(0xffea);
    pub const DELETE: Key = Key(0xffff);
    pub const SPACE: Key = Key(' ' as u32);
}

impl Key {
    /// Returns the key of a mouse button (1-based).
    pub const fn button(number: u8) -> Key {
        Key(Self::BUTTON.0 + number as u32)
    }

    /// Returns the key of a function key (1-based).
    pub const fn function(number: u8) -> Key {
        Key(Self::F.0 + number as u32)
    }

    /// Returns the key of a printable character.
    pub fn from_char(c: char) -> Key {
        Key(c.to_ascii_lowercase() as u32)
    }

    /// Returns the printable character of this key, if any.
    pub fn to_char(self) -> Option<char> {
        if self.0 < Self::BUTTON.0 {
            char::from_u32(self.0).filter(|c| !c.is_control())
        } else {
            None
        }
    }

    /// Returns the modifier bit held down by this key, if it is a modifier.
    ///
    /// Lock keys are not reported here since they toggle instead of being held.
    pub fn modifier(self) -> Option<State> {
        match self {
            Key::SHIFT_L | Key::SHIFT_R => Some(State::SHIFT),
            Key::CONTROL_L | Key::CONTROL_R => Some(State::CTRL),
            Key::ALT_L | Key::ALT_R => Some(State::ALT),
            Key::META_L | Key::META_R => Some(State::META),
            _ => None,
        }
    }

    /// Returns true if this is the Enter key of either the main block or the keypad.
    pub fn is_enter(self) -> bool {
        self == Key::ENTER || self == Key::KP_ENTER
    }
}

/// A keyboard shortcut: a key with the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shortcut {
    /// The modifiers that must be held.
    pub modifiers: State,
    /// The key.
    pub key: Key,
}

impl Shortcut {
    /// Creates a new [`Shortcut`].
    pub const fn new(modifiers: State, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Creates a [`Shortcut`] of a printable key with the given modifiers.
    pub fn char(modifiers: State, c: char) -> Self {
        Self::new(modifiers, Key::from_char(c))
    }

    /// Returns true if the given key and state trigger this shortcut.
    ///
    /// Held modifiers must match exactly; lock keys and buttons are ignored.
    pub fn matches(self, key: Key, state: State) -> bool {
        self.key != Key::NONE
            && self.key == key
            && (state & State::MODIFIERS) == (self.modifiers & State::MODIFIERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_keys_map_to_state_bits() {
        assert_eq!(Key::SHIFT_R.modifier(), Some(State::SHIFT));
        assert_eq!(Key::ALT_L.modifier(), Some(State::ALT));
        assert_eq!(Key::CAPS_LOCK.modifier(), None);
        assert_eq!(Key::from_char('A').modifier(), None);
    }

    #[test]
    fn shortcuts_ignore_lock_state() {
        let save = Shortcut::char(State::CTRL, 's');

        assert!(save.matches(Key::from_char('s'), State::CTRL | State::NUM_LOCK));
        assert!(!save.matches(Key::from_char('s'), State::CTRL | State::SHIFT));
        assert!(!save.matches(Key::from_char('s'), State::empty()));
    }

    #[test]
    fn printable_keys_round_trip_through_char() {
        assert_eq!(Key::from_char('q').to_char(), Some('q'));
        assert_eq!(Key::ESCAPE.to_char(), None);
        assert_eq!(Key::button(1), Key(0xfee9));
    }
}
