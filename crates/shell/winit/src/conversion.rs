//! Convert [`winit`] types into [`flint_runtime`] types, and back.
use flint_runtime::core::keyboard::{self, Key};
use flint_runtime::core::{Point, Rectangle, Size};
use flint_runtime::native::{self, Angle, Gesture, Pan, Pinch};

use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyLocation, ModifiersState, NamedKey};

/// Pixels of a precise scroll that make one wheel step.
const PIXELS_PER_STEP: f64 = 20.0;

/// What the backend tracks per window to convert its events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracking {
    /// The scale factor of the window.
    pub scale: f64,
    /// The last known pointer position, in logical pixels.
    pub cursor: Point,
    /// Precise scrolling not yet turned into steps.
    pub scroll: (f64, f64),
}

impl Tracking {
    /// Starts tracking a window with the given scale factor.
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            cursor: Point::ORIGIN,
            scroll: (0.0, 0.0),
        }
    }
}

/// Converts a window event, updating the tracking state.
///
/// Events the toolkit has no use for return `None`.
pub fn window_event(event: &WindowEvent, tracking: &mut Tracking) -> Option<native::Kind> {
    let kind = match event {
        WindowEvent::CursorMoved { position, .. } => {
            tracking.cursor = point(*position, tracking.scale);

            native::Kind::CursorMoved {
                position: tracking.cursor,
            }
        }
        WindowEvent::CursorEntered { .. } => native::Kind::CursorEntered {
            position: tracking.cursor,
        },
        WindowEvent::CursorLeft { .. } => native::Kind::CursorLeft,
        WindowEvent::MouseInput { state, button, .. } => {
            let button = mouse_button(*button)?;

            match state {
                ElementState::Pressed => native::Kind::ButtonPressed {
                    button,
                    position: tracking.cursor,
                    clicks: None,
                },
                ElementState::Released => native::Kind::ButtonReleased {
                    button,
                    position: tracking.cursor,
                },
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = wheel_steps(*delta, &mut tracking.scroll);

            if dx == 0 && dy == 0 {
                return None;
            }

            native::Kind::Wheel { dx, dy }
        }
        WindowEvent::KeyboardInput { event, .. } => key_event(event),
        WindowEvent::ModifiersChanged(modifiers) => {
            native::Kind::ModifiersChanged(self::modifiers(modifiers.state()))
        }
        WindowEvent::PinchGesture { delta, phase, .. } => {
            gesture(*phase, Gesture::Zoom(Pinch::Delta(*delta)))
        }
        WindowEvent::RotationGesture { delta, phase, .. } => {
            gesture(*phase, Gesture::Rotate(Angle::Delta(f64::from(*delta))))
        }
        WindowEvent::PanGesture { delta, phase, .. } => gesture(
            *phase,
            Gesture::Pan(Pan::Delta {
                dx: (f64::from(delta.x) / tracking.scale).round() as i32,
                dy: (f64::from(delta.y) / tracking.scale).round() as i32,
            }),
        ),
        WindowEvent::Focused(focused) => native::Kind::Focused(*focused),
        WindowEvent::CloseRequested => native::Kind::CloseRequested,
        WindowEvent::Resized(size) => native::Kind::Resized(self::size(*size, tracking.scale)),
        WindowEvent::Moved(position) => native::Kind::Moved(point(*position, tracking.scale)),
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
            tracking.scale = *scale_factor;
            return None;
        }
        WindowEvent::RedrawRequested => native::Kind::Exposed,
        _ => return None,
    };

    Some(kind)
}

fn gesture(phase: TouchPhase, gesture: Gesture) -> native::Kind {
    native::Kind::Gesture(match phase {
        TouchPhase::Started => Gesture::Begin,
        TouchPhase::Moved => gesture,
        TouchPhase::Ended | TouchPhase::Cancelled => Gesture::End,
    })
}

fn key_event(event: &KeyEvent) -> native::Kind {
    let (key, original_key) = key(&event.logical_key, event.location);

    match event.state {
        ElementState::Pressed => native::Kind::KeyPressed {
            key,
            original_key,
            text: event.text.as_deref().unwrap_or_default().into(),
        },
        ElementState::Released => native::Kind::KeyReleased { key },
    }
}

/// Converts a logical key into the key symbol and the symbol before keypad
/// translation.
pub fn key(key: &winit::keyboard::Key, location: KeyLocation) -> (Key, Key) {
    let plain = match key {
        winit::keyboard::Key::Character(text) => {
            text.chars().next().map_or(Key::NONE, Key::from_char)
        }
        winit::keyboard::Key::Named(named) => named_key(*named),
        _ => Key::NONE,
    };

    if location != KeyLocation::Numpad {
        return (plain, plain);
    }

    let keypad = match plain {
        Key::ENTER => Key::KP_ENTER,
        Key(code) if plain.to_char().is_some_and(|c| c.is_ascii_graphic()) => Key(Key::KP.0 + code),
        _ => plain,
    };

    (keypad, plain)
}

fn named_key(named: NamedKey) -> Key {
    match named {
        NamedKey::Enter => Key::ENTER,
        NamedKey::Tab => Key::TAB,
        NamedKey::Space => Key::SPACE,
        NamedKey::Backspace => Key::BACKSPACE,
        NamedKey::Escape => Key::ESCAPE,
        NamedKey::Delete => Key::DELETE,
        NamedKey::Insert => Key::INSERT,
        NamedKey::ArrowLeft => Key::LEFT,
        NamedKey::ArrowUp => Key::UP,
        NamedKey::ArrowRight => Key::RIGHT,
        NamedKey::ArrowDown => Key::DOWN,
        NamedKey::Home => Key::HOME,
        NamedKey::End => Key::END,
        NamedKey::PageUp => Key::PAGE_UP,
        NamedKey::PageDown => Key::PAGE_DOWN,
        NamedKey::Pause => Key::PAUSE,
        NamedKey::PrintScreen => Key::PRINT,
        NamedKey::ScrollLock => Key::SCROLL_LOCK,
        NamedKey::NumLock => Key::NUM_LOCK,
        NamedKey::CapsLock => Key::CAPS_LOCK,
        NamedKey::ContextMenu => Key::MENU,
        NamedKey::Help => Key::HELP,
        NamedKey::Shift => Key::SHIFT_L,
        NamedKey::Control => Key::CONTROL_L,
        NamedKey::Alt => Key::ALT_L,
        NamedKey::Super | NamedKey::Meta => Key::META_L,
        NamedKey::F1 => Key::function(1),
        NamedKey::F2 => Key::function(2),
        NamedKey::F3 => Key::function(3),
        NamedKey::F4 => Key::function(4),
        NamedKey::F5 => Key::function(5),
        NamedKey::F6 => Key::function(6),
        NamedKey::F7 => Key::function(7),
        NamedKey::F8 => Key::function(8),
        NamedKey::F9 => Key::function(9),
        NamedKey::F10 => Key::function(10),
        NamedKey::F11 => Key::function(11),
        NamedKey::F12 => Key::function(12),
        _ => Key::NONE,
    }
}

/// Converts the modifiers.
pub fn modifiers(modifiers: ModifiersState) -> keyboard::State {
    let mut state = keyboard::State::empty();

    state.set(keyboard::State::SHIFT, modifiers.shift_key());
    state.set(keyboard::State::CTRL, modifiers.control_key());
    state.set(keyboard::State::ALT, modifiers.alt_key());
    state.set(keyboard::State::META, modifiers.super_key());

    state
}

/// Converts a mouse button into its 1-based number.
pub fn mouse_button(button: MouseButton) -> Option<u8> {
    match button {
        MouseButton::Left => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::Right => Some(3),
        MouseButton::Back => Some(4),
        MouseButton::Forward => Some(5),
        MouseButton::Other(_) => None,
    }
}

/// Converts a scroll into wheel steps; positive `dy` scrolls down.
///
/// Precise scrolls accumulate in `rest` until they make a whole step.
pub fn wheel_steps(delta: MouseScrollDelta, rest: &mut (f64, f64)) -> (i32, i32) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            *rest = (0.0, 0.0);

            (-(x.round() as i32), -(y.round() as i32))
        }
        MouseScrollDelta::PixelDelta(pixels) => {
            rest.0 -= pixels.x / PIXELS_PER_STEP;
            rest.1 -= pixels.y / PIXELS_PER_STEP;

            let steps = (rest.0.trunc(), rest.1.trunc());
            rest.0 -= steps.0;
            rest.1 -= steps.1;

            (steps.0 as i32, steps.1 as i32)
        }
    }
}

/// Converts a physical position into logical pixels.
pub fn point<T: winit::dpi::Pixel>(position: PhysicalPosition<T>, scale: f64) -> Point {
    let position: LogicalPosition<f64> = position.to_logical(scale);

    Point::new(position.x.round() as i32, position.y.round() as i32)
}

/// Converts a physical size into logical pixels.
pub fn size(size: PhysicalSize<u32>, scale: f64) -> Size {
    let size: LogicalSize<f64> = size.to_logical(scale);

    Size::new(size.width.round() as i32, size.height.round() as i32)
}

/// Converts logical bounds into a [`winit`] position and size.
pub fn bounds(bounds: Rectangle) -> (LogicalPosition<i32>, LogicalSize<u32>) {
    (
        LogicalPosition::new(bounds.x, bounds.y),
        LogicalSize::new(bounds.width.max(1) as u32, bounds.height.max(1) as u32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn characters_are_lowercase_and_keypad_keys_are_translated() {
        let upper = winit::keyboard::Key::Character(SmolStr::new("Q"));
        assert_eq!(key(&upper, KeyLocation::Standard), (Key::from_char('q'), Key::from_char('q')));

        let seven = winit::keyboard::Key::Character(SmolStr::new("7"));
        let (keypad, plain) = key(&seven, KeyLocation::Numpad);
        assert_eq!(keypad, Key(Key::KP.0 + '7' as u32));
        assert_eq!(plain, Key::from_char('7'));

        let enter = winit::keyboard::Key::Named(NamedKey::Enter);
        assert_eq!(key(&enter, KeyLocation::Numpad), (Key::KP_ENTER, Key::ENTER));
        assert_eq!(
            key(&winit::keyboard::Key::Named(NamedKey::F5), KeyLocation::Standard).0,
            Key::function(5)
        );
    }

    #[test]
    fn modifiers_map_onto_the_state_mask() {
        let state = modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);

        assert_eq!(state, keyboard::State::CTRL | keyboard::State::SHIFT);
        assert!(modifiers(ModifiersState::empty()).is_empty());
    }

    #[test]
    fn precise_scrolling_accumulates_into_steps() {
        let mut rest = (0.0, 0.0);
        let pixels = |y| MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, y));

        assert_eq!(wheel_steps(pixels(-12.0), &mut rest), (0, 0));
        assert_eq!(wheel_steps(pixels(-12.0), &mut rest), (0, 1));
        assert_eq!(wheel_steps(MouseScrollDelta::LineDelta(0.0, 2.0), &mut rest), (0, -2));
        assert_eq!(rest, (0.0, 0.0));
    }

    #[test]
    fn physical_pixels_are_scaled_down() {
        assert_eq!(point(PhysicalPosition::new(300.0, 150.0), 1.5), Point::new(200, 100));
        assert_eq!(size(PhysicalSize::new(800, 600), 2.0), Size::new(400, 300));
        assert_eq!(mouse_button(MouseButton::Other(9)), None);
    }
}
