//! Decode native events into toolkit events.
//!
//! The [`Decoder`] keeps the state that native platforms only report as
//! deltas: held buttons and modifiers, the multi-click count and the
//! progress of touch gestures. It writes the event record and hands the
//! resulting event kinds to a [`Sink`].
use crate::core::event::{self, Kind, Record};
use crate::core::keyboard::{Key, State};
use crate::core::time::{Duration, Instant};
use crate::core::{Point, Settings, Size, window};
use crate::native::{self, Angle, Gesture, NativeId, Pan, Pinch};

use smol_str::SmolStr;

/// Rotations smaller than this many degrees are not reported.
const MIN_ROTATION: f64 = 0.01;

/// A change of window geometry reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Configure {
    /// The window has a new size.
    Resized(Size),
    /// The window has a new position on the screen.
    Moved(Point),
    /// The window must be redrawn.
    Exposed,
}

/// The receiver of decoded events.
pub trait Sink {
    /// Returns the toolkit window of a native window and its screen position.
    fn locate(&self, native: NativeId) -> Option<(window::Id, Point)>;

    /// Returns the event record to write.
    fn record(&mut self) -> &mut Record;

    /// Dispatches the event in the record; returns true if it was consumed.
    fn dispatch(&mut self, kind: Kind, window: window::Id) -> bool;

    /// Applies a geometry change.
    fn configure(&mut self, window: window::Id, change: Configure);
}

#[derive(Debug, Clone, Copy)]
struct Push {
    button: u8,
    position: Point,
    time: Instant,
}

#[derive(Debug, Default, Clone, Copy)]
struct Gestures {
    begin: bool,
    distance: Option<f64>,
    pan: Option<Point>,
    start_angle: f64,
    angle: f64,
}

/// Turns native events into toolkit events.
#[derive(Debug, Clone)]
pub struct Decoder {
    state: State,
    last_push: Option<Push>,
    clicks: u32,
    double_click_interval: Duration,
    click_tolerance: i32,
    gestures: Gestures,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Decoder {
    /// Creates a [`Decoder`] with the click metrics of `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: State::empty(),
            last_push: None,
            clicks: 0,
            double_click_interval: settings.double_click_interval,
            click_tolerance: settings.click_tolerance,
            gestures: Gestures::default(),
        }
    }

    /// Returns the held buttons and modifiers.
    pub fn state(&self) -> State {
        self.state
    }

    /// Decodes one native event.
    ///
    /// Returns true if the event was handled, even when it produced no
    /// toolkit event (like a pinch that did not change the distance).
    pub fn decode(&mut self, event: native::Event, sink: &mut dyn Sink) -> bool {
        let Some((window, origin)) = sink.locate(event.window) else {
            log::trace!("ignoring event of unknown window {}: {:?}", event.window, event.kind);
            return false;
        };

        match event.kind {
            native::Kind::ButtonPressed {
                button,
                position,
                clicks,
            } => {
                self.state |= State::button(button);
                self.count_click(button, position, clicks);

                let record = self.locate_pointer(sink, origin, position);
                record.key = Key::button(button);
                record.original_key = record.key;
                record.clicks = self.clicks;
                record.is_click = true;

                sink.dispatch(Kind::PUSH, window)
            }
            native::Kind::ButtonReleased { button, position } => {
                self.state.remove(State::button(button));
                self.check_drag(position);

                let record = self.locate_pointer(sink, origin, position);
                record.key = Key::button(button);
                record.original_key = record.key;

                sink.dispatch(Kind::RELEASE, window)
            }
            native::Kind::CursorMoved { position } => {
                self.check_drag(position);

                let dragging = self.state.intersects(State::BUTTONS);
                let _ = self.locate_pointer(sink, origin, position);

                sink.dispatch(if dragging { Kind::DRAG } else { Kind::MOVE }, window)
            }
            native::Kind::CursorEntered { position } => {
                let _ = self.locate_pointer(sink, origin, position);

                sink.dispatch(Kind::ENTER, window)
            }
            native::Kind::CursorLeft => {
                let _ = self.write_state(sink);

                sink.dispatch(Kind::LEAVE, window)
            }
            native::Kind::Wheel { dx, dy } => {
                let record = self.write_state(sink);
                record.dx = dx;
                record.dy = dy;

                sink.dispatch(Kind::MOUSEWHEEL, window)
            }
            native::Kind::KeyPressed {
                key,
                original_key,
                text,
            } => {
                if let Some(modifier) = key.modifier() {
                    self.state |= modifier;
                }

                let record = self.write_state(sink);
                record.key = key;
                record.original_key = original_key;
                record.text = text;

                sink.dispatch(Kind::KEYDOWN, window)
            }
            native::Kind::KeyReleased { key } => {
                if let Some(modifier) = key.modifier() {
                    self.state.remove(modifier);
                }

                let record = self.write_state(sink);
                record.key = key;
                record.original_key = key;
                record.text = SmolStr::default();

                sink.dispatch(Kind::KEYUP, window)
            }
            native::Kind::ModifiersChanged(modifiers) => {
                self.state = (self.state & State::BUTTONS) | (modifiers - State::BUTTONS);
                let _ = self.write_state(sink);

                true
            }
            native::Kind::Gesture(gesture) => self.gesture(gesture, window, sink),
            native::Kind::Focused(focused) => {
                let _ = self.write_state(sink);

                sink.dispatch(
                    if focused { Kind::FOCUS } else { Kind::UNFOCUS },
                    window,
                )
            }
            native::Kind::CloseRequested => sink.dispatch(Kind::CLOSE, window),
            native::Kind::Resized(size) => {
                sink.configure(window, Configure::Resized(size));
                true
            }
            native::Kind::Moved(position) => {
                sink.configure(window, Configure::Moved(position));
                true
            }
            native::Kind::Exposed => {
                sink.configure(window, Configure::Exposed);
                true
            }
            native::Kind::Unknown => {
                log::trace!("ignoring unknown native event of {}", event.window);
                false
            }
        }
    }

    fn count_click(&mut self, button: u8, position: Point, reported: Option<u32>) {
        let now = Instant::now();
        let tolerance = i64::from(self.click_tolerance).pow(2);

        let repeated = self.last_push.is_some_and(|last| {
            last.button == button
                && now.saturating_duration_since(last.time) <= self.double_click_interval
                && last.position.distance_squared(position) <= tolerance
        });

        self.clicks = match reported {
            Some(count) => count.saturating_sub(1),
            None if repeated => self.clicks + 1,
            None => 0,
        };

        self.last_push = Some(Push {
            button,
            position,
            time: now,
        });
    }

    fn check_drag(&mut self, position: Point) {
        let tolerance = i64::from(self.click_tolerance).pow(2);

        if let Some(last) = self.last_push
            && last.position.distance_squared(position) > tolerance
        {
            self.last_push = None;
            self.clicks = 0;
        }
    }

    fn write_state<'a>(&self, sink: &'a mut dyn Sink) -> &'a mut Record {
        let record = sink.record();
        record.state = self.state;
        record.is_click = self.last_push.is_some();
        record.dx = 0;
        record.dy = 0;
        record
    }

    fn locate_pointer<'a>(
        &self,
        sink: &'a mut dyn Sink,
        origin: Point,
        position: Point,
    ) -> &'a mut Record {
        let record = self.write_state(sink);
        record.x = position.x;
        record.y = position.y;
        record.x_root = origin.x + position.x;
        record.y_root = origin.y + position.y;
        record
    }

    fn gesture(&mut self, gesture: Gesture, window: window::Id, sink: &mut dyn Sink) -> bool {
        match gesture {
            Gesture::Begin => {
                self.gestures = Gestures {
                    begin: true,
                    ..Gestures::default()
                };
                true
            }
            Gesture::End => {
                self.gestures = Gestures::default();
                true
            }
            Gesture::Zoom(pinch) => {
                let factor = match pinch {
                    Pinch::Distance(distance) => {
                        let previous = self.gestures.distance.replace(distance);

                        match previous {
                            Some(previous) if !self.gestures.begin && previous > 0.0 => {
                                if distance == previous {
                                    return true;
                                }
                                distance / previous
                            }
                            _ => {
                                self.gestures.begin = false;
                                return true;
                            }
                        }
                    }
                    Pinch::Delta(delta) => {
                        if delta == 0.0 {
                            return true;
                        }
                        1.0 + delta
                    }
                };

                let record = self.write_state(sink);
                record.clear_values();
                record.dy = ((factor - 1.0) * 1000.0) as i32;
                record.values[event::slot::ZOOM_FACTOR] = factor;

                let _ = sink.dispatch(Kind::ZOOM_GESTURE, window);
                true
            }
            Gesture::Pan(pan) => {
                let (dx, dy) = match pan {
                    Pan::Position { position, distance } => {
                        if self.gestures.begin || self.gestures.pan.is_none() {
                            self.gestures.begin = false;
                            self.gestures.pan = Some(position);
                            return true;
                        }

                        if distance == 0 {
                            return false;
                        }

                        let previous = self.gestures.pan.replace(position).unwrap_or(position);
                        (position.x - previous.x, position.y - previous.y)
                    }
                    Pan::Delta { dx, dy } => (dx, dy),
                };

                if dx == 0 && dy == 0 {
                    return true;
                }

                self.scroll(dx, dy, window, sink);
                true
            }
            Gesture::Rotate(angle) => {
                let rotation = match angle {
                    Angle::FromStart(degrees) if self.gestures.begin => {
                        self.gestures.begin = false;
                        self.gestures.start_angle = degrees;
                        self.gestures.angle = degrees;
                        return true;
                    }
                    Angle::FromStart(degrees) => {
                        let current = self.gestures.start_angle + degrees;
                        let rotation = current - self.gestures.angle;

                        if rotation.abs() < MIN_ROTATION {
                            return true;
                        }

                        self.gestures.angle = current;
                        rotation
                    }
                    Angle::Delta(degrees) => {
                        if degrees.abs() < MIN_ROTATION {
                            return true;
                        }

                        self.gestures.angle += degrees;
                        degrees
                    }
                };

                let record = self.write_state(sink);
                record.clear_values();
                record.values[event::slot::ROTATION] = rotation;

                let _ = sink.dispatch(Kind::ROTATE_GESTURE, window);
                true
            }
        }
    }

    /// Sends each axis as its own scroll gesture, falling back to a wheel
    /// event when nobody takes it.
    fn scroll(&self, dx: i32, dy: i32, window: window::Id, sink: &mut dyn Sink) {
        for (horizontal, delta) in [(true, dx), (false, dy)] {
            if delta == 0 {
                continue;
            }

            let record = self.write_state(sink);
            record.clear_values();

            if horizontal {
                record.values[event::slot::SCROLL_X] = f64::from(delta);
            } else {
                record.values[event::slot::SCROLL_Y] = f64::from(delta);
            }

            if sink.dispatch(Kind::SCROLL_GESTURE, window) {
                continue;
            }

            let record = sink.record();
            (record.dx, record.dy) = if horizontal { (-delta, 0) } else { (0, -delta) };

            let _ = sink.dispatch(Kind::MOUSEWHEEL, window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        window: Option<window::Id>,
        record: Record,
        accept: bool,
        seen: Vec<(Kind, Record)>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                window: Some(window::Id::unique()),
                accept: true,
                ..Self::default()
            }
        }

        fn kinds(&self) -> Vec<Kind> {
            self.seen.iter().map(|(kind, _)| *kind).collect()
        }
    }

    impl Sink for Probe {
        fn locate(&self, _native: NativeId) -> Option<(window::Id, Point)> {
            self.window.map(|window| (window, Point::new(100, 50)))
        }

        fn record(&mut self) -> &mut Record {
            &mut self.record
        }

        fn dispatch(&mut self, kind: Kind, _window: window::Id) -> bool {
            self.seen.push((kind, self.record.clone()));
            self.accept
        }

        fn configure(&mut self, _window: window::Id, _change: Configure) {}
    }

    fn send(decoder: &mut Decoder, probe: &mut Probe, kind: native::Kind) -> bool {
        decoder.decode(native::Event::new(NativeId(1), kind), probe)
    }

    fn zoom(distance: f64) -> native::Kind {
        native::Kind::Gesture(Gesture::Zoom(Pinch::Distance(distance)))
    }

    #[test]
    fn button_state_persists_across_events() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::new();

        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::ButtonPressed {
                button: 1,
                position: Point::new(10, 10),
                clicks: None,
            },
        );
        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::CursorMoved {
                position: Point::new(40, 10),
            },
        );
        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::ButtonReleased {
                button: 1,
                position: Point::new(40, 10),
            },
        );
        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::CursorMoved {
                position: Point::new(41, 10),
            },
        );

        assert_eq!(
            probe.kinds(),
            vec![Kind::PUSH, Kind::DRAG, Kind::RELEASE, Kind::MOVE]
        );

        let (_, push) = &probe.seen[0];
        assert!(push.state.contains(State::BUTTON1));
        assert_eq!((push.x_root, push.y_root), (110, 60));
        assert_eq!(push.button(), Some(1));

        let (_, drag) = &probe.seen[1];
        assert!(!drag.is_click);
        assert!(!probe.seen[2].1.state.contains(State::BUTTON1));
    }

    #[test]
    fn close_pushes_count_as_multi_clicks() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::new();

        for x in [10, 12, 13] {
            let _ = send(
                &mut decoder,
                &mut probe,
                native::Kind::ButtonPressed {
                    button: 1,
                    position: Point::new(x, 10),
                    clicks: None,
                },
            );
            let _ = send(
                &mut decoder,
                &mut probe,
                native::Kind::ButtonReleased {
                    button: 1,
                    position: Point::new(x, 10),
                },
            );
        }

        let clicks: Vec<u32> = probe
            .seen
            .iter()
            .filter(|(kind, _)| *kind == Kind::PUSH)
            .map(|(_, record)| record.clicks)
            .collect();

        assert_eq!(clicks, vec![0, 1, 2]);
    }

    #[test]
    fn modifier_keys_update_the_state() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::new();

        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::KeyPressed {
                key: Key::CONTROL_L,
                original_key: Key::CONTROL_L,
                text: "".into(),
            },
        );
        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::KeyPressed {
                key: Key::from_char('s'),
                original_key: Key::from_char('s'),
                text: "s".into(),
            },
        );

        assert!(probe.seen[1].1.ctrl());
        assert_eq!(probe.seen[1].1.text, "s");

        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::KeyReleased {
                key: Key::CONTROL_R,
            },
        );

        assert!(!decoder.state().contains(State::CTRL));
    }

    #[test]
    fn zoom_factor_is_the_ratio_of_distances() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::new();

        assert!(send(
            &mut decoder,
            &mut probe,
            native::Kind::Gesture(Gesture::Begin)
        ));
        assert!(send(&mut decoder, &mut probe, zoom(100.0)));
        assert!(probe.seen.is_empty());

        assert!(send(&mut decoder, &mut probe, zoom(150.0)));
        assert_eq!(probe.kinds(), vec![Kind::ZOOM_GESTURE]);

        let (_, record) = &probe.seen[0];
        assert_eq!(record.value(event::slot::ZOOM_FACTOR), 1.5);
        assert_eq!(record.dy, 500);

        assert!(send(&mut decoder, &mut probe, zoom(150.0)));
        assert_eq!(probe.seen.len(), 1);

        assert!(send(&mut decoder, &mut probe, zoom(75.0)));
        assert_eq!(probe.seen[1].1.value(event::slot::ZOOM_FACTOR), 0.5);
    }

    #[test]
    fn unconsumed_pans_fall_back_to_the_wheel() {
        let mut decoder = Decoder::default();
        let mut probe = Probe {
            accept: false,
            ..Probe::new()
        };

        let pan = |x, y| {
            native::Kind::Gesture(Gesture::Pan(Pan::Position {
                position: Point::new(x, y),
                distance: 40,
            }))
        };

        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::Gesture(Gesture::Begin),
        );
        assert!(send(&mut decoder, &mut probe, pan(10, 10)));
        assert!(send(&mut decoder, &mut probe, pan(13, 8)));

        assert_eq!(
            probe.kinds(),
            vec![
                Kind::SCROLL_GESTURE,
                Kind::MOUSEWHEEL,
                Kind::SCROLL_GESTURE,
                Kind::MOUSEWHEEL
            ]
        );
        assert_eq!(probe.seen[0].1.value(event::slot::SCROLL_X), 3.0);
        assert_eq!((probe.seen[1].1.dx, probe.seen[1].1.dy), (-3, 0));
        assert_eq!(probe.seen[2].1.value(event::slot::SCROLL_Y), -2.0);
        assert_eq!((probe.seen[3].1.dx, probe.seen[3].1.dy), (0, 2));

        let single_finger = native::Kind::Gesture(Gesture::Pan(Pan::Position {
            position: Point::new(20, 20),
            distance: 0,
        }));
        assert!(!send(&mut decoder, &mut probe, single_finger));
    }

    #[test]
    fn rotation_is_relative_to_the_previous_event() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::new();

        let rotate = |degrees| native::Kind::Gesture(Gesture::Rotate(Angle::FromStart(degrees)));

        let _ = send(
            &mut decoder,
            &mut probe,
            native::Kind::Gesture(Gesture::Begin),
        );
        let _ = send(&mut decoder, &mut probe, rotate(30.0));
        let _ = send(&mut decoder, &mut probe, rotate(10.0));
        let _ = send(&mut decoder, &mut probe, rotate(10.001));
        let _ = send(&mut decoder, &mut probe, rotate(25.0));

        let rotations: Vec<f64> = probe
            .seen
            .iter()
            .map(|(_, record)| record.value(event::slot::ROTATION))
            .collect();

        assert_eq!(rotations.len(), 2);
        assert!((rotations[0] - 10.0).abs() < 1e-9);
        assert!((rotations[1] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn events_of_unknown_windows_are_ignored() {
        let mut decoder = Decoder::default();
        let mut probe = Probe::default();

        assert!(!send(&mut decoder, &mut probe, native::Kind::CloseRequested));
        assert!(probe.seen.is_empty());
    }
}
