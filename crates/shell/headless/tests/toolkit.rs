use flint_headless::Headless;
use flint_runtime::core::event::{Kind, Record};
use flint_runtime::core::graphics::Graphics;
use flint_runtime::core::keyboard::Key;
use flint_runtime::core::time::{self, Duration, Instant};
use flint_runtime::core::widget::{Base, Group, Shell, Widget};
use flint_runtime::core::{Point, Rectangle, Rgba, Settings, Size, window};
use flint_runtime::native;
use flint_runtime::{Error, Repeat, Status, Toolkit};

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(Kind, Point)>>>;

const RED: Rgba = Rgba::opaque(255, 0, 0);

struct Probe {
    base: Base,
    seen: Log,
    consumes: Vec<Kind>,
    fill: Option<Rgba>,
    focus_on_push: bool,
}

impl Probe {
    fn new(bounds: Rectangle, seen: &Log) -> Self {
        Self {
            base: Base::new(bounds),
            seen: Rc::clone(seen),
            consumes: Vec::new(),
            fill: None,
            focus_on_push: false,
        }
    }

    fn consuming(mut self, kind: Kind) -> Self {
        self.consumes.push(kind);
        self
    }

    fn filled(mut self, color: Rgba) -> Self {
        self.fill = Some(color);
        self
    }

    fn focusing(mut self) -> Self {
        self.focus_on_push = true;
        self.consumes.push(Kind::PUSH);
        self
    }
}

impl Widget for Probe {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn handle(&mut self, event: &Record, shell: &mut Shell) -> bool {
        self.seen.borrow_mut().push((event.kind, event.position()));

        if self.focus_on_push && event.kind == Kind::PUSH {
            shell.request_focus(self.id());
        }

        self.consumes.contains(&event.kind)
    }

    fn draw(&self, gc: &mut dyn Graphics) {
        if let Some(color) = self.fill {
            gc.fill(self.bounds(), color);
        }
    }
}

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn kinds(log: &Log) -> Vec<Kind> {
    log.borrow().iter().map(|(kind, _)| *kind).collect()
}

fn toolkit(backend: &Headless) -> Toolkit<Headless> {
    Toolkit::new(backend.clone(), Settings::default()).expect("toolkit")
}

fn probe_window(
    toolkit: &mut Toolkit<Headless>,
    settings: window::Settings,
    seen: &Log,
) -> window::Id {
    let bounds = Rectangle::with_size(Point::ORIGIN, settings.size);

    toolkit.add_window(settings, Probe::new(bounds, seen))
}

fn press(position: Point) -> native::Kind {
    native::Kind::ButtonPressed {
        button: 1,
        position,
        clicks: None,
    }
}

#[test]
fn the_display_is_opened_once() {
    let backend = Headless::new();
    let _toolkit = toolkit(&backend);

    assert_eq!(backend.display_opens(), 1);
}

#[test]
fn invalid_configurations_fail_fast() {
    let settings = Settings {
        scale: Some(0.0),
        ..Settings::default()
    };

    assert!(matches!(
        Toolkit::new(Headless::new(), settings),
        Err(Error::Settings(_))
    ));

    assert!(matches!(
        Toolkit::new(
            Headless::new().fail_display("no seat"),
            Settings::default()
        ),
        Err(Error::Display(_))
    ));
}

#[test]
fn the_registry_holds_exactly_the_shown_windows() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let a = probe_window(&mut toolkit, window::Settings::new("a", Size::new(100, 80)), &seen);
    let b = probe_window(&mut toolkit, window::Settings::new("b", Size::new(100, 80)), &seen);
    let c = probe_window(
        &mut toolkit,
        window::Settings::new("c", Size::new(20, 20))
            .at(Point::new(5, 5))
            .child_of(a),
        &seen,
    );

    let steps: [(window::Id, bool); 9] = [
        (a, true),
        (c, true),
        (b, true),
        (a, false),
        (b, false),
        (a, true),
        (a, true),
        (c, false),
        (b, true),
    ];

    for (window, show) in steps {
        if show {
            let _ = toolkit.show(window);
        } else {
            let _ = toolkit.hide(window);
        }

        let registered: BTreeSet<_> = toolkit.registry().windows().into_iter().collect();
        let shown: BTreeSet<_> = [a, b, c]
            .into_iter()
            .filter(|id| toolkit.is_shown(*id))
            .collect();

        assert_eq!(registered, shown);
    }
}

#[test]
fn showing_and_hiding_frees_the_native_window_exactly_once() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let id = probe_window(
        &mut toolkit,
        window::Settings::new("scenario", Size::new(200, 100)),
        &seen,
    );

    assert_eq!(toolkit.status(id), Some(Status::Unshown));
    assert!(toolkit.show(id));

    let native = toolkit.native(id).expect("native window");
    let canvas = backend.snapshot(native).expect("canvas");

    assert_eq!(canvas.size, Size::new(200, 100));
    assert_eq!(backend.windows_created(), 1);
    assert!(backend.native_window(native).is_some_and(|window| window.mapped));
    assert_eq!(kinds(&seen), vec![Kind::FOCUS, Kind::SHOW]);
    assert!(toolkit.is_damaged(id));

    let _ = toolkit.wait(Duration::ZERO);
    assert!(!toolkit.is_damaged(id));

    assert!(toolkit.hide(id));
    assert!(!toolkit.hide(id));

    assert_eq!(toolkit.status(id), Some(Status::Hidden));
    assert_eq!(toolkit.native(id), None);
    assert!(!toolkit.registry().contains(id));
    assert_eq!(backend.destroyed(native), 1);
    assert_eq!(kinds(&seen).last(), Some(&Kind::HIDE));

    assert!(toolkit.show(id));

    let again = toolkit.native(id).expect("native window");
    assert_ne!(again, native);

    drop(toolkit);

    assert_eq!(backend.destroyed(native), 1);
    assert_eq!(backend.destroyed(again), 1);
    assert!(backend.native_windows().is_empty());
}

#[test]
fn a_window_without_native_window_is_still_registered() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let id = probe_window(&mut toolkit, window::Settings::new("degraded", Size::new(50, 50)), &seen);

    backend.fail_next_window();

    assert!(toolkit.show(id));
    assert!(toolkit.is_shown(id));
    assert!(toolkit.registry().contains(id));
    assert_eq!(toolkit.native(id), None);

    let _ = toolkit.wait(Duration::ZERO);

    assert!(toolkit.hide(id));
    assert_eq!(backend.windows_created(), 0);
}

#[test]
fn child_windows_are_composited_into_their_parent() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let parent = probe_window(&mut toolkit, window::Settings::new("parent", Size::new(200, 100)), &seen);
    let child = toolkit.add_window(
        window::Settings::new("child", Size::new(40, 30))
            .at(Point::new(50, 20))
            .child_of(parent),
        Probe::new(Rectangle::new(0, 0, 40, 30), &seen).filled(RED),
    );

    assert!(!toolkit.show(child));
    assert_eq!(toolkit.status(child), Some(Status::Unshown));

    assert!(toolkit.show(parent));
    assert!(toolkit.is_shown(child));
    assert_eq!(toolkit.native(child), None);
    assert_eq!(backend.windows_created(), 1);

    let _ = toolkit.wait(Duration::ZERO);

    let native = toolkit.native(parent).expect("native window");
    let canvas = backend.snapshot(native).expect("canvas");

    assert_eq!(canvas.pixel(60, 30), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(89, 49), Some([255, 0, 0, 255]));
    assert_ne!(canvas.pixel(90, 50), Some([255, 0, 0, 255]));
    assert_ne!(canvas.pixel(10, 10), Some([255, 0, 0, 255]));

    assert!(toolkit.hide(parent));
    assert!(!toolkit.is_shown(child));
    assert_eq!(backend.destroyed(native), 1);
}

#[test]
fn wait_zero_returns_promptly() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let start = Instant::now();
    let handled = toolkit.wait(Duration::ZERO);

    assert!(!handled);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn wait_is_bounded_by_its_timeout() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let start = Instant::now();
    let _ = toolkit.wait(Duration::from_millis(50));
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(40));
    assert!(elapsed < Duration::from_secs(5));
}

#[test]
fn wait_is_bounded_by_the_next_timer() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);

    let _ = toolkit.add_timeout(Duration::from_millis(30), move |_| {
        flag.set(true);
        Repeat::Never
    });

    let start = Instant::now();
    let _ = toolkit.wait(time::FOREVER);

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(fired.get());
}

#[test]
fn timeouts_repeat_until_they_stop() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);

    let id = toolkit.add_timeout(Duration::from_millis(1), move |_| {
        counter.set(counter.get() + 1);

        if counter.get() < 3 {
            Repeat::After(Duration::from_millis(1))
        } else {
            Repeat::Never
        }
    });

    let start = Instant::now();

    while count.get() < 3 && start.elapsed() < Duration::from_secs(5) {
        let _ = toolkit.wait(Duration::from_millis(50));
    }

    assert_eq!(count.get(), 3);
    assert!(!toolkit.has_timeout(id));

    let cancelled = toolkit.add_timeout(Duration::from_millis(1), |_| unreachable!());

    assert!(toolkit.remove_timeout(cancelled));

    let _ = toolkit.wait(Duration::from_millis(10));
}

#[test]
fn the_idle_callback_makes_waits_poll() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);

    toolkit.set_idle(move |toolkit| {
        counter.set(counter.get() + 1);

        if counter.get() == 2 {
            toolkit.clear_idle();
        }
    });

    let start = Instant::now();

    let _ = toolkit.wait(time::FOREVER);
    let _ = toolkit.wait(time::FOREVER);

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(runs.get(), 2);

    let _ = toolkit.wait(Duration::ZERO);
    assert_eq!(runs.get(), 2);
}

#[test]
fn an_unconsumed_close_hides_the_window() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let closing = probe_window(&mut toolkit, window::Settings::new("closing", Size::new(50, 50)), &seen);
    let staying = toolkit.add_window(
        window::Settings::new("staying", Size::new(50, 50)),
        Probe::new(Rectangle::new(0, 0, 50, 50), &seen).consuming(Kind::CLOSE),
    );

    let _ = toolkit.show(closing);
    let _ = toolkit.show(staying);

    let closing_native = toolkit.native(closing).expect("native window");
    let staying_native = toolkit.native(staying).expect("native window");

    backend.push(closing_native, native::Kind::CloseRequested);
    backend.push(staying_native, native::Kind::CloseRequested);

    assert!(toolkit.wait(Duration::ZERO));

    assert_eq!(toolkit.status(closing), Some(Status::Hidden));
    assert_eq!(backend.destroyed(closing_native), 1);
    assert!(toolkit.is_shown(staying));
}

#[test]
fn the_grab_window_receives_all_input() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let (seen_a, seen_b) = (log(), log());

    let a = probe_window(
        &mut toolkit,
        window::Settings::new("a", Size::new(200, 100)).at(Point::new(100, 100)),
        &seen_a,
    );
    let b = probe_window(
        &mut toolkit,
        window::Settings::new("b", Size::new(100, 100)).at(Point::new(300, 200)),
        &seen_b,
    );

    let _ = toolkit.show(a);
    let _ = toolkit.show(b);

    seen_a.borrow_mut().clear();
    seen_b.borrow_mut().clear();

    assert!(toolkit.set_grab(Some(b)));

    let native_a = toolkit.native(a).expect("native window");
    backend.push(native_a, press(Point::new(10, 10)));
    let _ = toolkit.wait(Duration::ZERO);

    assert!(seen_a.borrow().is_empty());
    assert_eq!(*seen_b.borrow(), vec![(Kind::PUSH, Point::new(-190, -90))]);

    assert!(toolkit.set_grab(None));

    backend.push(native_a, press(Point::new(10, 10)));
    let _ = toolkit.wait(Duration::ZERO);

    assert_eq!(*seen_a.borrow(), vec![(Kind::PUSH, Point::new(10, 10))]);

    let _ = toolkit.set_grab(Some(b));
    let _ = toolkit.hide(b);

    assert_eq!(toolkit.grab(), None);
}

#[test]
fn keys_go_to_the_focus_widget_then_become_shortcuts() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let (seen_root, seen_field) = (log(), log());

    let mut root = Group::new(Rectangle::new(0, 0, 100, 100));
    let field = root.add(Probe::new(Rectangle::new(10, 10, 30, 20), &seen_field).focusing());
    let _ = root.add(Probe::new(Rectangle::new(50, 10, 30, 20), &seen_root));

    let id = toolkit.add_window(window::Settings::new("keys", Size::new(100, 100)), root);
    let _ = toolkit.show(id);
    let native = toolkit.native(id).expect("native window");

    backend.push(native, press(Point::new(15, 15)));
    let _ = toolkit.wait(Duration::ZERO);

    assert_eq!(toolkit.focused_widget(id), Some(field));
    assert_eq!(toolkit.pushed().map(|(_, widget)| widget), Some(field));
    assert!(kinds(&seen_field).contains(&Kind::FOCUS));

    seen_field.borrow_mut().clear();
    seen_root.borrow_mut().clear();

    backend.push(
        native,
        native::Kind::KeyPressed {
            key: Key::from_char('q'),
            original_key: Key::from_char('q'),
            text: "q".into(),
        },
    );
    let _ = toolkit.wait(Duration::ZERO);

    assert_eq!(kinds(&seen_field), vec![Kind::KEYDOWN, Kind::SHORTCUT]);
    assert_eq!(kinds(&seen_root), vec![Kind::SHORTCUT]);
    assert_eq!(toolkit.event().text.as_str(), "q");
}

#[test]
fn native_resizes_update_the_window() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);
    let seen = log();

    let id = probe_window(&mut toolkit, window::Settings::new("resize", Size::new(50, 50)), &seen);
    let _ = toolkit.show(id);
    let _ = toolkit.wait(Duration::ZERO);

    let native = toolkit.native(id).expect("native window");
    backend.push(native, native::Kind::Resized(Size::new(300, 150)));
    backend.push(native, native::Kind::Moved(Point::new(40, 30)));
    let _ = toolkit.wait(Duration::ZERO);

    let settings = toolkit.window(id).expect("window");

    assert_eq!(settings.bounds(), Rectangle::new(40, 30, 300, 150));
    assert_eq!(
        toolkit.root(id).map(|root| root.bounds()),
        Some(Rectangle::new(0, 0, 300, 150))
    );

    toolkit.set_label(id, "renamed");

    assert_eq!(
        backend.native_window(native).map(|window| window.label),
        Some(String::from("renamed"))
    );
}

#[test]
fn surfaces_draw_offscreen() {
    let backend = Headless::new();
    let mut toolkit = toolkit(&backend);

    let image = toolkit
        .image_surface(Size::new(8, 8), |gc| gc.rectf(0, 0, 4, 4))
        .expect("image surface");

    assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(image.pixel(6, 6), Some([0, 0, 0, 0]));

    toolkit
        .copy_surface(Size::new(8, 8), |gc| gc.rectf(0, 0, 8, 8))
        .expect("copy surface");

    assert_eq!(
        backend.clipboard_image().map(|image| image.size),
        Some(Size::new(8, 8))
    );

    toolkit.copy("hello");
    assert_eq!(toolkit.paste().as_deref(), Some("hello"));
}
