use flint_headless::Headless;
use flint_menu::{Item, Menu, MenuBar, Picked, Request, Session, State};
use flint_runtime::Toolkit;
use flint_runtime::core::keyboard::{self, Key, Shortcut};
use flint_runtime::core::time::Duration;
use flint_runtime::core::widget::{self, Callback, Group, Widget};
use flint_runtime::core::{Point, Rectangle, Settings, Size, window};
use flint_runtime::native::{self, NativeId};

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Action {
    New,
    Open,
    Recent,
    Copy,
    Paste,
    Help,
}

fn items() -> Vec<Item<Action>> {
    vec![
        Item::submenu(
            "File",
            vec![
                Item::entry("New", Action::New),
                Item::entry("Open", Action::Open),
                Item::submenu("Recent", vec![Item::entry("notes.txt", Action::Recent)]),
            ],
        ),
        Item::submenu(
            "Edit",
            vec![
                Item::entry("Copy", Action::Copy)
                    .shortcut(Shortcut::char(keyboard::State::CTRL, 'c')),
                Item::divider(),
                Item::entry("Paste", Action::Paste),
            ],
        ),
        Item::entry("Help", Action::Help),
    ]
}

struct App {
    backend: Headless,
    toolkit: Toolkit<Headless>,
    window: window::Id,
    native: NativeId,
    bar: widget::Id,
    titles: Vec<Rectangle>,
}

impl App {
    fn new() -> Self {
        Self::with_bar(MenuBar::new(Rectangle::new(0, 0, 400, 24), items()))
    }

    fn with_bar(bar: MenuBar<Action>) -> Self {
        let backend = Headless::new();
        let mut toolkit = Toolkit::new(backend.clone(), Settings::default()).expect("toolkit");

        let id = bar.id();
        let root = Group::new(Rectangle::new(0, 0, 400, 300)).push(bar);
        let window = toolkit.add_window(
            window::Settings::new("app", Size::new(400, 300)).at(Point::new(100, 100)),
            root,
        );

        assert!(toolkit.show(window));

        // The first flush lays the titles out.
        let _ = toolkit.wait(Duration::ZERO);

        let native = toolkit.native(window).expect("native window");

        let mut app = Self {
            backend,
            toolkit,
            window,
            native,
            bar: id,
            titles: Vec::new(),
        };

        app.titles = app.menubar().titles();
        app
    }

    fn menubar(&self) -> &MenuBar<Action> {
        let widget: &dyn Any = self.toolkit.widget(self.window, self.bar).expect("bar");
        widget.downcast_ref().expect("menu bar")
    }

    fn click_title(&mut self, title: usize) -> Session<Action> {
        let position = Point::new(self.titles[title].x + 3, 10);
        self.backend.push(self.native, press(position));
        let _ = self.toolkit.wait(Duration::ZERO);

        let request = self
            .toolkit
            .take_messages()
            .into_iter()
            .find_map(|message| message.downcast::<Request<Action>>().ok())
            .expect("menu request");

        Session::menubar(&mut self.toolkit, self.window, *request)
    }

    fn release_title(&mut self, session: &mut Session<Action>, title: usize) {
        let position = Point::new(self.titles[title].x + 3, 10);
        self.backend.push(self.native, release(position));
        let _ = session.step(&mut self.toolkit, Duration::ZERO);
    }

    fn keys(&mut self, session: &mut Session<Action>, keys: &[Key]) {
        for key in keys {
            self.backend.push(self.native, pressed(*key));
            let _ = session.step(&mut self.toolkit, Duration::ZERO);
        }
    }
}

fn press(position: Point) -> native::Kind {
    native::Kind::ButtonPressed {
        button: 1,
        position,
        clicks: None,
    }
}

fn release(position: Point) -> native::Kind {
    native::Kind::ButtonReleased {
        button: 1,
        position,
    }
}

fn pressed(key: Key) -> native::Kind {
    native::Kind::KeyPressed {
        key,
        original_key: key,
        text: "".into(),
    }
}

#[test]
fn escape_closes_every_level_and_releases_the_grab() {
    let mut app = App::new();
    assert_eq!(app.titles.len(), 3);

    let mut session = app.click_title(1);

    assert_eq!(session.state(), State::Push);
    assert_eq!(session.levels(), 2);
    assert_eq!(session.highlight(0), Some(1));

    let popup = session.window(1).expect("popup window");
    let below = Point::new(100 + app.titles[1].x, 100 + 24);

    assert_eq!(
        app.toolkit.window(popup).map(|settings| settings.position),
        Some(below)
    );
    assert_eq!(session.bounds(1).map(|bounds| bounds.position()), Some(below));
    assert_eq!(
        app.toolkit.window(popup).map(|settings| settings.kind),
        Some(window::Kind::Menu)
    );
    assert!(app.toolkit.is_shown(popup));
    assert_eq!(app.toolkit.grab(), Some(popup));
    assert_eq!(app.menubar().open_title(), Some(1));
    assert_eq!(app.backend.native_windows().len(), 2);

    app.backend.push(app.native, pressed(Key::ESCAPE));
    assert!(session.step(&mut app.toolkit, Duration::from_secs(1)));

    assert_eq!(session.state(), State::Done);
    assert_eq!(session.levels(), 0);
    assert!(session.picked().is_none());
    assert!(app.toolkit.status(popup).is_none());
    assert_eq!(app.toolkit.grab(), None);
    assert_eq!(app.menubar().open_title(), None);
    assert_eq!(app.backend.native_windows(), vec![app.native]);
}

#[test]
fn the_opening_release_keeps_the_menu_and_a_second_click_picks() {
    let picks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&picks);

    let bar = MenuBar::new(Rectangle::new(0, 0, 400, 24), items())
        .on_pick(Callback::new(move |_| counter.set(counter.get() + 1)));
    let mut app = App::with_bar(bar);

    let mut session = app.click_title(1);
    app.release_title(&mut session, 1);

    assert_eq!(session.state(), State::Initial);
    assert_eq!(session.levels(), 2);

    let popup = session.window(1).expect("popup window");
    let native = app.toolkit.native(popup).expect("native popup");
    let paste = Point::new(5, 2 * 24 + 5);

    app.backend.push(native, press(paste));
    app.backend.push(native, release(paste));

    assert!(session.step(&mut app.toolkit, Duration::ZERO));
    assert_eq!(
        session.take_picked(),
        Some(Picked {
            path: vec![1, 2],
            message: Some(Action::Paste)
        })
    );
    assert_eq!(app.menubar().value(), Some(&[1, 2][..]));
    assert_eq!(picks.get(), 1);
    assert_eq!(app.toolkit.grab(), None);
}

#[test]
fn hovering_a_header_opens_its_level_beside_the_item() {
    let mut app = App::new();

    let mut session = app.click_title(0);
    app.release_title(&mut session, 0);

    let popup = session.window(1).expect("popup window");
    let native = app.toolkit.native(popup).expect("native popup");
    let level = session.bounds(1).expect("level bounds");

    app.backend.push(
        native,
        native::Kind::CursorMoved {
            position: Point::new(5, 2 * 24 + 5),
        },
    );
    let _ = session.step(&mut app.toolkit, Duration::ZERO);

    assert_eq!(session.levels(), 3);
    assert_eq!(session.highlight(1), Some(2));
    assert_eq!(
        session.bounds(2).map(|bounds| bounds.position()),
        Some(Point::new(level.right(), level.y + 2 * 24))
    );
    assert_eq!(app.toolkit.grab(), Some(popup));

    app.keys(&mut session, &[Key::RIGHT]);
    assert_eq!(session.current_level(), 2);
    assert_eq!(session.highlight(2), Some(0));

    app.keys(&mut session, &[Key::LEFT]);
    assert_eq!(session.levels(), 2);
    assert_eq!(session.current_level(), 1);

    app.keys(&mut session, &[Key::ENTER]);
    assert_eq!(session.levels(), 3);
    assert_eq!(session.current_level(), 2);

    app.keys(&mut session, &[Key::ENTER]);
    assert!(session.is_done());
    assert_eq!(
        session.picked().map(|picked| picked.path.clone()),
        Some(vec![0, 2, 0])
    );
    assert_eq!(
        session.picked().and_then(|picked| picked.message.clone()),
        Some(Action::Recent)
    );
}

#[test]
fn arrows_wrap_skip_dividers_and_walk_the_bar() {
    let mut app = App::new();

    let mut session = app.click_title(1);
    app.release_title(&mut session, 1);

    app.keys(&mut session, &[Key::DOWN]);
    assert_eq!(session.current_level(), 1);
    assert_eq!(session.highlight(1), Some(0));

    app.keys(&mut session, &[Key::DOWN]);
    assert_eq!(session.highlight(1), Some(2));

    app.keys(&mut session, &[Key::DOWN]);
    assert_eq!(session.highlight(1), Some(0));

    app.keys(&mut session, &[Key::UP]);
    assert_eq!(session.highlight(1), Some(2));

    // From a leaf, Right moves to the next title, a plain one.
    app.keys(&mut session, &[Key::RIGHT]);
    assert_eq!(session.highlight(0), Some(2));
    assert_eq!(session.levels(), 1);
    assert_eq!(app.toolkit.grab(), Some(app.window));
    assert!(!session.is_done());

    app.keys(&mut session, &[Key::LEFT]);
    assert_eq!(session.highlight(0), Some(1));
    assert_eq!(session.levels(), 2);
    assert_eq!(app.toolkit.grab(), session.window(1));

    app.keys(&mut session, &[Key::ESCAPE]);
    assert!(session.is_done());
    assert_eq!(app.toolkit.grab(), None);
}

#[test]
fn a_push_outside_every_level_dismisses_the_menu() {
    let mut app = App::new();

    let mut session = app.click_title(0);
    app.release_title(&mut session, 0);
    let popup = session.window(1).expect("popup window");

    app.backend.push(app.native, press(Point::new(300, 200)));

    assert!(session.step(&mut app.toolkit, Duration::ZERO));
    assert!(session.picked().is_none());
    assert!(app.toolkit.status(popup).is_none());
    assert_eq!(app.toolkit.grab(), None);
}

#[test]
fn a_plain_title_is_picked_on_push() {
    let mut app = App::new();

    let session = app.click_title(2);

    assert!(session.is_done());
    assert_eq!(session.levels(), 0);
    assert_eq!(
        session.picked().and_then(|picked| picked.message.clone()),
        Some(Action::Help)
    );
    assert_eq!(app.toolkit.grab(), None);
    assert_eq!(app.menubar().value(), Some(&[2][..]));
}

#[test]
fn shortcuts_pick_items_of_any_level() {
    let mut app = App::new();

    let mut session = app.click_title(0);
    app.release_title(&mut session, 0);

    app.backend
        .push(app.native, native::Kind::ModifiersChanged(keyboard::State::CTRL));
    app.backend.push(app.native, pressed(Key::from_char('c')));

    assert!(session.step(&mut app.toolkit, Duration::ZERO));
    assert_eq!(
        session.picked().map(|picked| picked.path.clone()),
        Some(vec![1, 0])
    );
}

#[test]
fn the_bar_picks_shortcuts_without_a_session() {
    let mut app = App::new();

    app.backend
        .push(app.native, native::Kind::ModifiersChanged(keyboard::State::CTRL));
    app.backend.push(app.native, pressed(Key::from_char('c')));
    let _ = app.toolkit.wait(Duration::ZERO);

    let picked = app
        .toolkit
        .take_messages()
        .into_iter()
        .find_map(|message| message.downcast::<Picked<Action>>().ok())
        .expect("picked item");

    assert_eq!(picked.message, Some(Action::Copy));
    assert_eq!(app.menubar().value(), Some(&[1, 0][..]));
}

#[test]
fn the_session_ends_when_its_menu_is_dropped() {
    let mut app = App::new();

    let mut session = app.click_title(0);
    let popup = session.window(1).expect("popup window");

    let root = app.toolkit.remove_window(app.window);
    drop(root);

    assert!(session.step(&mut app.toolkit, Duration::ZERO));
    assert!(session.picked().is_none());
    assert!(app.toolkit.status(popup).is_none());
    assert_eq!(app.toolkit.grab(), None);
    assert!(app.backend.native_windows().is_empty());
}

#[test]
fn popups_stay_inside_the_work_area() {
    let backend = Headless::new();
    let mut toolkit = Toolkit::new(backend.clone(), Settings::default()).expect("toolkit");

    let menu = Menu::new(items());
    let mut session = Session::popup(&mut toolkit, &menu, Point::new(1900, 1030));

    let bounds = session.bounds(0).expect("popup bounds");
    assert!(bounds.right() <= 1920);
    assert!(bounds.bottom() <= 1040);
    assert_eq!(bounds.height, 3 * 24);
    assert_eq!(toolkit.grab(), session.window(0));
    assert_eq!(session.state(), State::Initial);

    let native = session
        .window(0)
        .and_then(|popup| toolkit.native(popup))
        .expect("native popup");

    backend.push(native, pressed(Key::DOWN));
    let _ = session.step(&mut toolkit, Duration::ZERO);
    assert_eq!(session.highlight(0), Some(0));

    session.cancel(&mut toolkit);
    assert!(session.is_done());
    assert_eq!(toolkit.grab(), None);
    assert!(backend.native_windows().is_empty());
}

fn headers() -> Vec<Item<Action>> {
    vec![
        Item::entry("New", Action::New),
        Item::submenu("Open", vec![Item::entry("notes.txt", Action::Recent)])
            .on_pick(Action::Open),
        Item::submenu("Edit", vec![Item::entry("Copy", Action::Copy)]),
    ]
}

fn open_popup(
    menu: &Menu<Action>,
) -> (Headless, Toolkit<Headless>, Session<Action>, NativeId) {
    let backend = Headless::new();
    let mut toolkit = Toolkit::new(backend.clone(), Settings::default()).expect("toolkit");

    let session = Session::popup(&mut toolkit, menu, Point::new(50, 50));
    let native = session
        .window(0)
        .and_then(|popup| toolkit.native(popup))
        .expect("native popup");

    (backend, toolkit, session, native)
}

fn click(backend: &Headless, native: NativeId, position: Point) {
    backend.push(native, press(position));
    backend.push(native, release(position));
}

#[test]
fn a_header_with_a_callback_opens_on_click_and_picks_on_the_next() {
    let menu = Menu::new(headers());
    let (backend, mut toolkit, mut session, native) = open_popup(&menu);
    let (open, edit) = (Point::new(5, 24 + 5), Point::new(5, 2 * 24 + 5));

    backend.push(native, native::Kind::CursorMoved { position: open });
    let _ = session.step(&mut toolkit, Duration::ZERO);

    assert_eq!(session.highlight(0), Some(1));
    assert_eq!(session.levels(), 1);

    backend.push(native, native::Kind::CursorMoved { position: edit });
    let _ = session.step(&mut toolkit, Duration::ZERO);

    assert_eq!(session.highlight(0), Some(2));
    assert_eq!(session.levels(), 2);

    click(&backend, native, open);

    assert!(!session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(session.state(), State::Initial);
    assert_eq!(session.highlight(0), Some(1));
    assert_eq!(session.levels(), 2);
    assert!(session.window(1).is_some_and(|level| toolkit.is_shown(level)));
    assert_eq!(toolkit.grab(), session.window(0));

    click(&backend, native, open);

    assert!(session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(
        session.take_picked(),
        Some(Picked {
            path: vec![1],
            message: Some(Action::Open)
        })
    );
    assert_eq!(toolkit.grab(), None);
    assert!(backend.native_windows().is_empty());
}

#[test]
fn enter_on_a_header_with_a_callback_opens_its_level() {
    let menu = Menu::new(headers());
    let (backend, mut toolkit, mut session, native) = open_popup(&menu);

    for key in [Key::DOWN, Key::DOWN] {
        backend.push(native, pressed(key));
        let _ = session.step(&mut toolkit, Duration::ZERO);
    }

    assert_eq!(session.highlight(0), Some(1));
    assert_eq!(session.levels(), 1);

    backend.push(native, pressed(Key::ENTER));

    assert!(!session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(session.levels(), 2);
    assert_eq!(session.current_level(), 1);
    assert_eq!(session.highlight(1), Some(0));

    backend.push(native, pressed(Key::ENTER));

    assert!(session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(
        session.picked().map(|picked| picked.path.clone()),
        Some(vec![1, 0])
    );
}

#[test]
fn enter_picks_a_header_whose_level_a_click_opened() {
    let menu = Menu::new(headers());
    let (backend, mut toolkit, mut session, native) = open_popup(&menu);

    click(&backend, native, Point::new(5, 24 + 5));
    assert!(!session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(session.levels(), 2);
    assert_eq!(session.current_level(), 0);

    backend.push(native, pressed(Key::ENTER));

    assert!(session.step(&mut toolkit, Duration::ZERO));
    assert_eq!(
        session.picked().and_then(|picked| picked.message.clone()),
        Some(Action::Open)
    );
}
