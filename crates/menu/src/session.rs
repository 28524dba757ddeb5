//! The menu state machine.
//!
//! A [`Session`] owns the open levels of a popup menu or of a menu bar
//! and takes the grab while it runs. It reads every input event before
//! the toolkit dispatches it, through [`Toolkit::wait_with`].
use crate::bar::{MenuBar, Request};
use crate::core::event::Kind;
use crate::core::keyboard::{self, Key};
use crate::core::settings::MenuSettings;
use crate::core::time::{self, Duration};
use crate::core::widget::{self, Tracker};
use crate::core::{Point, Rectangle, Size, window};
use crate::item::{self, Item, Menu};
use crate::stack::Stack;
use crate::view::{LevelView, Row, View};

use flint_runtime::{Platform, Toolkit};

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// The state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The menu is open and no button is held.
    Initial,
    /// The button that opened the menu is still held.
    Push,
    /// A button was pushed inside the menu.
    MenuPush,
    /// The session is over; every level is closed.
    Done,
}

/// The item a session ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct Picked<Message> {
    /// The path of the item.
    pub path: Vec<usize>,
    /// The message of the item.
    pub message: Option<Message>,
}

#[derive(Debug)]
struct Level {
    path: Vec<usize>,
    bounds: Rectangle,
    popup: Option<Popup>,
}

#[derive(Debug)]
struct Popup {
    window: window::Id,
    view: Rc<RefCell<View>>,
}

#[derive(Debug)]
struct Bar {
    host: window::Id,
    widget: widget::Id,
    titles: Vec<Rectangle>,
}

#[derive(Debug, Clone, Copy)]
struct Info {
    selectable: bool,
    submenu: bool,
    opens_on_highlight: bool,
}

enum Hit {
    Item(usize, usize),
    Level,
    Outside,
}

/// A running popup menu or menu bar.
///
/// Level `0` is the bar itself in a menu bar session and the first popup
/// otherwise. Positions are in screen coordinates.
#[derive(Debug)]
pub struct Session<Message> {
    menu: Tracker<Vec<Item<Message>>>,
    bar: Option<Bar>,
    stack: Stack<Level>,
    current: usize,
    state: State,
    metrics: MenuSettings,
    picked: Option<Picked<Message>>,
    /// The header whose level the current push opened.
    opened: Option<(usize, usize)>,
}

impl<Message: Clone + 'static> Session<Message> {
    fn new<P: Platform>(
        toolkit: &Toolkit<P>,
        menu: Tracker<Vec<Item<Message>>>,
        bar: Option<Bar>,
    ) -> Self {
        let state = if toolkit.event().buttons().is_empty() {
            State::Initial
        } else {
            State::Push
        };

        Self {
            menu,
            bar,
            stack: Stack::new(),
            current: 0,
            state,
            metrics: toolkit.settings().menu.clone(),
            picked: None,
            opened: None,
        }
    }

    /// Opens `menu` as a popup at `position`.
    pub fn popup<P: Platform>(
        toolkit: &mut Toolkit<P>,
        menu: &Menu<Message>,
        position: Point,
    ) -> Self {
        let mut session = Self::new(toolkit, menu.tracker(), None);
        let rows = menu.with_items(Row::from_items);

        if rows.is_empty() {
            session.finish(toolkit, None);
            return session;
        }

        let level = session.make_level(toolkit, Vec::new(), rows, position);
        let closed = session.stack.open_root(level);
        session.close(toolkit, closed);
        session.update_grab(toolkit);

        session
    }

    /// Starts the session a [`MenuBar`] of `window` asked for.
    ///
    /// The pushed title opens its submenu; a plain title is picked right
    /// away and the session is over when this returns.
    pub fn menubar<P: Platform>(
        toolkit: &mut Toolkit<P>,
        window: window::Id,
        request: Request<Message>,
    ) -> Self {
        let origin = toolkit.window_origin(window);
        let bar = Bar {
            host: window,
            widget: request.bar,
            titles: request
                .titles
                .iter()
                .map(|title| title.translate(origin))
                .collect(),
        };

        let mut session = Self::new(toolkit, request.menu, Some(bar));

        let closed = session.stack.open_root(Level {
            path: Vec::new(),
            bounds: request.bounds.translate(origin),
            popup: None,
        });
        session.close(toolkit, closed);

        session.update_grab(toolkit);
        session.select_title(toolkit, request.title, true);

        session
    }

    /// Returns the state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true once the session is over.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Returns the number of open levels, the bar included.
    pub fn levels(&self) -> usize {
        self.stack.len()
    }

    /// Returns the level holding the keyboard navigation.
    pub fn current_level(&self) -> usize {
        self.current
    }

    /// Returns the popup window of a level.
    pub fn window(&self, level: usize) -> Option<window::Id> {
        self.stack
            .get(level)?
            .level
            .popup
            .as_ref()
            .map(|popup| popup.window)
    }

    /// Returns the screen bounds of a level.
    pub fn bounds(&self, level: usize) -> Option<Rectangle> {
        self.stack.get(level).map(|entry| entry.level.bounds)
    }

    /// Returns the highlighted item of a level.
    pub fn highlight(&self, level: usize) -> Option<usize> {
        self.stack.get(level)?.highlight
    }

    /// Returns the picked item, once the session is over.
    pub fn picked(&self) -> Option<&Picked<Message>> {
        self.picked.as_ref()
    }

    /// Takes the picked item.
    pub fn take_picked(&mut self) -> Option<Picked<Message>> {
        self.picked.take()
    }

    /// Waits once for events and feeds them to the session.
    ///
    /// Returns true once the session is over.
    pub fn step<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, timeout: Duration) -> bool {
        self.check(toolkit);

        if self.state != State::Done {
            let mut hook =
                |toolkit: &mut Toolkit<P>, kind: Kind, _window: window::Id| self.on_event(toolkit, kind);

            let _ = toolkit.wait_with(timeout, &mut hook);
        }

        self.check(toolkit);

        self.state == State::Done
    }

    /// Runs the session until it is over and returns the picked item.
    pub fn run<P: Platform>(mut self, toolkit: &mut Toolkit<P>) -> Option<Picked<Message>> {
        while !self.step(toolkit, time::FOREVER) {}

        self.picked.take()
    }

    /// Ends the session without picking anything.
    pub fn cancel<P: Platform>(&mut self, toolkit: &mut Toolkit<P>) {
        if self.state != State::Done {
            self.finish(toolkit, None);
        }
    }

    fn check<P: Platform>(&mut self, toolkit: &mut Toolkit<P>) {
        if self.state == State::Done {
            return;
        }

        if self.menu.deleted() {
            log::debug!("menu session ended: the menu is gone");
            self.finish(toolkit, None);
        } else if let Some(bar) = &self.bar
            && !toolkit.is_shown(bar.host)
        {
            log::debug!("menu session ended: window {} was hidden", bar.host);
            self.finish(toolkit, None);
        }
    }

    fn on_event<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, kind: Kind) -> Option<bool> {
        if self.state == State::Done || !kind.is_input() {
            return None;
        }

        if self.menu.deleted() {
            self.finish(toolkit, None);
            return None;
        }

        let event = toolkit.event();
        let point = event.root_position();
        let (key, modifiers, is_click) = (event.key, event.state, event.is_click);

        match kind {
            Kind::PUSH => self.push(toolkit, point),
            Kind::MOVE | Kind::DRAG => self.hover(toolkit, point),
            Kind::RELEASE => self.release(toolkit, point, is_click),
            Kind::KEYDOWN => self.key(toolkit, key, modifiers),
            _ => {}
        }

        Some(true)
    }

    fn push<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, point: Point) {
        self.opened = None;

        match self.hit(point) {
            Hit::Item(level, item) if self.is_bar(level) => {
                let popup_open = self.stack.len() > 1;

                if self.highlight(0) == Some(item) && popup_open && self.state != State::Push {
                    self.finish(toolkit, None);
                    return;
                }

                self.state = State::Push;
                self.select_title(toolkit, item, true);
            }
            Hit::Item(level, item) => {
                self.state = State::MenuPush;

                let Some(info) = self.info(level, item) else {
                    return;
                };

                let was_open = self.is_open(level, item);
                self.set_highlight(toolkit, level, info.selectable.then_some(item));

                if info.selectable
                    && info.submenu
                    && self.open_child(toolkit, level, item)
                    && !was_open
                {
                    self.opened = Some((level, item));
                }
            }
            Hit::Level => self.state = State::MenuPush,
            Hit::Outside => {
                log::debug!("menu dismissed by a push outside of it");
                self.finish(toolkit, None);
            }
        }
    }

    fn hover<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, point: Point) {
        let Hit::Item(level, item) = self.hit(point) else {
            return;
        };

        if self.is_bar(level) {
            if self.highlight(0) != Some(item) {
                self.select_title(toolkit, item, false);
            }

            return;
        }

        let selectable = self.info(level, item).is_some_and(|info| info.selectable);
        self.set_highlight(toolkit, level, selectable.then_some(item));
    }

    fn release<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, point: Point, is_click: bool) {
        if self.state == State::Push && is_click {
            self.state = State::Initial;
            return;
        }

        let Hit::Item(level, item) = self.hit(point) else {
            if self.state == State::Push {
                self.state = State::Initial;
            }

            return;
        };

        let Some(info) = self.info(level, item) else {
            return;
        };

        if !info.selectable {
            return;
        }

        // A header with a callback is picked by a click once its level is
        // open; the click that opens it only opens it.
        if info.submenu
            && (info.opens_on_highlight
                || self.is_bar(level)
                || self.opened == Some((level, item))
                || !self.is_open(level, item))
        {
            let _ = self.open_child(toolkit, level, item);
            self.state = State::Initial;
            return;
        }

        self.pick(toolkit, level, item);
    }

    fn key<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, key: Key, modifiers: keyboard::State) {
        let level = self.current;

        match key {
            Key::ESCAPE => self.finish(toolkit, None),
            Key::UP | Key::DOWN => {
                if !self.is_bar(level) {
                    self.step_highlight(toolkit, level, key == Key::DOWN);
                } else if key == Key::DOWN
                    && let Some(title) = self.highlight(0)
                {
                    let _ = self.enter(toolkit, 0, title);
                }
            }
            Key::LEFT => {
                if self.bar.is_some() && level <= 1 {
                    self.step_title(toolkit, false);
                } else if level > 0 {
                    let closed = self.stack.truncate(level);
                    self.close(toolkit, closed);
                    self.current = level - 1;
                    self.update_grab(toolkit);
                }
            }
            Key::RIGHT => {
                let entered = self.highlight(level).is_some_and(|item| {
                    self.info(level, item).is_some_and(|info| info.submenu)
                        && !self.is_bar(level)
                        && self.enter(toolkit, level, item)
                });

                if !entered && self.bar.is_some() {
                    self.step_title(toolkit, true);
                }
            }
            key if key.is_enter() || key == Key::SPACE => {
                if let Some(item) = self.highlight(level) {
                    self.activate(toolkit, level, item);
                }
            }
            _ => {
                if let Some(path) = self.shortcut(level, key, modifiers) {
                    self.pick_path(toolkit, path);
                }
            }
        }
    }

    fn activate<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, level: usize, item: usize) {
        let Some(info) = self.info(level, item) else {
            return;
        };

        if !info.selectable {
            return;
        }

        // Activating a header with a callback whose level is already open
        // picks the header.
        if info.submenu
            && (info.opens_on_highlight || self.is_bar(level) || !self.is_open(level, item))
        {
            let _ = self.enter(toolkit, level, item);
        } else {
            self.pick(toolkit, level, item);
        }
    }

    fn shortcut(&self, level: usize, key: Key, modifiers: keyboard::State) -> Option<Vec<usize>> {
        let local = self
            .with_level(level, |items| {
                items.iter().position(|item| {
                    item.is_selectable()
                        && item
                            .key_shortcut()
                            .is_some_and(|shortcut| shortcut.matches(key, modifiers))
                })
            })
            .flatten();

        if let (Some(index), Some(entry)) = (local, self.stack.get(level)) {
            let mut path = entry.level.path.clone();
            path.push(index);

            return Some(path);
        }

        let menu = self.menu.get()?;
        let items = menu.borrow();

        item::find_shortcut(&items, key, modifiers)
    }

    fn step_highlight<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, level: usize, forward: bool) {
        let from = self.highlight(level);
        let next = self
            .with_level(level, |items| item::next_selectable(items, from, forward))
            .flatten();

        if next.is_some() {
            self.set_highlight(toolkit, level, next);
        }
    }

    fn step_title<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, forward: bool) {
        let from = self.highlight(0);
        let Some(next) = self
            .with_level(0, |items| item::next_selectable(items, from, forward))
            .flatten()
        else {
            return;
        };

        let into = self.current > 0;
        self.select_title(toolkit, next, false);

        if into {
            let _ = self.enter(toolkit, 0, next);
        }
    }

    /// Highlights a bar title, opening its submenu.
    ///
    /// A pushed plain title is picked.
    fn select_title<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, title: usize, pushed: bool) {
        let Some(info) = self.info(0, title) else {
            return;
        };

        if !info.selectable {
            return;
        }

        let closed = self.stack.highlight(0, Some(title));
        self.close(toolkit, closed);
        self.current = 0;
        self.show_highlight(toolkit, 0);

        if info.submenu {
            let _ = self.open_child(toolkit, 0, title);
        } else if pushed {
            self.pick(toolkit, 0, title);
        }

        self.update_grab(toolkit);
    }

    fn set_highlight<P: Platform>(
        &mut self,
        toolkit: &mut Toolkit<P>,
        level: usize,
        item: Option<usize>,
    ) {
        let closed = self.stack.highlight(level, item);
        self.close(toolkit, closed);

        self.current = level;
        self.show_highlight(toolkit, level);

        if let Some(item) = item
            && self
                .info(level, item)
                .is_some_and(|info| info.opens_on_highlight)
        {
            let _ = self.open_child(toolkit, level, item);
        }

        self.update_grab(toolkit);
    }

    /// Opens the submenu of `item` and moves the navigation into it.
    fn enter<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, level: usize, item: usize) -> bool {
        if !self.open_child(toolkit, level, item) {
            return false;
        }

        let first = self
            .with_level(level + 1, |items| item::next_selectable(items, None, true))
            .flatten();

        match first {
            Some(first) => self.set_highlight(toolkit, level + 1, Some(first)),
            None => self.current = level + 1,
        }

        true
    }

    /// Opens the submenu of `item` in level `level` as level `level + 1`.
    fn open_child<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, level: usize, item: usize) -> bool {
        let Some(parent) = self.stack.get(level) else {
            return false;
        };

        let mut path = parent.level.path.clone();
        path.push(item);

        if self
            .stack
            .get(level + 1)
            .is_some_and(|child| child.level.path == path)
        {
            return true;
        }

        let position = match &self.bar {
            Some(bar) if level == 0 => {
                let Some(title) = bar.titles.get(item) else {
                    return false;
                };

                Point::new(title.x, parent.level.bounds.bottom())
            }
            _ => Point::new(
                parent.level.bounds.right(),
                parent.level.bounds.y + item as i32 * self.metrics.item_height,
            ),
        };

        let rows = self
            .with_level(level, |items| {
                items
                    .get(item)
                    .map(|item| Row::from_items(item.children()))
            })
            .flatten()
            .unwrap_or_default();

        if rows.is_empty() {
            return false;
        }

        let child = self.make_level(toolkit, path, rows, position);
        let closed = self.stack.open(level, item, child);
        self.close(toolkit, closed);

        self.show_highlight(toolkit, level);
        self.update_grab(toolkit);

        true
    }

    fn make_level<P: Platform>(
        &self,
        toolkit: &mut Toolkit<P>,
        path: Vec<usize>,
        rows: Vec<Row>,
        position: Point,
    ) -> Level {
        let view = View {
            rows,
            highlight: None,
            metrics: self.metrics.clone(),
        };

        let size = view.size(toolkit.graphics());
        let position = fit(toolkit.work_area_at(position), position, size);

        let mut settings = window::Settings::new("", size)
            .at(position)
            .kind(window::Kind::Menu);
        settings.resizable = false;

        let view = Rc::new(RefCell::new(view));
        let window = toolkit.add_window(settings, LevelView::new(Rc::clone(&view)));
        let _ = toolkit.show(window);

        log::debug!("menu level {path:?} opened in window {window} at {position:?}");

        Level {
            path,
            bounds: Rectangle::with_size(position, size),
            popup: Some(Popup { window, view }),
        }
    }

    fn close<P: Platform>(&self, toolkit: &mut Toolkit<P>, levels: Vec<Level>) {
        for level in levels {
            if let Some(popup) = level.popup {
                let _ = toolkit.remove_window(popup.window);
                log::trace!("menu level {:?} closed", level.path);
            }
        }
    }

    fn show_highlight<P: Platform>(&self, toolkit: &mut Toolkit<P>, level: usize) {
        let Some(entry) = self.stack.get(level) else {
            return;
        };

        match &entry.level.popup {
            Some(popup) => {
                popup.view.borrow_mut().highlight = entry.highlight;
                toolkit.redraw(popup.window);
            }
            None => {
                let title = entry.highlight;
                self.with_bar(toolkit, |bar| bar.set_open_title(title));
            }
        }
    }

    fn update_grab<P: Platform>(&self, toolkit: &mut Toolkit<P>) {
        if self.state == State::Done {
            return;
        }

        let target = self
            .stack
            .iter()
            .find_map(|entry| entry.level.popup.as_ref().map(|popup| popup.window))
            .or_else(|| self.bar.as_ref().map(|bar| bar.host));

        if target.is_some() && toolkit.grab() != target {
            let _ = toolkit.set_grab(target);
        }
    }

    fn pick<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, level: usize, item: usize) {
        let Some(entry) = self.stack.get(level) else {
            return;
        };

        let mut path = entry.level.path.clone();
        path.push(item);

        self.pick_path(toolkit, path);
    }

    fn pick_path<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, path: Vec<usize>) {
        let message = self.menu.get().and_then(|menu| {
            let items = menu.borrow();
            item::get(&items, &path).and_then(Item::message).cloned()
        });

        self.finish(toolkit, Some(Picked { path, message }));
    }

    fn finish<P: Platform>(&mut self, toolkit: &mut Toolkit<P>, picked: Option<Picked<Message>>) {
        self.state = State::Done;

        let closed = self.stack.clear();
        self.close(toolkit, closed);

        let path = picked.as_ref().map(|picked| picked.path.clone());

        self.with_bar(toolkit, |bar| {
            bar.set_open_title(None);

            if let Some(path) = path {
                bar.pick(path);
            }
        });

        let _ = toolkit.set_grab(None);

        log::debug!(
            "menu session done, picked {:?}",
            picked.as_ref().map(|picked| &picked.path)
        );

        self.picked = picked;
    }

    fn with_bar<P: Platform>(&self, toolkit: &mut Toolkit<P>, f: impl FnOnce(&mut MenuBar<Message>)) {
        let Some(bar) = &self.bar else {
            return;
        };

        if let Some(widget) = toolkit.widget_mut(bar.host, bar.widget) {
            let widget: &mut dyn Any = widget;

            if let Some(bar) = widget.downcast_mut::<MenuBar<Message>>() {
                f(bar);
            }
        }

        toolkit.redraw(bar.host);
    }

    fn hit(&self, point: Point) -> Hit {
        for (index, entry) in self.stack.iter().enumerate().rev() {
            let bounds = entry.level.bounds;

            if !bounds.contains(point) {
                continue;
            }

            if self.is_bar(index) {
                let title = self.bar.as_ref().and_then(|bar| {
                    bar.titles.iter().position(|title| title.contains(point))
                });

                return match title {
                    Some(title) => Hit::Item(index, title),
                    None => Hit::Level,
                };
            }

            let rows = entry
                .level
                .popup
                .as_ref()
                .map_or(0, |popup| popup.view.borrow().rows.len());
            let row = (point.y - bounds.y) / self.metrics.item_height;

            return match usize::try_from(row) {
                Ok(row) if row < rows => Hit::Item(index, row),
                _ => Hit::Level,
            };
        }

        Hit::Outside
    }

    /// Returns true if the level of `item` in `level` is open.
    fn is_open(&self, level: usize, item: usize) -> bool {
        self.stack.get(level).is_some_and(|parent| parent.highlight == Some(item))
            && self.stack.get(level + 1).is_some()
    }

    fn is_bar(&self, level: usize) -> bool {
        self.bar.is_some() && level == 0
    }

    fn info(&self, level: usize, item: usize) -> Option<Info> {
        self.with_level(level, |items| {
            items.get(item).map(|item| Info {
                selectable: item.is_selectable(),
                submenu: item.is_submenu(),
                opens_on_highlight: item.opens_on_highlight(),
            })
        })
        .flatten()
    }

    fn with_level<R>(&self, level: usize, f: impl FnOnce(&[Item<Message>]) -> R) -> Option<R> {
        let entry = self.stack.get(level)?;
        let menu = self.menu.get()?;
        let items = menu.borrow();
        let items = item::level(&items, &entry.level.path)?;

        Some(f(items))
    }
}

/// Moves a popup of `size` at `position` inside `area`.
fn fit(area: Rectangle, position: Point, size: Size) -> Point {
    let x = position.x.min(area.right() - size.width).max(area.x);
    let y = position.y.min(area.bottom() - size.height).max(area.y);

    Point::new(x, y)
}
