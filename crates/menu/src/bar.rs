use crate::core::event::{Kind, Record};
use crate::core::graphics::Graphics;
use crate::core::settings::MenuSettings;
use crate::core::widget::{self, Base, Callback, Shell, Tracker, Widget};
use crate::core::{Color, Rectangle};
use crate::item::{self, Item, Menu};
use crate::session::Picked;

use std::cell::RefCell;

/// Asks the application to run a menu bar session.
///
/// A [`MenuBar`] publishes it through the [`Shell`] when one of its titles
/// is pushed; hand it to [`Session::menubar`](crate::Session::menubar).
#[derive(Debug)]
pub struct Request<Message> {
    /// The items of the bar.
    pub menu: Tracker<Vec<Item<Message>>>,
    /// The bar widget.
    pub bar: widget::Id,
    /// The bounds of the bar, relative to its window.
    pub bounds: Rectangle,
    /// The bounds of every title, relative to the window.
    pub titles: Vec<Rectangle>,
    /// The pushed title.
    pub title: usize,
}

/// A horizontal bar of menu titles.
///
/// Titles are laid out every time the bar is drawn. A push on a title
/// publishes a [`Request`]; the bar itself never blocks.
#[derive(Debug)]
pub struct MenuBar<Message> {
    base: Base,
    menu: Menu<Message>,
    metrics: MenuSettings,
    titles: RefCell<Vec<Rectangle>>,
    open: Option<usize>,
    value: Option<Vec<usize>>,
}

impl<Message: Clone + 'static> MenuBar<Message> {
    /// Creates a bar with the given top-level items.
    pub fn new(bounds: Rectangle, items: Vec<Item<Message>>) -> Self {
        Self {
            base: Base::new(bounds),
            menu: Menu::new(items),
            metrics: MenuSettings::default(),
            titles: RefCell::new(Vec::new()),
            open: None,
            value: None,
        }
    }

    /// Sets the menu metrics.
    pub fn metrics(mut self, metrics: MenuSettings) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets the callback run after an item was picked.
    pub fn on_pick(mut self, callback: Callback) -> Self {
        self.base.set_callback(Some(callback));
        self
    }

    /// Returns the menu of the bar.
    pub fn menu(&self) -> &Menu<Message> {
        &self.menu
    }

    /// Returns the bounds of the titles as of the last draw.
    pub fn titles(&self) -> Vec<Rectangle> {
        self.titles.borrow().clone()
    }

    /// Returns the title drawn as open.
    pub fn open_title(&self) -> Option<usize> {
        self.open
    }

    /// Draws a title as open, or none.
    pub fn set_open_title(&mut self, title: Option<usize>) {
        self.open = title;
    }

    /// Returns the path of the last picked item.
    pub fn value(&self) -> Option<&[usize]> {
        self.value.as_deref()
    }

    /// Records a picked item and runs the callback.
    pub fn pick(&mut self, path: Vec<usize>) {
        self.value = Some(path);
        let _ = widget::do_callback(self);
    }

    fn title_at(&self, event: &Record) -> Option<usize> {
        self.titles
            .borrow()
            .iter()
            .position(|title| event.inside(title))
    }

    fn layout(&self, gc: &dyn Graphics) -> Vec<Rectangle> {
        let bounds = self.bounds();
        let mut x = bounds.x;

        self.menu.with_items(|items| {
            items
                .iter()
                .map(|item| {
                    let width = gc.measure(item.label()).0 + 2 * self.metrics.title_padding;
                    let title = Rectangle::new(x, bounds.y, width, bounds.height);
                    x += width;

                    title
                })
                .collect()
        })
    }
}

impl<Message: Clone + 'static> Widget for MenuBar<Message> {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn handle(&mut self, event: &Record, shell: &mut Shell) -> bool {
        match event.kind {
            Kind::PUSH => {
                let Some(title) = self.title_at(event) else {
                    return false;
                };

                let enabled = self
                    .menu
                    .with_items(|items| items.get(title).is_some_and(Item::is_selectable));

                if !enabled {
                    return true;
                }

                shell.publish(Request {
                    menu: self.menu.tracker(),
                    bar: self.id(),
                    bounds: self.bounds(),
                    titles: self.titles(),
                    title,
                });

                true
            }
            Kind::SHORTCUT => {
                let found = self.menu.with_items(|items| {
                    let path = item::find_shortcut(items, event.key, event.state)?;
                    let message = item::get(items, &path).and_then(Item::message).cloned();

                    Some((path, message))
                });

                let Some((path, message)) = found else {
                    return false;
                };

                log::debug!("menu bar {}: shortcut picked {path:?}", self.id());

                self.pick(path.clone());
                shell.publish(Picked { path, message });

                true
            }
            _ => false,
        }
    }

    fn draw(&self, gc: &mut dyn Graphics) {
        let bounds = self.bounds();

        gc.color(Color::BACKGROUND);
        gc.rectf(bounds.x, bounds.y, bounds.width, bounds.height);

        let titles = self.layout(gc);
        let metrics = gc.metrics();
        let ascent = metrics.corrected_ascent(&gc.state().baseline).round() as i32;
        let line = metrics.line_height(&gc.state().baseline).round() as i32;
        let baseline = bounds.y + (bounds.height - line) / 2 + ascent;

        self.menu.with_items(|items| {
            for (index, (item, title)) in items.iter().zip(&titles).enumerate() {
                if self.open == Some(index) {
                    gc.color(Color::SELECTION);
                    gc.rectf(title.x, title.y, title.width, title.height);
                    gc.color(Color::WHITE);
                } else if item.is_selectable() {
                    gc.color(Color::FOREGROUND);
                } else {
                    gc.color(Color::INACTIVE);
                }

                gc.draw_str(item.label(), title.x + self.metrics.title_padding, baseline);
            }
        });

        gc.color(Color::DARK2);
        gc.xyline(bounds.x, bounds.bottom() - 1, bounds.right() - 1);

        *self.titles.borrow_mut() = titles;
    }
}
