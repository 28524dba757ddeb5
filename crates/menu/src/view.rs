use crate::core::graphics::Graphics;
use crate::core::settings::MenuSettings;
use crate::core::widget::{Base, Widget};
use crate::core::{Color, Point, Rectangle, Size};
use crate::item::{self, Item};

use std::cell::RefCell;
use std::rc::Rc;

const PADDING: i32 = 6;
const GAP: i32 = 16;
const ARROW: i32 = 8;

/// What a row of a level shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowKind {
    Entry,
    Submenu,
    Divider,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) label: String,
    pub(crate) shortcut: String,
    pub(crate) kind: RowKind,
    pub(crate) enabled: bool,
}

impl Row {
    pub(crate) fn from_items<Message>(items: &[Item<Message>]) -> Vec<Row> {
        items
            .iter()
            .map(|item| Row {
                label: item.label().to_owned(),
                shortcut: item
                    .key_shortcut()
                    .map(item::shortcut_label)
                    .unwrap_or_default(),
                kind: match item {
                    Item::Entry { .. } => RowKind::Entry,
                    Item::Submenu { .. } => RowKind::Submenu,
                    Item::Divider => RowKind::Divider,
                },
                enabled: item.is_selectable(),
            })
            .collect()
    }
}

/// The rows of a level and its highlight, shared with the session.
#[derive(Debug)]
pub(crate) struct View {
    pub(crate) rows: Vec<Row>,
    pub(crate) highlight: Option<usize>,
    pub(crate) metrics: MenuSettings,
}

impl View {
    /// Computes the size of a level window.
    pub(crate) fn size(&self, gc: &dyn Graphics) -> Size {
        let width = self
            .rows
            .iter()
            .map(|row| {
                let label = gc.measure(&row.label).0;
                let shortcut = if row.shortcut.is_empty() {
                    0
                } else {
                    GAP + gc.measure(&row.shortcut).0
                };

                PADDING * 2 + label + shortcut + GAP + ARROW
            })
            .max()
            .unwrap_or(0);

        Size::new(
            width.max(self.metrics.min_width),
            self.metrics.item_height * self.rows.len().max(1) as i32,
        )
    }
}

/// The root widget of a popup level window.
///
/// Every row is one item height tall; the session does the hit testing.
#[derive(Debug)]
pub(crate) struct LevelView {
    base: Base,
    view: Rc<RefCell<View>>,
}

impl LevelView {
    pub(crate) fn new(view: Rc<RefCell<View>>) -> Self {
        Self {
            base: Base::new(Rectangle::default()),
            view,
        }
    }
}

impl Widget for LevelView {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn draw(&self, gc: &mut dyn Graphics) {
        let view = self.view.borrow();
        let bounds = self.bounds();
        let height = view.metrics.item_height;

        gc.color(Color::BACKGROUND);
        gc.rectf(bounds.x, bounds.y, bounds.width, bounds.height);

        let metrics = gc.metrics();
        let ascent = metrics.corrected_ascent(&gc.state().baseline).round() as i32;
        let line = metrics.line_height(&gc.state().baseline).round() as i32;

        for (index, row) in view.rows.iter().enumerate() {
            let top = bounds.y + index as i32 * height;
            let row_bounds = Rectangle::new(bounds.x, top, bounds.width, height);

            if !gc.not_clipped(row_bounds.x, row_bounds.y, row_bounds.width, row_bounds.height) {
                continue;
            }

            if row.kind == RowKind::Divider {
                gc.color(Color::DARK2);
                gc.rectf(
                    bounds.x + 2,
                    top + (height - view.metrics.divider_height) / 2,
                    bounds.width - 4,
                    view.metrics.divider_height,
                );
                continue;
            }

            let highlighted = view.highlight == Some(index) && row.enabled;

            if highlighted {
                gc.color(Color::SELECTION);
                gc.rectf(row_bounds.x, row_bounds.y, row_bounds.width, row_bounds.height);
            }

            let text = match (row.enabled, highlighted) {
                (false, _) => Color::INACTIVE,
                (true, true) => Color::WHITE,
                (true, false) => Color::FOREGROUND,
            };

            gc.color(text);

            let baseline = top + (height - line) / 2 + ascent;
            gc.draw_str(&row.label, bounds.x + PADDING, baseline);

            let right = bounds.right() - PADDING - ARROW;

            if !row.shortcut.is_empty() {
                let width = gc.measure(&row.shortcut).0;
                gc.draw_str(&row.shortcut, right - GAP / 2 - width, baseline);
            }

            if row.kind == RowKind::Submenu {
                let middle = top + height / 2;

                gc.polygon(&[
                    Point::new(right, middle - ARROW / 2),
                    Point::new(right + ARROW / 2, middle),
                    Point::new(right, middle + ARROW / 2),
                ]);
            }
        }

        gc.color(Color::DARK3);
        gc.rect(bounds.x, bounds.y, bounds.width, bounds.height);
    }
}
