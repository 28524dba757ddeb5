//! The menu model.
//!
//! A menu is a tree of [`Item`]s. An item with children is a submenu
//! header; every other item is an entry or a divider. Items are addressed
//! by their path of indices from the top-level list.
use crate::core::keyboard::{Key, Shortcut, State};
use crate::core::widget::Tracker;

use std::cell::RefCell;
use std::rc::Rc;

/// A menu item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<Message> {
    /// A pickable entry.
    Entry {
        /// The label.
        label: String,
        /// Whether the entry can be picked.
        enabled: bool,
        /// The keyboard shortcut that picks the entry.
        shortcut: Option<Shortcut>,
        /// The message produced when the entry is picked.
        on_pick: Option<Message>,
    },
    /// A header opening a nested level.
    ///
    /// A header without a message opens its level as soon as it is
    /// highlighted; a header with one must be clicked and is picked like
    /// an entry.
    Submenu {
        /// The label.
        label: String,
        /// Whether the submenu can be opened.
        enabled: bool,
        /// The keyboard shortcut that picks the header.
        shortcut: Option<Shortcut>,
        /// The message produced when the header itself is picked.
        on_pick: Option<Message>,
        /// The items of the nested level.
        children: Vec<Item<Message>>,
    },
    /// A separator line.
    Divider,
}

impl<Message> Item<Message> {
    /// Creates an entry producing `message` when picked.
    pub fn entry(label: impl Into<String>, message: Message) -> Self {
        Item::Entry {
            label: label.into(),
            enabled: true,
            shortcut: None,
            on_pick: Some(message),
        }
    }

    /// Creates an entry without a message.
    pub fn plain(label: impl Into<String>) -> Self {
        Item::Entry {
            label: label.into(),
            enabled: true,
            shortcut: None,
            on_pick: None,
        }
    }

    /// Creates a submenu header without a message.
    pub fn submenu(label: impl Into<String>, children: Vec<Item<Message>>) -> Self {
        Item::Submenu {
            label: label.into(),
            enabled: true,
            shortcut: None,
            on_pick: None,
            children,
        }
    }

    /// Creates a divider.
    pub fn divider() -> Self {
        Item::Divider
    }

    /// Sets the keyboard shortcut of an entry or header.
    #[must_use]
    pub fn shortcut(mut self, shortcut: Shortcut) -> Self {
        match &mut self {
            Item::Entry { shortcut: s, .. } | Item::Submenu { shortcut: s, .. } => {
                *s = Some(shortcut);
            }
            Item::Divider => {}
        }

        self
    }

    /// Sets whether the item can be picked or opened.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        match &mut self {
            Item::Entry { enabled: e, .. } | Item::Submenu { enabled: e, .. } => *e = enabled,
            Item::Divider => {}
        }

        self
    }

    /// Sets the message produced when the item is picked.
    #[must_use]
    pub fn on_pick(mut self, message: Message) -> Self {
        match &mut self {
            Item::Entry { on_pick, .. } | Item::Submenu { on_pick, .. } => {
                *on_pick = Some(message);
            }
            Item::Divider => {}
        }

        self
    }

    /// Returns the label; empty for a divider.
    pub fn label(&self) -> &str {
        match self {
            Item::Entry { label, .. } | Item::Submenu { label, .. } => label,
            Item::Divider => "",
        }
    }

    /// Returns the message of the item.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Item::Entry { on_pick, .. } | Item::Submenu { on_pick, .. } => on_pick.as_ref(),
            Item::Divider => None,
        }
    }

    /// Returns the keyboard shortcut of the item.
    pub fn key_shortcut(&self) -> Option<Shortcut> {
        match self {
            Item::Entry { shortcut, .. } | Item::Submenu { shortcut, .. } => *shortcut,
            Item::Divider => None,
        }
    }

    /// Returns true if the item can be highlighted.
    pub fn is_selectable(&self) -> bool {
        match self {
            Item::Entry { enabled, .. } | Item::Submenu { enabled, .. } => *enabled,
            Item::Divider => false,
        }
    }

    /// Returns true for a submenu header.
    pub fn is_submenu(&self) -> bool {
        matches!(self, Item::Submenu { .. })
    }

    /// Returns true for a submenu header that opens on highlight.
    pub fn opens_on_highlight(&self) -> bool {
        matches!(self, Item::Submenu { on_pick: None, .. })
    }

    /// Returns the items of the nested level.
    pub fn children(&self) -> &[Item<Message>] {
        match self {
            Item::Submenu { children, .. } => children,
            _ => &[],
        }
    }
}

/// The menu shared by a widget and the sessions it starts.
///
/// Sessions only keep a [`Tracker`] of it: once every handle is dropped,
/// a running session ends without picking anything.
#[derive(Debug)]
pub struct Menu<Message> {
    inner: Rc<RefCell<Vec<Item<Message>>>>,
}

impl<Message> Menu<Message> {
    /// Creates a menu with the given top-level items.
    pub fn new(items: Vec<Item<Message>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(items)),
        }
    }

    /// Runs `f` with the items.
    pub fn with_items<R>(&self, f: impl FnOnce(&[Item<Message>]) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Runs `f` with the items, mutably.
    pub fn with_items_mut<R>(&self, f: impl FnOnce(&mut Vec<Item<Message>>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Returns a weak reference to the items.
    pub fn tracker(&self) -> Tracker<Vec<Item<Message>>> {
        Tracker::new(&self.inner)
    }
}

impl<Message> Clone for Menu<Message> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Returns the items of the level at `path`; the empty path is the top level.
pub fn level<'a, Message>(
    items: &'a [Item<Message>],
    path: &[usize],
) -> Option<&'a [Item<Message>]> {
    match path.split_first() {
        None => Some(items),
        Some((index, rest)) => level(items.get(*index)?.children(), rest),
    }
}

/// Returns the item at `path`.
pub fn get<'a, Message>(items: &'a [Item<Message>], path: &[usize]) -> Option<&'a Item<Message>> {
    let (last, parent) = path.split_last()?;

    level(items, parent)?.get(*last)
}

/// Returns the next selectable index after `from`, wrapping around.
///
/// Without `from`, the search starts at the first (or, backwards, the last)
/// item. Inactive items and dividers are skipped.
pub fn next_selectable<Message>(
    items: &[Item<Message>],
    from: Option<usize>,
    forward: bool,
) -> Option<usize> {
    let count = items.len();

    if count == 0 {
        return None;
    }

    let start = match (from, forward) {
        (Some(index), true) => index + 1,
        (Some(index), false) => index + count - 1,
        (None, true) => 0,
        (None, false) => count - 1,
    };

    (0..count)
        .map(|step| {
            if forward {
                (start + step) % count
            } else {
                (start + count - step) % count
            }
        })
        .find(|index| items[*index].is_selectable())
}

/// Returns the path of the first selectable item triggered by a key press.
///
/// `items` is searched depth first; submenus of disabled headers are skipped.
pub fn find_shortcut<Message>(items: &[Item<Message>], key: Key, state: State) -> Option<Vec<usize>> {
    items.iter().enumerate().find_map(|(index, item)| {
        if !item.is_selectable() {
            return None;
        }

        if item
            .key_shortcut()
            .is_some_and(|shortcut| shortcut.matches(key, state))
        {
            return Some(vec![index]);
        }

        let mut path = find_shortcut(item.children(), key, state)?;
        path.insert(0, index);

        Some(path)
    })
}

/// Formats a shortcut the way menus display it, like `Ctrl+Shift+S`.
pub fn shortcut_label(shortcut: Shortcut) -> String {
    let mut label = String::new();

    for (modifier, name) in [
        (State::META, "Meta+"),
        (State::CTRL, "Ctrl+"),
        (State::ALT, "Alt+"),
        (State::SHIFT, "Shift+"),
    ] {
        if shortcut.modifiers.contains(modifier) {
            label.push_str(name);
        }
    }

    let key = shortcut.key;

    match key {
        Key::ENTER => label.push_str("Enter"),
        Key::ESCAPE => label.push_str("Esc"),
        Key::TAB => label.push_str("Tab"),
        Key::BACKSPACE => label.push_str("Backspace"),
        Key::DELETE => label.push_str("Delete"),
        Key::INSERT => label.push_str("Insert"),
        Key::HOME => label.push_str("Home"),
        Key::END => label.push_str("End"),
        Key::PAGE_UP => label.push_str("PgUp"),
        Key::PAGE_DOWN => label.push_str("PgDn"),
        Key::SPACE => label.push_str("Space"),
        _ if key.0 > Key::F.0 && key.0 <= Key::F.0 + 35 => {
            label.push_str(&format!("F{}", key.0 - Key::F.0));
        }
        _ => match key.to_char() {
            Some(c) => label.extend(c.to_uppercase()),
            None => label.clear(),
        },
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Item<u8>> {
        vec![
            Item::entry("New", 1).shortcut(Shortcut::char(State::CTRL, 'n')),
            Item::divider(),
            Item::entry("Disabled", 2).enabled(false),
            Item::submenu(
                "Recent",
                vec![Item::entry("a.txt", 3).shortcut(Shortcut::char(State::CTRL, 'r'))],
            ),
            Item::plain("Quit"),
        ]
    }

    #[test]
    fn navigation_skips_dividers_and_disabled_items() {
        let items = sample();

        assert_eq!(next_selectable(&items, None, true), Some(0));
        assert_eq!(next_selectable(&items, Some(0), true), Some(3));
        assert_eq!(next_selectable(&items, Some(4), true), Some(0));
        assert_eq!(next_selectable(&items, Some(0), false), Some(4));
        assert_eq!(next_selectable(&items, None, false), Some(4));
        assert_eq!(next_selectable::<u8>(&[Item::divider()], None, true), None);
    }

    #[test]
    fn shortcuts_are_found_in_nested_levels() {
        let items = sample();

        assert_eq!(
            find_shortcut(&items, Key::from_char('r'), State::CTRL),
            Some(vec![3, 0])
        );
        assert_eq!(
            find_shortcut(&items, Key::from_char('n'), State::CTRL),
            Some(vec![0])
        );
        assert_eq!(find_shortcut(&items, Key::from_char('n'), State::ALT), None);

        let path = [3, 0];
        assert_eq!(get(&items, &path).and_then(Item::message), Some(&3));
        assert_eq!(level(&items, &[3]).map(<[_]>::len), Some(1));
        assert!(level(&items, &[0, 1]).is_none());
    }

    #[test]
    fn shortcut_labels() {
        assert_eq!(
            shortcut_label(Shortcut::char(State::CTRL | State::SHIFT, 's')),
            "Ctrl+Shift+S"
        );
        assert_eq!(
            shortcut_label(Shortcut::new(State::empty(), Key::function(5))),
            "F5"
        );
        assert_eq!(shortcut_label(Shortcut::new(State::ALT, Key::ENTER)), "Alt+Enter");
    }
}
