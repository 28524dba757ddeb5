//! Create custom widgets and operate on them.
//!
//! The toolkit only needs a small collaborator interface from widgets:
//! geometry, a label, visibility/activity flags, a callback slot and the
//! [`Widget::handle`]/[`Widget::draw`] pair. Everything else is up to the
//! widget library built on top.
use crate::event::Record;
use crate::{Graphics, Point, Rectangle};

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{self, AtomicU64};

/// The identifier of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u64);

static COUNT: AtomicU64 = AtomicU64::new(1);

impl Id {
    /// Creates a new unique widget [`Id`].
    pub fn unique() -> Id {
        Id(COUNT.fetch_add(1, atomic::Ordering::Relaxed))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The function and opaque data of a widget callback.
pub struct Callback {
    function: Box<dyn FnMut(&mut dyn Widget, &mut dyn Any)>,
    data: Box<dyn Any>,
}

impl Callback {
    /// Creates a [`Callback`] without user data.
    pub fn new(mut function: impl FnMut(&mut dyn Widget) + 'static) -> Self {
        Self {
            function: Box::new(move |widget, _| function(widget)),
            data: Box::new(()),
        }
    }

    /// Creates a [`Callback`] that receives `data` on every invocation.
    pub fn with_data<T: Any>(
        mut function: impl FnMut(&mut dyn Widget, &mut T) + 'static,
        data: T,
    ) -> Self {
        Self {
            function: Box::new(move |widget, data| {
                if let Some(data) = data.downcast_mut::<T>() {
                    function(widget, data);
                }
            }),
            data: Box::new(data),
        }
    }

    /// Returns the user data, if it has type `T`.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

/// Invokes the callback of a widget.
///
/// The callback is taken out of its slot while it runs, so it may borrow
/// the widget mutably (and even replace its own callback). Returns false
/// if the widget has no callback.
pub fn do_callback(widget: &mut dyn Widget) -> bool {
    let Some(mut callback) = widget.base_mut().callback.take() else {
        return false;
    };

    (callback.function)(widget, callback.data.as_mut());

    let slot = &mut widget.base_mut().callback;

    if slot.is_none() {
        *slot = Some(callback);
    }

    true
}

/// The state every widget carries.
#[derive(Debug)]
pub struct Base {
    id: Id,
    /// Bounds relative to the window.
    pub bounds: Rectangle,
    /// The label.
    pub label: String,
    /// Whether the widget is drawn and receives events.
    pub visible: bool,
    /// Whether the widget accepts input.
    pub active: bool,
    callback: Option<Callback>,
}

impl Base {
    /// Creates the state of a widget covering `bounds`.
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            id: Id::unique(),
            bounds,
            label: String::new(),
            visible: true,
            active: true,
            callback: None,
        }
    }

    /// Returns the [`Id`] of the widget.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the callback slot.
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Replaces the callback slot.
    pub fn set_callback(&mut self, callback: Option<Callback>) {
        self.callback = callback;
    }

    /// Returns true if a callback is registered.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

/// Side effects a widget may request while handling an event.
#[derive(Debug, Default)]
pub struct Shell {
    focus: Option<Id>,
    redraw: bool,
    messages: Vec<Box<dyn Any>>,
}

impl Shell {
    /// Creates an empty [`Shell`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the toolkit to move the keyboard focus to the given widget.
    pub fn request_focus(&mut self, id: Id) {
        self.focus = Some(id);
    }

    /// Marks the window of the handled event as damaged.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Publishes a message for the application to process.
    pub fn publish<T: Any>(&mut self, message: T) {
        self.messages.push(Box::new(message));
    }

    /// Returns the requested focus, if any.
    pub fn focus_request(&self) -> Option<Id> {
        self.focus
    }

    /// Returns true if a redraw was requested.
    pub fn is_redraw_requested(&self) -> bool {
        self.redraw
    }

    /// Takes the published messages.
    pub fn take_messages(&mut self) -> Vec<Box<dyn Any>> {
        std::mem::take(&mut self.messages)
    }
}

/// A component of a user interface.
///
/// Children are positioned in window coordinates, like their parent.
pub trait Widget: Any {
    /// Returns the common state.
    fn base(&self) -> &Base;

    /// Returns the common state, mutably.
    fn base_mut(&mut self) -> &mut Base;

    /// Processes the event in `event`; returns true if it was consumed.
    fn handle(&mut self, event: &Record, shell: &mut Shell) -> bool {
        let _ = (event, shell);
        false
    }

    /// Draws the widget.
    fn draw(&self, gc: &mut dyn Graphics);

    /// Returns the children, front-most last.
    fn children(&self) -> &[Box<dyn Widget>] {
        &[]
    }

    /// Returns the children, mutably.
    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut []
    }

    /// Returns the [`Id`] of the widget.
    fn id(&self) -> Id {
        self.base().id()
    }

    /// Returns the bounds relative to the window.
    fn bounds(&self) -> Rectangle {
        self.base().bounds
    }

    /// Moves and resizes the widget.
    fn resize(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.base_mut().bounds = Rectangle::new(x, y, w, h);
    }

    /// Returns the label.
    fn label(&self) -> &str {
        &self.base().label
    }

    /// Replaces the label.
    fn set_label(&mut self, label: &str) {
        label.clone_into(&mut self.base_mut().label);
    }

    /// Returns true if the widget and its children take part in dispatch.
    fn takes_events(&self) -> bool {
        let base = self.base();
        base.visible && base.active
    }
}

/// Walks the tree down to the path of the widget with the given [`Id`].
///
/// The path holds child indices from `root`; an empty path is the root.
pub fn find(root: &dyn Widget, id: Id) -> Option<Vec<usize>> {
    if root.id() == id {
        return Some(Vec::new());
    }

    root.children()
        .iter()
        .enumerate()
        .find_map(|(index, child)| {
            let mut path = find(child.as_ref(), id)?;
            path.insert(0, index);
            Some(path)
        })
}

/// Returns the path of the deepest widget that takes events at `point`.
///
/// Later children are searched first, since they are drawn on top.
pub fn find_at(root: &dyn Widget, point: Point) -> Option<Vec<usize>> {
    if !root.takes_events() || !root.bounds().contains(point) {
        return None;
    }

    let deeper = root
        .children()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, child)| {
            let mut path = find_at(child.as_ref(), point)?;
            path.insert(0, index);
            Some(path)
        });

    Some(deeper.unwrap_or_default())
}

/// Returns the widget at the end of `path`.
pub fn get<'a>(root: &'a dyn Widget, path: &[usize]) -> Option<&'a dyn Widget> {
    match path.split_first() {
        None => Some(root),
        Some((index, rest)) => get(root.children().get(*index)?.as_ref(), rest),
    }
}

/// Returns the widget at the end of `path`, mutably.
pub fn get_mut<'a>(root: &'a mut dyn Widget, path: &[usize]) -> Option<&'a mut dyn Widget> {
    match path.split_first() {
        None => Some(root),
        Some((index, rest)) => get_mut(root.children_mut().get_mut(*index)?.as_mut(), rest),
    }
}

/// Offers an event to every widget of the tree, depth first, until one
/// consumes it.
pub fn broadcast(root: &mut dyn Widget, event: &Record, shell: &mut Shell) -> bool {
    if !root.takes_events() {
        return false;
    }

    for child in root.children_mut() {
        if broadcast(child.as_mut(), event, shell) {
            return true;
        }
    }

    root.handle(event, shell)
}

/// Delivers an event to every widget of the tree, regardless of consumption.
pub fn notify(root: &mut dyn Widget, event: &Record, shell: &mut Shell) {
    for child in root.children_mut() {
        notify(child.as_mut(), event, shell);
    }

    let _ = root.handle(event, shell);
}

/// Draws a widget and its visible children.
pub fn draw(widget: &dyn Widget, gc: &mut dyn Graphics) {
    if !widget.base().visible {
        return;
    }

    widget.draw(gc);

    for child in widget.children() {
        draw(child.as_ref(), gc);
    }
}

/// A weak reference that notices when the widget state it tracks is gone.
///
/// Code that may re-enter the event loop checks [`Tracker::deleted`] before
/// touching the tracked state again.
#[derive(Debug)]
pub struct Tracker<T> {
    target: Weak<RefCell<T>>,
}

impl<T> Tracker<T> {
    /// Starts tracking `target`.
    pub fn new(target: &Rc<RefCell<T>>) -> Self {
        Self {
            target: Rc::downgrade(target),
        }
    }

    /// Creates a tracker that is already deleted.
    pub fn none() -> Self {
        Self {
            target: Weak::new(),
        }
    }

    /// Returns true if the tracked state was dropped.
    pub fn deleted(&self) -> bool {
        self.target.strong_count() == 0
    }

    /// Returns the tracked state, if it still exists.
    pub fn get(&self) -> Option<Rc<RefCell<T>>> {
        self.target.upgrade()
    }
}

impl<T> Clone for Tracker<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

/// A widget that draws nothing but its children.
#[derive(Debug)]
pub struct Group {
    base: Base,
    children: Vec<Box<dyn Widget>>,
}

impl Group {
    /// Creates an empty [`Group`] covering `bounds`.
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            base: Base::new(bounds),
            children: Vec::new(),
        }
    }

    /// Adds a child, returning its [`Id`].
    pub fn add(&mut self, child: impl Widget) -> Id {
        let id = child.id();
        self.children.push(Box::new(child));
        id
    }

    /// Adds a child.
    pub fn push(mut self, child: impl Widget) -> Self {
        let _ = self.add(child);
        self
    }

    /// Removes the child with the given [`Id`].
    pub fn remove(&mut self, id: Id) -> Option<Box<dyn Widget>> {
        let index = self.children.iter().position(|child| child.id() == id)?;
        Some(self.children.remove(index))
    }
}

impl Widget for Group {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn draw(&self, _gc: &mut dyn Graphics) {}

    fn children(&self) -> &[Box<dyn Widget>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut self.children
    }
}

impl fmt::Debug for dyn Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id())
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        base: Base,
    }

    impl Widget for Counter {
        fn base(&self) -> &Base {
            &self.base
        }

        fn base_mut(&mut self) -> &mut Base {
            &mut self.base
        }

        fn draw(&self, _gc: &mut dyn Graphics) {}
    }

    #[test]
    fn do_callback_passes_data_and_restores_the_slot() {
        let mut widget = Counter {
            base: Base::new(Rectangle::new(0, 0, 10, 10)).with_callback(Callback::with_data(
                |widget, count: &mut u32| {
                    *count += 1;
                    widget.set_label(&format!("clicked {count}"));
                },
                0u32,
            )),
        };

        assert!(do_callback(&mut widget));
        assert!(do_callback(&mut widget));

        assert_eq!(widget.label(), "clicked 2");
        assert_eq!(
            widget.base().callback.as_ref().and_then(Callback::data::<u32>),
            Some(&2)
        );
    }

    #[test]
    fn find_at_prefers_the_topmost_child() {
        let under = Counter {
            base: Base::new(Rectangle::new(0, 0, 50, 50)),
        };
        let over = Counter {
            base: Base::new(Rectangle::new(20, 20, 50, 50)),
        };
        let over_id = over.id();

        let root = Group::new(Rectangle::new(0, 0, 100, 100))
            .push(under)
            .push(over);

        assert_eq!(find_at(&root, Point::new(25, 25)), Some(vec![1]));
        assert_eq!(find_at(&root, Point::new(5, 5)), Some(vec![0]));
        assert_eq!(find_at(&root, Point::new(90, 5)), Some(vec![]));
        assert_eq!(find_at(&root, Point::new(200, 5)), None);
        assert_eq!(find(&root, over_id), Some(vec![1]));
    }

    #[test]
    fn tracker_notices_drops() {
        let state = Rc::new(RefCell::new(3));
        let tracker = Tracker::new(&state);

        assert!(!tracker.deleted());
        drop(state);
        assert!(tracker.deleted());
        assert!(tracker.get().is_none());
    }
}
