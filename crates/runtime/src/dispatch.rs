//! Route events through windows and their widget trees.
use crate::core::event::{Kind, Record};
use crate::core::keyboard::State;
use crate::core::widget::{self, Shell};
use crate::core::{Point, window};
use crate::decoder::{Configure, Sink};
use crate::driver::Platform;
use crate::native::NativeId;
use crate::toolkit::{Hook, Toolkit};

/// Feeds decoded events into the toolkit, through an optional hook.
pub(crate) struct Dispatcher<'a, 'h, P: Platform> {
    pub(crate) toolkit: &'a mut Toolkit<P>,
    pub(crate) hook: Option<&'a mut Hook<'h, P>>,
}

impl<P: Platform> Sink for Dispatcher<'_, '_, P> {
    fn locate(&self, native: NativeId) -> Option<(window::Id, Point)> {
        let registry = &self.toolkit.registry;
        let id = registry.get(registry.find_native(native)?)?.window;

        Some((id, self.toolkit.window_origin(id)))
    }

    fn record(&mut self) -> &mut Record {
        &mut self.toolkit.record
    }

    fn dispatch(&mut self, kind: Kind, window: window::Id) -> bool {
        if let Some(hook) = self.hook.as_mut() {
            self.toolkit.record.kind = kind;

            if let Some(consumed) = hook(&mut *self.toolkit, kind, window) {
                return consumed;
            }
        }

        self.toolkit.handle(kind, Some(window))
    }

    fn configure(&mut self, window: window::Id, change: Configure) {
        self.toolkit.configure(window, change);
    }
}

impl<P: Platform> Toolkit<P> {
    /// Dispatches the event in the record as `kind` to `target`.
    ///
    /// While a window holds the grab, input goes to it regardless of
    /// `target`, with the position recomputed relative to it. Returns true
    /// if the event was consumed.
    pub fn handle(&mut self, kind: Kind, target: Option<window::Id>) -> bool {
        self.record.kind = kind;

        let target = match self.grab {
            Some(grab) if kind.is_input() => {
                if target != Some(grab) {
                    let origin = self.window_origin(grab);

                    self.record.x = self.record.x_root - origin.x;
                    self.record.y = self.record.y_root - origin.y;
                }

                grab
            }
            _ => match target {
                Some(target) => target,
                None => return false,
            },
        };

        if !self.is_shown(target) {
            return false;
        }

        let target = if kind.is_pointer() {
            self.child_window_at(target)
        } else {
            target
        };

        match kind {
            Kind::PUSH | Kind::DRAG | Kind::RELEASE | Kind::MOVE => self.route_pointer(target, kind),
            Kind::MOUSEWHEEL | Kind::ZOOM_GESTURE | Kind::SCROLL_GESTURE | Kind::ROTATE_GESTURE => {
                let position = self.record.position();
                self.bubble_at(target, position).is_some()
            }
            Kind::KEYDOWN | Kind::KEYUP => self.route_key(target, kind),
            Kind::SHORTCUT => self.broadcast(target),
            Kind::FOCUS | Kind::UNFOCUS => self.route_focus(target, kind),
            Kind::ENTER | Kind::LEAVE => self.route_crossing(target, kind),
            Kind::SHOW | Kind::HIDE => {
                self.notify_tree(target);
                true
            }
            Kind::CLOSE => {
                if !self.deliver(target, Vec::new()) {
                    log::debug!("window {target} closed");
                    let _ = self.hide(target);
                }

                true
            }
            _ => self.deliver(target, Vec::new()),
        }
    }

    fn child_window_at(&mut self, window: window::Id) -> window::Id {
        let position = self.record.position();

        let child = self.children_of(window).into_iter().rev().find(|child| {
            self.is_shown(*child)
                && self
                    .window(*child)
                    .is_some_and(|settings| settings.bounds().contains(position))
        });

        let Some(child) = child else {
            return window;
        };

        if let Some(settings) = self.window(child) {
            let offset = settings.position;

            self.record.x -= offset.x;
            self.record.y -= offset.y;
        }

        self.child_window_at(child)
    }

    fn route_pointer(&mut self, window: window::Id, kind: Kind) -> bool {
        let position = self.record.position();

        match kind {
            Kind::PUSH => {
                let consumer = self.bubble_at(window, position);
                self.pushed = consumer.map(|widget| (window, widget));

                consumer.is_some()
            }
            Kind::DRAG | Kind::RELEASE => {
                let consumed = match self.pushed {
                    Some((pushed, widget)) if pushed == window => self.deliver_to(window, widget),
                    _ => self.bubble_at(window, position).is_some(),
                };

                if kind == Kind::RELEASE && !self.record.state.intersects(State::BUTTONS) {
                    self.pushed = None;
                }

                consumed
            }
            _ => {
                self.update_hover(window, position);
                self.bubble_at(window, position).is_some()
            }
        }
    }

    fn route_key(&mut self, window: window::Id, kind: Kind) -> bool {
        let path = self
            .windows
            .get(&window)
            .and_then(|entry| widget::find(entry.root.as_ref(), entry.focus?))
            .unwrap_or_default();

        if self.bubble(window, path).is_some() {
            return true;
        }

        if kind != Kind::KEYDOWN {
            return false;
        }

        self.record.kind = Kind::SHORTCUT;
        let consumed = self.broadcast(window);
        self.record.kind = Kind::KEYDOWN;

        consumed
    }

    fn route_focus(&mut self, window: window::Id, kind: Kind) -> bool {
        if kind == Kind::FOCUS {
            self.focus = Some(window);
        } else if self.focus == Some(window) {
            self.focus = None;
        }

        match self.focused_widget(window) {
            Some(widget) => self.deliver_to(window, widget),
            None => self.deliver(window, Vec::new()),
        }
    }

    fn route_crossing(&mut self, window: window::Id, kind: Kind) -> bool {
        if kind == Kind::ENTER {
            self.pointer = Some(window);
            let _ = self.deliver(window, Vec::new());

            let position = self.record.position();
            self.update_hover(window, position);
        } else {
            if self.pointer == Some(window) {
                self.pointer = None;
            }

            if let Some((hovered, widget)) = self.hovered
                && hovered == window
            {
                self.hovered = None;

                if Some(widget) != self.root(window).map(|root| root.id()) {
                    let _ = self.deliver_to(window, widget);
                }
            }

            let _ = self.deliver(window, Vec::new());
        }

        true
    }

    fn update_hover(&mut self, window: window::Id, position: Point) {
        let under = self.root(window).and_then(|root| {
            let path = widget::find_at(root, position)?;
            widget::get(root, &path).map(|widget| (window, widget.id()))
        });

        if under == self.hovered {
            return;
        }

        let previous = self.record.kind;

        if let Some((window, widget)) = self.hovered {
            self.record.kind = Kind::LEAVE;
            let _ = self.deliver_to(window, widget);
        }

        self.hovered = under;

        if let Some((window, widget)) = under {
            self.record.kind = Kind::ENTER;
            let _ = self.deliver_to(window, widget);
        }

        self.record.kind = previous;
    }

    /// Bubbles from the widget under `position`.
    ///
    /// Outside of every widget, the root of the grab window still gets it.
    fn bubble_at(&mut self, window: window::Id, position: Point) -> Option<widget::Id> {
        let path = self
            .root(window)
            .and_then(|root| widget::find_at(root, position))
            .or_else(|| (self.grab == Some(window)).then(Vec::new))?;

        self.bubble(window, path)
    }

    /// Offers the event to the widget at `path`, then to its ancestors.
    fn bubble(&mut self, window: window::Id, path: Vec<usize>) -> Option<widget::Id> {
        let mut shell = Shell::new();

        let consumer = {
            let entry = self.windows.get_mut(&window)?;
            let record = &self.record;

            (0..=path.len()).rev().find_map(|depth| {
                let widget = widget::get_mut(entry.root.as_mut(), &path[..depth])?;

                (widget.takes_events() && widget.handle(record, &mut shell)).then(|| widget.id())
            })
        };

        self.apply(window, shell);

        consumer
    }

    /// Offers the event to the widget at `path` alone.
    fn deliver(&mut self, window: window::Id, path: Vec<usize>) -> bool {
        let mut shell = Shell::new();

        let consumed = {
            let Some(entry) = self.windows.get_mut(&window) else {
                return false;
            };

            widget::get_mut(entry.root.as_mut(), &path)
                .is_some_and(|widget| widget.handle(&self.record, &mut shell))
        };

        self.apply(window, shell);

        consumed
    }

    fn deliver_to(&mut self, window: window::Id, id: widget::Id) -> bool {
        let path = self.root(window).and_then(|root| widget::find(root, id));

        match path {
            Some(path) => self.deliver(window, path),
            None => false,
        }
    }

    fn broadcast(&mut self, window: window::Id) -> bool {
        let mut shell = Shell::new();

        let consumed = {
            let Some(entry) = self.windows.get_mut(&window) else {
                return false;
            };

            widget::broadcast(entry.root.as_mut(), &self.record, &mut shell)
        };

        self.apply(window, shell);

        consumed
    }

    fn notify_tree(&mut self, window: window::Id) {
        let mut shell = Shell::new();

        if let Some(entry) = self.windows.get_mut(&window) {
            widget::notify(entry.root.as_mut(), &self.record, &mut shell);
        }

        self.apply(window, shell);
    }

    fn apply(&mut self, window: window::Id, mut shell: Shell) {
        self.messages.extend(shell.take_messages());

        if shell.is_redraw_requested() {
            self.redraw(window);
        }

        if let Some(widget) = shell.focus_request() {
            self.set_focused_widget(window, widget);
        }
    }

    /// Moves the keyboard focus of a window to one of its widgets.
    ///
    /// The previous focus widget gets `UNFOCUS`, the new one `FOCUS`.
    pub fn set_focused_widget(&mut self, window: window::Id, widget: widget::Id) {
        let Some(entry) = self.windows.get_mut(&window) else {
            return;
        };

        let previous = entry.focus.replace(widget);

        if previous == Some(widget) {
            return;
        }

        let kind = self.record.kind;

        if let Some(previous) = previous {
            self.record.kind = Kind::UNFOCUS;
            let _ = self.deliver_to(window, previous);
        }

        self.record.kind = Kind::FOCUS;
        let _ = self.deliver_to(window, widget);

        self.record.kind = kind;
    }
}
