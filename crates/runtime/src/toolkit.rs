//! The toolkit: windows, the event loop and the services around it.
use crate::Error;
use crate::core::event::{Kind, Record};
use crate::core::graphics::{Clip, Font, Graphics};
use crate::core::settings::Baseline;
use crate::core::time::{self, Duration, Instant};
use crate::core::widget::{self, Widget};
use crate::core::{Point, Rectangle, Settings, Size, window};
use crate::decoder::{Configure, Decoder};
use crate::dispatch::Dispatcher;
use crate::driver::{
    CopySurfaceDriver, GraphicsDriver, Image, ImageSurfaceDriver, Monitor, Platform, ScreenDriver,
    SystemDriver, WindowDriver,
};
use crate::lock::{Guard, Message, ThreadHandle};
use crate::native::{self, NativeId};
use crate::registry::{self, Registry};
use crate::timer::{self, Repeat, Timeouts};

use parking_lot::{ArcMutexGuard, Mutex};
use rustc_hash::FxHashMap;
use std::any::Any;
use std::mem;
use std::sync::Arc;

type Timeout<P> = Box<dyn FnMut(&mut Toolkit<P>) -> Repeat>;
type Idle<P> = Box<dyn FnMut(&mut Toolkit<P>)>;

/// Intercepts decoded events before they are dispatched.
///
/// Returning `Some(consumed)` skips the regular dispatch.
pub type Hook<'a, P> = dyn FnMut(&mut Toolkit<P>, Kind, window::Id) -> Option<bool> + 'a;

/// The life cycle of a toolkit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The window was never shown.
    Unshown,
    /// The window is shown and owns a window record.
    Shown,
    /// The window was shown and hidden again.
    Hidden,
}

pub(crate) struct Window<P: Platform> {
    pub(crate) settings: window::Settings,
    pub(crate) root: Box<dyn Widget>,
    pub(crate) driver: P::Window,
    pub(crate) status: Status,
    pub(crate) visible: bool,
    pub(crate) damaged: bool,
    pub(crate) focus: Option<widget::Id>,
    pub(crate) scale: f32,
}

/// A running toolkit on top of a [`Platform`].
///
/// The toolkit owns the drivers, every window and its widget tree, the
/// event record and the timer queue. [`Toolkit::wait`] is the only call
/// that blocks.
pub struct Toolkit<P: Platform> {
    platform: P,
    settings: Settings,
    baseline: Baseline,
    screen: P::Screen,
    system: P::System,
    graphics: P::Graphics,
    pub(crate) windows: FxHashMap<window::Id, Window<P>>,
    pub(crate) registry: Registry,
    pub(crate) record: Record,
    decoder: Decoder,
    events: Vec<native::Event>,
    timeouts: Timeouts<Timeout<P>>,
    idle: Option<Idle<P>>,
    idle_generation: u64,
    lock: Arc<Mutex<()>>,
    guard: Option<Guard>,
    inbox: Arc<Mutex<Vec<Message>>>,
    pub(crate) messages: Vec<Box<dyn Any>>,
    pub(crate) grab: Option<window::Id>,
    pub(crate) focus: Option<window::Id>,
    pub(crate) pointer: Option<window::Id>,
    pub(crate) pushed: Option<(window::Id, widget::Id)>,
    pub(crate) hovered: Option<(window::Id, widget::Id)>,
}

impl<P: Platform> Toolkit<P> {
    /// Starts the toolkit on `platform`.
    ///
    /// Fails if the settings are invalid or a main driver cannot be created.
    pub fn new(mut platform: P, settings: Settings) -> Result<Self, Error> {
        settings.validate()?;

        let mut screen = platform.new_screen_driver(&settings)?;
        screen.open_display()?;

        let baseline = settings.baseline.unwrap_or_else(|| screen.baseline());
        let system = platform.new_system_driver(&mut screen)?;
        let mut graphics = platform.new_main_graphics_driver(&mut screen, baseline)?;

        screen.get_system_colors(graphics.color_map_mut());
        graphics.font(Font::SANS, settings.font_size);

        log::debug!("toolkit started (locale {})", system.locale());

        Ok(Self {
            platform,
            decoder: Decoder::new(&settings),
            settings,
            baseline,
            screen,
            system,
            graphics,
            windows: FxHashMap::default(),
            registry: Registry::new(),
            record: Record::default(),
            events: Vec::new(),
            timeouts: Timeouts::new(),
            idle: None,
            idle_generation: 0,
            lock: Arc::new(Mutex::new(())),
            guard: None,
            inbox: Arc::new(Mutex::new(Vec::new())),
            messages: Vec::new(),
            grab: None,
            focus: None,
            pointer: None,
            pushed: None,
            hovered: None,
        })
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the event record of the last dispatched event.
    pub fn event(&self) -> &Record {
        &self.record
    }

    /// Returns the event record, mutably, to prepare a synthetic event.
    pub fn event_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    /// Returns the platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns the main graphics driver.
    pub fn graphics(&mut self) -> &mut P::Graphics {
        &mut self.graphics
    }

    /// Adds a window with `root` as its widget tree; it starts unshown.
    ///
    /// The root widget is resized to cover the window.
    pub fn add_window(&mut self, settings: window::Settings, root: impl Widget) -> window::Id {
        let id = window::Id::unique();
        let driver = self.platform.new_window_driver(&mut self.screen, &settings);

        let mut root: Box<dyn Widget> = Box::new(root);
        root.resize(0, 0, settings.size.width, settings.size.height);

        let _ = self.windows.insert(
            id,
            Window {
                settings,
                root,
                driver,
                status: Status::Unshown,
                visible: false,
                damaged: false,
                focus: None,
                scale: 1.0,
            },
        );

        id
    }

    /// Removes a window and its child windows, hiding them first.
    ///
    /// Returns the widget tree of the window.
    pub fn remove_window(&mut self, id: window::Id) -> Option<Box<dyn Widget>> {
        let _ = self.hide(id);

        for child in self.children_of(id) {
            let _ = self.remove_window(child);
        }

        let window = self.windows.remove(&id)?;
        log::debug!("window {id} removed");

        Some(window.root)
    }

    /// Returns the life-cycle status of a window.
    pub fn status(&self, id: window::Id) -> Option<Status> {
        self.windows.get(&id).map(|window| window.status)
    }

    /// Returns true if the window is shown.
    pub fn is_shown(&self, id: window::Id) -> bool {
        self.status(id) == Some(Status::Shown)
    }

    /// Returns the settings of a window.
    pub fn window(&self, id: window::Id) -> Option<&window::Settings> {
        self.windows.get(&id).map(|window| &window.settings)
    }

    /// Returns the widget tree of a window.
    pub fn root(&self, id: window::Id) -> Option<&dyn Widget> {
        self.windows.get(&id).map(|window| window.root.as_ref())
    }

    /// Returns the widget tree of a window, mutably.
    pub fn root_mut(&mut self, id: window::Id) -> Option<&mut dyn Widget> {
        self.windows.get_mut(&id).map(|window| window.root.as_mut())
    }

    /// Returns the widget with the given id in a window.
    pub fn widget(&self, window: window::Id, id: widget::Id) -> Option<&dyn Widget> {
        let root = self.root(window)?;
        let path = widget::find(root, id)?;

        widget::get(root, &path)
    }

    /// Returns the widget with the given id in a window, mutably.
    pub fn widget_mut(&mut self, window: window::Id, id: widget::Id) -> Option<&mut dyn Widget> {
        let root = self.root_mut(window)?;
        let path = widget::find(root, id)?;

        widget::get_mut(root, &path)
    }

    /// Returns the window records in stacking order.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the most recently shown or raised window.
    pub fn first_window(&self) -> Option<window::Id> {
        self.registry.first().map(|record| record.window)
    }

    /// Returns the native window of a shown window, if it owns one.
    pub fn native(&self, id: window::Id) -> Option<NativeId> {
        let handle = self.registry.find(id)?;
        self.registry.get(handle)?.native
    }

    /// Shows a window.
    ///
    /// A top-level window gets a native window the first time it is shown
    /// after being unshown or hidden; showing it again raises it. A child
    /// window is composited into its top-level ancestor and only shows
    /// together with its parent.
    pub fn show(&mut self, id: window::Id) -> bool {
        let Some(window) = self.windows.get(&id) else {
            log::warn!("cannot show unknown window {id}");
            return false;
        };

        let parent = window.settings.parent;
        let position = window.settings.position;
        let takes_focus = parent.is_none() && window.settings.kind.takes_focus();

        if window.status == Status::Shown {
            self.raise(id);
            return true;
        }

        if let Some(parent) = parent
            && !self.is_shown(parent)
        {
            if let Some(window) = self.windows.get_mut(&id) {
                window.visible = true;
            }

            log::debug!("window {id} will show together with window {parent}");
            return false;
        }

        let scale = match self.settings.scale {
            Some(scale) => scale,
            None => parent.map_or_else(
                || {
                    let n = self.screen.screen_num(position);
                    self.screen.scale(n)
                },
                |parent| self.windows.get(&parent).map_or(1.0, |parent| parent.scale),
            ),
        };

        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };

        let native = if parent.is_none() {
            match window.driver.make_window(&window.settings, scale) {
                Ok(native) => {
                    window.driver.show(native);
                    Some(native)
                }
                Err(error) => {
                    log::error!("window {id} is shown without a native window: {error}");
                    None
                }
            }
        } else {
            None
        };

        window.status = Status::Shown;
        window.visible = true;
        window.scale = scale;

        let _ = self.registry.insert(
            registry::Record {
                window: id,
                native,
                clip: None,
            },
            parent.is_some(),
        );

        log::debug!("window {id} shown ({native:?})");

        let previous = self.record.kind;

        if takes_focus {
            let _ = self.handle(Kind::FOCUS, Some(id));
        }

        let _ = self.handle(Kind::SHOW, Some(id));
        self.record.kind = previous;

        self.redraw(id);

        for child in self.children_of(id) {
            if self.windows.get(&child).is_some_and(|child| child.visible) {
                let _ = self.show(child);
            }
        }

        true
    }

    /// Hides a window and its child windows.
    ///
    /// The window record is unregistered and its native window destroyed;
    /// the toolkit window itself stays and may be shown again.
    pub fn hide(&mut self, id: window::Id) -> bool {
        self.hide_window(id, false)
    }

    fn hide_window(&mut self, id: window::Id, keep_visible: bool) -> bool {
        if !self.is_shown(id) {
            return false;
        }

        for child in self.children_of(id) {
            let _ = self.hide_window(child, true);
        }

        let previous = self.record.kind;
        let _ = self.handle(Kind::HIDE, Some(id));
        self.record.kind = previous;

        let record = self
            .registry
            .find(id)
            .and_then(|handle| self.registry.remove(handle));

        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };

        if let Some(record) = record {
            if let Some(native) = record.native {
                window.driver.destroy(native);

                log::debug!("window {id}: native window {native} destroyed");
            }

            if record.clip.is_some() {
                log::trace!("window {id}: clip region released");
            }
        }

        window.status = Status::Hidden;
        window.visible = keep_visible;
        window.damaged = false;

        self.forget(id);

        true
    }

    fn forget(&mut self, id: window::Id) {
        if self.grab == Some(id) {
            self.grab = None;
            log::debug!("grab released: window {id} was hidden");
        }

        if self.focus == Some(id) {
            self.focus = None;
        }

        if self.pointer == Some(id) {
            self.pointer = None;
        }

        if self.pushed.is_some_and(|(window, _)| window == id) {
            self.pushed = None;
        }

        if self.hovered.is_some_and(|(window, _)| window == id) {
            self.hovered = None;
        }
    }

    fn raise(&mut self, id: window::Id) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        window.visible = true;

        if window.settings.parent.is_none()
            && let Some(handle) = self.registry.find(id)
        {
            self.registry.raise(handle);

            if let Some(native) = self.registry.get(handle).and_then(|record| record.native) {
                window.driver.show(native);
            }
        }

        self.redraw(id);
    }

    /// Moves and resizes a window.
    pub fn resize(&mut self, id: window::Id, bounds: Rectangle) {
        let native = self.native(id);

        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        window.settings.position = bounds.position();
        window.settings.size = bounds.size();
        window.root.resize(0, 0, bounds.width, bounds.height);

        if let Some(native) = native {
            window.driver.resize(native, bounds);
        }

        self.redraw(self.top_level(id));
    }

    /// Changes the title of a window.
    pub fn set_label(&mut self, id: window::Id, label: &str) {
        let native = self.native(id);

        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        label.clone_into(&mut window.settings.label);

        if let Some(native) = native {
            window.driver.set_label(native, label);
        }
    }

    pub(crate) fn configure(&mut self, id: window::Id, change: Configure) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        match change {
            Configure::Resized(size) => {
                window.settings.size = size;
                window.root.resize(0, 0, size.width, size.height);
            }
            Configure::Moved(position) => {
                window.settings.position = position;
                return;
            }
            Configure::Exposed => {}
        }

        self.redraw(id);
    }

    /// Marks a window and its shown child windows as damaged.
    pub fn redraw(&mut self, id: window::Id) {
        if let Some(window) = self.windows.get_mut(&id)
            && window.status == Status::Shown
        {
            window.damaged = true;
        }

        for child in self.children_of(id) {
            self.redraw(child);
        }
    }

    /// Returns true if the window waits to be drawn.
    pub fn is_damaged(&self, id: window::Id) -> bool {
        self.windows.get(&id).is_some_and(|window| window.damaged)
    }

    pub(crate) fn children_of(&self, id: window::Id) -> Vec<window::Id> {
        let mut children: Vec<_> = self
            .windows
            .iter()
            .filter(|(_, window)| window.settings.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();

        children.sort_unstable();
        children
    }

    /// Returns the top-level ancestor of a window.
    pub fn top_level(&self, id: window::Id) -> window::Id {
        let mut current = id;

        for _ in 0..self.windows.len() {
            match self
                .windows
                .get(&current)
                .and_then(|window| window.settings.parent)
            {
                Some(parent) => current = parent,
                None => break,
            }
        }

        current
    }

    /// Returns the offset of a window inside its top-level ancestor.
    pub fn offset_in_top_level(&self, id: window::Id) -> Point {
        let mut offset = Point::ORIGIN;
        let mut current = id;

        for _ in 0..self.windows.len() {
            let Some(window) = self.windows.get(&current) else {
                break;
            };

            let Some(parent) = window.settings.parent else {
                break;
            };

            offset = offset + window.settings.position;
            current = parent;
        }

        offset
    }

    /// Returns the position of a window on the screen.
    pub fn window_origin(&self, id: window::Id) -> Point {
        let top = self.top_level(id);
        let position = self
            .windows
            .get(&top)
            .map_or(Point::ORIGIN, |window| window.settings.position);

        position + self.offset_in_top_level(id)
    }

    /// Binds the main graphics driver to a window for drawing.
    ///
    /// The driver draws into the native window of the top-level ancestor,
    /// offset to the window and clipped to the part of it that is inside
    /// all of its parents. Returns false if there is nothing to draw into.
    pub fn make_current(&mut self, id: window::Id) -> bool {
        if !self.is_shown(id) {
            return false;
        }

        let top = self.top_level(id);

        let Some(native) = self.native(top) else {
            return false;
        };

        let scale = self.windows.get(&top).map_or(1.0, |window| window.scale);
        let origin = self.offset_in_top_level(id);
        let mut clip = Clip::None;

        if id != top {
            let mut visible = self.bounds_in_top_level(id);
            let mut current = id;

            while let Some(parent) = self
                .windows
                .get(&current)
                .and_then(|window| window.settings.parent)
            {
                if parent == top {
                    break;
                }

                let bounds = self.bounds_in_top_level(parent);
                visible = visible
                    .intersection(&bounds)
                    .unwrap_or(Rectangle::new(visible.x, visible.y, 0, 0));
                current = parent;
            }

            clip = Clip::Rectangle(visible.scale(scale));
        }

        let region = self
            .registry
            .find(id)
            .and_then(|handle| self.registry.get(handle))
            .and_then(|record| record.clip);

        if let Some(region) = region {
            let region = region.translate(origin).scale(scale);

            clip = match clip {
                Clip::None => Clip::Rectangle(region),
                Clip::Rectangle(clip) => Clip::Rectangle(
                    clip.intersection(&region)
                        .unwrap_or(Rectangle::new(clip.x, clip.y, 0, 0)),
                ),
            };
        }

        self.graphics.state_mut().bind(origin, scale, clip);
        self.graphics.begin(native)
    }

    fn bounds_in_top_level(&self, id: window::Id) -> Rectangle {
        let size = self
            .windows
            .get(&id)
            .map_or(Size::ZERO, |window| window.settings.size);

        Rectangle::with_size(self.offset_in_top_level(id), size)
    }

    /// Restricts drawing of a shown window to `region`, in window coordinates.
    pub fn set_clip_region(&mut self, id: window::Id, region: Option<Rectangle>) {
        if let Some(record) = self
            .registry
            .find(id)
            .and_then(|handle| self.registry.get_mut(handle))
        {
            record.clip = region;
        }

        self.redraw(id);
    }

    /// Draws every damaged window, then presents once.
    pub fn flush(&mut self) {
        let mut damaged: Vec<window::Id> = self
            .registry
            .windows()
            .into_iter()
            .filter(|id| self.is_damaged(*id))
            .collect();

        damaged.sort_by_key(|id| self.depth(*id));

        for id in damaged {
            if let Some(window) = self.windows.get_mut(&id) {
                window.damaged = false;
            }

            if !self.make_current(id) {
                continue;
            }

            if let Some(window) = self.windows.get(&id) {
                widget::draw(window.root.as_ref(), &mut self.graphics);
            }

            self.graphics.end();
        }

        self.screen.flush();
    }

    fn depth(&self, id: window::Id) -> usize {
        let mut depth = 0;
        let mut current = id;

        while let Some(parent) = self
            .windows
            .get(&current)
            .and_then(|window| window.settings.parent)
        {
            depth += 1;
            current = parent;

            if depth > self.windows.len() {
                break;
            }
        }

        depth
    }

    /// Waits for events and dispatches them.
    ///
    /// Blocks for at most `timeout`, and never past the next timer deadline.
    /// [`time::FOREVER`] blocks until an event arrives, a timer fires or
    /// another thread calls [`ThreadHandle::awake`]; a zero timeout polls.
    ///
    /// Returns true if at least one event was handled.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        self.wait_inner(timeout, None)
    }

    /// Waits like [`Toolkit::wait`], offering every decoded event to `hook`
    /// before dispatching it.
    pub fn wait_with(&mut self, timeout: Duration, hook: &mut Hook<'_, P>) -> bool {
        self.wait_inner(timeout, Some(hook))
    }

    fn wait_inner(&mut self, timeout: Duration, mut hook: Option<&mut Hook<'_, P>>) -> bool {
        let limit = (timeout != time::FOREVER).then_some(timeout);

        let _ = self.elapse_timeouts();
        let mut limit = self.timeouts.time_to_wait(Instant::now(), limit);

        self.flush();

        if self.idle.is_some() {
            limit = Some(Duration::ZERO);
        }

        let mut events = mem::take(&mut self.events);
        let system = &mut self.system;

        match self.guard.as_mut() {
            Some(guard) => {
                ArcMutexGuard::unlocked(guard, || system.wait_native(limit, &mut events));
            }
            None => system.wait_native(limit, &mut events),
        }

        let mut handled = false;
        let mut decoder = mem::take(&mut self.decoder);

        {
            let mut sink = Dispatcher {
                toolkit: self,
                hook: hook.as_deref_mut(),
            };

            for event in events.drain(..) {
                handled |= decoder.decode(event, &mut sink);
            }
        }

        self.decoder = decoder;
        self.events = events;

        handled |= self.collect_messages();

        let _ = self.elapse_timeouts();
        self.run_idle();

        handled
    }

    /// Runs the event loop until no window is shown.
    pub fn run(&mut self) {
        while !self.registry.is_empty() {
            let _ = self.wait(time::FOREVER);
        }
    }

    /// Schedules `callback` to run after `delay`.
    pub fn add_timeout(
        &mut self,
        delay: Duration,
        callback: impl FnMut(&mut Toolkit<P>) -> Repeat + 'static,
    ) -> timer::Id {
        self.timeouts
            .add(Instant::now(), delay, Box::new(callback))
    }

    /// Cancels a timeout.
    pub fn remove_timeout(&mut self, id: timer::Id) -> bool {
        self.timeouts.remove(id)
    }

    /// Returns true if the timeout waits for its deadline.
    pub fn has_timeout(&self, id: timer::Id) -> bool {
        self.timeouts.contains(id)
    }

    fn elapse_timeouts(&mut self) -> bool {
        let due = self.timeouts.take_due(Instant::now());
        let fired = !due.is_empty();

        for mut due in due {
            let repeat = (due.callback)(self);
            self.timeouts.finish(due, repeat, Instant::now());
        }

        fired
    }

    /// Arms the idle callback; it runs after every wait and makes waits poll.
    pub fn set_idle(&mut self, callback: impl FnMut(&mut Toolkit<P>) + 'static) {
        self.idle = Some(Box::new(callback));
        self.idle_generation += 1;
    }

    /// Disarms the idle callback.
    pub fn clear_idle(&mut self) {
        self.idle = None;
        self.idle_generation += 1;
    }

    fn run_idle(&mut self) {
        let Some(mut idle) = self.idle.take() else {
            return;
        };

        let generation = self.idle_generation;
        idle(self);

        if self.idle_generation == generation {
            self.idle = Some(idle);
        }
    }

    /// Makes the UI thread hold the global lock outside of waits.
    pub fn lock(&mut self) {
        if self.guard.is_none() {
            self.guard = Some(self.lock.lock_arc());
        }
    }

    /// Releases the global lock.
    pub fn unlock(&mut self) {
        self.guard = None;
    }

    /// Returns a handle for worker threads.
    pub fn thread_handle(&self) -> ThreadHandle {
        ThreadHandle {
            lock: Arc::clone(&self.lock),
            waker: self.system.waker(),
            messages: Arc::clone(&self.inbox),
        }
    }

    fn collect_messages(&mut self) -> bool {
        let mut inbox = self.inbox.lock();
        let received = !inbox.is_empty();

        self.messages
            .extend(inbox.drain(..).map(|message| message as Box<dyn Any>));

        received
    }

    /// Takes the messages published by widgets and worker threads.
    pub fn take_messages(&mut self) -> Vec<Box<dyn Any>> {
        mem::take(&mut self.messages)
    }

    /// Puts text on the clipboard.
    pub fn copy(&mut self, text: &str) {
        self.system.copy(text);
    }

    /// Returns the text on the clipboard.
    pub fn paste(&mut self) -> Option<String> {
        self.system.paste()
    }

    /// Returns the user locale.
    pub fn locale(&self) -> String {
        self.system.locale()
    }

    /// Enumerates the monitors.
    pub fn screens(&mut self) -> Vec<Monitor> {
        self.screen.screens()
    }

    /// Returns the work area of the monitor containing `point`.
    pub fn work_area_at(&mut self, point: Point) -> Rectangle {
        let n = self.screen.screen_num(point);
        self.screen.work_area(n)
    }

    /// Draws offscreen and returns the result.
    pub fn image_surface(
        &mut self,
        size: Size,
        draw: impl FnOnce(&mut dyn Graphics),
    ) -> Result<Image, Error> {
        let mut surface =
            self.platform
                .new_image_surface_driver(&mut self.screen, size, self.baseline)?;

        draw(surface.graphics());

        Ok(surface.image())
    }

    /// Draws offscreen and puts the result on the clipboard.
    pub fn copy_surface(
        &mut self,
        size: Size,
        draw: impl FnOnce(&mut dyn Graphics),
    ) -> Result<(), Error> {
        let mut surface =
            self.platform
                .new_copy_surface_driver(&mut self.screen, size, self.baseline)?;

        draw(surface.graphics());
        self.system.copy_image(surface.finish());

        Ok(())
    }

    /// Returns the window receiving all input, if any.
    pub fn grab(&self) -> Option<window::Id> {
        self.grab
    }

    /// Routes all input to `window`, or stops doing so.
    ///
    /// Only shown windows can take the grab.
    pub fn set_grab(&mut self, window: Option<window::Id>) -> bool {
        match window {
            Some(id) if !self.is_shown(id) => {
                log::warn!("window {id} is not shown and cannot take the grab");
                false
            }
            _ => {
                if self.grab != window {
                    log::debug!("grab moved from {:?} to {window:?}", self.grab);
                }

                self.grab = window;
                true
            }
        }
    }

    /// Returns the window with the keyboard focus.
    pub fn focus(&self) -> Option<window::Id> {
        self.focus
    }

    /// Returns the focus widget of a window.
    pub fn focused_widget(&self, window: window::Id) -> Option<widget::Id> {
        self.windows.get(&window).and_then(|window| window.focus)
    }

    /// Returns the widget that took the last push.
    pub fn pushed(&self) -> Option<(window::Id, widget::Id)> {
        self.pushed
    }

    /// Returns the widget under the pointer.
    pub fn hovered(&self) -> Option<(window::Id, widget::Id)> {
        self.hovered
    }

    /// Returns the window under the pointer.
    pub fn pointer_window(&self) -> Option<window::Id> {
        self.pointer
    }
}

impl<P: Platform> Drop for Toolkit<P> {
    fn drop(&mut self) {
        for id in self.registry.windows() {
            let _ = self.hide(id);
        }
    }
}
