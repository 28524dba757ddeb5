//! The [`winit`] event loop, pumped on demand.
//!
//! The toolkit owns the loop of the application, so the event loop is never
//! run. Every native wait pumps it once, and so does every window creation,
//! since windows can only be created while the loop is active.
use crate::conversion::{self, Tracking};
use crate::error::Error;

use flint_runtime::Monitor;
use flint_runtime::core::time::Duration;
use flint_runtime::core::{Color, ColorMap, Rectangle, window};
use flint_runtime::native::{self, NativeId};
use flint_tiny_skia::{Pixmap, Targets, canvas, to_xrgb};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::mem;
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy, OwnedDisplayHandle};
use winit::monitor::MonitorHandle;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{WindowAttributes, WindowId};

type Presenter = softbuffer::Surface<OwnedDisplayHandle, Arc<winit::window::Window>>;

/// The user event waking a blocked pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wake;

/// A native window and its presentation surface.
pub(crate) struct Native {
    pub window: Arc<winit::window::Window>,
    pub kind: window::Kind,
    presenter: Presenter,
    tracking: Tracking,
}

struct Pending {
    native: NativeId,
    kind: window::Kind,
    attributes: WindowAttributes,
}

/// The event loop and everything its handler touches.
pub(crate) struct Pump {
    event_loop: Option<EventLoop<Wake>>,
    proxy: Option<Arc<Mutex<EventLoopProxy<Wake>>>>,
    state: State,
}

struct State {
    display: Option<softbuffer::Context<OwnedDisplayHandle>>,
    natives: FxHashMap<NativeId, Native>,
    ids: FxHashMap<WindowId, NativeId>,
    pending: Vec<Pending>,
    failures: FxHashMap<NativeId, Error>,
    events: Vec<native::Event>,
    monitors: Vec<Monitor>,
    targets: Targets,
    next_native: u64,
    exited: bool,
}

impl Pump {
    pub fn new(targets: Targets) -> Self {
        Self {
            event_loop: None,
            proxy: None,
            state: State {
                display: None,
                natives: FxHashMap::default(),
                ids: FxHashMap::default(),
                pending: Vec::new(),
                failures: FxHashMap::default(),
                events: Vec::new(),
                monitors: Vec::new(),
                targets,
                next_native: 0,
                exited: false,
            },
        }
    }

    /// Creates the event loop and the presentation context.
    pub fn open(&mut self) -> Result<(), Error> {
        if self.event_loop.is_some() {
            return Ok(());
        }

        let event_loop = EventLoop::<Wake>::with_user_event().build()?;
        let display = softbuffer::Context::new(event_loop.owned_display_handle())?;

        self.proxy = Some(Arc::new(Mutex::new(event_loop.create_proxy())));
        self.state.display = Some(display);
        self.event_loop = Some(event_loop);

        log::debug!("winit event loop created");

        // The first pump resumes the loop and enumerates the monitors.
        self.pump(Some(Duration::ZERO));

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.event_loop.is_some()
    }

    /// Returns a function waking a blocked pump from any thread.
    pub fn wake(&self) -> impl Fn() + Send + Sync + 'static {
        let proxy = self.proxy.clone();

        move || {
            if let Some(proxy) = &proxy {
                let _ = proxy.lock().send_event(Wake);
            }
        }
    }

    pub fn monitors(&mut self) -> Vec<Monitor> {
        if self.state.monitors.is_empty() {
            self.pump(Some(Duration::ZERO));
        }

        self.state.monitors.clone()
    }

    /// Pumps once, then moves every event received so far into `events`.
    pub fn wait(&mut self, timeout: Option<Duration>, events: &mut Vec<native::Event>) {
        let timeout = if self.state.events.is_empty() {
            timeout
        } else {
            Some(Duration::ZERO)
        };

        self.pump(timeout);
        events.append(&mut self.state.events);
    }

    /// Creates a native window, pumping until the loop has done so.
    pub fn create(
        &mut self,
        attributes: WindowAttributes,
        kind: window::Kind,
    ) -> Result<NativeId, Error> {
        if !self.is_open() {
            return Err(Error::NoDisplay);
        }

        self.state.next_native += 1;
        let native = NativeId(self.state.next_native);

        self.state.pending.push(Pending {
            native,
            kind,
            attributes,
        });

        self.pump(Some(Duration::ZERO));

        if self.state.natives.contains_key(&native) {
            return Ok(native);
        }

        self.state.pending.retain(|pending| pending.native != native);

        Err(self
            .state
            .failures
            .remove(&native)
            .unwrap_or(Error::Inactive))
    }

    pub fn native(&self, native: NativeId) -> Option<&Native> {
        self.state.natives.get(&native)
    }

    pub fn destroy(&mut self, native: NativeId) {
        if let Some(entry) = self.state.natives.remove(&native) {
            let _ = self.state.ids.remove(&entry.window.id());
        }

        let _ = self.state.targets.borrow_mut().remove(&native);

        log::debug!("winit window {native} destroyed");
    }

    /// Gives a native window a canvas matching its current size.
    pub fn reallocate(&mut self, native: NativeId) {
        self.state.reallocate(native);
    }

    /// Copies the canvases of `drawn` to their windows.
    pub fn present(&mut self, drawn: impl IntoIterator<Item = NativeId>) {
        let targets = self.state.targets.borrow();

        for native in drawn {
            let (Some(entry), Some(pixmap)) =
                (self.state.natives.get_mut(&native), targets.get(&native))
            else {
                continue;
            };

            if let Err(error) = present(entry, pixmap) {
                log::warn!("{native} could not be presented: {error}");
            }
        }
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        let Some(mut event_loop) = self.event_loop.take() else {
            return;
        };

        let status = event_loop.pump_app_events(
            timeout,
            &mut Handler {
                state: &mut self.state,
            },
        );

        self.event_loop = Some(event_loop);

        if let PumpStatus::Exit(code) = status
            && !self.state.exited
        {
            log::debug!("winit event loop exited with {code}");
            self.state.exited = true;
        }
    }
}

impl fmt::Debug for Pump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pump")
            .field("open", &self.is_open())
            .field("windows", &self.state.natives.len())
            .field("queued", &self.state.events.len())
            .finish_non_exhaustive()
    }
}

fn present(native: &mut Native, pixmap: &Pixmap) -> Result<(), Error> {
    let (Some(width), Some(height)) = (NonZeroU32::new(pixmap.width()), NonZeroU32::new(pixmap.height()))
    else {
        return Ok(());
    };

    native.presenter.resize(width, height)?;

    let mut buffer = native.presenter.buffer_mut()?;
    to_xrgb(pixmap, &mut buffer);

    native.window.pre_present_notify();
    buffer.present()?;

    Ok(())
}

impl State {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        for pending in mem::take(&mut self.pending) {
            let native = pending.native;

            match self.create(event_loop, pending) {
                Ok(entry) => {
                    let _ = self.ids.insert(entry.window.id(), native);
                    let _ = self.natives.insert(native, entry);
                    self.reallocate(native);

                    log::debug!("winit window {native} created");
                }
                Err(error) => {
                    log::warn!("winit window {native} could not be created: {error}");
                    let _ = self.failures.insert(native, error);
                }
            }
        }
    }

    fn create(&self, event_loop: &ActiveEventLoop, pending: Pending) -> Result<Native, Error> {
        let display = self.display.as_ref().ok_or(Error::NoDisplay)?;
        let window = Arc::new(event_loop.create_window(pending.attributes)?);
        let presenter = softbuffer::Surface::new(display, Arc::clone(&window))?;

        Ok(Native {
            tracking: Tracking::new(window.scale_factor()),
            window,
            kind: pending.kind,
            presenter,
        })
    }

    fn reallocate(&mut self, native: NativeId) {
        let Some(entry) = self.natives.get(&native) else {
            return;
        };

        let size = entry.window.inner_size();
        let background = ColorMap::default().resolve(Color::BACKGROUND);

        let mut targets = self.targets.borrow_mut();
        let fits = targets
            .get(&native)
            .is_some_and(|pixmap| pixmap.width() == size.width && pixmap.height() == size.height);

        if !fits && let Some(pixmap) = canvas(size.width, size.height, background) {
            let _ = targets.insert(native, pixmap);
        }
    }

    fn refresh_monitors(&mut self, event_loop: &ActiveEventLoop) {
        self.monitors = event_loop.available_monitors().map(|handle| monitor(&handle)).collect();
    }
}

fn monitor(handle: &MonitorHandle) -> Monitor {
    let scale = handle.scale_factor();
    let bounds = Rectangle::with_size(
        conversion::point(handle.position(), scale),
        conversion::size(handle.size(), scale),
    );

    Monitor {
        bounds,
        work_area: bounds,
        scale: scale as f32,
    }
}

struct Handler<'a> {
    state: &'a mut State,
}

impl ApplicationHandler<Wake> for Handler<'_> {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if cause == StartCause::Init || self.state.monitors.is_empty() {
            self.state.refresh_monitors(event_loop);
        }

        self.state.create_pending(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.state.create_pending(event_loop);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: Wake) {
        log::trace!("winit event loop woken");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(native) = self.state.ids.get(&id).copied() else {
            return;
        };

        let Some(entry) = self.state.natives.get_mut(&native) else {
            return;
        };

        let kind = conversion::window_event(&event, &mut entry.tracking);

        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.state.reallocate(native);
            }
            WindowEvent::Destroyed => {
                let _ = self.state.ids.remove(&id);
            }
            _ => {}
        }

        if let Some(kind) = kind {
            self.state.events.push(native::Event::new(native, kind));
        }

        if !self.state.pending.is_empty() {
            self.state.create_pending(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.state.create_pending(event_loop);
    }
}
