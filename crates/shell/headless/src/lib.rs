//! An in-memory backend for [flint].
//!
//! Native windows are software canvases, monitors are configured up front
//! and native events are scripted through an [`Injector`]. Every native
//! call is recorded, so the backend can be inspected after the fact.
//!
//! ```no_run
//! use flint_headless::Headless;
//! use flint_runtime::Toolkit;
//! use flint_runtime::core::Settings;
//!
//! let backend = Headless::new();
//! let toolkit = Toolkit::new(backend.clone(), Settings::default());
//!
//! assert!(toolkit.is_ok());
//! assert_eq!(backend.display_opens(), 1);
//! ```
//!
//! [flint]: https://github.com/flint-toolkit/flint
#![cfg_attr(docsrs, feature(doc_cfg))]
mod queue;

pub use queue::Injector;

use flint_runtime::core::settings::Baseline;
use flint_runtime::core::time::Duration;
use flint_runtime::core::{Color, ColorMap, Rectangle, Settings, Size, window};
use flint_runtime::driver::Waker;
use flint_runtime::native::{self, NativeId};
use flint_runtime::{Error, Image, Monitor, Platform, ScreenDriver, SystemDriver, WindowDriver};
use flint_tiny_skia::{BoxFont, Renderer, Surface, Targets, canvas, snapshot};

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// The headless platform.
///
/// Clones share the same state; keep one to inspect what the toolkit did.
#[derive(Debug, Clone)]
pub struct Headless {
    shared: Rc<RefCell<Shared>>,
    targets: Targets,
    injector: Injector,
}

/// A native window of the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeWindow {
    /// The title.
    pub label: String,
    /// The bounds in logical screen coordinates.
    pub bounds: Rectangle,
    /// The device scale of the canvas.
    pub scale: f32,
    /// The kind of the toolkit window.
    pub kind: window::Kind,
    /// Whether the window was mapped.
    pub mapped: bool,
}

#[derive(Debug)]
struct Shared {
    monitors: Vec<Monitor>,
    display_failure: Option<String>,
    display_open: bool,
    display_opens: u32,
    next_native: u64,
    windows: FxHashMap<NativeId, NativeWindow>,
    created: u32,
    destroyed: FxHashMap<NativeId, u32>,
    fail_next_window: bool,
    frames: u32,
    clipboard: Option<String>,
    clipboard_image: Option<Image>,
}

impl Headless {
    /// Creates a backend with a single 1920x1080 monitor.
    pub fn new() -> Self {
        Self::with_monitors(vec![Monitor {
            bounds: Rectangle::new(0, 0, 1920, 1080),
            work_area: Rectangle::new(0, 0, 1920, 1040),
            scale: 1.0,
        }])
    }

    /// Creates a backend with the given monitors.
    pub fn with_monitors(monitors: Vec<Monitor>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                monitors,
                display_failure: None,
                display_open: false,
                display_opens: 0,
                next_native: 0,
                windows: FxHashMap::default(),
                created: 0,
                destroyed: FxHashMap::default(),
                fail_next_window: false,
                frames: 0,
                clipboard: None,
                clipboard_image: None,
            })),
            targets: Targets::default(),
            injector: Injector::default(),
        }
    }

    /// Makes opening the display fail with `reason`.
    pub fn fail_display(self, reason: impl Into<String>) -> Self {
        self.shared.borrow_mut().display_failure = Some(reason.into());
        self
    }

    /// Makes the next native window creation fail.
    pub fn fail_next_window(&self) {
        self.shared.borrow_mut().fail_next_window = true;
    }

    /// Returns the event injector.
    pub fn injector(&self) -> Injector {
        self.injector.clone()
    }

    /// Queues a native event.
    pub fn push(&self, window: NativeId, kind: native::Kind) {
        self.injector.push(native::Event::new(window, kind));
    }

    /// Returns how many times the display connection was created.
    pub fn display_opens(&self) -> u32 {
        self.shared.borrow().display_opens
    }

    /// Returns how many native windows were created.
    pub fn windows_created(&self) -> u32 {
        self.shared.borrow().created
    }

    /// Returns how many times a native window was destroyed.
    pub fn destroyed(&self, native: NativeId) -> u32 {
        self.shared
            .borrow()
            .destroyed
            .get(&native)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the native windows that are alive, in creation order.
    pub fn native_windows(&self) -> Vec<NativeId> {
        let mut windows: Vec<_> = self.shared.borrow().windows.keys().copied().collect();
        windows.sort_unstable();

        windows
    }

    /// Returns a native window that is alive.
    pub fn native_window(&self, native: NativeId) -> Option<NativeWindow> {
        self.shared.borrow().windows.get(&native).cloned()
    }

    /// Returns how many frames were presented.
    pub fn frames(&self) -> u32 {
        self.shared.borrow().frames
    }

    /// Returns the contents of the canvas of a native window.
    pub fn snapshot(&self, native: NativeId) -> Option<Image> {
        self.targets.borrow().get(&native).map(snapshot)
    }

    /// Returns the text on the clipboard.
    pub fn clipboard(&self) -> Option<String> {
        self.shared.borrow().clipboard.clone()
    }

    /// Returns the image on the clipboard.
    pub fn clipboard_image(&self) -> Option<Image> {
        self.shared.borrow().clipboard_image.clone()
    }
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

/// The screen driver of the headless backend.
#[derive(Debug)]
pub struct Screen {
    shared: Rc<RefCell<Shared>>,
}

impl ScreenDriver for Screen {
    fn open_display(&mut self) -> Result<(), Error> {
        let mut shared = self.shared.borrow_mut();

        if shared.display_open {
            return Ok(());
        }

        if let Some(reason) = &shared.display_failure {
            return Err(Error::Display(reason.clone()));
        }

        shared.display_open = true;
        shared.display_opens += 1;

        log::debug!("headless display opened");

        Ok(())
    }

    fn is_display_open(&self) -> bool {
        self.shared.borrow().display_open
    }

    fn screens(&mut self) -> Vec<Monitor> {
        self.shared.borrow().monitors.clone()
    }

    fn flush(&mut self) {
        self.shared.borrow_mut().frames += 1;
    }
}

/// The system driver of the headless backend.
#[derive(Debug)]
pub struct System {
    shared: Rc<RefCell<Shared>>,
    injector: Injector,
}

impl SystemDriver for System {
    fn wait_native(&mut self, timeout: Option<Duration>, events: &mut Vec<native::Event>) {
        self.injector.wait(timeout, events);
    }

    fn waker(&self) -> Waker {
        self.injector.waker()
    }

    fn copy(&mut self, text: &str) {
        self.shared.borrow_mut().clipboard = Some(text.to_owned());
    }

    fn paste(&mut self) -> Option<String> {
        self.shared.borrow().clipboard.clone()
    }

    fn copy_image(&mut self, image: Image) {
        self.shared.borrow_mut().clipboard_image = Some(image);
    }

    fn locale(&self) -> String {
        String::from("C")
    }
}

/// The window driver of the headless backend.
#[derive(Debug)]
pub struct Window {
    shared: Rc<RefCell<Shared>>,
    targets: Targets,
}

impl WindowDriver for Window {
    fn make_window(&mut self, settings: &window::Settings, scale: f32) -> Result<NativeId, Error> {
        let mut shared = self.shared.borrow_mut();

        if mem::take(&mut shared.fail_next_window) {
            return Err(Error::WindowCreationFailed(String::from(
                "the headless backend was told to fail",
            )));
        }

        let (width, height) = device_size(settings.size, scale);
        let background = ColorMap::default().resolve(Color::BACKGROUND);

        let pixmap = canvas(width, height, background).ok_or_else(|| {
            Error::WindowCreationFailed(format!("no canvas of {width}x{height} pixels"))
        })?;

        shared.next_native += 1;
        shared.created += 1;

        let native = NativeId(shared.next_native);

        let _ = self.targets.borrow_mut().insert(native, pixmap);
        let _ = shared.windows.insert(
            native,
            NativeWindow {
                label: settings.label.clone(),
                bounds: settings.bounds(),
                scale,
                kind: settings.kind,
                mapped: false,
            },
        );

        log::debug!("headless window {native} created ({width}x{height})");

        Ok(native)
    }

    fn show(&mut self, native: NativeId) {
        if let Some(window) = self.shared.borrow_mut().windows.get_mut(&native) {
            window.mapped = true;
        }
    }

    fn destroy(&mut self, native: NativeId) {
        let mut shared = self.shared.borrow_mut();

        let _ = self.targets.borrow_mut().remove(&native);
        let _ = shared.windows.remove(&native);
        *shared.destroyed.entry(native).or_default() += 1;

        log::debug!("headless window {native} destroyed");
    }

    fn resize(&mut self, native: NativeId, bounds: Rectangle) {
        let mut shared = self.shared.borrow_mut();

        let Some(window) = shared.windows.get_mut(&native) else {
            return;
        };

        window.bounds = bounds;

        let (width, height) = device_size(bounds.size(), window.scale);
        let background = ColorMap::default().resolve(Color::BACKGROUND);

        if let Some(pixmap) = canvas(width, height, background) {
            let _ = self.targets.borrow_mut().insert(native, pixmap);
        }
    }

    fn set_label(&mut self, native: NativeId, label: &str) {
        if let Some(window) = self.shared.borrow_mut().windows.get_mut(&native) {
            label.clone_into(&mut window.label);
        }
    }
}

fn device_size(size: Size, scale: f32) -> (u32, u32) {
    let width = (size.width.max(1) as f32 * scale).round() as u32;
    let height = (size.height.max(1) as f32 * scale).round() as u32;

    (width, height)
}

impl Platform for Headless {
    type Screen = Screen;
    type System = System;
    type Graphics = Renderer<BoxFont>;
    type Window = Window;
    type ImageSurface = Surface<BoxFont>;
    type CopySurface = Surface<BoxFont>;

    fn new_screen_driver(&mut self, settings: &Settings) -> Result<Screen, Error> {
        let _ = settings;

        Ok(Screen {
            shared: Rc::clone(&self.shared),
        })
    }

    fn new_system_driver(&mut self, screen: &mut Screen) -> Result<System, Error> {
        let _ = screen;

        Ok(System {
            shared: Rc::clone(&self.shared),
            injector: self.injector.clone(),
        })
    }

    fn new_main_graphics_driver(
        &mut self,
        screen: &mut Screen,
        baseline: Baseline,
    ) -> Result<Renderer<BoxFont>, Error> {
        let _ = screen;

        Ok(Renderer::new(Rc::clone(&self.targets), BoxFont, baseline))
    }

    fn new_window_driver(&mut self, screen: &mut Screen, settings: &window::Settings) -> Window {
        let _ = (screen, settings);

        Window {
            shared: Rc::clone(&self.shared),
            targets: Rc::clone(&self.targets),
        }
    }

    fn new_image_surface_driver(
        &mut self,
        screen: &mut Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Surface<BoxFont>, Error> {
        let _ = screen;

        Surface::new(size, BoxFont, baseline)
    }

    fn new_copy_surface_driver(
        &mut self,
        screen: &mut Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Surface<BoxFont>, Error> {
        let _ = screen;

        Surface::new(size, BoxFont, baseline)
    }
}
