//! A native backend for [flint] on top of [`winit`] and [`softbuffer`].
//!
//! Every toolkit window without a parent gets a [`winit`] window. Drawing
//! happens on the CPU through [`flint_tiny_skia`]; each flush copies the
//! canvases drawn since the previous one to their windows. Text is shaped
//! with [`cosmic_text`] through the system fonts.
//!
//! The event loop is pumped once per native wait instead of being run, so
//! the toolkit keeps its own loop and nested loops work as usual.
//!
//! ```no_run
//! use flint_runtime::Toolkit;
//! use flint_runtime::core::Settings;
//! use flint_winit::Winit;
//!
//! # fn main() -> Result<(), flint_runtime::Error> {
//! let mut toolkit = Toolkit::new(Winit::new(), Settings::default())?;
//! toolkit.run();
//! # Ok(())
//! # }
//! ```
//!
//! [flint]: https://github.com/flint-toolkit/flint
//! [`cosmic_text`]: https://docs.rs/cosmic-text
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod clipboard;
pub mod conversion;

mod error;
mod pump;

pub use clipboard::Clipboard;
pub use error::Error;

pub use winit;

use pump::Pump;

use flint_runtime::core::settings::Baseline;
use flint_runtime::core::time::Duration;
use flint_runtime::core::{Rectangle, Settings, Size, window};
use flint_runtime::driver::Waker;
use flint_runtime::native::{self, NativeId};
use flint_runtime::{Monitor, Platform, ScreenDriver, SystemDriver, WindowDriver};
use flint_tiny_skia::{CosmicFont, Drawn, Renderer, Surface, Targets};

use std::cell::{OnceCell, RefCell};
use std::mem;
use std::rc::Rc;
use winit::window::WindowLevel;

/// The native platform.
#[derive(Debug)]
pub struct Winit {
    pump: Rc<RefCell<Pump>>,
    targets: Targets,
    drawn: Drawn,
    fonts: OnceCell<CosmicFont>,
}

impl Winit {
    /// Creates the platform; the display opens with the toolkit.
    pub fn new() -> Self {
        let targets = Targets::default();

        Self {
            pump: Rc::new(RefCell::new(Pump::new(Rc::clone(&targets)))),
            targets,
            drawn: Drawn::default(),
            fonts: OnceCell::new(),
        }
    }

    fn fonts(&self) -> CosmicFont {
        self.fonts.get_or_init(CosmicFont::new).clone()
    }
}

impl Default for Winit {
    fn default() -> Self {
        Self::new()
    }
}

/// The screen driver of the native backend.
#[derive(Debug)]
pub struct Screen {
    pump: Rc<RefCell<Pump>>,
    drawn: Drawn,
}

impl ScreenDriver for Screen {
    fn open_display(&mut self) -> Result<(), flint_runtime::Error> {
        self.pump.borrow_mut().open().map_err(flint_runtime::Error::from)
    }

    fn is_display_open(&self) -> bool {
        self.pump.borrow().is_open()
    }

    fn screens(&mut self) -> Vec<Monitor> {
        self.pump.borrow_mut().monitors()
    }

    fn flush(&mut self) {
        let drawn = mem::take(&mut *self.drawn.borrow_mut());

        if !drawn.is_empty() {
            self.pump.borrow_mut().present(drawn);
        }
    }
}

/// The system driver of the native backend.
#[derive(Debug)]
pub struct System {
    pump: Rc<RefCell<Pump>>,
    clipboard: Clipboard,
}

impl SystemDriver for System {
    fn wait_native(&mut self, timeout: Option<Duration>, events: &mut Vec<native::Event>) {
        self.pump.borrow_mut().wait(timeout, events);
    }

    fn waker(&self) -> Waker {
        Waker::new(self.pump.borrow().wake())
    }

    fn copy(&mut self, text: &str) {
        self.clipboard.write_text(text);
    }

    fn paste(&mut self) -> Option<String> {
        self.clipboard.read_text()
    }
}

/// The window driver of the native backend.
#[derive(Debug)]
pub struct Window {
    pump: Rc<RefCell<Pump>>,
}

impl WindowDriver for Window {
    fn make_window(
        &mut self,
        settings: &window::Settings,
        scale: f32,
    ) -> Result<NativeId, flint_runtime::Error> {
        let (position, size) = conversion::bounds(settings.bounds());

        let mut attributes = winit::window::Window::default_attributes()
            .with_title(settings.label.clone())
            .with_position(position)
            .with_inner_size(size)
            .with_resizable(settings.resizable)
            .with_visible(false);

        if settings.kind != window::Kind::Normal {
            attributes = popup(
                attributes
                    .with_decorations(false)
                    .with_active(false)
                    .with_window_level(WindowLevel::AlwaysOnTop),
                settings.kind,
            );
        }

        log::trace!(
            "creating a {:?} window at {:?} (toolkit scale {scale})",
            settings.kind,
            settings.bounds()
        );

        self.pump
            .borrow_mut()
            .create(attributes, settings.kind)
            .map_err(flint_runtime::Error::from)
    }

    fn show(&mut self, native: NativeId) {
        let pump = self.pump.borrow();

        if let Some(entry) = pump.native(native) {
            entry.window.set_visible(true);

            if entry.kind == window::Kind::Normal {
                entry.window.focus_window();
            }

            entry.window.request_redraw();
        }
    }

    fn destroy(&mut self, native: NativeId) {
        self.pump.borrow_mut().destroy(native);
    }

    fn resize(&mut self, native: NativeId, bounds: Rectangle) {
        let mut pump = self.pump.borrow_mut();

        let Some(entry) = pump.native(native) else {
            return;
        };

        let (position, size) = conversion::bounds(bounds);
        entry.window.set_outer_position(position);

        // Platforms that resize asynchronously report it with an event.
        if entry.window.request_inner_size(size).is_some() {
            pump.reallocate(native);
        }
    }

    fn set_label(&mut self, native: NativeId, label: &str) {
        if let Some(entry) = self.pump.borrow().native(native) {
            entry.window.set_title(label);
        }
    }
}

#[cfg(all(
    feature = "x11",
    any(
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
))]
fn popup(
    attributes: winit::window::WindowAttributes,
    kind: window::Kind,
) -> winit::window::WindowAttributes {
    use winit::platform::x11::{WindowAttributesExtX11, WindowType};

    let role = match kind {
        window::Kind::Tooltip => WindowType::Tooltip,
        window::Kind::Menu | window::Kind::Normal => WindowType::PopupMenu,
    };

    attributes
        .with_override_redirect(true)
        .with_x11_window_type(vec![role])
}

#[cfg(not(all(
    feature = "x11",
    any(
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
)))]
fn popup(
    attributes: winit::window::WindowAttributes,
    kind: window::Kind,
) -> winit::window::WindowAttributes {
    let _ = kind;

    attributes
}

impl Platform for Winit {
    type Screen = Screen;
    type System = System;
    type Graphics = Renderer<CosmicFont>;
    type Window = Window;
    type ImageSurface = Surface<CosmicFont>;
    type CopySurface = Surface<CosmicFont>;

    fn new_screen_driver(&mut self, settings: &Settings) -> Result<Screen, flint_runtime::Error> {
        let _ = settings;

        Ok(Screen {
            pump: Rc::clone(&self.pump),
            drawn: Rc::clone(&self.drawn),
        })
    }

    fn new_system_driver(&mut self, screen: &mut Screen) -> Result<System, flint_runtime::Error> {
        let _ = screen;

        Ok(System {
            pump: Rc::clone(&self.pump),
            clipboard: Clipboard::connect(),
        })
    }

    fn new_main_graphics_driver(
        &mut self,
        screen: &mut Screen,
        baseline: Baseline,
    ) -> Result<Renderer<CosmicFont>, flint_runtime::Error> {
        let _ = screen;

        Ok(Renderer::new(Rc::clone(&self.targets), self.fonts(), baseline)
            .track(Rc::clone(&self.drawn)))
    }

    fn new_window_driver(&mut self, screen: &mut Screen, settings: &window::Settings) -> Window {
        let _ = (screen, settings);

        Window {
            pump: Rc::clone(&self.pump),
        }
    }

    fn new_image_surface_driver(
        &mut self,
        screen: &mut Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Surface<CosmicFont>, flint_runtime::Error> {
        let _ = screen;

        Surface::new(size, self.fonts(), baseline)
    }

    fn new_copy_surface_driver(
        &mut self,
        screen: &mut Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Surface<CosmicFont>, flint_runtime::Error> {
        let _ = screen;

        Surface::new(size, self.fonts(), baseline)
    }
}
