//! The driver roles a platform backend implements.
//!
//! Every backend provides one [`Platform`] with one factory per role. The
//! toolkit asks for the main screen, system and graphics drivers once, and
//! for one window driver per toolkit window. Exactly one platform is
//! selected at build time.
use crate::Error;
use crate::core::graphics::Graphics;
use crate::core::settings::Baseline;
use crate::core::time::Duration;
use crate::core::{ColorMap, Point, Rectangle, Settings, Size, window};
use crate::native::{self, NativeId};

use std::fmt;
use std::sync::Arc;

/// A monitor of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    /// The bounds in logical screen coordinates.
    pub bounds: Rectangle,
    /// The part of the bounds not covered by panels and docks.
    pub work_area: Rectangle,
    /// The scale of logical pixels to device pixels.
    pub scale: f32,
}

/// An RGBA image with 8 bits per channel, not premultiplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// The size in pixels.
    pub size: Size,
    /// The pixels, row by row.
    pub pixels: Vec<u8>,
}

impl Image {
    /// Returns the pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }

        let offset = (y as usize * self.size.width as usize + x as usize) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;

        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Wakes a blocked [`SystemDriver::wait_native`] from any thread.
#[derive(Clone)]
pub struct Waker(Arc<dyn Fn() + Send + Sync>);

impl Waker {
    /// Creates a [`Waker`] calling `wake`.
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(wake))
    }

    /// Wakes the native wait.
    pub fn wake(&self) {
        (self.0)();
    }
}

impl fmt::Debug for Waker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Waker")
    }
}

/// The display connection and the monitors.
pub trait ScreenDriver {
    /// Opens the native display connection.
    ///
    /// Opening an already open display does nothing.
    fn open_display(&mut self) -> Result<(), Error>;

    /// Returns true if the display was opened.
    fn is_display_open(&self) -> bool;

    /// Adjusts the color map to the system colors, opening the display.
    fn get_system_colors(&mut self, colors: &mut ColorMap) {
        let _ = colors;

        if let Err(error) = self.open_display() {
            log::warn!("system colors are unavailable: {error}");
        }
    }

    /// Enumerates the monitors.
    fn screens(&mut self) -> Vec<Monitor>;

    /// Returns the index of the monitor containing `point`.
    ///
    /// Points outside every monitor belong to the first one.
    fn screen_num(&mut self, point: Point) -> usize {
        self.screens()
            .iter()
            .position(|monitor| monitor.bounds.contains(point))
            .unwrap_or(0)
    }

    /// Returns the work area of monitor `n`.
    fn work_area(&mut self, n: usize) -> Rectangle {
        self.screens()
            .get(n)
            .map_or(Rectangle::new(0, 0, 0, 0), |monitor| monitor.work_area)
    }

    /// Returns the scale of monitor `n`.
    fn scale(&mut self, n: usize) -> f32 {
        self.screens().get(n).map_or(1.0, |monitor| monitor.scale)
    }

    /// Returns the text baseline correction suited to this backend's font engine.
    fn baseline(&self) -> Baseline {
        Baseline::default()
    }

    /// Presents everything drawn since the previous flush.
    fn flush(&mut self);
}

/// OS services and the blocking native wait.
pub trait SystemDriver {
    /// Blocks until a native event arrives, the waker is used or `timeout`
    /// elapses, then appends every immediately available event.
    ///
    /// `None` blocks without limit; a zero timeout only polls.
    fn wait_native(&mut self, timeout: Option<Duration>, events: &mut Vec<native::Event>);

    /// Returns a waker for other threads.
    fn waker(&self) -> Waker;

    /// Puts text on the clipboard.
    fn copy(&mut self, text: &str);

    /// Returns the text on the clipboard.
    fn paste(&mut self) -> Option<String>;

    /// Puts an image on the clipboard.
    fn copy_image(&mut self, image: Image) {
        log::warn!(
            "this backend cannot copy a {}x{} image to the clipboard",
            image.size.width,
            image.size.height
        );
    }

    /// Returns the user locale, like `en_US`.
    fn locale(&self) -> String {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
            .map(|value| value.split('.').next().unwrap_or_default().to_owned())
            .unwrap_or_else(|| String::from("C"))
    }
}

/// A drawing context bound to one native target at a time.
pub trait GraphicsDriver: Graphics {
    /// Returns the color map, mutably.
    fn color_map_mut(&mut self) -> &mut ColorMap;

    /// Makes `target` the drawing target.
    ///
    /// The drawing state must be bound before; returns false if the target
    /// does not exist.
    fn begin(&mut self, target: NativeId) -> bool;

    /// Finishes drawing into the current target.
    fn end(&mut self);

    /// Returns the current target.
    fn target(&self) -> Option<NativeId>;
}

/// The native side of one toolkit window.
pub trait WindowDriver {
    /// Creates the native window.
    fn make_window(
        &mut self,
        settings: &window::Settings,
        scale: f32,
    ) -> Result<NativeId, Error>;

    /// Maps and raises a native window.
    fn show(&mut self, native: NativeId);

    /// Destroys a native window.
    fn destroy(&mut self, native: NativeId);

    /// Moves and resizes a native window.
    fn resize(&mut self, native: NativeId, bounds: Rectangle);

    /// Changes the title of a native window.
    fn set_label(&mut self, native: NativeId, label: &str);
}

/// An offscreen drawing surface producing an [`Image`].
pub trait ImageSurfaceDriver {
    /// Returns the drawing context of the surface.
    fn graphics(&mut self) -> &mut dyn Graphics;

    /// Returns the logical size of the surface.
    fn size(&self) -> Size;

    /// Returns the pixels drawn so far.
    fn image(&mut self) -> Image;
}

/// An offscreen drawing surface whose contents go to the clipboard.
pub trait CopySurfaceDriver {
    /// Returns the drawing context of the surface.
    fn graphics(&mut self) -> &mut dyn Graphics;

    /// Finishes drawing and returns the contents for the clipboard.
    fn finish(&mut self) -> Image;
}

/// A windowing backend: one concrete driver per role.
pub trait Platform: 'static {
    /// The screen driver.
    type Screen: ScreenDriver;
    /// The system driver.
    type System: SystemDriver;
    /// The main graphics driver.
    type Graphics: GraphicsDriver;
    /// The window driver.
    type Window: WindowDriver;
    /// The image surface driver.
    type ImageSurface: ImageSurfaceDriver;
    /// The copy surface driver.
    type CopySurface: CopySurfaceDriver;

    /// Creates the screen driver.
    fn new_screen_driver(&mut self, settings: &Settings) -> Result<Self::Screen, Error>;

    /// Creates the system driver.
    fn new_system_driver(&mut self, screen: &mut Self::Screen) -> Result<Self::System, Error>;

    /// Creates the main graphics driver.
    fn new_main_graphics_driver(
        &mut self,
        screen: &mut Self::Screen,
        baseline: Baseline,
    ) -> Result<Self::Graphics, Error>;

    /// Creates the driver of one window.
    fn new_window_driver(
        &mut self,
        screen: &mut Self::Screen,
        settings: &window::Settings,
    ) -> Self::Window;

    /// Creates an image surface.
    fn new_image_surface_driver(
        &mut self,
        screen: &mut Self::Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Self::ImageSurface, Error>;

    /// Creates a copy surface.
    fn new_copy_surface_driver(
        &mut self,
        screen: &mut Self::Screen,
        size: Size,
        baseline: Baseline,
    ) -> Result<Self::CopySurface, Error>;
}
