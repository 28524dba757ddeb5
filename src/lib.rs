//! flint is a small cross-platform GUI toolkit core built around platform
//! drivers.
//!
//! A backend implements one driver per role (screen, system, graphics,
//! window and offscreen surfaces) behind a [`Platform`]. The [`Toolkit`]
//! owns the windows, decodes native events into the current [`Record`] and
//! dispatches it to widgets; [`menu`] runs popup menus and menu bars on top
//! of it.
//!
//! The backend is picked at build time. The `winit` feature selects the
//! native one; otherwise the headless backend is used. Either is available
//! as [`Backend`].
//!
//! ```no_run
//! use flint::core::widget::Group;
//! use flint::core::{Rectangle, Settings, Size, window};
//!
//! pub fn main() -> flint::Result {
//!     let mut toolkit = flint::toolkit(Settings::default())?;
//!
//!     let root = Group::new(Rectangle::new(0, 0, 320, 200));
//!     let main = toolkit.add_window(window::Settings::new("hello", Size::new(320, 200)), root);
//!
//!     let _ = toolkit.show(main);
//!     toolkit.run();
//!
//!     Ok(())
//! }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
pub use flint_core as core;
pub use flint_menu as menu;
pub use flint_runtime as runtime;
pub use flint_tiny_skia as tiny_skia;

#[cfg(feature = "headless")]
pub use flint_headless as headless;

#[cfg(feature = "winit")]
pub use flint_winit as winit;

#[cfg(not(any(feature = "headless", feature = "winit")))]
compile_error!(
    "No backend has been enabled! You must enable a backend feature.\n\
    Available options: headless, winit."
);

pub use crate::core::keyboard::{Key, Shortcut};
pub use crate::core::{Color, Point, Record, Rectangle, Settings, Size, Widget, window};
pub use crate::menu::{Item, Menu, MenuBar, Session};
pub use crate::runtime::{Error, Platform, ThreadHandle, Toolkit};

/// The backend selected at build time.
#[cfg(feature = "winit")]
pub type Backend = flint_winit::Winit;

/// The backend selected at build time.
#[cfg(all(feature = "headless", not(feature = "winit")))]
pub type Backend = flint_headless::Headless;

/// The result of starting a flint toolkit.
pub type Result<T = ()> = std::result::Result<T, Error>;

/// Starts a toolkit on the selected [`Backend`].
#[cfg(any(feature = "headless", feature = "winit"))]
pub fn toolkit(settings: Settings) -> Result<Toolkit<Backend>> {
    Toolkit::new(Backend::default(), settings)
}
