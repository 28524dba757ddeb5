//! A platform-agnostic runtime for [flint].
//!
//! The runtime owns the toolkit state: the [`Toolkit`] with its windows and
//! their widget trees, the [`registry`] of shown windows, the [`timer`]
//! queue and the event [`decoder`] that turns [`native`] events into
//! toolkit events. Platform backends plug in by implementing the traits in
//! [`driver`].
//!
//! [flint]: https://github.com/flint-toolkit/flint
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod decoder;
pub mod driver;
pub mod native;
pub mod registry;
pub mod timer;

mod dispatch;
mod error;
mod lock;
mod toolkit;

pub use flint_core as core;

pub use decoder::Decoder;
pub use driver::{
    CopySurfaceDriver, GraphicsDriver, Image, ImageSurfaceDriver, Monitor, Platform, ScreenDriver,
    SystemDriver, WindowDriver,
};
pub use error::Error;
pub use lock::ThreadHandle;
pub use timer::Repeat;
pub use toolkit::{Hook, Status, Toolkit};
