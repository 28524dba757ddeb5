//! The core library of [flint].
//!
//! This library holds the basic types shared by every other crate of the
//! toolkit: geometry, colors and the color map, the event record and the
//! open enumeration of event kinds, keyboard symbols and modifier state,
//! window identifiers, the [`Widget`] collaborator interface and the
//! [`Graphics`] driver interface that backends implement.
//!
//! It does not talk to any platform by itself.
//!
//! [flint]: https://github.com/flint-toolkit/flint
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod color;
pub mod event;
pub mod graphics;
pub mod keyboard;
pub mod settings;
pub mod text;
pub mod time;
pub mod widget;
pub mod window;

mod point;
mod rectangle;
mod size;

pub use color::{Color, ColorMap, Rgba};
pub use event::Record;
pub use graphics::Graphics;
pub use point::Point;
pub use rectangle::Rectangle;
pub use settings::Settings;
pub use size::Size;
pub use widget::Widget;
