//! Popup menus and menu bars for [flint].
//!
//! A menu is a tree of [`Item`]s. A [`MenuBar`] draws the top level of a
//! menu as titles and publishes a [`Request`] when one is pushed; the
//! application answers it with a [`Session`], which opens every nested
//! level in its own popup window, takes the grab and runs until an item
//! is picked or the menu is dismissed.
//!
//! ```no_run
//! use flint_menu::{Item, MenuBar, Request, Session};
//! use flint_runtime::core::widget::Group;
//! use flint_runtime::core::{Rectangle, Size, window};
//! use flint_runtime::{Platform, Toolkit};
//!
//! #[derive(Debug, Clone)]
//! enum Message {
//!     Open,
//!     Quit,
//! }
//!
//! fn build<P: Platform>(toolkit: &mut Toolkit<P>) -> window::Id {
//!     let bar = MenuBar::new(
//!         Rectangle::new(0, 0, 640, 24),
//!         vec![Item::submenu(
//!             "File",
//!             vec![Item::entry("Open", Message::Open), Item::entry("Quit", Message::Quit)],
//!         )],
//!     );
//!
//!     let root = Group::new(Rectangle::new(0, 0, 640, 480)).push(bar);
//!     toolkit.add_window(window::Settings::new("app", Size::new(640, 480)), root)
//! }
//!
//! fn process<P: Platform>(toolkit: &mut Toolkit<P>, window: window::Id) {
//!     for message in toolkit.take_messages() {
//!         if let Ok(request) = message.downcast::<Request<Message>>() {
//!             let picked = Session::menubar(toolkit, window, *request).run(toolkit);
//!             println!("{:?}", picked.and_then(|picked| picked.message));
//!         }
//!     }
//! }
//! ```
//!
//! [flint]: https://github.com/flint-toolkit/flint
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod item;
pub mod stack;

mod bar;
mod session;
mod view;

pub use flint_runtime::core;

pub use bar::{MenuBar, Request};
pub use item::{Item, Menu};
pub use session::{Picked, Session, State};
