//! A software graphics driver for [flint] on top of [`tiny_skia`].
//!
//! The [`Renderer`] draws into [`Pixmap`]s shared with the windowing
//! backend through [`Targets`], one per native window. Offscreen drawing
//! goes through a [`Surface`] that owns its pixmap.
//!
//! [flint]: https://github.com/flint-toolkit/flint
#![cfg_attr(docsrs, feature(doc_cfg))]
pub mod text;

mod renderer;
mod surface;

pub use renderer::{Drawn, Renderer, Targets};
pub use surface::Surface;
pub use text::{BoxFont, CosmicFont, FontEngine};

pub use tiny_skia::Pixmap;

use flint_runtime::Image;
use flint_runtime::core::Rgba;

/// Copies a pixmap into an [`Image`], undoing the alpha premultiplication.
pub fn snapshot(pixmap: &Pixmap) -> Image {
    let mut pixels = Vec::with_capacity(pixmap.data().len());

    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        pixels.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    Image {
        size: flint_runtime::core::Size::new(pixmap.width() as i32, pixmap.height() as i32),
        pixels,
    }
}

/// Writes a pixmap as `0x00RRGGBB` words, the layout of presentation buffers.
///
/// Extra words of `buffer` are left untouched.
pub fn to_xrgb(pixmap: &Pixmap, buffer: &mut [u32]) {
    for (word, pixel) in buffer.iter_mut().zip(pixmap.pixels()) {
        let color = pixel.demultiply();

        *word = Rgba::opaque(color.red(), color.green(), color.blue()).to_argb() & 0x00FF_FFFF;
    }
}

/// Creates a pixmap of at least one pixel, filled with `background`.
pub fn canvas(width: u32, height: u32, background: Rgba) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width.max(1), height.max(1))?;

    pixmap.fill(tiny_skia::Color::from_rgba8(
        background.r,
        background.g,
        background.b,
        background.a,
    ));

    Some(pixmap)
}
