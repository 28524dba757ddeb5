use crate::renderer::{Renderer, Targets};
use crate::text::FontEngine;
use crate::{canvas, snapshot};

use flint_runtime::core::graphics::{Clip, Graphics};
use flint_runtime::core::settings::Baseline;
use flint_runtime::core::{Point, Rgba, Size};
use flint_runtime::native::NativeId;
use flint_runtime::{CopySurfaceDriver, Error, GraphicsDriver, Image, ImageSurfaceDriver};

const TARGET: NativeId = NativeId(0);

/// An offscreen surface owning its own pixmap.
///
/// It serves both as an image surface and as a copy surface.
#[derive(Debug)]
pub struct Surface<F> {
    renderer: Renderer<F>,
    size: Size,
}

impl<F: FontEngine> Surface<F> {
    /// Allocates a transparent surface of `size` logical pixels.
    pub fn new(size: Size, fonts: F, baseline: Baseline) -> Result<Self, Error> {
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::Surface(size));
        }

        let pixmap = canvas(size.width as u32, size.height as u32, Rgba::new(0, 0, 0, 0))
            .ok_or(Error::Surface(size))?;

        let targets = Targets::default();
        let _ = targets.borrow_mut().insert(TARGET, pixmap);

        let mut renderer = Renderer::new(targets, fonts, baseline);
        renderer.state_mut().bind(Point::ORIGIN, 1.0, Clip::None);

        let _ = renderer.begin(TARGET);

        Ok(Self { renderer, size })
    }

    fn snapshot(&self) -> Image {
        let targets = self.renderer.targets().borrow();

        targets.get(&TARGET).map_or_else(
            || Image {
                size: Size::ZERO,
                pixels: Vec::new(),
            },
            snapshot,
        )
    }
}

impl<F: FontEngine> ImageSurfaceDriver for Surface<F> {
    fn graphics(&mut self) -> &mut dyn Graphics {
        &mut self.renderer
    }

    fn size(&self) -> Size {
        self.size
    }

    fn image(&mut self) -> Image {
        self.snapshot()
    }
}

impl<F: FontEngine> CopySurfaceDriver for Surface<F> {
    fn graphics(&mut self) -> &mut dyn Graphics {
        &mut self.renderer
    }

    fn finish(&mut self) -> Image {
        self.renderer.end();
        self.snapshot()
    }
}
