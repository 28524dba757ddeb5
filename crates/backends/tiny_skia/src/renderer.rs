use crate::text::FontEngine;

use flint_runtime::GraphicsDriver;
use flint_runtime::core::graphics::{Clip, Font, FontMetrics, Graphics, State};
use flint_runtime::core::settings::Baseline;
use flint_runtime::core::{ColorMap, Point, Rectangle, Rgba};
use flint_runtime::native::NativeId;

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tiny_skia::{FillRule, LineCap, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// The pixmaps of the native windows, shared with the windowing backend.
pub type Targets = Rc<RefCell<FxHashMap<NativeId, Pixmap>>>;

/// The targets drawn into since the windowing backend last presented them.
pub type Drawn = Rc<RefCell<FxHashSet<NativeId>>>;

/// A [`Graphics`] driver rasterizing into [`Targets`].
#[derive(Debug)]
pub struct Renderer<F> {
    state: State,
    colors: ColorMap,
    fonts: F,
    targets: Targets,
    target: Option<NativeId>,
    mask: Option<ClipMask>,
    drawn: Option<Drawn>,
}

struct ClipMask {
    width: u32,
    height: u32,
    area: Rectangle,
    mask: Mask,
}

impl fmt::Debug for ClipMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("area", &self.area)
            .finish_non_exhaustive()
    }
}

impl<F: FontEngine> Renderer<F> {
    /// Creates a [`Renderer`] drawing into `targets`.
    pub fn new(targets: Targets, fonts: F, baseline: Baseline) -> Self {
        Self {
            state: State::new(baseline),
            colors: ColorMap::default(),
            fonts,
            targets,
            target: None,
            mask: None,
            drawn: None,
        }
    }

    /// Records every finished target in `drawn`.
    pub fn track(mut self, drawn: Drawn) -> Self {
        self.drawn = Some(drawn);
        self
    }

    /// Returns the shared targets.
    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// Returns the font engine.
    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    fn paint(&mut self, draw: impl FnOnce(&mut Pixmap, Option<&Mask>)) {
        let Some(target) = self.target else {
            return;
        };

        let clip = self.state.clip();
        let mut targets = self.targets.borrow_mut();

        let Some(pixmap) = targets.get_mut(&target) else {
            return;
        };

        match clip {
            Clip::None => draw(pixmap, None),
            Clip::Rectangle(area) if area.is_empty() => {}
            Clip::Rectangle(area) => {
                let (width, height) = (pixmap.width(), pixmap.height());

                if let Some(mask) = clip_mask(&mut self.mask, width, height, area) {
                    draw(pixmap, Some(mask));
                }
            }
        }
    }
}

fn clip_mask(
    cache: &mut Option<ClipMask>,
    width: u32,
    height: u32,
    area: Rectangle,
) -> Option<&Mask> {
    let fresh = cache
        .as_ref()
        .is_some_and(|clip| clip.width == width && clip.height == height && clip.area == area);

    if !fresh {
        let mut mask = Mask::new(width, height)?;
        let rect = Rect::from_xywh(
            area.x as f32,
            area.y as f32,
            area.width as f32,
            area.height as f32,
        )?;

        mask.fill_path(
            &PathBuilder::from_rect(rect),
            FillRule::Winding,
            false,
            Transform::identity(),
        );

        *cache = Some(ClipMask {
            width,
            height,
            area,
            mask,
        });
    }

    cache.as_ref().map(|clip| &clip.mask)
}

fn paint_of(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();

    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = false;

    paint
}

impl<F: FontEngine> Graphics for Renderer<F> {
    fn state(&self) -> &State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn color_map(&self) -> &ColorMap {
        &self.colors
    }

    fn fill(&mut self, rectangle: Rectangle, color: Rgba) {
        let device = self.state.to_device(rectangle);

        let Some(rect) = Rect::from_xywh(
            device.x as f32,
            device.y as f32,
            device.width as f32,
            device.height as f32,
        ) else {
            return;
        };

        let paint = paint_of(color);

        self.paint(|pixmap, mask| pixmap.fill_rect(rect, &paint, Transform::identity(), mask));
    }

    fn stroke(&mut self, points: &[Point], closed: bool, width: u16, color: Rgba) {
        let scale = self.state.scale();
        let half = scale / 2.0;
        let mut builder = PathBuilder::new();

        for (index, point) in points.iter().enumerate() {
            let (x, y) = self.state.point_to_device(*point);

            if index == 0 {
                builder.move_to(x + half, y + half);
            } else {
                builder.line_to(x + half, y + half);
            }
        }

        if closed {
            builder.close();
        }

        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: f32::from(width.max(1)) * scale,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };

        let paint = paint_of(color);

        self.paint(|pixmap, mask| {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), mask);
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        let mut builder = PathBuilder::new();

        for (index, point) in points.iter().enumerate() {
            let (x, y) = self.state.point_to_device(*point);

            if index == 0 {
                builder.move_to(x, y);
            } else {
                builder.line_to(x, y);
            }
        }

        builder.close();

        let Some(path) = builder.finish() else {
            return;
        };

        let paint = paint_of(color);

        self.paint(|pixmap, mask| {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), mask);
        });
    }

    fn font_metrics(&self, font: Font) -> FontMetrics {
        self.fonts.metrics(font)
    }

    fn text_width(&self, font: Font, text: &str) -> f32 {
        self.fonts.width(font, text)
    }

    fn render_text(&mut self, text: &str, position: Point, font: Font, color: Rgba) {
        let (x, y) = self.state.point_to_device(position);
        let (x, y) = (x.round() as i32, y.round() as i32);
        let mut spans = Vec::new();

        self.fonts
            .rasterize(text, font, self.state.scale(), color, &mut |dx, dy, w, h, c| {
                spans.push((x + dx, y + dy, w, h, c));
            });

        self.paint(|pixmap, mask| {
            for (x, y, w, h, color) in spans {
                if let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) {
                    pixmap.fill_rect(rect, &paint_of(color), Transform::identity(), mask);
                }
            }
        });
    }
}

impl<F: FontEngine> GraphicsDriver for Renderer<F> {
    fn color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.colors
    }

    fn begin(&mut self, target: NativeId) -> bool {
        if !self.targets.borrow().contains_key(&target) {
            log::warn!("{target} has no canvas to draw into");
            return false;
        }

        self.target = Some(target);
        true
    }

    fn end(&mut self) {
        if let (Some(target), Some(drawn)) = (self.target.take(), &self.drawn) {
            let _ = drawn.borrow_mut().insert(target);
        }
    }

    fn target(&self) -> Option<NativeId> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxFont, canvas, snapshot};

    const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    const RED: Rgba = Rgba::opaque(255, 0, 0);

    fn renderer(width: u32, height: u32) -> Renderer<BoxFont> {
        let targets = Targets::default();
        let pixmap = canvas(width, height, WHITE).expect("canvas");

        let _ = targets.borrow_mut().insert(NativeId(1), pixmap);

        let mut renderer = Renderer::new(targets, BoxFont, Baseline::default());
        renderer.state_mut().bind(Point::ORIGIN, 1.0, Clip::None);
        assert!(renderer.begin(NativeId(1)));

        renderer
    }

    fn pixel(renderer: &Renderer<BoxFont>, x: i32, y: i32) -> [u8; 4] {
        let targets = renderer.targets().borrow();
        let image = snapshot(&targets[&NativeId(1)]);

        image.pixel(x, y).expect("pixel")
    }

    #[test]
    fn fills_are_offset_by_the_origin() {
        let mut renderer = renderer(20, 20);
        renderer.state_mut().bind(Point::new(5, 5), 1.0, Clip::None);

        renderer.fill(Rectangle::new(0, 0, 2, 2), RED);

        assert_eq!(pixel(&renderer, 5, 5), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn drawing_honors_the_clip_stack() {
        let mut renderer = renderer(20, 20);

        renderer.push_clip(0, 0, 4, 4);
        renderer.fill(Rectangle::new(0, 0, 10, 10), RED);
        renderer.pop_clip();

        assert_eq!(pixel(&renderer, 3, 3), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 5, 5), [255, 255, 255, 255]);

        renderer.push_clip(0, 0, 0, 0);
        renderer.fill(Rectangle::new(0, 0, 10, 10), Rgba::opaque(0, 0, 255));
        renderer.pop_clip();

        assert_eq!(pixel(&renderer, 0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn lines_cover_both_endpoints() {
        let mut renderer = renderer(20, 20);

        renderer.stroke(&[Point::new(2, 4), Point::new(6, 4)], false, 0, RED);

        assert_eq!(pixel(&renderer, 2, 4), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 6, 4), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 4, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn unknown_targets_cannot_be_bound() {
        let mut renderer = renderer(4, 4);

        assert!(!renderer.begin(NativeId(7)));
        assert_eq!(renderer.target(), Some(NativeId(1)));
    }

    #[test]
    fn finished_targets_are_tracked() {
        let drawn = Drawn::default();
        let mut renderer = renderer(4, 4).track(Rc::clone(&drawn));

        assert!(drawn.borrow().is_empty());

        renderer.end();

        assert!(drawn.borrow().contains(&NativeId(1)));
        assert_eq!(renderer.target(), None);
    }
}
