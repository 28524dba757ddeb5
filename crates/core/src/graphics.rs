//! The drawing interface implemented by graphics drivers.
//!
//! A [`Graphics`] driver keeps the current drawing [`State`] (color, line
//! width, font, clip stack and the window transform) and implements a few
//! rasterizing primitives. Every other drawing operation is provided on top
//! of those primitives, so all backends share the same degenerate-size and
//! text placement rules.
use crate::settings::Baseline;
use crate::text;
use crate::{Color, ColorMap, Point, Rectangle, Rgba};

/// A font face and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Font {
    /// The face index; `0` is the default sans-serif face.
    pub face: u16,
    /// The size in logical pixels.
    pub size: u16,
}

impl Font {
    /// The default sans-serif face.
    pub const SANS: u16 = 0;
    /// The default monospace face.
    pub const MONOSPACE: u16 = 4;

    /// Creates a new [`Font`].
    pub const fn new(face: u16, size: u16) -> Self {
        Self { face, size }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(Font::SANS, 14)
    }
}

/// Vertical metrics of a font, as reported by a font engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyph (positive).
    pub descent: f32,
}

impl FontMetrics {
    /// Returns the corrected distance from the baseline to the top of a line.
    pub fn corrected_ascent(&self, baseline: &Baseline) -> f32 {
        self.ascent * baseline.ascent_scale + baseline.offset
    }

    /// Returns the corrected height of a line of text.
    pub fn line_height(&self, baseline: &Baseline) -> f32 {
        self.ascent * baseline.ascent_scale + self.descent * baseline.descent_scale
    }
}

/// One entry of the clip stack, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    /// Nothing is clipped.
    None,
    /// Only the given rectangle may be drawn. It may be empty.
    Rectangle(Rectangle),
}

impl Clip {
    fn intersect(self, rectangle: Rectangle) -> Clip {
        match self {
            Clip::None => Clip::Rectangle(rectangle),
            Clip::Rectangle(current) => Clip::Rectangle(
                current
                    .intersection(&rectangle)
                    .unwrap_or(Rectangle::new(rectangle.x, rectangle.y, 0, 0)),
            ),
        }
    }

    /// Returns true if the given device rectangle is entirely outside the clip.
    pub fn excludes(&self, rectangle: &Rectangle) -> bool {
        match self {
            Clip::None => rectangle.is_empty(),
            Clip::Rectangle(clip) => clip.intersection(rectangle).is_none(),
        }
    }
}

/// The drawing state of a graphics driver.
#[derive(Debug, Clone)]
pub struct State {
    /// The current color, as given by the caller.
    pub color: Color,
    /// The current color, resolved.
    pub rgba: Rgba,
    /// The current line width in logical pixels; `0` means the thinnest line.
    pub line_width: u16,
    /// The current font.
    pub font: Font,
    /// The baseline correction applied when drawing text.
    pub baseline: Baseline,
    origin: Point,
    scale: f32,
    base_clip: Clip,
    clips: Vec<Clip>,
}

impl State {
    /// Creates a fresh drawing state with the given baseline correction.
    pub fn new(baseline: Baseline) -> Self {
        Self {
            color: Color::FOREGROUND,
            rgba: Rgba::opaque(0, 0, 0),
            line_width: 0,
            font: Font::default(),
            baseline,
            origin: Point::ORIGIN,
            scale: 1.0,
            base_clip: Clip::None,
            clips: Vec::new(),
        }
    }

    /// Binds the state to a new target.
    ///
    /// `origin` is the position of the drawn window inside its native
    /// target and `clip` is the device rectangle the window may cover.
    /// The clip stack is reset.
    pub fn bind(&mut self, origin: Point, scale: f32, clip: Clip) {
        self.origin = origin;
        self.scale = scale;
        self.base_clip = clip;
        self.clips.clear();
    }

    /// Returns the origin offset of the current target.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the scale of the current target.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the effective clip.
    pub fn clip(&self) -> Clip {
        self.clips.last().copied().unwrap_or(self.base_clip)
    }

    /// Returns the depth of the clip stack.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    /// Transforms a logical rectangle to device pixels.
    pub fn to_device(&self, rectangle: Rectangle) -> Rectangle {
        rectangle.translate(self.origin).scale(self.scale)
    }

    /// Transforms a logical point to device pixels.
    pub fn point_to_device(&self, point: Point) -> (f32, f32) {
        (
            point.x.saturating_add(self.origin.x) as f32 * self.scale,
            point.y.saturating_add(self.origin.y) as f32 * self.scale,
        )
    }

    fn push_clip(&mut self, rectangle: Rectangle) {
        let device = self.to_device(rectangle);
        let clip = self.clip().intersect(device);

        self.clips.push(clip);
    }

    fn push_no_clip(&mut self) {
        self.clips.push(self.base_clip);
    }

    fn pop_clip(&mut self) -> bool {
        self.clips.pop().is_some()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(Baseline::default())
    }
}

/// A stateful drawing context.
///
/// Coordinates are logical and relative to the window bound by the last
/// `make_current`. Implementors map them to device pixels with
/// [`State::to_device`] and honor [`State::clip`].
pub trait Graphics {
    /// Returns the drawing state.
    fn state(&self) -> &State;

    /// Returns the drawing state, mutably.
    fn state_mut(&mut self) -> &mut State;

    /// Returns the color map used to resolve indexed colors.
    fn color_map(&self) -> &ColorMap;

    /// Fills a logical rectangle.
    fn fill(&mut self, rectangle: Rectangle, color: Rgba);

    /// Strokes a polyline through the given logical points.
    fn stroke(&mut self, points: &[Point], closed: bool, width: u16, color: Rgba);

    /// Fills the polygon through the given logical points.
    fn fill_polygon(&mut self, points: &[Point], color: Rgba);

    /// Returns the metrics of a font.
    fn font_metrics(&self, font: Font) -> FontMetrics;

    /// Returns the advance width of a text.
    fn text_width(&self, font: Font, text: &str) -> f32;

    /// Draws a text with its top-left corner at `position`.
    fn render_text(&mut self, text: &str, position: Point, font: Font, color: Rgba);

    /// Sets the current color.
    fn color(&mut self, color: Color) {
        let rgba = self.color_map().resolve(color);
        let state = self.state_mut();

        state.color = color;
        state.rgba = rgba;
    }

    /// Sets the current color from its channels.
    fn rgb_color(&mut self, r: u8, g: u8, b: u8) {
        self.color(Color::rgb(r, g, b));
    }

    /// Sets the current line width.
    fn line_width(&mut self, width: u16) {
        self.state_mut().line_width = width;
    }

    /// Sets the current font.
    fn font(&mut self, face: u16, size: u16) {
        self.state_mut().font = Font::new(face, size);
    }

    /// Draws a one-pixel rectangle outline.
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }

        let (right, bottom) = (x.saturating_add(w - 1), y.saturating_add(h - 1));

        self.loop_(&[
            Point::new(x, y),
            Point::new(right, y),
            Point::new(right, bottom),
            Point::new(x, bottom),
        ]);
    }

    /// Fills a rectangle with the current color.
    fn rectf(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }

        let color = self.state().rgba;
        self.fill(Rectangle::new(x, y, w, h), color);
    }

    /// Draws a line.
    fn line(&mut self, x: i32, y: i32, x1: i32, y1: i32) {
        self.lines(&[Point::new(x, y), Point::new(x1, y1)]);
    }

    /// Draws a line through three points.
    fn line3(&mut self, x: i32, y: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.lines(&[Point::new(x, y), Point::new(x1, y1), Point::new(x2, y2)]);
    }

    /// Draws an open polyline.
    fn lines(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }

        let (width, color) = (self.state().line_width, self.state().rgba);
        self.stroke(points, false, width, color);
    }

    /// Draws a closed polyline.
    fn loop_(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }

        let (width, color) = (self.state().line_width, self.state().rgba);
        self.stroke(points, true, width, color);
    }

    /// Fills a polygon with the current color.
    fn polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }

        let color = self.state().rgba;
        self.fill_polygon(points, color);
    }

    /// Draws a horizontal line from `(x, y)` to `(x1, y)`.
    fn xyline(&mut self, x: i32, y: i32, x1: i32) {
        self.lines(&[Point::new(x, y), Point::new(x1, y)]);
    }

    /// Draws a horizontal then a vertical line.
    fn xyline2(&mut self, x: i32, y: i32, x1: i32, y2: i32) {
        self.lines(&[Point::new(x, y), Point::new(x1, y), Point::new(x1, y2)]);
    }

    /// Draws a horizontal, a vertical, then a horizontal line.
    fn xyline3(&mut self, x: i32, y: i32, x1: i32, y2: i32, x3: i32) {
        self.lines(&[
            Point::new(x, y),
            Point::new(x1, y),
            Point::new(x1, y2),
            Point::new(x3, y2),
        ]);
    }

    /// Draws a vertical line from `(x, y)` to `(x, y1)`.
    fn yxline(&mut self, x: i32, y: i32, y1: i32) {
        self.lines(&[Point::new(x, y), Point::new(x, y1)]);
    }

    /// Draws a vertical then a horizontal line.
    fn yxline2(&mut self, x: i32, y: i32, y1: i32, x2: i32) {
        self.lines(&[Point::new(x, y), Point::new(x, y1), Point::new(x2, y1)]);
    }

    /// Draws a vertical, a horizontal, then a vertical line.
    fn yxline3(&mut self, x: i32, y: i32, y1: i32, x2: i32, y3: i32) {
        self.lines(&[
            Point::new(x, y),
            Point::new(x, y1),
            Point::new(x2, y1),
            Point::new(x2, y3),
        ]);
    }

    /// Intersects the clip with a logical rectangle.
    ///
    /// A degenerate rectangle clips everything until the matching
    /// [`pop_clip`](Self::pop_clip).
    fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.state_mut()
            .push_clip(Rectangle::new(x, y, w.max(0), h.max(0)));
    }

    /// Pushes the unclipped state of the current target.
    fn push_no_clip(&mut self) {
        self.state_mut().push_no_clip();
    }

    /// Restores the clip in effect before the last push.
    fn pop_clip(&mut self) {
        if !self.state_mut().pop_clip() {
            log::warn!("pop_clip called without a matching push_clip");
        }
    }

    /// Returns true if any part of the logical rectangle may be drawn.
    fn not_clipped(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        let state = self.state();
        let device = state.to_device(Rectangle::new(x, y, w, h));

        !device.is_empty() && !state.clip().excludes(&device)
    }

    /// Returns the corrected metrics of the current font.
    fn metrics(&self) -> FontMetrics {
        self.font_metrics(self.state().font)
    }

    /// Measures a text with the current font, returning `(width, height)`.
    fn measure(&self, text: &str) -> (i32, i32) {
        let state = self.state();
        let metrics = self.font_metrics(state.font);

        (
            self.text_width(state.font, text).ceil() as i32,
            metrics.line_height(&state.baseline).ceil() as i32,
        )
    }

    /// Draws the first `n` bytes of `text` with its baseline at `y`.
    ///
    /// A prefix that splits a code point is drawn lossily.
    fn draw(&mut self, text: &str, n: usize, x: i32, y: i32) {
        let prefix = text::prefix(text, n);

        if prefix.is_empty() {
            return;
        }

        let (font, color) = (self.state().font, self.state().rgba);
        let ascent = self
            .font_metrics(font)
            .corrected_ascent(&self.state().baseline);
        let top = y.saturating_sub(ascent.round() as i32);

        self.render_text(&prefix, Point::new(x, top), font, color);
    }

    /// Draws a whole text with its baseline at `y`.
    fn draw_str(&mut self, text: &str, x: i32, y: i32) {
        self.draw(text, text.len(), x, y);
    }
}
