//! Font engines: text metrics and glyph coverage.
use flint_runtime::core::Rgba;
use flint_runtime::core::graphics::{Font, FontMetrics};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, Weight};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Measures and rasterizes text for a [`Renderer`](crate::Renderer).
pub trait FontEngine {
    /// Returns the metrics of a font, in logical pixels.
    fn metrics(&self, font: Font) -> FontMetrics;

    /// Returns the advance width of a text, in logical pixels.
    fn width(&self, font: Font, text: &str) -> f32;

    /// Rasterizes a text at `scale`.
    ///
    /// `plot` receives device spans relative to the top-left corner of the
    /// line: `(x, y, width, height, color)`.
    fn rasterize(
        &self,
        text: &str,
        font: Font,
        scale: f32,
        color: Rgba,
        plot: &mut dyn FnMut(i32, i32, u32, u32, Rgba),
    );
}

/// A font engine with fixed metrics that draws every glyph as a box.
///
/// Ascent is 80% and descent 20% of the font size; each character advances
/// by 60% of it. Useful when pixels have to be predictable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFont;

impl BoxFont {
    fn advance(font: Font) -> f32 {
        f32::from(font.size) * 0.6
    }
}

impl FontEngine for BoxFont {
    fn metrics(&self, font: Font) -> FontMetrics {
        let size = f32::from(font.size);

        FontMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
        }
    }

    fn width(&self, font: Font, text: &str) -> f32 {
        text.chars().filter(|c| !c.is_control()).count() as f32 * Self::advance(font)
    }

    fn rasterize(
        &self,
        text: &str,
        font: Font,
        scale: f32,
        color: Rgba,
        plot: &mut dyn FnMut(i32, i32, u32, u32, Rgba),
    ) {
        let advance = Self::advance(font) * scale;
        let size = f32::from(font.size) * scale;

        let top = (size * 0.2).round() as i32;
        let width = (advance * 0.8).round().max(1.0) as u32;
        let height = (size * 0.6).round().max(1.0) as u32;

        for (index, _) in text
            .chars()
            .filter(|c| !c.is_control())
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
        {
            let x = (index as f32 * advance).round() as i32;
            plot(x, top, width, height, color);
        }
    }
}

/// A font engine shaping text with [`cosmic_text`].
///
/// Face numbers follow the classic layout: the low two bits select bold
/// and italic, the rest the family (sans, monospace, serif, symbol).
#[derive(Clone)]
pub struct CosmicFont {
    inner: Rc<RefCell<Cosmic>>,
}

struct Cosmic {
    system: FontSystem,
    cache: SwashCache,
    metrics: FxHashMap<Font, FontMetrics>,
}

impl CosmicFont {
    /// Loads the system fonts.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Cosmic {
                system: FontSystem::new(),
                cache: SwashCache::new(),
                metrics: FxHashMap::default(),
            })),
        }
    }
}

impl Default for CosmicFont {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CosmicFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmicFont").finish_non_exhaustive()
    }
}

fn attrs(face: u16) -> Attrs<'static> {
    let family = match face & !3 {
        4 => Family::Monospace,
        8 => Family::Serif,
        _ => Family::SansSerif,
    };

    let mut attrs = Attrs::new().family(family);

    if face & 1 != 0 {
        attrs = attrs.weight(Weight::BOLD);
    }

    if face & 2 != 0 {
        attrs = attrs.style(Style::Italic);
    }

    attrs
}

fn shape(system: &mut FontSystem, text: &str, font: Font, scale: f32) -> Buffer {
    let size = f32::from(font.size.max(1)) * scale;
    let mut buffer = Buffer::new(system, Metrics::new(size, size));

    buffer.set_size(system, None, None);
    buffer.set_text(system, text, attrs(font.face), Shaping::Advanced);
    buffer.shape_until_scroll(system, false);

    buffer
}

impl FontEngine for CosmicFont {
    fn metrics(&self, font: Font) -> FontMetrics {
        let mut cosmic = self.inner.borrow_mut();

        if let Some(metrics) = cosmic.metrics.get(&font) {
            return *metrics;
        }

        let size = f32::from(font.size);
        let buffer = shape(&mut cosmic.system, "Ag", font, 1.0);

        let ascent = buffer
            .layout_runs()
            .next()
            .map_or(size * 0.8, |run| run.line_y - run.line_top);

        let metrics = FontMetrics {
            ascent,
            descent: (size - ascent).max(0.0),
        };

        let _ = cosmic.metrics.insert(font, metrics);

        metrics
    }

    fn width(&self, font: Font, text: &str) -> f32 {
        let mut cosmic = self.inner.borrow_mut();
        let buffer = shape(&mut cosmic.system, text, font, 1.0);

        buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max)
    }

    fn rasterize(
        &self,
        text: &str,
        font: Font,
        scale: f32,
        color: Rgba,
        plot: &mut dyn FnMut(i32, i32, u32, u32, Rgba),
    ) {
        let mut cosmic = self.inner.borrow_mut();
        let Cosmic { system, cache, .. } = &mut *cosmic;

        let buffer = shape(system, text, font, scale);
        let base = cosmic_text::Color::rgba(color.r, color.g, color.b, color.a);

        buffer.draw(system, cache, base, |x, y, width, height, color| {
            plot(
                x,
                y,
                width,
                height,
                Rgba::new(color.r(), color.g(), color.b(), color.a()),
            );
        });
    }
}
