//! Colors and the 256-entry color map.
//!
//! A [`Color`] is either a packed RGB value (`0xRRGGBB00`) or an index into
//! a [`ColorMap`]. Any value with a non-zero upper 24 bits is RGB.
//!
//! The color map stores entries as `0xRRGGBBxx`, where `xx` is the alpha
//! XORed with `0xFF`. A zeroed low byte therefore means "opaque", which
//! keeps older entries written without alpha valid.

/// A color, either a palette index or a packed RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// The default foreground color.
    pub const FOREGROUND: Color = Color(0);
    /// The default background color of text, list, and valuator widgets.
    pub const BACKGROUND2: Color = Color(7);
    /// The inactive foreground color.
    pub const INACTIVE: Color = Color(8);
    /// The default selection/highlight color.
    pub const SELECTION: Color = Color(15);
    /// The first entry of the gray ramp.
    pub const GRAY0: Color = Color(32);
    /// A dark gray.
    pub const DARK3: Color = Color(39);
    /// A dark gray.
    pub const DARK2: Color = Color(45);
    /// A dark gray.
    pub const DARK1: Color = Color(47);
    /// The default background color.
    pub const BACKGROUND: Color = Color(49);
    /// A light gray.
    pub const LIGHT1: Color = Color(50);
    /// A light gray.
    pub const LIGHT2: Color = Color(52);
    /// A light gray.
    pub const LIGHT3: Color = Color(54);
    /// Black, from the color cube.
    pub const BLACK: Color = Color(56);
    /// Red, from the color cube.
    pub const RED: Color = Color(88);
    /// Green, from the color cube.
    pub const GREEN: Color = Color(63);
    /// Yellow, from the color cube.
    pub const YELLOW: Color = Color(95);
    /// Blue, from the color cube.
    pub const BLUE: Color = Color(216);
    /// Magenta, from the color cube.
    pub const MAGENTA: Color = Color(248);
    /// Cyan, from the color cube.
    pub const CYAN: Color = Color(223);
    /// White, from the color cube.
    pub const WHITE: Color = Color(255);

    /// First index of the gray ramp.
    pub const GRAY_RAMP: u8 = 32;
    /// Number of entries of the gray ramp.
    pub const NUM_GRAY: u8 = 24;
    /// First index of the color cube.
    pub const COLOR_CUBE: u8 = 56;
    /// Red levels of the color cube.
    pub const NUM_RED: u8 = 5;
    /// Green levels of the color cube.
    pub const NUM_GREEN: u8 = 8;
    /// Blue levels of the color cube.
    pub const NUM_BLUE: u8 = 5;

    /// Creates a packed RGB [`Color`].
    ///
    /// Pure black cannot be packed (it would read as index 0), so it maps to
    /// [`Color::BLACK`].
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        if r == 0 && g == 0 && b == 0 {
            Color::BLACK
        } else {
            Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8))
        }
    }

    /// Creates an indexed [`Color`].
    pub const fn index(index: u8) -> Color {
        Color(index as u32)
    }

    /// Returns the color cube entry for the given levels.
    pub const fn cube(r: u8, g: u8, b: u8) -> Color {
        Color::index(Self::COLOR_CUBE + (b * Self::NUM_RED + r) * Self::NUM_GREEN + g)
    }

    /// Returns true if this is a packed RGB value.
    pub const fn is_rgb(self) -> bool {
        self.0 & 0xFFFF_FF00 != 0
    }

    /// Returns the palette index, if this is an indexed color.
    pub const fn as_index(self) -> Option<u8> {
        if self.is_rgb() {
            None
        } else {
            Some(self.0 as u8)
        }
    }
}

/// A color with resolved 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; `255` is opaque.
    pub a: u8,
}

impl Rgba {
    /// Creates a new [`Rgba`].
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque [`Rgba`].
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Packs the color as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// The 256-entry palette used to resolve indexed colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    entries: [u32; 256],
}

impl ColorMap {
    /// Stores an entry, encoding its alpha.
    pub fn set(&mut self, index: u8, color: Rgba) {
        self.entries[usize::from(index)] = ((color.r as u32) << 24)
            | ((color.g as u32) << 16)
            | ((color.b as u32) << 8)
            | u32::from(color.a ^ 0xFF);
    }

    /// Stores an opaque entry.
    pub fn set_rgb(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.set(index, Rgba::opaque(r, g, b));
    }

    /// Returns the raw stored value of an entry.
    pub fn raw(&self, index: u8) -> u32 {
        self.entries[usize::from(index)]
    }

    /// Returns the entry at `index`, recovering its true alpha.
    pub fn get(&self, index: u8) -> Rgba {
        let c = self.entries[usize::from(index)] ^ 0x0000_00FF;

        Rgba::new((c >> 24) as u8, (c >> 16) as u8, (c >> 8) as u8, c as u8)
    }

    /// Resolves any [`Color`] to its channels.
    ///
    /// Packed RGB values are always opaque.
    pub fn resolve(&self, color: Color) -> Rgba {
        match color.as_index() {
            Some(index) => self.get(index),
            None => Rgba::opaque((color.0 >> 24) as u8, (color.0 >> 16) as u8, (color.0 >> 8) as u8),
        }
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        const BASE: [u32; 16] = [
            0x0000_0000,
            0xff00_0000,
            0x00ff_0000,
            0xffff_0000,
            0x0000_ff00,
            0xff00_ff00,
            0x00ff_ff00,
            0xffff_ff00,
            0x5555_5500,
            0xc671_7100,
            0x71c6_7100,
            0x8e8e_3800,
            0x7171_c600,
            0x8e38_8e00,
            0x388e_8e00,
            0x0000_8000,
        ];

        let mut map = ColorMap {
            entries: [0; 256],
        };

        map.entries[..16].copy_from_slice(&BASE);

        // Slots 16..32 are free for applications; they start as mid gray.
        for index in 16..Color::GRAY_RAMP {
            map.set_rgb(index, 0x80, 0x80, 0x80);
        }

        for i in 0..Color::NUM_GRAY {
            let level = (u32::from(i) * 255 / u32::from(Color::NUM_GRAY - 1)) as u8;
            map.set_rgb(Color::GRAY_RAMP + i, level, level, level);
        }

        for b in 0..Color::NUM_BLUE {
            for r in 0..Color::NUM_RED {
                for g in 0..Color::NUM_GREEN {
                    let Color(index) = Color::cube(r, g, b);

                    map.set_rgb(
                        index as u8,
                        (u32::from(r) * 255 / u32::from(Color::NUM_RED - 1)) as u8,
                        (u32::from(g) * 255 / u32::from(Color::NUM_GREEN - 1)) as u8,
                        (u32::from(b) * 255 / u32::from(Color::NUM_BLUE - 1)) as u8,
                    );
                }
            }
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_survives_the_xor_encoding_for_every_index() {
        let mut map = ColorMap::default();

        for index in 0..=255u8 {
            let stored = Rgba::new(index, 255 - index, index / 2, index);
            map.set(index, stored);

            assert_eq!(map.raw(index) & 0xFF, u32::from(index ^ 0xFF));
            assert_eq!(map.get(index).a, index);
            assert_eq!(map.resolve(Color::index(index)), stored);
        }
    }

    #[test]
    fn entries_without_alpha_bits_are_opaque() {
        let map = ColorMap::default();

        assert_eq!(map.resolve(Color::index(1)), Rgba::opaque(255, 0, 0));
        assert_eq!(map.resolve(Color::FOREGROUND).a, 255);
    }

    #[test]
    fn color_cube_matches_named_colors() {
        let map = ColorMap::default();

        assert_eq!(map.resolve(Color::BLACK), Rgba::opaque(0, 0, 0));
        assert_eq!(map.resolve(Color::RED), Rgba::opaque(255, 0, 0));
        assert_eq!(map.resolve(Color::GREEN), Rgba::opaque(0, 255, 0));
        assert_eq!(map.resolve(Color::BLUE), Rgba::opaque(0, 0, 255));
        assert_eq!(map.resolve(Color::WHITE), Rgba::opaque(255, 255, 255));
    }

    #[test]
    fn packed_rgb_bypasses_the_map() {
        let map = ColorMap::default();
        let color = Color::rgb(10, 20, 30);

        assert!(color.is_rgb());
        assert_eq!(map.resolve(color), Rgba::opaque(10, 20, 30));
        assert_eq!(Color::rgb(0, 0, 0), Color::BLACK);
    }
}
