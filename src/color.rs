//! Color handling
//!
//! Cells store fully resolved RGB triples. SGR color parameters go through
//! [`Palette::resolve`]: indices inside the 16-entry palette copy the
//! stored triple, anything larger is taken as a packed 24-bit value and
//! decomposed directly.

use serde::{Deserialize, Serialize};

/// Palette index used for the default foreground (green)
pub const DEFAULT_FG_INDEX: usize = 2;
/// Palette index used for the default background (black)
pub const DEFAULT_BG_INDEX: usize = 0;

/// An RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Seed values for the 16-entry palette: the 8 standard colors followed by
/// their bright variants.
const SEED: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // black
    Rgb::new(205, 0, 0),     // red
    Rgb::new(0, 205, 0),     // green
    Rgb::new(205, 205, 0),   // yellow
    Rgb::new(0, 0, 238),     // blue
    Rgb::new(205, 0, 205),   // magenta
    Rgb::new(0, 205, 205),   // cyan
    Rgb::new(229, 229, 229), // white
    Rgb::new(127, 127, 127), // bright black
    Rgb::new(255, 0, 0),     // bright red
    Rgb::new(0, 255, 0),     // bright green
    Rgb::new(255, 255, 0),   // bright yellow
    Rgb::new(92, 92, 255),   // bright blue
    Rgb::new(255, 0, 255),   // bright magenta
    Rgb::new(0, 255, 255),   // bright cyan
    Rgb::new(255, 255, 255), // bright white
];

/// The 16-entry color palette
///
/// Seeded once at construction; individual entries can be substituted but
/// there is no further palette-editing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 16],
}

impl Default for Palette {
    fn default() -> Self {
        Self { colors: SEED }
    }
}

impl Palette {
    /// Substitute a single palette entry. Out-of-range indices are ignored.
    pub fn substitute(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    /// Resolve a color parameter to an RGB triple.
    ///
    /// Indices 0..16 copy the palette entry; larger values are decomposed
    /// as packed `0xRRGGBB`.
    pub fn resolve(&self, index: u32) -> Rgb {
        match self.colors.get(index as usize) {
            Some(&color) => color,
            None => Rgb::new((index >> 16) as u8, (index >> 8) as u8, index as u8),
        }
    }

    /// The fixed default foreground
    pub fn default_fg(&self) -> Rgb {
        self.colors[DEFAULT_FG_INDEX]
    }

    /// The fixed default background
    pub fn default_bg(&self) -> Rgb {
        self.colors[DEFAULT_BG_INDEX]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_copies_entry() {
        let palette = Palette::default();
        assert_eq!(palette.resolve(2), Rgb::new(0, 205, 0));
        assert_eq!(palette.resolve(15), Rgb::new(255, 255, 255));
    }

    #[test]
    fn out_of_palette_index_decomposes_as_rgb() {
        let palette = Palette::default();
        assert_eq!(palette.resolve(0x00FF_8040), Rgb::new(0xFF, 0x80, 0x40));
        assert_eq!(palette.resolve(16), Rgb::new(0, 0, 16));
    }

    #[test]
    fn substitution_replaces_entry() {
        let mut palette = Palette::default();
        palette.substitute(2, Rgb::new(1, 2, 3));
        assert_eq!(palette.default_fg(), Rgb::new(1, 2, 3));
        palette.substitute(99, Rgb::new(9, 9, 9)); // ignored
    }
}
