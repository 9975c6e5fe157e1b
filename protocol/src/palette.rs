//! Fixed 8-colour palette and nearest-colour lookup.

use crate::INDEX_MASK;

/// 24-bit RGB colour, alpha already discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Receiver palette. The position of each entry is its 3-bit index.
pub const PALETTE: [Color; 8] = [
    Color::new(0, 0, 0),       // 0: black
    Color::new(0, 0, 255),     // 1: blue
    Color::new(0, 255, 0),     // 2: green
    Color::new(0, 255, 255),   // 3: cyan
    Color::new(255, 0, 0),     // 4: red
    Color::new(255, 0, 255),   // 5: magenta
    Color::new(255, 255, 0),   // 6: yellow
    Color::new(255, 255, 255), // 7: white
];

/// Palette colour for an index; only the low 3 bits are used
pub const fn palette_color(index: u8) -> Color {
    PALETTE[(index & INDEX_MASK) as usize]
}

/// Squared Euclidean distance in RGB space, at most 3 * 255^2
pub const fn distance_sq(a: Color, b: Color) -> u32 {
    let dr = a.r.abs_diff(b.r) as u32;
    let dg = a.g.abs_diff(b.g) as u32;
    let db = a.b.abs_diff(b.b) as u32;
    dr * dr + dg * dg + db * db
}

/// Index of the nearest receiver palette entry
pub fn quantize(color: Color) -> u8 {
    nearest(&PALETTE, color) as u8
}

/// Linear scan for the closest entry of `palette`. Ties go to the lowest index.
pub fn nearest(palette: &[Color], color: Color) -> usize {
    let mut best_index = 0;
    let mut best_dist = u32::MAX;

    for (index, &entry) in palette.iter().enumerate() {
        let dist = distance_sq(color, entry);
        if dist < best_dist {
            best_dist = dist;
            best_index = index;
        }
    }

    best_index
}
