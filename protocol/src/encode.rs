//! Pixel grid and frame encoding into palette indices.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::palette::{quantize, Color};
use crate::Error;

/// Row-major RGB pixels of a frame already sized for the receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelGrid {
    /// Create a grid, checking that `pixels` holds exactly `width * height` colours
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid);
        }

        let expected = width
            .checked_mul(height)
            .ok_or(Error::DimensionOutOfRange { width, height })?;
        if pixels.len() != expected {
            return Err(Error::GridSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a grid from packed RGB24 data (3 bytes per pixel)
    pub fn from_rgb_bytes(width: usize, height: usize, data: &[u8]) -> Result<Self, Error> {
        if data.len() % 3 != 0 {
            return Err(Error::GridSizeMismatch {
                expected: width.saturating_mul(height).saturating_mul(3),
                actual: data.len(),
            });
        }

        let pixels = data
            .chunks_exact(3)
            .map(|rgb| Color::new(rgb[0], rgb[1], rgb[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixel at column `x` of row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks_exact(self.width)
    }
}

/// Quantize every pixel of the grid, preserving row-major order
pub fn encode(grid: &PixelGrid) -> Vec<u8> {
    grid.pixels.iter().map(|&color| quantize(color)).collect()
}

/// Same output as [`encode`], with rows split across `threads` scoped workers
#[cfg(feature = "std")]
pub fn encode_parallel(grid: &PixelGrid, threads: usize) -> Vec<u8> {
    let threads = threads.clamp(1, grid.height);
    if threads == 1 {
        return encode(grid);
    }

    let rows_per_worker = grid.height.div_ceil(threads);
    let chunk_len = rows_per_worker * grid.width;
    let mut indices = std::vec![0u8; grid.pixels.len()];

    std::thread::scope(|scope| {
        for (out, src) in indices
            .chunks_mut(chunk_len)
            .zip(grid.pixels.chunks(chunk_len))
        {
            scope.spawn(move || {
                for (slot, &color) in out.iter_mut().zip(src) {
                    *slot = quantize(color);
                }
            });
        }
    });

    indices
}
