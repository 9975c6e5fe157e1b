#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

use core::fmt;

mod encode;
mod packet;
mod palette;

pub use encode::{encode, PixelGrid};
#[cfg(feature = "std")]
pub use encode::encode_parallel;
pub use packet::{build_packet, Packet};
pub use palette::{distance_sq, nearest, palette_color, quantize, Color, PALETTE};

/// Protocol identifier for 3-bit images
pub const DEFAULT_MAGIC: [u8; 4] = *b"IMG3";

/// Default framebuffer resolution of the receiver
pub const DEFAULT_WIDTH: u16 = 160;
pub const DEFAULT_HEIGHT: u16 = 120;

/// Magic (4) + width (2) + height (2)
pub const HEADER_SIZE: usize = 8;

/// Number of palette entries, one per 3-bit index
pub const PALETTE_SIZE: usize = 8;

/// Bits of a payload byte that carry the palette index
pub const INDEX_MASK: u8 = 0x07;

/// Errors raised while building or parsing a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Magic identifier was not exactly 4 bytes
    InvalidMagicLength(usize),
    /// Width or height does not fit the 16-bit header fields
    DimensionOutOfRange { width: usize, height: usize },
    /// Pixel or index count differs from width * height
    GridSizeMismatch { expected: usize, actual: usize },
    /// Pixel grid with a zero width or height
    EmptyGrid,
    /// Received buffer length disagrees with its header
    Truncated { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMagicLength(len) => {
                write!(f, "magic must be exactly 4 bytes, got {}", len)
            }
            Error::DimensionOutOfRange { width, height } => {
                write!(f, "dimensions {}x{} do not fit in 16 bits", width, height)
            }
            Error::GridSizeMismatch { expected, actual } => {
                write!(f, "expected {} pixels, got {}", expected, actual)
            }
            Error::EmptyGrid => write!(f, "width and height must be positive"),
            Error::Truncated { expected, actual } => {
                write!(f, "packet should be {} bytes, got {}", expected, actual)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size_matches_layout() {
        assert_eq!(HEADER_SIZE, DEFAULT_MAGIC.len() + 2 + 2);
        assert_eq!(PALETTE.len(), PALETTE_SIZE);
        assert_eq!(INDEX_MASK as usize, PALETTE_SIZE - 1);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            std::format!("{}", Error::InvalidMagicLength(3)),
            "magic must be exactly 4 bytes, got 3"
        );
        assert_eq!(
            std::format!("{}", Error::GridSizeMismatch { expected: 4, actual: 3 }),
            "expected 4 pixels, got 3"
        );
    }
}
