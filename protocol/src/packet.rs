//! Frame packet: `magic(4) | width(2, BE) | height(2, BE) | one index byte per pixel`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{Error, HEADER_SIZE, INDEX_MASK};

/// One framed image, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Protocol identifier
    pub magic: [u8; 4],
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Row-major palette indices, upper 5 bits always zero
    pub data: Vec<u8>,
}

impl Packet {
    /// Frame `indices` under a header. Each index is masked to its low 3 bits.
    pub fn build(indices: &[u8], width: usize, height: usize, magic: &[u8]) -> Result<Self, Error> {
        let magic: [u8; 4] = magic
            .try_into()
            .map_err(|_| Error::InvalidMagicLength(magic.len()))?;

        let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(Error::DimensionOutOfRange { width, height }),
        };

        let expected = width * height;
        if indices.len() != expected {
            return Err(Error::GridSizeMismatch {
                expected,
                actual: indices.len(),
            });
        }

        Ok(Self {
            magic,
            width: w,
            height: h,
            data: indices.iter().map(|&index| index & INDEX_MASK).collect(),
        })
    }

    /// Total wire size, header included
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }

    /// Never true: a packet always carries its header
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serialize the header fields
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let w = self.width.to_be_bytes();
        let h = self.height.to_be_bytes();
        [
            self.magic[0],
            self.magic[1],
            self.magic[2],
            self.magic[3],
            w[0],
            w[1],
            h[0],
            h[1],
        ]
    }

    /// Serialize packet to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.header_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Deserialize packet from bytes, as the receiver reads it.
    ///
    /// The magic is returned as-is; callers compare it against the identifier they expect.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let width = u16::from_be_bytes([bytes[4], bytes[5]]);
        let height = u16::from_be_bytes([bytes[6], bytes[7]]);

        let expected = HEADER_SIZE + width as usize * height as usize;
        if bytes.len() != expected {
            return Err(Error::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            magic,
            width,
            height,
            data: bytes[HEADER_SIZE..]
                .iter()
                .map(|&index| index & INDEX_MASK)
                .collect(),
        })
    }
}

/// Build a packet and return its wire bytes
pub fn build_packet(
    indices: &[u8],
    width: usize,
    height: usize,
    magic: &[u8],
) -> Result<Vec<u8>, Error> {
    Packet::build(indices, width, height, magic).map(|packet| packet.to_bytes())
}
