//! Binary payload cursor, color conversion and timestamp search helpers.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

/// Synchronous cursor over an in-memory segment payload, decoding fixed-width
/// unsigned integers most-significant-byte-first.
pub struct BigEndianReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BigEndianReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len() - self.position()
    }

    #[inline]
    pub fn read_u8(&mut self) -> Option<u8> {
        self.cursor.read_u8().ok()
    }

    #[inline]
    pub fn read_u16(&mut self) -> Option<u16> {
        self.cursor.read_u16::<BigEndian>().ok()
    }

    #[inline]
    pub fn read_u24(&mut self) -> Option<u32> {
        let mut buf = [0u8; 3];
        self.cursor.read_exact(&mut buf).ok()?;
        Some(((buf[0] as u32) << 16) | ((buf[1] as u32) << 8) | (buf[2] as u32))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Option<u32> {
        self.cursor.read_u32::<BigEndian>().ok()
    }
}

/// Convert a YCbCr palette entry to a packed RGBA value.
///
/// The packing is little-endian, so the in-memory byte order is R, G, B, A —
/// the layout renderers expect for an RGBA surface.
#[inline]
pub fn ycbcr_to_rgba(y: u8, cb: u8, cr: u8, a: u8) -> u32 {
    let y = y as f32;
    let cb = (cb as f32) - 128.0;
    let cr = (cr as f32) - 128.0;

    let r = ((y + 1.40200 * cr).round() as i32).clamp(0, 255) as u8;
    let g = ((y - 0.34414 * cb - 0.71414 * cr).round() as i32).clamp(0, 255) as u8;
    let b = ((y + 1.77200 * cb).round() as i32).clamp(0, 255) as u8;

    u32::from_le_bytes([r, g, b, a])
}

/// Find the largest index whose timestamp is `<= target`.
///
/// `timestamps` must be sorted ascending and non-empty, and `target` must be
/// at least `timestamps[0]`; range checks belong to the caller.
pub fn binary_search_timestamp(timestamps: &[u32], target: u64) -> usize {
    let mut low = 0;
    let mut high = timestamps.len();

    while low < high {
        let mid = low + (high - low) / 2;
        if timestamps[mid] as u64 <= target {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    low.saturating_sub(1)
}
