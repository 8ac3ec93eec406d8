//! Run-length decoder for PGS object bitmaps.
//!
//! The encoding, read left to right:
//! - a non-zero byte is a literal palette index for one pixel;
//! - `0x00 0x00` marks the end of a line and emits nothing;
//! - `0x00` followed by a non-zero byte starts a run: the low six bits are
//!   the run length, bit 6 extends the length by one more byte (14-bit run),
//!   and bit 7 selects an explicit palette index for the run instead of
//!   entry zero.

/// Expand run-length-encoded `data` through `palette` into `target`.
///
/// Decoding stops when the input is exhausted or the target is full, and
/// returns the number of pixels emitted. Callers size `target` to
/// `width * height` and treat a short count as a malformed image; pixels
/// past the emitted count keep their prior contents.
pub fn decode_rle(data: &[u8], palette: &[u32], target: &mut [u32]) -> usize {
    let mut idx = 0;
    let mut pos = 0;
    let len = data.len();
    let target_len = target.len();

    let lookup = |entry: u8| palette.get(entry as usize).copied().unwrap_or(0);
    let transparent = lookup(0);

    while pos < len && idx < target_len {
        let byte1 = data[pos];
        pos += 1;

        // Most common case: literal palette index.
        if byte1 != 0 {
            target[idx] = lookup(byte1);
            idx += 1;
            continue;
        }

        let Some(&byte2) = data.get(pos) else { break };
        pos += 1;

        // End-of-line marker.
        if byte2 == 0 {
            continue;
        }

        let mut count = (byte2 & 0x3F) as usize;
        if byte2 & 0x40 != 0 {
            // 14-bit run length.
            count = (count << 8) | data.get(pos).copied().unwrap_or(0) as usize;
            pos += 1;
        }
        let color = if byte2 & 0x80 != 0 {
            let entry = data.get(pos).copied().unwrap_or(0);
            pos += 1;
            lookup(entry)
        } else {
            transparent
        };

        let end = (idx + count).min(target_len);
        if count > 8 {
            target[idx..end].fill(color);
        } else {
            // Plain store loop beats fill() for short runs.
            while idx < end {
                target[idx] = color;
                idx += 1;
            }
        }
        idx = end;
    }

    idx
}
