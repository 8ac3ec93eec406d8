//! Palette Definition Segment parsing.

use crate::utils::{ycbcr_to_rgba, BigEndianReader};

/// Palette Definition Segment: a 256-entry index-to-color table.
///
/// Entries are stored in the stream as YCbCr plus alpha and converted to
/// packed RGBA once at parse time, so run-length decoding is a flat lookup.
/// Entries a segment does not mention stay fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteDefinitionSegment {
    /// Palette ID
    pub id: u8,
    /// Version number
    pub version: u8,
    /// Packed RGBA colors indexed by palette entry, always 256 entries
    pub rgba: Vec<u32>,
}

impl PaletteDefinitionSegment {
    /// Parse a palette definition segment payload.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut reader = BigEndianReader::new(payload);

        let id = reader.read_u8()?;
        let version = reader.read_u8()?;

        // Each entry is 5 bytes: index, Y, Cr, Cb, alpha.
        let entry_count = (payload.len() - 2) / 5;
        let mut rgba = vec![0u32; 256];

        for _ in 0..entry_count {
            let entry = reader.read_u8()? as usize;
            let y = reader.read_u8()?;
            let cr = reader.read_u8()?;
            let cb = reader.read_u8()?;
            let alpha = reader.read_u8()?;

            rgba[entry] = ycbcr_to_rgba(y, cb, cr, alpha);
        }

        Some(Self { id, version, rgba })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let payload = [
            0x03, // palette id
            0x01, // version
            0x01, 0xFF, 0x80, 0x80, 0xFF, // entry 1: opaque white
            0x02, 0x64, 0x80, 0x80, 0x40, // entry 2: translucent grey
        ];

        let pds = PaletteDefinitionSegment::parse(&payload).unwrap();
        assert_eq!(pds.id, 3);
        assert_eq!(pds.version, 1);
        assert_eq!(pds.rgba.len(), 256);
        assert_eq!(pds.rgba[1].to_le_bytes(), [255, 255, 255, 255]);
        assert_eq!(pds.rgba[2].to_le_bytes(), [100, 100, 100, 0x40]);
        // Unmentioned entries stay transparent.
        assert_eq!(pds.rgba[0], 0);
        assert_eq!(pds.rgba[255], 0);
    }
}
