//! Object Definition Segment parsing.

use bytes::Bytes;

use crate::utils::BigEndianReader;

/// Object Definition Segment: one fragment of a run-length-encoded bitmap.
///
/// Large images are split across several fragments sharing one `id`; only
/// the fragment marked first-in-sequence carries the image dimensions and
/// the declared total data length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDefinitionSegment {
    /// Object ID
    pub id: u16,
    /// Version number
    pub version: u8,
    /// Sequence flags (bit 7 = first fragment, bit 6 = last fragment)
    pub sequence_flag: u8,
    /// Declared length of the full encoded image (first fragment only)
    pub data_length: u32,
    /// Image width in pixels (first fragment only)
    pub width: u16,
    /// Image height in pixels (first fragment only)
    pub height: u16,
    /// Run-length-encoded pixel data carried by this fragment
    pub data: Bytes,
}

impl ObjectDefinitionSegment {
    /// Parse an object definition segment payload.
    ///
    /// The fragment data is a zero-copy slice of `payload`.
    pub fn parse(payload: &Bytes) -> Option<Self> {
        let mut reader = BigEndianReader::new(payload);

        let id = reader.read_u16()?;
        let version = reader.read_u8()?;
        let sequence_flag = reader.read_u8()?;

        let is_first = (sequence_flag & 0x80) != 0;

        let (data_length, width, height) = if is_first {
            (reader.read_u24()?, reader.read_u16()?, reader.read_u16()?)
        } else {
            (0, 0, 0)
        };

        let data = payload.slice(reader.position()..);

        Some(Self {
            id,
            version,
            sequence_flag,
            data_length,
            width,
            height,
            data,
        })
    }

    /// Whether this fragment opens an object sequence.
    #[inline]
    pub fn is_first_in_sequence(&self) -> bool {
        (self.sequence_flag & 0x80) != 0
    }

    /// Whether this fragment closes an object sequence.
    #[inline]
    pub fn is_last_in_sequence(&self) -> bool {
        (self.sequence_flag & 0x40) != 0
    }
}
