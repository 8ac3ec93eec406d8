//! Presentation Composition Segment parsing.

use crate::segment::CompositionState;
use crate::utils::BigEndianReader;

/// Cropping rectangle selecting a sub-region of a decoded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Placement of one object within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionObject {
    /// Object ID reference
    pub object_id: u16,
    /// Window ID reference
    pub window_id: u8,
    /// Horizontal position on the canvas
    pub x: u16,
    /// Vertical position on the canvas
    pub y: u16,
    /// Sub-region of the decoded object to display, if any
    pub crop: Option<Crop>,
}

/// Presentation Composition Segment: canvas dimensions, the palette to use
/// and the objects to place for one subtitle update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationCompositionSegment {
    /// Subtitle canvas width
    pub width: u16,
    /// Subtitle canvas height
    pub height: u16,
    /// Frame rate (encoded value, carried through unused)
    pub frame_rate: u8,
    /// Composition sequence number
    pub number: u16,
    /// Relation to the preceding decoder state
    pub state: CompositionState,
    /// Palette-only update flag (bit 7)
    pub palette_update: bool,
    /// Palette ID to resolve against the accumulated palettes
    pub palette_id: u8,
    /// Objects to place, in stream order
    pub objects: Vec<CompositionObject>,
}

impl PresentationCompositionSegment {
    /// Parse a presentation composition segment payload.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut reader = BigEndianReader::new(payload);

        let width = reader.read_u16()?;
        let height = reader.read_u16()?;
        let frame_rate = reader.read_u8()?;
        let number = reader.read_u16()?;
        // Unknown states are conservatively treated as epoch boundaries.
        let state = CompositionState::try_from(reader.read_u8()?)
            .unwrap_or(CompositionState::EpochStart);
        let palette_update = (reader.read_u8()? & 0x80) != 0;
        let palette_id = reader.read_u8()?;

        let count = reader.read_u8()? as usize;
        let mut objects = Vec::with_capacity(count);

        for _ in 0..count {
            let object_id = reader.read_u16()?;
            let window_id = reader.read_u8()?;
            let cropped = (reader.read_u8()? & 0x80) != 0;
            let x = reader.read_u16()?;
            let y = reader.read_u16()?;

            let crop = if cropped {
                Some(Crop {
                    x: reader.read_u16()?,
                    y: reader.read_u16()?,
                    width: reader.read_u16()?,
                    height: reader.read_u16()?,
                })
            } else {
                None
            };

            objects.push(CompositionObject {
                object_id,
                window_id,
                x,
                y,
                crop,
            });
        }

        Some(Self {
            width,
            height,
            frame_rate,
            number,
            state,
            palette_update,
            palette_id,
            objects,
        })
    }
}
