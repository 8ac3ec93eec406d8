//! Window Definition Segment parsing.

use crate::utils::BigEndianReader;

/// A named rectangle on the subtitle canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowDefinition {
    /// Window ID
    pub id: u8,
    /// Horizontal position
    pub x: u16,
    /// Vertical position
    pub y: u16,
    /// Window width
    pub width: u16,
    /// Window height
    pub height: u16,
}

/// Window Definition Segment: one segment may declare several windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDefinitionSegment {
    pub windows: Vec<WindowDefinition>,
}

impl WindowDefinitionSegment {
    /// Parse a window definition segment payload.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut reader = BigEndianReader::new(payload);

        let count = reader.read_u8()? as usize;
        let mut windows = Vec::with_capacity(count);

        for _ in 0..count {
            windows.push(WindowDefinition {
                id: reader.read_u8()?,
                x: reader.read_u16()?,
                y: reader.read_u16()?,
                width: reader.read_u16()?,
                height: reader.read_u16()?,
            });
        }

        Some(Self { windows })
    }
}
