//! PGS segment kinds and composition states.

/// Segment kind identifiers as they appear in the stream.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Palette Definition Segment (0x14)
    PaletteDefinition = 0x14,
    /// Object Definition Segment (0x15)
    ObjectDefinition = 0x15,
    /// Presentation Composition Segment (0x16)
    PresentationComposition = 0x16,
    /// Window Definition Segment (0x17)
    WindowDefinition = 0x17,
    /// End of Display Set (0x80)
    End = 0x80,
}

impl TryFrom<u8> for SegmentKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x14 => Ok(SegmentKind::PaletteDefinition),
            0x15 => Ok(SegmentKind::ObjectDefinition),
            0x16 => Ok(SegmentKind::PresentationComposition),
            0x17 => Ok(SegmentKind::WindowDefinition),
            0x80 => Ok(SegmentKind::End),
            _ => Err(value),
        }
    }
}

/// How a display set relates to the decoder state that preceded it.
///
/// Anything other than [`CompositionState::Normal`] starts a new epoch:
/// definitions from earlier display sets no longer apply.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionState {
    /// Incremental update, inherits the current epoch's definitions.
    Normal = 0x00,
    /// Safe re-entry point carrying a full set of definitions.
    AcquisitionPoint = 0x40,
    /// Complete reset of decoder state.
    EpochStart = 0x80,
}

impl CompositionState {
    /// Whether context accumulation must stop at this display set.
    #[inline]
    pub fn is_epoch_boundary(self) -> bool {
        !matches!(self, CompositionState::Normal)
    }
}

impl TryFrom<u8> for CompositionState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CompositionState::Normal),
            0x40 => Ok(CompositionState::AcquisitionPoint),
            0x80 => Ok(CompositionState::EpochStart),
            _ => Err(value),
        }
    }
}
