//! Display sets: the segments making up one subtitle update.

use crate::composition::PresentationCompositionSegment;
use crate::object::ObjectDefinitionSegment;
use crate::palette::PaletteDefinitionSegment;
use crate::window::WindowDefinitionSegment;

/// All segments belonging to a single presentation update.
///
/// Built by the parser while consuming one contiguous run of segments up to
/// and including an End segment, and immutable afterwards. Display sets are
/// owned by the decoded stream's sequence and indexed by arrival order.
#[derive(Debug, Clone, Default)]
pub struct DisplaySet {
    /// Presentation timestamp in 90 kHz clock ticks
    pub pts: u32,
    /// The composition describing what to present, if any
    pub composition: Option<PresentationCompositionSegment>,
    /// Palette definitions carried by this update, in arrival order
    pub palettes: Vec<PaletteDefinitionSegment>,
    /// Object definition fragments carried by this update, in arrival order
    pub objects: Vec<ObjectDefinitionSegment>,
    /// Window definitions carried by this update, in arrival order
    pub windows: Vec<WindowDefinitionSegment>,
}

impl DisplaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any segment besides the timestamp was collected.
    pub fn is_empty(&self) -> bool {
        self.composition.is_none()
            && self.palettes.is_empty()
            && self.objects.is_empty()
            && self.windows.is_empty()
    }

    /// Presentation timestamp in seconds.
    #[inline]
    pub fn pts_seconds(&self) -> f64 {
        self.pts as f64 / 90_000.0
    }
}
