//! The PGS decoder: loading, seeking and subtitle compilation.

use std::sync::Arc;

use tracing::trace;

use crate::cache::{CachedSubtitle, SubtitleCache, DEFAULT_CACHE_CAPACITY};
use crate::composition::CompositionObject;
use crate::display_set::DisplaySet;
use crate::error::PgsError;
use crate::object::ObjectDefinitionSegment;
use crate::palette::PaletteDefinitionSegment;
use crate::parser::{parse_stream, LoadProgress, ProgressFn};
use crate::rle::decode_rle;
use crate::source::{BufferSource, ByteSource};
use crate::utils::binary_search_timestamp;
use crate::window::WindowDefinition;

/// One object of a compiled subtitle, ready to blit.
///
/// `rgba` is `width * height` pixels in RGBA byte order. Position and
/// cropping come from the composition object and its window; applying them
/// is the renderer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledObject {
    /// The placement that produced this image
    pub composition: CompositionObject,
    /// The window the placement refers to
    pub window: WindowDefinition,
    /// Decoded image width in pixels
    pub width: u16,
    /// Decoded image height in pixels
    pub height: u16,
    /// Decoded pixels, RGBA byte order
    pub rgba: Vec<u8>,
}

/// A fully compiled subtitle for one display set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleData {
    /// Subtitle canvas width
    pub width: u16,
    /// Subtitle canvas height
    pub height: u16,
    /// Compiled objects in composition order
    pub objects: Vec<CompiledObject>,
}

/// Everything live at one point in the timeline: the palette, object and
/// window definitions accumulated since the current epoch began.
#[derive(Default)]
struct EpochContext<'a> {
    palettes: Vec<&'a PaletteDefinitionSegment>,
    objects: Vec<&'a ObjectDefinitionSegment>,
    windows: Vec<&'a WindowDefinition>,
}

/// A decoded PGS stream with seek-friendly subtitle lookup.
///
/// One instance owns one stream; loading a new stream replaces the old one
/// and clears the cache. Queries mutate the cache, so an instance is meant
/// for a single caller at a time.
pub struct Pgs {
    display_sets: Vec<DisplaySet>,
    timestamps: Vec<u32>,
    cache: SubtitleCache,
}

impl Pgs {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a decoder whose subtitle cache holds up to `capacity` entries.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            display_sets: Vec::new(),
            timestamps: Vec::new(),
            cache: SubtitleCache::new(capacity),
        }
    }

    /// Decode a whole in-memory stream. Returns the display-set count.
    pub fn load_blob(&mut self, data: &[u8]) -> Result<usize, PgsError> {
        // Buffer sources never suspend, so blocking here cannot stall.
        futures::executor::block_on(self.load(BufferSource::from(data)))
    }

    /// Decode a stream from any byte source.
    pub async fn load<S: ByteSource>(&mut self, source: S) -> Result<usize, PgsError> {
        self.load_inner(source, None).await
    }

    /// Decode a stream, reporting progress at most once per second and once
    /// more when parsing completes.
    pub async fn load_with_progress<S, F>(
        &mut self,
        source: S,
        mut progress: F,
    ) -> Result<usize, PgsError>
    where
        S: ByteSource,
        F: FnMut(LoadProgress) + Send,
    {
        self.load_inner(source, Some(&mut progress)).await
    }

    async fn load_inner<S: ByteSource>(
        &mut self,
        mut source: S,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<usize, PgsError> {
        let mut display_sets = Vec::new();
        let mut timestamps = Vec::new();
        let result = parse_stream(&mut source, &mut display_sets, &mut timestamps, progress).await;

        match result {
            Ok(()) => {
                self.install(display_sets, timestamps);
                Ok(self.display_sets.len())
            }
            Err(err) => {
                // A failed load only displaces the previous stream once the
                // new parse has produced at least one display set.
                if !display_sets.is_empty() {
                    self.install(display_sets, timestamps);
                }
                Err(err)
            }
        }
    }

    fn install(&mut self, display_sets: Vec<DisplaySet>, timestamps: Vec<u32>) {
        self.display_sets = display_sets;
        self.timestamps = timestamps;
        self.cache.clear();
    }

    /// Number of display sets in the loaded stream.
    pub fn len(&self) -> usize {
        self.display_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_sets.is_empty()
    }

    /// Presentation timestamps in 90 kHz ticks, one per display set, in
    /// strictly increasing order.
    pub fn update_timestamps(&self) -> &[u32] {
        &self.timestamps
    }

    /// The parsed display sets in arrival order.
    pub fn display_sets(&self) -> &[DisplaySet] {
        &self.display_sets
    }

    /// Index of the display set active at `seconds`, if any.
    ///
    /// A display set is active from its own timestamp up to, but not
    /// including, the next one; nothing is active before the first or at
    /// and after the last recorded timestamp.
    pub fn index_at_timestamp(&self, seconds: f64) -> Option<usize> {
        let first = *self.timestamps.first()? as u64;
        let last = *self.timestamps.last()? as u64;

        let ticks = (seconds * 90_000.0) as u64;
        if seconds < 0.0 || ticks < first || ticks >= last {
            return None;
        }
        Some(binary_search_timestamp(&self.timestamps, ticks))
    }

    /// Compiled subtitle active at `seconds`, if any.
    pub fn subtitle_at_timestamp(&mut self, seconds: f64) -> Option<Arc<SubtitleData>> {
        let index = self.index_at_timestamp(seconds)?;
        self.subtitle_at_index(index)
    }

    /// Compiled subtitle for a display-set index, if it shows anything.
    ///
    /// Outcomes are cached either way; a hit returns the shared compiled
    /// data without recomputing.
    pub fn subtitle_at_index(&mut self, index: usize) -> Option<Arc<SubtitleData>> {
        if index >= self.display_sets.len() {
            return None;
        }

        if let Some(cached) = self.cache.get(index) {
            return match cached {
                CachedSubtitle::Present(subtitle) => Some(subtitle),
                CachedSubtitle::Absent => None,
            };
        }

        let compiled = compile(&self.display_sets, index).map(Arc::new);
        let outcome = match &compiled {
            Some(subtitle) => CachedSubtitle::Present(Arc::clone(subtitle)),
            None => CachedSubtitle::Absent,
        };
        self.cache.insert(index, outcome);
        compiled
    }

    /// Compile and cache the subtitle at `index` without returning it.
    pub fn cache_at_index(&mut self, index: usize) {
        let _ = self.subtitle_at_index(index);
    }
}

impl Default for Pgs {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconstruct the definitions live at `index` by walking back to the start
/// of the current epoch.
///
/// A pure function over the immutable display-set sequence, so lookups stay
/// correct under arbitrary, non-monotonic seek order. Accumulation runs
/// from the epoch boundary forward, which leaves definitions in arrival
/// order; the walk never crosses a display set whose composition state is
/// not `Normal`.
fn resolve_context(display_sets: &[DisplaySet], index: usize) -> EpochContext<'_> {
    let start = epoch_start(display_sets, index);

    let mut context = EpochContext::default();
    for set in &display_sets[start..=index] {
        context.palettes.extend(set.palettes.iter());
        context.objects.extend(set.objects.iter());
        for windows in &set.windows {
            context.windows.extend(windows.windows.iter());
        }
    }
    context
}

/// Index of the display set opening the epoch that `index` belongs to.
fn epoch_start(display_sets: &[DisplaySet], index: usize) -> usize {
    for i in (0..=index).rev() {
        if let Some(composition) = &display_sets[i].composition {
            if composition.state.is_epoch_boundary() {
                return i;
            }
        }
    }
    0
}

/// Compile one display set against its epoch context.
///
/// Returns `None` when the display set presents nothing: no composition,
/// an unresolvable palette, or no composition object that could be decoded.
fn compile(display_sets: &[DisplaySet], index: usize) -> Option<SubtitleData> {
    let composition = display_sets[index].composition.as_ref()?;
    let context = resolve_context(display_sets, index);

    let palette = context
        .palettes
        .iter()
        .find(|palette| palette.id == composition.palette_id)?;

    let mut objects = Vec::new();
    for comp_obj in &composition.objects {
        let Some(window) = context
            .windows
            .iter()
            .find(|window| window.id == comp_obj.window_id)
        else {
            trace!(window_id = comp_obj.window_id, "skipping object with unresolved window");
            continue;
        };

        let fragments: Vec<&ObjectDefinitionSegment> = context
            .objects
            .iter()
            .copied()
            .filter(|object| object.id == comp_obj.object_id)
            .collect();
        let Some(first) = fragments.iter().find(|f| f.is_first_in_sequence()) else {
            trace!(object_id = comp_obj.object_id, "skipping object with no definition");
            continue;
        };

        let (width, height) = (first.width, first.height);
        let pixel_count = width as usize * height as usize;
        if pixel_count == 0 {
            continue;
        }

        // Fragments sharing the id are concatenated in accumulation order
        // before decoding; only the first carries the dimensions.
        let mut encoded = Vec::with_capacity(fragments.iter().map(|f| f.data.len()).sum());
        for fragment in &fragments {
            encoded.extend_from_slice(&fragment.data);
        }

        let mut pixels = vec![0u32; pixel_count];
        let emitted = decode_rle(&encoded, &palette.rgba, &mut pixels);
        if emitted < pixel_count {
            // Malformed or incomplete image; whatever decoded is shown and
            // the remainder stays transparent.
            trace!(
                object_id = comp_obj.object_id,
                emitted,
                expected = pixel_count,
                "run-length data ended early"
            );
        }

        let rgba = pixels.iter().flat_map(|pixel| pixel.to_le_bytes()).collect();

        objects.push(CompiledObject {
            composition: *comp_obj,
            window: **window,
            width,
            height,
            rgba,
        });
    }

    if objects.is_empty() {
        return None;
    }

    Some(SubtitleData {
        width: composition.width,
        height: composition.height,
        objects,
    })
}
