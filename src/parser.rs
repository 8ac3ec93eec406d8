//! Segment stream parsing into display sets.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::composition::PresentationCompositionSegment;
use crate::display_set::DisplaySet;
use crate::error::PgsError;
use crate::object::ObjectDefinitionSegment;
use crate::palette::PaletteDefinitionSegment;
use crate::segment::SegmentKind;
use crate::source::{ByteSource, ReadFieldsExt};
use crate::window::WindowDefinitionSegment;

/// Magic number opening every segment header: "PG".
const SEGMENT_MAGIC: u16 = 0x5047;

/// Minimum interval between two progress callbacks.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Parsing progress handed to load callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Display sets completed so far.
    pub display_sets: usize,
    /// Bytes consumed from the source so far.
    pub bytes_read: usize,
}

/// Callback invoked at most once per second while parsing, and exactly once
/// more after the final segment.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(LoadProgress) + Send);

struct SegmentHeader {
    pts: u32,
    kind: u8,
    size: usize,
}

/// Consume `source` segment by segment, appending each completed display
/// set and its timestamp to the output sequences in arrival order.
///
/// A truncated header or payload ends parsing at the last complete display
/// set; an in-progress one is discarded, never published. Transport
/// failures propagate to the caller with whatever complete display sets
/// were parsed before the failure left in place.
pub(crate) async fn parse_stream<S: ByteSource>(
    source: &mut S,
    display_sets: &mut Vec<DisplaySet>,
    timestamps: &mut Vec<u32>,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<(), PgsError> {
    let mut open = DisplaySet::new();
    let mut last_report = Instant::now();

    loop {
        if source.at_end().await {
            break;
        }

        let header = match read_header(source).await {
            Ok(Some(header)) => header,
            Ok(None) => break,
            Err(err) => return Err(err),
        };

        let payload = match source.read_bytes(header.size).await {
            Ok(payload) => payload,
            Err(PgsError::UnexpectedEnd { position }) => {
                warn!(position, "segment payload truncated, stopping");
                break;
            }
            Err(err) => return Err(err),
        };

        match SegmentKind::try_from(header.kind) {
            Ok(SegmentKind::PaletteDefinition) => {
                match PaletteDefinitionSegment::parse(&payload) {
                    Some(palette) => open.palettes.push(palette),
                    None => debug!(pts = header.pts, "skipping malformed palette definition"),
                }
            }
            Ok(SegmentKind::ObjectDefinition) => {
                match ObjectDefinitionSegment::parse(&payload) {
                    Some(object) => open.objects.push(object),
                    None => debug!(pts = header.pts, "skipping malformed object definition"),
                }
            }
            Ok(SegmentKind::PresentationComposition) => {
                match PresentationCompositionSegment::parse(&payload) {
                    Some(composition) => open.composition = Some(composition),
                    None => debug!(pts = header.pts, "skipping malformed composition"),
                }
            }
            Ok(SegmentKind::WindowDefinition) => {
                match WindowDefinitionSegment::parse(&payload) {
                    Some(windows) => open.windows.push(windows),
                    None => debug!(pts = header.pts, "skipping malformed window definition"),
                }
            }
            Ok(SegmentKind::End) => {
                let mut finished = std::mem::take(&mut open);
                finished.pts = header.pts;
                timestamps.push(finished.pts);
                display_sets.push(finished);
            }
            Err(kind) => {
                debug!(kind, size = header.size, "skipping unknown segment kind");
            }
        }

        if let Some(report) = progress.as_mut() {
            if last_report.elapsed() >= PROGRESS_INTERVAL {
                report(LoadProgress {
                    display_sets: display_sets.len(),
                    bytes_read: source.position(),
                });
                last_report = Instant::now();
            }
        }
    }

    if let Some(report) = progress.as_mut() {
        report(LoadProgress {
            display_sets: display_sets.len(),
            bytes_read: source.position(),
        });
    }

    Ok(())
}

/// Read one segment header. `Ok(None)` means the stream ended (truncated
/// header or bad magic) and parsing should stop cleanly.
async fn read_header<S: ByteSource>(source: &mut S) -> Result<Option<SegmentHeader>, PgsError> {
    let position = source.position();

    let magic = match source.read_u16().await {
        Ok(magic) => magic,
        Err(PgsError::UnexpectedEnd { .. }) => return Ok(None),
        Err(err) => return Err(err),
    };
    if magic != SEGMENT_MAGIC {
        warn!(position, magic, "bad segment magic, stopping");
        return Ok(None);
    }

    let rest = async {
        let pts = source.read_u32().await?;
        let _dts = source.read_u32().await?;
        let kind = source.read_u8().await?;
        let size = source.read_u16().await? as usize;
        Ok(SegmentHeader { pts, kind, size })
    };

    match rest.await {
        Ok(header) => Ok(Some(header)),
        Err(PgsError::UnexpectedEnd { position }) => {
            warn!(position, "segment header truncated, stopping");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
