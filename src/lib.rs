//! # supstream
//!
//! Decoder for Presentation Graphic Stream (PGS) subtitles, the bitmap
//! subtitle container used on Blu-ray discs (`.sup` files).
//!
//! A stream is parsed into immutable display sets once; afterwards any
//! playback position can be queried for its compiled subtitle — decoded
//! RGBA pixels plus placement metadata — with a small LRU cache keeping
//! nearby seeks cheap. Epoch context is re-derived per query, so seeking
//! backwards and forwards in any order stays correct.
//!
//! ```no_run
//! use supstream::Pgs;
//!
//! # fn main() -> Result<(), supstream::PgsError> {
//! let data = std::fs::read("subtitles.sup").unwrap();
//!
//! let mut pgs = Pgs::new();
//! pgs.load_blob(&data)?;
//!
//! if let Some(subtitle) = pgs.subtitle_at_timestamp(63.5) {
//!     for object in &subtitle.objects {
//!         // blit object.rgba at (object.composition.x, object.composition.y)
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Streaming transports feed a [`StreamSource`] through a channel instead,
//! and drive [`Pgs::load`] (or [`Pgs::load_with_progress`]) as a future.

mod cache;
mod composition;
mod display_set;
mod error;
mod object;
mod palette;
mod parser;
mod pgs;
mod rle;
mod segment;
mod source;
#[cfg(test)]
pub(crate) mod testutil;
mod utils;
mod window;

pub use composition::{CompositionObject, Crop, PresentationCompositionSegment};
pub use display_set::DisplaySet;
pub use error::PgsError;
pub use object::ObjectDefinitionSegment;
pub use palette::PaletteDefinitionSegment;
pub use parser::LoadProgress;
pub use pgs::{CompiledObject, Pgs, SubtitleData};
pub use rle::decode_rle;
pub use segment::{CompositionState, SegmentKind};
pub use source::{BufferSource, ByteSource, ChunkResult, ChunkedSource, ReadFieldsExt, StreamSource};
pub use window::{WindowDefinition, WindowDefinitionSegment};
