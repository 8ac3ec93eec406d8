//! Error types for stream loading and byte-source reads.

use thiserror::Error;

/// Errors surfaced while reading from a byte source or loading a stream.
///
/// Malformed stream contents are not represented here: the parser stops at
/// the last complete display set instead of raising, and unresolvable
/// references inside a display set yield no output rather than an error.
#[derive(Debug, Error)]
pub enum PgsError {
    /// A bounded byte source ran out of data mid-read.
    #[error("byte source ended unexpectedly at position {position}")]
    UnexpectedEnd { position: usize },

    /// The supplier behind a streaming byte source failed.
    #[error("transport error: {0}")]
    Transport(String),
}
