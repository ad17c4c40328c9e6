//! Storage engine error types.
//!
//! No error is recovered internally; everything propagates to the caller.
//! [`Error::OffsetOutOfRange`] is the one variant front-ends are expected
//! to pattern-match (to translate into a not-found status, or to tail-wait
//! in a streaming consumer). The wire translation itself lives with the
//! front-end, not here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The offset is not covered by any segment, or lies beyond the highest
    /// written offset. Carries the requested offset.
    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    /// The index has no entry at the requested slot, or its preallocated
    /// space is exhausted.
    #[error("end of index")]
    Eof,

    /// Filesystem or mmap failure, propagated verbatim.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record payload failed to decode.
    #[error("codec error: {0}")]
    Codec(#[from] driftlog_core::Error),
}
