//! Error types for record encoding and decoding.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The payload is shorter than the codec header.
    #[error("record payload truncated: need at least {needed} bytes, have {have}")]
    UnexpectedEof { needed: usize, have: usize },

    /// The stored checksum does not match the value bytes.
    #[error("corrupt record payload: CRC mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    Corrupt { stored: u32, computed: u32 },
}
