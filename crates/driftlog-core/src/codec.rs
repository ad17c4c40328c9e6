//! Wire format for record payloads.
//!
//! Every record is serialized into a self-checking payload before the
//! storage engine sees it:
//!
//! ```text
//! ┌──────────────┬──────────────────┬─────────────┐
//! │ offset       │ crc32(value)     │ value       │
//! │ (8 bytes BE) │ (4 bytes BE)     │ (N bytes)   │
//! └──────────────┴──────────────────┴─────────────┘
//! ```
//!
//! The checksum covers the value bytes only; the offset is restamped by the
//! log on every append, so corrupting it is caught by the index/offset
//! routing instead.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Record, Result};

/// Offset (8 bytes) + CRC32 (4 bytes).
pub const HEADER_LEN: usize = 12;

/// Serializes `record` into its wire payload.
pub fn encode(record: &Record) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + record.value.len());
    buf.put_u64(record.offset);
    buf.put_u32(crc32fast::hash(&record.value));
    buf.put_slice(&record.value);
    buf.freeze()
}

/// Deserializes a wire payload back into a record, verifying the checksum.
pub fn decode(payload: &[u8]) -> Result<Record> {
    if payload.len() < HEADER_LEN {
        return Err(Error::UnexpectedEof {
            needed: HEADER_LEN,
            have: payload.len(),
        });
    }

    let mut buf = payload;
    let offset = buf.get_u64();
    let stored = buf.get_u32();

    let value = Bytes::copy_from_slice(buf);
    let computed = crc32fast::hash(&value);
    if stored != computed {
        return Err(Error::Corrupt { stored, computed });
    }

    Ok(Record { offset, value })
}
